use thiserror::Error;

/// Errors raised while loading or validating a graph document.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("failed to read graph file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parse error ({context}): {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("transition table references screen index {screen} which is not in page_index")]
    DanglingSource { screen: u32 },

    #[error("action {action} has no metadata")]
    MissingMetadata { action: u32 },

    #[error(transparent)]
    MalformedPath(#[from] crate::model::MalformedPath),

    #[error("screen record keyed '{key}' declares id '{declared}'")]
    ScreenKeyMismatch { key: String, declared: String },
}
