use crate::semantic::target::TargetSpec;

/// Semantic planning failures. Each carries enough context to diagnose the
/// request without re-running it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlannerError {
    /// The graph offers no candidate screen at all
    #[error("TARGET_NOT_FOUND: no screen can satisfy {target}")]
    TargetNotFound { target: TargetSpec },

    #[error("PATH_NOT_FOUND: no path from '{start}' to any of {targets:?}")]
    PathNotFound {
        start: String,
        targets: Vec<String>,
        target: TargetSpec,
    },

    /// The selector could not pick between candidate paths
    #[error("MULTIPLE_PATHS: {count} paths from '{start}', none preferred")]
    MultiplePaths {
        count: usize,
        start: String,
        targets: Vec<String>,
    },

    /// The selected path could not be turned into executable steps
    #[error("TARGET_SPEC_MISMATCH: {reason}")]
    TargetSpecMismatch { target: TargetSpec, reason: String },

    #[error("UNKNOWN_ERROR: {message} (intent '{intent}', start '{start}')")]
    Unknown {
        message: String,
        intent: String,
        start: String,
    },
}

impl PlannerError {
    pub fn code(&self) -> &'static str {
        match self {
            PlannerError::TargetNotFound { .. } => "TARGET_NOT_FOUND",
            PlannerError::PathNotFound { .. } => "PATH_NOT_FOUND",
            PlannerError::MultiplePaths { .. } => "MULTIPLE_PATHS",
            PlannerError::TargetSpecMismatch { .. } => "TARGET_SPEC_MISMATCH",
            PlannerError::Unknown { .. } => "UNKNOWN_ERROR",
        }
    }
}
