pub mod ollama;
pub mod rule_based;

use crate::semantic::TargetSpec;

pub use ollama::{OllamaClient, OllamaTargetResolver, OllamaTextResolver, parse_target_reply};
pub use rule_based::RuleBasedResolver;

#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    #[error("request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("model reply is not a valid {expected}: {reply}")]
    MalformedReply { expected: String, reply: String },

    #[error("'{text}' is not one of the indexed texts")]
    NotACandidate { text: String },
}

/// Turns a natural-language intent into a structured goal.
pub trait TargetResolver: Send + Sync {
    fn resolve(&self, intent: &str) -> Result<TargetSpec, ResolverError>;
}

/// Picks which indexed visible text an intent refers to.
pub trait VisibleTextResolver: Send + Sync {
    fn resolve(
        &self,
        intent: &str,
        start_screen: &str,
        candidates: &[&str],
    ) -> Result<String, ResolverError>;
}

/// Uses the intent verbatim as the target text.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTextResolver;

impl VisibleTextResolver for IdentityTextResolver {
    fn resolve(&self, intent: &str, _start: &str, _candidates: &[&str]) -> Result<String, ResolverError> {
        Ok(intent.trim().to_string())
    }
}
