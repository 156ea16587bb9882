use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::graph::UiMap;
use crate::resolver::rule_based::RuleBasedResolver;
use crate::resolver::{ResolverError, TargetResolver, VisibleTextResolver};
use crate::semantic::TargetSpec;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_MODEL: &str = "qwen2.5:1.5b";

// ============================================================================
// Ollama client
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OllamaClient {
    pub endpoint: String,
    pub model: String,
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'static str,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaClient {
    pub fn new(endpoint: &str, model: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
        }
    }

    /// One non-streaming JSON completion. Returns the raw `response` text.
    pub fn generate(&self, prompt: &str) -> Result<String, ResolverError> {
        let request = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
            format: "json",
        };

        let http = |source: reqwest::Error| ResolverError::Http {
            endpoint: self.endpoint.clone(),
            source,
        };

        let client = reqwest::blocking::Client::new();
        let response = client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(http)?;

        let body: OllamaResponse = response.json().map_err(http)?;
        debug!(model = %self.model, reply = %body.response, "Ollama reply");
        Ok(body.response)
    }
}

/// Drop a surrounding ```` ```json ```` fence if the model added one.
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let inner = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Parse a model reply into a [`TargetSpec`], tolerating a code fence.
pub fn parse_target_reply(reply: &str) -> Result<TargetSpec, ResolverError> {
    serde_json::from_str(strip_code_fence(reply)).map_err(|_| ResolverError::MalformedReply {
        expected: "TargetSpec".into(),
        reply: reply.to_string(),
    })
}

// ============================================================================
// Target resolver
// ============================================================================

/// Asks a local model for a [`TargetSpec`]; any transport or parse failure
/// falls back to [`RuleBasedResolver`].
pub struct OllamaTargetResolver {
    client: OllamaClient,
    fallback: RuleBasedResolver,
    screens: Vec<String>,
    elements: Vec<String>,
}

impl OllamaTargetResolver {
    pub fn new(client: OllamaClient) -> Self {
        Self {
            client,
            fallback: RuleBasedResolver,
            screens: Vec::new(),
            elements: Vec::new(),
        }
    }

    /// Tell the model which screens and elements exist.
    pub fn with_map(mut self, map: &UiMap) -> Self {
        self.screens = map.screen_ids().map(str::to_string).collect();
        self.elements = map
            .states
            .values()
            .flat_map(|screen| {
                screen.elements.iter().map(move |e| {
                    format!(
                        "  - {} ({}) text=\"{}\" on {}",
                        e.element_id,
                        e.kind,
                        e.label().unwrap_or(""),
                        screen.screen_id
                    )
                })
            })
            .collect();
        self
    }

    fn build_prompt(&self, intent: &str) -> String {
        let screens = if self.screens.is_empty() {
            "  (unknown)".to_string()
        } else {
            self.screens
                .iter()
                .map(|s| format!("  - {}", s))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let elements = if self.elements.is_empty() {
            "  (unknown)".to_string()
        } else {
            self.elements.join("\n")
        };

        format!(
r#"Convert the user's instruction into a TargetSpec for mobile UI path planning.

A TargetSpec is one of:
1. {{"type":"StateTarget","stateId":"<screen id>","confidence":0.9}}
2. {{"type":"ComponentTarget","componentId":"<element id>","componentType":"<type>","componentText":"<text>","componentRole":"<role>","confidence":0.9}}

SCREENS:
{}

ELEMENTS:
{}

Rules:
- Only use screen ids and element ids listed above.
- Prefer a ComponentTarget when the instruction names something to press.
- confidence is a number between 0 and 1.
- Respond with the JSON object only.

Instruction: {}
"#,
            screens, elements, intent
        )
    }

    /// Model answer without the fallback.
    pub fn ask(&self, intent: &str) -> Result<TargetSpec, ResolverError> {
        let reply = self.client.generate(&self.build_prompt(intent))?;
        parse_target_reply(&reply)
    }
}

impl TargetResolver for OllamaTargetResolver {
    fn resolve(&self, intent: &str) -> Result<TargetSpec, ResolverError> {
        match self.ask(intent) {
            Ok(target) => Ok(target),
            Err(e) => {
                warn!(error = %e, "Model resolution failed, using keyword rules");
                Ok(self.fallback.resolve_intent(intent))
            }
        }
    }
}

// ============================================================================
// Visible text resolver
// ============================================================================

#[derive(Deserialize)]
struct TextReply {
    text: String,
}

/// Asks a local model which indexed visible text an intent refers to.
/// The reply must be one of the candidates.
pub struct OllamaTextResolver {
    client: OllamaClient,
}

impl OllamaTextResolver {
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }

    fn build_prompt(intent: &str, start_screen: &str, candidates: &[&str]) -> String {
        let listed = candidates
            .iter()
            .map(|c| format!("  - {}", c))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
r#"The app is on screen "{}". Which of these on-screen texts should be pressed to satisfy the instruction?

TEXTS:
{}

Respond with JSON only: {{"text":"<one of the texts above>"}}

Instruction: {}
"#,
            start_screen, listed, intent
        )
    }
}

impl VisibleTextResolver for OllamaTextResolver {
    fn resolve(
        &self,
        intent: &str,
        start_screen: &str,
        candidates: &[&str],
    ) -> Result<String, ResolverError> {
        let reply = self
            .client
            .generate(&Self::build_prompt(intent, start_screen, candidates))?;
        let parsed: TextReply =
            serde_json::from_str(strip_code_fence(&reply)).map_err(|_| ResolverError::MalformedReply {
                expected: "text reply".into(),
                reply: reply.clone(),
            })?;

        let text = parsed.text.trim();
        if candidates.contains(&text) {
            Ok(text.to_string())
        } else {
            Err(ResolverError::NotACandidate {
                text: text.to_string(),
            })
        }
    }
}
