use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Structured goal produced by a target resolver.
///
/// Tagged on `type` so model replies of the form
/// `{"type":"StateTarget","stateId":"Main","confidence":0.9}` parse directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TargetSpec {
    /// Reach a named screen.
    StateTarget(StateTarget),

    /// Reach a screen holding an element matching a fuzzy description.
    ComponentTarget(ComponentTarget),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateTarget {
    pub state_id: String,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_role: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub component_properties: BTreeMap<String, String>,

    #[serde(default)]
    pub confidence: f64,
}

impl TargetSpec {
    pub fn state(state_id: impl Into<String>, confidence: f64) -> Self {
        TargetSpec::StateTarget(StateTarget {
            state_id: state_id.into(),
            confidence,
        })
    }

    pub fn component(target: ComponentTarget) -> Self {
        TargetSpec::ComponentTarget(target)
    }

    pub fn confidence(&self) -> f64 {
        match self {
            TargetSpec::StateTarget(t) => t.confidence,
            TargetSpec::ComponentTarget(t) => t.confidence,
        }
    }
}

impl ComponentTarget {
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.component_id = Some(id.into());
        self
    }

    pub fn with_type(mut self, kind: impl Into<String>) -> Self {
        self.component_type = Some(kind.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.component_text = Some(text.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.component_role = Some(role.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.component_properties.insert(key.into(), value.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetSpec::StateTarget(t) => write!(f, "state '{}' ({:.2})", t.state_id, t.confidence),
            TargetSpec::ComponentTarget(t) => {
                let mut parts = Vec::new();
                if let Some(id) = &t.component_id {
                    parts.push(format!("id={}", id));
                }
                if let Some(kind) = &t.component_type {
                    parts.push(format!("type={}", kind));
                }
                if let Some(text) = &t.component_text {
                    parts.push(format!("text='{}'", text));
                }
                if let Some(role) = &t.component_role {
                    parts.push(format!("role={}", role));
                }
                write!(f, "component [{}] ({:.2})", parts.join(", "), t.confidence)
            }
        }
    }
}
