use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::graph::error::GraphError;
use crate::model::Trigger;

/// Intent type tag for back/return navigation whose target is decided by
/// the host's navigation history.
pub const NAVIGATE_BACK: &str = "NAVIGATE_BACK";

/// Element id bound to intents owned by a screen rather than an element.
/// Atomic executors treat it as the host's own back/finish affordance.
pub const SCREEN_ELEMENT_ID: &str = "auto_back_btn";

// ============================================================================
// Semantic graph model
// ============================================================================

/// Semantic graph: screens keyed by id, each holding its elements and
/// screen-level intents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiMap {
    #[serde(default)]
    pub states: BTreeMap<String, Screen>,

    #[serde(default = "default_version")]
    pub version: String,
}

/// One addressable screen of the host application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    #[serde(rename = "stateId", alias = "screenId", default)]
    pub screen_id: String,

    #[serde(rename = "components", alias = "elements", default)]
    pub elements: Vec<Element>,

    /// Intents owned by the screen itself rather than one of its elements
    #[serde(default)]
    pub intents: Vec<Intent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An interactive unit on a screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(rename = "componentId", alias = "elementId")]
    pub element_id: String,

    /// Declared type, e.g. `BUTTON`, `SWITCH`, `TEXT_FIELD`
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(
        rename = "contentDescription",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub content_description: Option<String>,

    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Empty means "not declared"; see [`Element::supports`].
    #[serde(rename = "supportedTriggers", default, skip_serializing_if = "Vec::is_empty")]
    pub supported_triggers: Vec<Trigger>,

    #[serde(default)]
    pub properties: BTreeMap<String, String>,

    #[serde(default)]
    pub intents: Vec<Intent>,
}

/// A named, typed edge owned by a screen or one of its elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    #[serde(rename = "intentId")]
    pub intent_id: String,

    /// Type tag, either a trigger name (`CLICK`) or an intent category
    /// (`NAVIGATION`, `NAVIGATE_BACK`, `SUBMIT`, ...)
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Empty when navigation history decides the destination
    #[serde(rename = "targetStateId", alias = "targetScreenId", default)]
    pub target_screen_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Behaviour
// ============================================================================

impl Intent {
    /// Whether the destination depends on navigation history. Back intents
    /// count even when they name a screen.
    pub fn has_unknown_destination(&self) -> bool {
        self.kind.eq_ignore_ascii_case(NAVIGATE_BACK) || !self.has_declared_target()
    }

    /// Whether the intent names the screen it lands on, whatever its type.
    pub fn has_declared_target(&self) -> bool {
        !self.target_screen_id.is_empty()
    }

    pub fn trigger(&self) -> Trigger {
        Trigger::from_intent_type(&self.kind)
    }
}

impl Element {
    /// Displayed text, falling back to the content description.
    pub fn label(&self) -> Option<&str> {
        self.text
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(self.content_description.as_deref())
    }

    /// Whether the element accepts a trigger. Elements that declare no
    /// triggers accept any trigger one of their intents uses, plus click.
    pub fn supports(&self, trigger: Trigger) -> bool {
        if self.supported_triggers.is_empty() {
            trigger == Trigger::Click || self.intents.iter().any(|i| i.trigger() == trigger)
        } else {
            self.supported_triggers.contains(&trigger)
        }
    }

    pub fn owns_intent(&self, intent_id: &str) -> bool {
        self.intents.iter().any(|i| i.intent_id == intent_id)
    }

    pub fn semantic_role(&self) -> &str {
        self.properties
            .get("semanticRole")
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Who owns an intent on a screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntentOwner<'a> {
    Element(&'a Element),
    Screen,
}

impl Screen {
    pub fn element(&self, element_id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.element_id == element_id)
    }

    /// Screen-level intents first, then every element's intents in order.
    pub fn all_intents(&self) -> impl Iterator<Item = &Intent> {
        self.intents
            .iter()
            .chain(self.elements.iter().flat_map(|e| e.intents.iter()))
    }

    pub fn owner_of(&self, intent_id: &str) -> Option<IntentOwner<'_>> {
        if self.intents.iter().any(|i| i.intent_id == intent_id) {
            return Some(IntentOwner::Screen);
        }
        self.elements
            .iter()
            .find(|e| e.owns_intent(intent_id))
            .map(IntentOwner::Element)
    }
}

impl UiMap {
    /// Parse a semantic graph document. Screens with an empty id take the
    /// id of their key; a conflicting id is rejected.
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        let mut map: UiMap = serde_json::from_str(json).map_err(|e| GraphError::JsonParse {
            context: "ui map".into(),
            source: e,
        })?;
        for (key, screen) in map.states.iter_mut() {
            if screen.screen_id.is_empty() {
                screen.screen_id = key.clone();
            } else if &screen.screen_id != key {
                return Err(GraphError::ScreenKeyMismatch {
                    key: key.clone(),
                    declared: screen.screen_id.clone(),
                });
            }
        }
        Ok(map)
    }

    pub fn load(path: &str) -> Result<Self, GraphError> {
        let content = std::fs::read_to_string(path).map_err(|e| GraphError::Io {
            path: path.to_string(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    /// Build a map from screens, keyed by their ids.
    pub fn from_screens(screens: impl IntoIterator<Item = Screen>) -> Self {
        Self {
            states: screens
                .into_iter()
                .map(|s| (s.screen_id.clone(), s))
                .collect(),
            version: default_version(),
        }
    }

    pub fn screen(&self, screen_id: &str) -> Option<&Screen> {
        self.states.get(screen_id)
    }

    pub fn contains(&self, screen_id: &str) -> bool {
        self.states.contains_key(screen_id)
    }

    pub fn screen_ids(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }

    pub fn fingerprint(&self) -> String {
        crate::graph::fingerprint(self)
    }
}
