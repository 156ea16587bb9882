use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::graph::error::GraphError;
use crate::model::{ActionRef, ActionStep, Trigger};

pub type ScreenIdx = u32;
pub type ActionId = u32;

// ============================================================================
// Document model
// ============================================================================

/// Metadata recorded for every indexed action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionMeta {
    /// Screen the action lives on
    pub page: String,

    /// Element fired by the action
    pub component_id: String,

    /// Trigger name, e.g. `CLICK`
    pub trigger_type: String,

    /// Displayed text (or content description) of the element
    #[serde(default)]
    pub visible_text: String,

    /// Declared element type, e.g. `BUTTON`
    #[serde(default)]
    pub view_type: String,
}

impl ActionMeta {
    pub fn trigger(&self) -> Trigger {
        Trigger::from_intent_type(&self.trigger_type)
    }
}

/// Where an action leads.
///
/// On disk an unknown destination is an empty list; in memory it is a
/// distinct variant so "stay and keep searching" is never confused with
/// "no edge". A screen with no entry in the transition table has no edges
/// at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ScreenIdx>", into = "Vec<ScreenIdx>")]
pub enum Destination {
    /// One or more concrete screens; more than one is a nondeterministic
    /// branch resolved only at execution time.
    Screens(Vec<ScreenIdx>),

    /// Return/back action whose target depends on navigation history.
    Unknown,
}

impl From<Vec<ScreenIdx>> for Destination {
    fn from(screens: Vec<ScreenIdx>) -> Self {
        if screens.is_empty() {
            Destination::Unknown
        } else {
            Destination::Screens(screens)
        }
    }
}

impl From<Destination> for Vec<ScreenIdx> {
    fn from(dest: Destination) -> Self {
        match dest {
            Destination::Screens(screens) => screens,
            Destination::Unknown => Vec::new(),
        }
    }
}

impl Destination {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Destination::Unknown)
    }

    pub fn screens(&self) -> &[ScreenIdx] {
        match self {
            Destination::Screens(screens) => screens,
            Destination::Unknown => &[],
        }
    }

    pub fn contains(&self, screen: ScreenIdx) -> bool {
        self.screens().contains(&screen)
    }
}

/// Flat transition index consumed by the blind planner.
///
/// Mirrors the on-disk document exactly: `page_index`, `action_index`,
/// `action_metadata`, `visible_text_index` and `transition`. Unknown
/// top-level keys are ignored. Maps are ordered so every search over the
/// index is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionMap {
    /// Screen name -> screen index
    #[serde(default)]
    pub page_index: BTreeMap<String, ScreenIdx>,

    /// Action key -> action id. Keys are opaque to the planner.
    #[serde(default)]
    pub action_index: BTreeMap<String, ActionId>,

    /// Action id -> metadata
    #[serde(default)]
    pub action_metadata: BTreeMap<ActionId, ActionMeta>,

    /// Display text -> action ids showing that text
    #[serde(default)]
    pub visible_text_index: BTreeMap<String, Vec<ActionId>>,

    /// Screen index -> action id -> destination
    #[serde(default)]
    pub transition: BTreeMap<ScreenIdx, BTreeMap<ActionId, Destination>>,
}

impl TransitionMap {
    /// Parse and validate a transition document.
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        let map: TransitionMap = serde_json::from_str(json).map_err(|e| GraphError::JsonParse {
            context: "transition map".into(),
            source: e,
        })?;
        map.validate()?;
        Ok(map)
    }

    /// Load a transition document from disk.
    pub fn load(path: &str) -> Result<Self, GraphError> {
        let content = std::fs::read_to_string(path).map_err(|e| GraphError::Io {
            path: path.to_string(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    pub fn to_json_pretty(&self) -> Result<String, GraphError> {
        serde_json::to_string_pretty(self).map_err(|e| GraphError::JsonParse {
            context: "serialize transition map".into(),
            source: e,
        })
    }

    /// Every transition source must be a known screen.
    pub fn validate(&self) -> Result<(), GraphError> {
        let known: BTreeSet<ScreenIdx> = self.page_index.values().copied().collect();
        match self.transition.keys().find(|s| !known.contains(s)) {
            Some(screen) => Err(GraphError::DanglingSource { screen: *screen }),
            None => Ok(()),
        }
    }

    /// Exact lookup in the visible-text index. `None` on a miss.
    pub fn resolve_actions_for_text(&self, text: &str) -> Option<BTreeSet<ActionId>> {
        self.visible_text_index
            .get(text)
            .map(|ids| ids.iter().copied().collect())
    }

    /// All outgoing edges of a screen. `None` means the screen has no
    /// transitions at all, which is different from an edge whose
    /// destination is unknown.
    pub fn actions_from(&self, screen: ScreenIdx) -> Option<&BTreeMap<ActionId, Destination>> {
        self.transition.get(&screen)
    }

    pub fn screen_index(&self, name: &str) -> Option<ScreenIdx> {
        self.page_index.get(name).copied()
    }

    pub fn screen_name(&self, idx: ScreenIdx) -> Option<&str> {
        self.page_index
            .iter()
            .find(|(_, i)| **i == idx)
            .map(|(name, _)| name.as_str())
    }

    pub fn action_meta(&self, action: ActionId) -> Option<&ActionMeta> {
        self.action_metadata.get(&action)
    }

    /// Screen an action belongs to, according to its metadata.
    pub fn owning_screen(&self, action: ActionId) -> Option<ScreenIdx> {
        self.action_meta(action)
            .and_then(|meta| self.screen_index(&meta.page))
    }

    pub fn visible_texts(&self) -> impl Iterator<Item = &str> {
        self.visible_text_index.keys().map(String::as_str)
    }

    /// Resolve an action id to the element and trigger the executor fires.
    pub fn step_for(&self, action: ActionId) -> Result<ActionStep, GraphError> {
        let meta = self
            .action_meta(action)
            .ok_or(GraphError::MissingMetadata { action })?;
        Ok(ActionStep::new(
            ActionRef::Indexed(action),
            meta.component_id.clone(),
            meta.trigger(),
        ))
    }

    /// SHA-1 of the serialized document, used to tie plans and traces to
    /// the exact graph that produced them.
    pub fn fingerprint(&self) -> String {
        crate::graph::fingerprint(self)
    }
}

/// Render an action key for the `(screen, element, trigger)` triple.
pub fn action_key(screen: &str, element_id: &str, trigger: &str) -> String {
    format!("({}, {}, {})", screen, element_id, trigger)
}
