use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::trigger::Trigger;

// ============================================================================
// Expected screens
// ============================================================================

/// What the planner expects the current screen to be at a point in a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "screens", rename_all = "snake_case")]
pub enum ExpectedScreen {
    /// Exactly this screen.
    Exact(String),

    /// One of several candidate screens (nondeterministic branch).
    AnyOf(Vec<String>),

    /// Destination depends on navigation history (back/return actions).
    Unknown,
}

impl ExpectedScreen {
    pub fn exact(screen: impl Into<String>) -> Self {
        ExpectedScreen::Exact(screen.into())
    }

    /// Whether an observed screen id satisfies this expectation.
    pub fn accepts(&self, screen_id: &str) -> bool {
        match self {
            ExpectedScreen::Exact(s) => s == screen_id,
            ExpectedScreen::AnyOf(all) => all.iter().any(|s| s == screen_id),
            ExpectedScreen::Unknown => true,
        }
    }

    pub fn as_exact(&self) -> Option<&str> {
        match self {
            ExpectedScreen::Exact(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ExpectedScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedScreen::Exact(s) => f.write_str(s),
            ExpectedScreen::AnyOf(all) => write!(f, "{{{}}}", all.join("|")),
            ExpectedScreen::Unknown => f.write_str("?"),
        }
    }
}

// ============================================================================
// Steps
// ============================================================================

/// Stable reference to the planned action a step came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionRef {
    /// Integer action id from the flat transition index.
    Indexed(u32),

    /// Intent id from the semantic graph.
    Intent(String),
}

impl fmt::Display for ActionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionRef::Indexed(id) => write!(f, "#{}", id),
            ActionRef::Intent(id) => f.write_str(id),
        }
    }
}

/// A single executable step: which element to fire and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionStep {
    pub action: ActionRef,
    pub element_id: String,
    pub trigger: Trigger,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
}

impl ActionStep {
    pub fn new(action: ActionRef, element_id: impl Into<String>, trigger: Trigger) -> Self {
        Self {
            action,
            element_id: element_id.into(),
            trigger,
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_parameters(mut self, parameters: BTreeMap<String, String>) -> Self {
        self.parameters = parameters;
        self
    }
}

// ============================================================================
// Paths
// ============================================================================

/// Returned when a screen sequence does not line up with its steps.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("action path has {steps} steps but {screens} screens (expected {})", .steps + 1)]
pub struct MalformedPath {
    pub steps: usize,
    pub screens: usize,
}

/// Ordered steps plus the screen sequence they are expected to produce.
///
/// `screens()[i]` is where step `i` starts and `screens()[i + 1]` is where
/// it should land, so there is always one more screen than steps.
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionPath {
    steps: Vec<ActionStep>,
    screens: Vec<ExpectedScreen>,
}

impl ActionPath {
    pub fn new(steps: Vec<ActionStep>, screens: Vec<ExpectedScreen>) -> Result<Self, MalformedPath> {
        if screens.len() != steps.len() + 1 {
            return Err(MalformedPath {
                steps: steps.len(),
                screens: screens.len(),
            });
        }
        Ok(Self { steps, screens })
    }

    /// A path with no steps that expects to stay on `start`.
    pub fn empty(start: ExpectedScreen) -> Self {
        Self {
            steps: Vec::new(),
            screens: vec![start],
        }
    }

    pub fn steps(&self) -> &[ActionStep] {
        &self.steps
    }

    pub fn screens(&self) -> &[ExpectedScreen] {
        &self.screens
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn start(&self) -> &ExpectedScreen {
        &self.screens[0]
    }

    /// Screen the path expects to be on before running step `index`.
    pub fn expected_before(&self, index: usize) -> Option<&ExpectedScreen> {
        if index < self.steps.len() {
            self.screens.get(index)
        } else {
            None
        }
    }

    /// Screen the path expects to land on after running step `index`.
    pub fn expected_after(&self, index: usize) -> Option<&ExpectedScreen> {
        if index < self.steps.len() {
            self.screens.get(index + 1)
        } else {
            None
        }
    }
}
