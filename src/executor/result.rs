use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::ActionStep;

/// Why an execution stopped. Never mixed with planning failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecuteFailReason {
    /// Current screen differs from the one the step expects; nothing was fired
    PageMismatch,
    ComponentNotFound,
    ComponentNotInteractable,
    TriggerNotSupported,
    /// UI did not settle after dispatch
    Timeout,
    /// Dispatch was accepted but the screen did not change
    PageNotChanged,
}

impl ExecuteFailReason {
    pub fn code(&self) -> &'static str {
        match self {
            ExecuteFailReason::PageMismatch => "PAGE_MISMATCH",
            ExecuteFailReason::ComponentNotFound => "COMPONENT_NOT_FOUND",
            ExecuteFailReason::ComponentNotInteractable => "COMPONENT_NOT_INTERACTABLE",
            ExecuteFailReason::TriggerNotSupported => "TRIGGER_NOT_SUPPORTED",
            ExecuteFailReason::Timeout => "TIMEOUT",
            ExecuteFailReason::PageNotChanged => "PAGE_NOT_CHANGED",
        }
    }
}

impl fmt::Display for ExecuteFailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ExecuteFailReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PAGE_MISMATCH" => Ok(ExecuteFailReason::PageMismatch),
            "COMPONENT_NOT_FOUND" => Ok(ExecuteFailReason::ComponentNotFound),
            "COMPONENT_NOT_INTERACTABLE" => Ok(ExecuteFailReason::ComponentNotInteractable),
            "TRIGGER_NOT_SUPPORTED" => Ok(ExecuteFailReason::TriggerNotSupported),
            "TIMEOUT" => Ok(ExecuteFailReason::Timeout),
            "PAGE_NOT_CHANGED" => Ok(ExecuteFailReason::PageNotChanged),
            other => Err(format!("unknown execution failure code '{}'", other)),
        }
    }
}

/// Failure reported by an atomic action executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AtomicFailure {
    ComponentNotFound,
    ComponentNotInteractable,
    TriggerNotSupported,
}

impl From<AtomicFailure> for ExecuteFailReason {
    fn from(f: AtomicFailure) -> Self {
        match f {
            AtomicFailure::ComponentNotFound => ExecuteFailReason::ComponentNotFound,
            AtomicFailure::ComponentNotInteractable => ExecuteFailReason::ComponentNotInteractable,
            AtomicFailure::TriggerNotSupported => ExecuteFailReason::TriggerNotSupported,
        }
    }
}

impl fmt::Display for AtomicFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ExecuteFailReason::from(*self).fmt(f)
    }
}

/// Terminal outcome of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ExecuteResult {
    /// Every step ran and verified
    Success { steps: usize },

    /// Stopped at `step_index`; earlier steps took effect
    Failed {
        step_index: usize,
        action: ActionStep,
        reason: ExecuteFailReason,
        /// Screen id read when the failure was detected
        observed_screen: Option<String>,
    },

    /// Cancellation flag seen before step `completed`
    Cancelled { completed: usize },
}

impl ExecuteResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecuteResult::Success { .. })
    }

    pub fn fail_reason(&self) -> Option<ExecuteFailReason> {
        match self {
            ExecuteResult::Failed { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

impl fmt::Display for ExecuteResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecuteResult::Success { steps } => write!(f, "SUCCESS after {} steps", steps),
            ExecuteResult::Failed {
                step_index,
                action,
                reason,
                observed_screen,
            } => write!(
                f,
                "FAILED at step {} ({} {} on {}): {} (screen: {})",
                step_index,
                action.action,
                action.trigger,
                action.element_id,
                reason,
                observed_screen.as_deref().unwrap_or("none")
            ),
            ExecuteResult::Cancelled { completed } => {
                write!(f, "CANCELLED after {} steps", completed)
            }
        }
    }
}
