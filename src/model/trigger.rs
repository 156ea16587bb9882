use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Interaction type that activates an element.
///
/// Serialized in the upper snake case used by the graph documents
/// (`CLICK`, `LONG_CLICK`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trigger {
    Click,
    LongClick,
    CheckedChange,
    ProgressChange,
    TextChange,
    Select,
    Touch,
}

impl Trigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::Click => "CLICK",
            Trigger::LongClick => "LONG_CLICK",
            Trigger::CheckedChange => "CHECKED_CHANGE",
            Trigger::ProgressChange => "PROGRESS_CHANGE",
            Trigger::TextChange => "TEXT_CHANGE",
            Trigger::Select => "SELECT",
            Trigger::Touch => "TOUCH",
        }
    }

    /// Map an intent type tag to the trigger that fires it.
    ///
    /// Intent tags are broader than triggers (`NAVIGATION`, `SUBMIT`,
    /// `NAVIGATE_BACK`, ...); anything that is not itself a trigger name
    /// is dispatched as a click.
    pub fn from_intent_type(tag: &str) -> Trigger {
        tag.parse().unwrap_or(Trigger::Click)
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown trigger '{0}'")]
pub struct UnknownTrigger(pub String);

impl FromStr for Trigger {
    type Err = UnknownTrigger;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CLICK" => Ok(Trigger::Click),
            "LONG_CLICK" => Ok(Trigger::LongClick),
            "CHECKED_CHANGE" => Ok(Trigger::CheckedChange),
            "PROGRESS_CHANGE" => Ok(Trigger::ProgressChange),
            "TEXT_CHANGE" => Ok(Trigger::TextChange),
            "SELECT" => Ok(Trigger::Select),
            "TOUCH" => Ok(Trigger::Touch),
            _ => Err(UnknownTrigger(s.to_string())),
        }
    }
}
