use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::graph::ui_map::SCREEN_ELEMENT_ID;
use crate::graph::{IntentOwner, UiMap};
use crate::model::{ActionPath, ActionRef, ActionStep, ExpectedScreen, MalformedPath, Trigger};
use crate::semantic::searcher::PathResult;

/// Element and trigger that fire one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiBinding {
    #[serde(rename = "componentId")]
    pub element_id: String,
    pub trigger: Trigger,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

/// Executable step handed to the executor and to progress displays.
///
/// An empty `expected_screen_id` means the landing screen is decided by
/// navigation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutorStep {
    pub intent: String,
    #[serde(rename = "fromStateId")]
    pub from_screen_id: String,
    #[serde(rename = "expectedStateId")]
    pub expected_screen_id: String,
    pub ui_binding: UiBinding,
}

impl ExecutorStep {
    pub fn expected_screen(&self) -> ExpectedScreen {
        if self.expected_screen_id.is_empty() {
            ExpectedScreen::Unknown
        } else {
            ExpectedScreen::exact(&self.expected_screen_id)
        }
    }

    pub fn to_action_step(&self) -> ActionStep {
        ActionStep::new(
            ActionRef::Intent(self.intent.clone()),
            &self.ui_binding.element_id,
            self.ui_binding.trigger,
        )
        .with_parameters(self.ui_binding.parameters.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("path of {steps} intents has only {screens} screens")]
    ShortSequence { steps: usize, screens: usize },

    #[error("step {index} starts on unknown screen '{screen}'")]
    UnknownScreen { index: usize, screen: String },

    #[error("intent '{intent}' is not owned by screen '{screen}'")]
    UnownedIntent { intent: String, screen: String },
}

/// Bind every intent of a selected path to the element that owns it.
pub fn generate(map: &UiMap, result: &PathResult) -> Result<Vec<ExecutorStep>, FlowError> {
    let path = &result.path;
    let sequence = &result.screen_sequence;
    if sequence.len() < path.len() + 1 {
        return Err(FlowError::ShortSequence {
            steps: path.len(),
            screens: sequence.len(),
        });
    }

    path.iter()
        .enumerate()
        .map(|(index, intent)| {
            let from = &sequence[index];
            let screen = map.screen(from).ok_or_else(|| FlowError::UnknownScreen {
                index,
                screen: from.clone(),
            })?;
            let element_id = match screen.owner_of(&intent.intent_id) {
                Some(IntentOwner::Element(element)) => element.element_id.clone(),
                Some(IntentOwner::Screen) => SCREEN_ELEMENT_ID.to_string(),
                None => {
                    return Err(FlowError::UnownedIntent {
                        intent: intent.intent_id.clone(),
                        screen: from.clone(),
                    });
                }
            };
            Ok(ExecutorStep {
                intent: intent.intent_id.clone(),
                from_screen_id: from.clone(),
                expected_screen_id: sequence[index + 1].clone(),
                ui_binding: UiBinding {
                    element_id,
                    trigger: intent.trigger(),
                    parameters: intent.parameters.clone(),
                },
            })
        })
        .collect()
}

/// Executable path for `steps`, starting on `start`.
pub fn to_action_path(start: &str, steps: &[ExecutorStep]) -> Result<ActionPath, MalformedPath> {
    let mut screens = vec![ExpectedScreen::exact(start)];
    screens.extend(steps.iter().map(ExecutorStep::expected_screen));
    ActionPath::new(steps.iter().map(ExecutorStep::to_action_step).collect(), screens)
}
