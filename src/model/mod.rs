pub mod action_path;
pub mod trigger;

pub use action_path::{ActionPath, ActionRef, ActionStep, ExpectedScreen, MalformedPath};
pub use trigger::{Trigger, UnknownTrigger};
