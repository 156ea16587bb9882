//! Goal-directed navigation over application UI graphs.
//!
//! Two planners turn a goal into an [`model::ActionPath`]: the blind
//! planner searches a flat transition index for the action showing a piece
//! of text, the semantic planner resolves an intent to a screen or element
//! and searches a semantic map. The [`executor::ExecutionEngine`] replays a
//! path step by step, verifying the screen before and after every dispatch,
//! and the [`orchestrator::Orchestrator`] ties planning and execution to a
//! single background task.

pub mod blind;
pub mod cli;
pub mod executor;
pub mod graph;
pub mod model;
pub mod orchestrator;
pub mod resolver;
pub mod semantic;
pub mod trace;
