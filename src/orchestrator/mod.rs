pub mod orchestrator;
pub mod planner_client;
pub mod status;

pub use orchestrator::{Orchestrator, OrchestratorConfig, OrchestratorError, TaskOutcome};
pub use planner_client::{
    BlindPlannerClient, PlanRequest, PlannerClient, PlanningResult, SemanticPlannerClient,
};
pub use status::{StatusListener, StatusLog};
