use std::sync::Arc;

use tracing::info;

use crate::blind::{BlindPlanner, SearchStrategy};
use crate::graph::{TransitionMap, UiMap};
use crate::model::ActionPath;
use crate::resolver::VisibleTextResolver;
use crate::semantic::SemanticPlanner;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRequest {
    pub intent: String,
    pub current_screen: String,
}

/// What the orchestrator gets back from planning.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanningResult {
    Success {
        path: ActionPath,
        /// Fingerprint of the graph the plan was computed on
        fingerprint: Option<String>,
    },
    Failed { code: String, message: String },
}

impl PlanningResult {
    fn failed(code: &str, message: impl ToString) -> Self {
        PlanningResult::Failed {
            code: code.to_string(),
            message: message.to_string(),
        }
    }
}

/// Planning step of an orchestrated task.
pub trait PlannerClient: Send + Sync {
    fn plan(&self, request: &PlanRequest) -> PlanningResult;
}

/// Plans over a flat transition index, resolving the intent to an indexed
/// text first.
pub struct BlindPlannerClient {
    map: Arc<TransitionMap>,
    strategy: SearchStrategy,
    resolver: Box<dyn VisibleTextResolver>,
    fingerprint: String,
}

impl BlindPlannerClient {
    pub fn new(
        map: Arc<TransitionMap>,
        strategy: SearchStrategy,
        resolver: Box<dyn VisibleTextResolver>,
    ) -> Self {
        let fingerprint = map.fingerprint();
        Self {
            map,
            strategy,
            resolver,
            fingerprint,
        }
    }
}

impl PlannerClient for BlindPlannerClient {
    fn plan(&self, request: &PlanRequest) -> PlanningResult {
        let planner = BlindPlanner::new(&self.map);
        let result = planner.plan_from_intent(
            &request.intent,
            &request.current_screen,
            self.strategy,
            self.resolver.as_ref(),
        );
        if let Some(failure) = &result.failure {
            return PlanningResult::failed(failure.code(), failure);
        }
        match planner.action_path(&result) {
            Ok(path) => PlanningResult::Success {
                path,
                fingerprint: Some(self.fingerprint.clone()),
            },
            Err(e) => PlanningResult::failed("UNKNOWN_ERROR", e),
        }
    }
}

/// Plans over a semantic map.
pub struct SemanticPlannerClient {
    map: Arc<UiMap>,
    planner: SemanticPlanner,
    fingerprint: String,
}

impl SemanticPlannerClient {
    pub fn new(map: Arc<UiMap>, planner: SemanticPlanner) -> Self {
        let fingerprint = map.fingerprint();
        Self {
            map,
            planner,
            fingerprint,
        }
    }
}

impl PlannerClient for SemanticPlannerClient {
    fn plan(&self, request: &PlanRequest) -> PlanningResult {
        let output =
            self.planner
                .plan_safe(&request.intent, &self.map, Some(&request.current_screen));
        if let Some(failure) = output.failure {
            return PlanningResult::Failed {
                code: failure.code,
                message: failure.message,
            };
        }
        info!(goal = %output.target, steps = output.planned_path.len(), "Plan ready");
        match output.action_path() {
            Ok(path) => PlanningResult::Success {
                path,
                fingerprint: Some(self.fingerprint.clone()),
            },
            Err(e) => PlanningResult::failed("TARGET_SPEC_MISMATCH", e),
        }
    }
}
