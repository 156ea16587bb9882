use std::sync::Mutex;
use std::sync::mpsc::{Receiver, Sender, channel};

use ui_navigator::orchestrator::{PlanRequest, PlannerClient, PlanningResult};
use ui_navigator::resolver::{ResolverError, TargetResolver};
use ui_navigator::semantic::TargetSpec;

/// Always resolves to the same target.
pub struct FixedResolver(pub TargetSpec);

impl TargetResolver for FixedResolver {
    fn resolve(&self, _intent: &str) -> Result<TargetSpec, ResolverError> {
        Ok(self.0.clone())
    }
}

/// Always fails, as a model that returned garbage would.
pub struct BrokenResolver;

impl TargetResolver for BrokenResolver {
    fn resolve(&self, _intent: &str) -> Result<TargetSpec, ResolverError> {
        Err(ResolverError::MalformedReply {
            expected: "TargetSpec".into(),
            reply: "not json".into(),
        })
    }
}

/// Returns a canned planning result and remembers the requests.
pub struct StaticPlanner {
    result: PlanningResult,
    pub requests: Mutex<Vec<PlanRequest>>,
}

impl StaticPlanner {
    pub fn new(result: PlanningResult) -> Self {
        Self {
            result,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(code: &str) -> Self {
        Self::new(PlanningResult::Failed {
            code: code.to_string(),
            message: format!("{} for test", code),
        })
    }
}

impl PlannerClient for StaticPlanner {
    fn plan(&self, request: &PlanRequest) -> PlanningResult {
        self.requests.lock().unwrap().push(request.clone());
        self.result.clone()
    }
}

/// Blocks inside `plan` until the test releases it.
pub struct GatedPlanner {
    gate: Mutex<Receiver<()>>,
    result: PlanningResult,
}

impl GatedPlanner {
    pub fn new(result: PlanningResult) -> (Self, Sender<()>) {
        let (release, gate) = channel();
        (
            Self {
                gate: Mutex::new(gate),
                result,
            },
            release,
        )
    }
}

impl PlannerClient for GatedPlanner {
    fn plan(&self, _request: &PlanRequest) -> PlanningResult {
        let _ = self.gate.lock().unwrap().recv();
        self.result.clone()
    }
}
