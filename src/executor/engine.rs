use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::executor::collaborators::{AtomicActionExecutor, ScreenIdSource, SettleDetector};
use crate::executor::result::{ExecuteFailReason, ExecuteResult};
use crate::executor::state::{CancelToken, ExecutionState, RunStatus};
use crate::model::{ActionPath, ActionStep, ExpectedScreen};
use crate::trace::{TraceEvent, TraceLogger};

/// Runs an [`ActionPath`] step by step, verifying the screen before and
/// after every dispatch.
///
/// One engine runs one path at a time; `execute` takes `&mut self` so
/// concurrent runs on the same engine do not compile.
pub struct ExecutionEngine {
    screens: Arc<dyn ScreenIdSource>,
    actions: Arc<dyn AtomicActionExecutor>,
    settle: Arc<dyn SettleDetector>,
    inter_step_delay: Duration,
    cancel: CancelToken,
    tracer: Option<Arc<TraceLogger>>,
    fingerprint: Option<String>,
    state: ExecutionState,
}

impl ExecutionEngine {
    pub fn new(
        screens: Arc<dyn ScreenIdSource>,
        actions: Arc<dyn AtomicActionExecutor>,
        settle: Arc<dyn SettleDetector>,
    ) -> Self {
        Self {
            screens,
            actions,
            settle,
            inter_step_delay: Duration::ZERO,
            cancel: CancelToken::new(),
            tracer: None,
            fingerprint: None,
            state: ExecutionState::default(),
        }
    }

    pub fn with_inter_step_delay(mut self, delay: Duration) -> Self {
        self.inter_step_delay = delay;
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Record every step to `tracer`, tagged with the graph fingerprint.
    pub fn with_tracer(mut self, tracer: Arc<TraceLogger>, fingerprint: Option<String>) -> Self {
        self.tracer = Some(tracer);
        self.fingerprint = fingerprint;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> &ExecutionState {
        &self.state
    }

    pub fn status(&self) -> RunStatus {
        self.state.status
    }

    /// Back to `IDLE`, keeping nothing from the previous run.
    pub fn reset(&mut self) {
        self.state = ExecutionState::default();
    }

    pub fn execute(&mut self, path: &ActionPath) -> ExecuteResult {
        self.state.begin(path);
        info!(steps = path.len(), start = %path.start(), "Execution started");

        for (index, step) in path.steps().iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!(completed = index, "Execution cancelled");
                self.reset();
                return ExecuteResult::Cancelled { completed: index };
            }
            if index > 0 && !self.inter_step_delay.is_zero() {
                thread::sleep(self.inter_step_delay);
            }

            if let Err(result) = self.run_step(path, index, step) {
                self.state.status = RunStatus::Failed;
                return result;
            }
            self.state.step_index = index + 1;
        }

        self.state.status = RunStatus::Completed;
        info!(steps = path.len(), "Execution completed");
        ExecuteResult::Success { steps: path.len() }
    }

    fn run_step(
        &self,
        path: &ActionPath,
        index: usize,
        step: &ActionStep,
    ) -> Result<(), ExecuteResult> {
        let expected = path
            .expected_before(index)
            .cloned()
            .unwrap_or(ExpectedScreen::Unknown);

        // Precondition
        let before = self.screens.current_screen_id();
        let on_expected = before.as_deref().is_some_and(|id| expected.accepts(id));
        if !on_expected {
            debug!(index, expected = %expected, observed = ?before, "Precondition failed");
            return Err(self.fail(index, step, ExecuteFailReason::PageMismatch, before, None));
        }

        // Dispatch
        if let Err(failure) = self.actions.run(&step.element_id, step.trigger) {
            return Err(self.fail(index, step, failure.into(), before, None));
        }

        // Settle
        if !self.settle.wait_for_idle() {
            return Err(self.fail(index, step, ExecuteFailReason::Timeout, before, None));
        }

        // Postcondition
        let after = self.screens.current_screen_id();
        let is_last = index + 1 == path.len();
        let stays_by_plan = match (path.expected_after(index), before.as_deref()) {
            (Some(ExpectedScreen::Exact(next)), Some(current)) => next == current,
            _ => false,
        };
        if !is_last && after == before && !stays_by_plan {
            return Err(self.fail(
                index,
                step,
                ExecuteFailReason::PageNotChanged,
                before.clone(),
                after,
            ));
        }

        debug!(
            index,
            element = %step.element_id,
            trigger = %step.trigger,
            before = ?before,
            after = ?after,
            "Step verified"
        );
        self.trace(
            TraceEvent::step(index, step)
                .with_screens(before.as_deref(), after.as_deref())
                .with_ok(),
        );
        Ok(())
    }

    fn fail(
        &self,
        index: usize,
        step: &ActionStep,
        reason: ExecuteFailReason,
        before: Option<String>,
        after: Option<String>,
    ) -> ExecuteResult {
        warn!(
            index,
            element = %step.element_id,
            trigger = %step.trigger,
            reason = %reason,
            "Step failed"
        );
        self.trace(
            TraceEvent::step(index, step)
                .with_screens(before.as_deref(), after.as_deref())
                .with_failure(reason),
        );
        ExecuteResult::Failed {
            step_index: index,
            action: step.clone(),
            reason,
            observed_screen: after.or(before),
        }
    }

    fn trace(&self, event: TraceEvent) {
        if let Some(tracer) = &self.tracer {
            tracer.log(&event.with_fingerprint(self.fingerprint.as_deref()));
        }
    }
}
