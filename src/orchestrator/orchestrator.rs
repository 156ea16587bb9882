use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{info, warn};

use crate::executor::{
    AtomicActionExecutor, CancelToken, ExecuteResult, ExecutionEngine, RetryPolicy,
    RetryingActionExecutor, RunStatus, ScreenIdSource, SettleDetector,
};
use crate::orchestrator::planner_client::{PlanRequest, PlannerClient, PlanningResult};
use crate::orchestrator::status::StatusListener;
use crate::trace::{TraceEvent, TraceLogger};

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("a task is already {status}")]
    Busy { status: RunStatus },

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub inter_step_delay: Duration,
    /// How long COMPLETED/FAILED is shown before returning to IDLE
    pub idle_reset_delay: Duration,
    pub retry: RetryPolicy,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            inter_step_delay: Duration::ZERO,
            idle_reset_delay: Duration::from_millis(2000),
            retry: RetryPolicy::none(),
        }
    }
}

/// How a task ended, as seen by whoever joins the worker.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Executed(ExecuteResult),
    PlanningFailed { code: String, message: String },
    /// The screen source had nothing to report at start
    NoCurrentScreen,
    Cancelled,
}

// ============================================================================
// Shared state
// ============================================================================

/// Status shared between the coordinating side and the worker.
///
/// Each task gets a generation number; `stop` and `start` bump it, and a
/// worker whose generation is stale can no longer publish statuses.
struct Shared {
    status: Mutex<RunStatus>,
    generation: AtomicU64,
    listener: Option<Arc<dyn StatusListener>>,
    tracer: Option<Arc<TraceLogger>>,
}

impl Shared {
    fn new(listener: Option<Arc<dyn StatusListener>>, tracer: Option<Arc<TraceLogger>>) -> Self {
        Self {
            status: Mutex::new(RunStatus::Idle),
            generation: AtomicU64::new(0),
            listener,
            tracer,
        }
    }

    fn publish(&self, status: RunStatus, detail: Option<&str>) {
        if let Some(listener) = &self.listener {
            listener.on_status(status);
        }
        if let Some(tracer) = &self.tracer {
            let event = TraceEvent::status(status);
            match detail {
                Some(detail) => tracer.log(&event.with_detail(detail)),
                None => tracer.log(&event),
            }
        }
    }

    fn update(&self, generation: u64, status: RunStatus) {
        self.report(generation, status, None);
    }

    /// Set `status` only if `generation` is still current. The listener is
    /// called after the lock is released so it may call back into the
    /// orchestrator.
    fn report(&self, generation: u64, status: RunStatus, detail: Option<&str>) {
        {
            let Ok(mut current) = self.status.lock() else {
                return;
            };
            if self.generation.load(Ordering::SeqCst) != generation {
                return;
            }
            *current = status;
        }
        info!(status = %status, "Status changed");
        self.publish(status, detail);
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Plans and executes one intent at a time on a dedicated worker thread.
pub struct Orchestrator {
    planner: Arc<dyn PlannerClient>,
    screens: Arc<dyn ScreenIdSource>,
    actions: Arc<dyn AtomicActionExecutor>,
    settle: Arc<dyn SettleDetector>,
    config: OrchestratorConfig,
    shared: Arc<Shared>,
    cancel: Mutex<CancelToken>,
    worker: Mutex<Option<JoinHandle<TaskOutcome>>>,
}

impl Orchestrator {
    pub fn new(
        planner: Arc<dyn PlannerClient>,
        screens: Arc<dyn ScreenIdSource>,
        actions: Arc<dyn AtomicActionExecutor>,
        settle: Arc<dyn SettleDetector>,
    ) -> Self {
        Self {
            planner,
            screens,
            actions,
            settle,
            config: OrchestratorConfig::default(),
            shared: Arc::new(Shared::new(None, None)),
            cancel: Mutex::new(CancelToken::new()),
            worker: Mutex::new(None),
        }
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Builders replace the shared state and must run before [`Orchestrator::start`].
    pub fn with_listener(mut self, listener: Arc<dyn StatusListener>) -> Self {
        self.shared = Arc::new(Shared::new(Some(listener), self.shared.tracer.clone()));
        self
    }

    pub fn with_tracer(mut self, tracer: Arc<TraceLogger>) -> Self {
        self.shared = Arc::new(Shared::new(self.shared.listener.clone(), Some(tracer)));
        self
    }

    pub fn status(&self) -> RunStatus {
        self.shared
            .status
            .lock()
            .map(|s| *s)
            .unwrap_or(RunStatus::Failed)
    }

    /// Start planning and executing `intent`.
    ///
    /// Rejected with [`OrchestratorError::Busy`] while another task is
    /// planning or executing; requests are never queued.
    pub fn start(&self, intent: &str) -> Result<(), OrchestratorError> {
        let generation = {
            let Ok(mut status) = self.shared.status.lock() else {
                return Err(OrchestratorError::Busy {
                    status: RunStatus::Failed,
                });
            };
            if matches!(*status, RunStatus::Planning | RunStatus::Executing) {
                return Err(OrchestratorError::Busy { status: *status });
            }
            *status = RunStatus::Planning;
            self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1
        };
        self.shared.publish(RunStatus::Planning, None);

        let cancel = CancelToken::new();
        if let Ok(mut slot) = self.cancel.lock() {
            *slot = cancel.clone();
        }

        let task = Task {
            intent: intent.to_string(),
            generation,
            cancel,
            planner: Arc::clone(&self.planner),
            screens: Arc::clone(&self.screens),
            actions: Arc::clone(&self.actions),
            settle: Arc::clone(&self.settle),
            config: self.config.clone(),
            shared: Arc::clone(&self.shared),
        };

        let handle = thread::Builder::new()
            .name("ui-navigator-task".into())
            .spawn(move || task.run());

        match handle {
            Ok(handle) => {
                if let Ok(mut worker) = self.worker.lock() {
                    *worker = Some(handle);
                }
                Ok(())
            }
            Err(e) => {
                self.shared.update(generation, RunStatus::Idle);
                Err(OrchestratorError::Spawn(e))
            }
        }
    }

    /// Cancel the running task, if any, and go back to `IDLE` immediately.
    /// A step already being dispatched finishes first.
    pub fn stop(&self) {
        if let Ok(cancel) = self.cancel.lock() {
            cancel.cancel();
        }
        let was_running = {
            let Ok(mut status) = self.shared.status.lock() else {
                return;
            };
            self.shared.generation.fetch_add(1, Ordering::SeqCst);
            std::mem::replace(&mut *status, RunStatus::Idle) != RunStatus::Idle
        };
        if was_running {
            info!("Task stopped");
            self.shared.publish(RunStatus::Idle, None);
        }
    }

    /// Wait for the most recent worker to finish. `None` if no task was
    /// started or the worker panicked.
    pub fn join(&self) -> Option<TaskOutcome> {
        let handle = self.worker.lock().ok()?.take()?;
        handle.join().ok()
    }
}

// ============================================================================
// Worker
// ============================================================================

struct Task {
    intent: String,
    generation: u64,
    cancel: CancelToken,
    planner: Arc<dyn PlannerClient>,
    screens: Arc<dyn ScreenIdSource>,
    actions: Arc<dyn AtomicActionExecutor>,
    settle: Arc<dyn SettleDetector>,
    config: OrchestratorConfig,
    shared: Arc<Shared>,
}

impl Task {
    fn run(self) -> TaskOutcome {
        let Some(current_screen) = self.screens.current_screen_id() else {
            warn!("No current screen, cannot plan");
            self.finish(RunStatus::Failed, Some("no current screen"));
            return TaskOutcome::NoCurrentScreen;
        };

        let request = PlanRequest {
            intent: self.intent.clone(),
            current_screen,
        };
        let planned = self.planner.plan(&request);

        if self.cancel.is_cancelled() {
            return TaskOutcome::Cancelled;
        }

        let (path, fingerprint) = match planned {
            PlanningResult::Success { path, fingerprint } => (path, fingerprint),
            PlanningResult::Failed { code, message } => {
                warn!(code = %code, message = %message, "Planning failed");
                self.finish(RunStatus::Failed, Some(&format!("{code}: {message}")));
                return TaskOutcome::PlanningFailed { code, message };
            }
        };

        self.shared.update(self.generation, RunStatus::Executing);

        let actions: Arc<dyn AtomicActionExecutor> = if self.config.retry.max_attempts > 1 {
            Arc::new(RetryingActionExecutor::new(
                Arc::clone(&self.actions),
                self.config.retry.clone(),
            ))
        } else {
            Arc::clone(&self.actions)
        };

        let mut engine =
            ExecutionEngine::new(Arc::clone(&self.screens), actions, Arc::clone(&self.settle))
                .with_inter_step_delay(self.config.inter_step_delay)
                .with_cancel_token(self.cancel.clone());
        if let Some(tracer) = &self.shared.tracer {
            engine = engine.with_tracer(Arc::clone(tracer), fingerprint);
        }

        let result = engine.execute(&path);
        match &result {
            ExecuteResult::Success { .. } => self.finish(RunStatus::Completed, None),
            ExecuteResult::Failed { .. } => {
                info!(result = %result, "Execution failed");
                self.finish(RunStatus::Failed, Some(&result.to_string()));
            }
            ExecuteResult::Cancelled { .. } => return TaskOutcome::Cancelled,
        }
        TaskOutcome::Executed(result)
    }

    /// Publish a terminal status, hold it for the reset delay, then go idle.
    fn finish(&self, status: RunStatus, detail: Option<&str>) {
        self.shared.report(self.generation, status, detail);
        if !self.config.idle_reset_delay.is_zero() {
            thread::sleep(self.config.idle_reset_delay);
        }
        self.shared.update(self.generation, RunStatus::Idle);
    }
}
