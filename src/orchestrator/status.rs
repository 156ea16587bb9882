use std::sync::Mutex;

use crate::executor::RunStatus;

/// Receives every status change of an orchestrator, in order.
pub trait StatusListener: Send + Sync {
    fn on_status(&self, status: RunStatus);
}

impl<F> StatusListener for F
where
    F: Fn(RunStatus) + Send + Sync,
{
    fn on_status(&self, status: RunStatus) {
        self(status)
    }
}

/// Keeps every status it is told about.
#[derive(Debug, Default)]
pub struct StatusLog {
    seen: Mutex<Vec<RunStatus>>,
}

impl StatusLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statuses(&self) -> Vec<RunStatus> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl StatusListener for StatusLog {
    fn on_status(&self, status: RunStatus) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(status);
        }
    }
}
