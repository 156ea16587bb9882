//! Scripted collaborators for tests and dry runs.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::executor::collaborators::{AtomicActionExecutor, ScreenIdSource, SettleDetector};
use crate::executor::result::AtomicFailure;
use crate::model::{ActionPath, Trigger};

// ============================================================================
// Screen source
// ============================================================================

/// Returns queued screen ids in order, then repeats the last one forever.
#[derive(Debug, Default)]
pub struct ScriptedScreens {
    queue: Mutex<VecDeque<Option<String>>>,
    last: Mutex<Option<String>>,
    reads: AtomicUsize,
}

impl ScriptedScreens {
    pub fn new<I, S>(screens: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            queue: Mutex::new(screens.into_iter().map(|s| s.map(Into::into)).collect()),
            last: Mutex::new(None),
            reads: AtomicUsize::new(0),
        }
    }

    /// Always reports `screen`.
    pub fn fixed(screen: &str) -> Self {
        Self::new([Some(screen)])
    }

    /// Reads a well-behaved app produces while following `path`: before and
    /// after every step, each landing on the next exact screen. Non-exact
    /// expectations read as the previous screen.
    pub fn following(path: &ActionPath) -> Self {
        let mut current = path.start().as_exact().unwrap_or_default().to_string();
        let mut reads = Vec::new();
        for i in 0..path.len() {
            reads.push(Some(current.clone()));
            if let Some(next) = path.expected_after(i).and_then(|e| e.as_exact()) {
                current = next.to_string();
            }
            reads.push(Some(current.clone()));
        }
        Self::new(reads)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl ScreenIdSource for ScriptedScreens {
    fn current_screen_id(&self) -> Option<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let (Ok(mut queue), Ok(mut last)) = (self.queue.lock(), self.last.lock()) else {
            return None;
        };
        if let Some(next) = queue.pop_front() {
            *last = next;
        }
        last.clone()
    }
}

// ============================================================================
// Atomic executor
// ============================================================================

/// Records every dispatch; succeeds unless a failure was queued.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<(String, Trigger)>>,
    outcomes: Mutex<VecDeque<Result<(), AtomicFailure>>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue outcomes for the next dispatches, in order.
    pub fn with_outcomes(outcomes: impl IntoIterator<Item = Result<(), AtomicFailure>>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            outcomes: Mutex::new(outcomes.into_iter().collect()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Trigger)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl AtomicActionExecutor for RecordingExecutor {
    fn run(&self, element_id: &str, trigger: Trigger) -> Result<(), AtomicFailure> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((element_id.to_string(), trigger));
        }
        self.outcomes
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .unwrap_or(Ok(()))
    }
}

// ============================================================================
// Settle detector
// ============================================================================

/// Reports queued settle results, then `default` once the queue runs dry.
#[derive(Debug)]
pub struct ScriptedSettle {
    results: Mutex<VecDeque<bool>>,
    default: bool,
    waits: AtomicUsize,
}

impl ScriptedSettle {
    pub fn always(settled: bool) -> Self {
        Self::new(Vec::new(), settled)
    }

    pub fn new(results: impl IntoIterator<Item = bool>, default: bool) -> Self {
        Self {
            results: Mutex::new(results.into_iter().collect()),
            default,
            waits: AtomicUsize::new(0),
        }
    }

    pub fn waits(&self) -> usize {
        self.waits.load(Ordering::SeqCst)
    }
}

impl SettleDetector for ScriptedSettle {
    fn wait_for_idle(&self) -> bool {
        self.waits.fetch_add(1, Ordering::SeqCst);
        self.results
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .unwrap_or(self.default)
    }
}
