use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::executor::{ExecuteFailReason, RunStatus};
use crate::model::ActionStep;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    Step,
    Status,
}

/// One JSONL line of the execution trace.
#[derive(Debug, Clone, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub kind: TraceKind,

    /// SHA-1 of the graph the plan came from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_fingerprint: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_after: Option<String>,

    /// `OK` or a failure code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RunStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

impl TraceEvent {
    fn empty(kind: TraceKind) -> Self {
        Self {
            timestamp_ms: now_ms(),
            kind,
            graph_fingerprint: None,
            step_index: None,
            action: None,
            element_id: None,
            trigger: None,
            screen_before: None,
            screen_after: None,
            outcome: None,
            status: None,
            detail: None,
        }
    }

    pub fn step(index: usize, step: &ActionStep) -> Self {
        let mut event = Self::empty(TraceKind::Step);
        event.step_index = Some(index);
        event.action = Some(step.action.to_string());
        event.element_id = Some(step.element_id.clone());
        event.trigger = Some(step.trigger.to_string());
        event
    }

    pub fn status(status: RunStatus) -> Self {
        let mut event = Self::empty(TraceKind::Status);
        event.status = Some(status);
        event
    }

    pub fn with_screens(mut self, before: Option<&str>, after: Option<&str>) -> Self {
        self.screen_before = before.map(str::to_string);
        self.screen_after = after.map(str::to_string);
        self
    }

    pub fn with_ok(mut self) -> Self {
        self.outcome = Some("OK".to_string());
        self
    }

    pub fn with_failure(mut self, reason: ExecuteFailReason) -> Self {
        self.outcome = Some(reason.code().to_string());
        self
    }

    pub fn with_fingerprint(mut self, fingerprint: Option<&str>) -> Self {
        self.graph_fingerprint = fingerprint.map(str::to_string);
        self
    }

    pub fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}
