use serde::Serialize;
use tracing::{info, warn};

use crate::graph::UiMap;
use crate::model::{ActionPath, MalformedPath};
use crate::resolver::TargetResolver;
use crate::semantic::error::PlannerError;
use crate::semantic::flow::{self, ExecutorStep};
use crate::semantic::locator::TargetLocator;
use crate::semantic::searcher::{PathResult, PathSearcher};
use crate::semantic::selector::{DefaultPathSelector, PathSelector};
use crate::semantic::target::TargetSpec;

pub const DEFAULT_START_SCREEN: &str = "MainActivity";

// ============================================================================
// Output
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assumptions {
    #[serde(rename = "startState")]
    pub start_screen: String,
    pub confidence: f64,
}

/// Code and message of a failed plan, as reported by [`SemanticPlanner::plan_safe`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanFailure {
    pub code: String,
    pub message: String,
}

impl From<&PlannerError> for PlanFailure {
    fn from(e: &PlannerError) -> Self {
        Self {
            code: e.code().to_string(),
            message: e.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerOutput {
    pub target: TargetSpec,
    pub planned_path: Vec<ExecutorStep>,
    pub assumptions: Assumptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<PlanFailure>,
}

impl PlannerOutput {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn action_path(&self) -> Result<ActionPath, MalformedPath> {
        flow::to_action_path(&self.assumptions.start_screen, &self.planned_path)
    }
}

// ============================================================================
// Planner
// ============================================================================

/// Resolve → locate → search → select → bind.
pub struct SemanticPlanner {
    resolver: Box<dyn TargetResolver>,
    locator: TargetLocator,
    searcher: PathSearcher,
    selector: Box<dyn PathSelector>,
    default_start: String,
}

impl SemanticPlanner {
    pub fn new(resolver: Box<dyn TargetResolver>) -> Self {
        Self {
            resolver,
            locator: TargetLocator::default(),
            searcher: PathSearcher,
            selector: Box::new(DefaultPathSelector),
            default_start: DEFAULT_START_SCREEN.to_string(),
        }
    }

    pub fn with_selector(mut self, selector: Box<dyn PathSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_locator(mut self, locator: TargetLocator) -> Self {
        self.locator = locator;
        self
    }

    pub fn with_default_start(mut self, screen: impl Into<String>) -> Self {
        self.default_start = screen.into();
        self
    }

    /// Plan from `current` (inferred from the intent when `None`).
    ///
    /// Returns the chosen plan and every candidate path the search found.
    pub fn plan(
        &self,
        intent: &str,
        map: &UiMap,
        current: Option<&str>,
    ) -> Result<(PlannerOutput, Vec<PathResult>), PlannerError> {
        let start = self.start_screen(intent, map, current);

        let target = self
            .resolver
            .resolve(intent)
            .map_err(|e| PlannerError::Unknown {
                message: e.to_string(),
                intent: intent.to_string(),
                start: start.clone(),
            })?;
        info!(intent, start = %start, goal = %target, "Resolved target");

        let location = self.locator.locate(map, &target);
        if location.screens.is_empty() {
            return Err(PlannerError::TargetNotFound { target });
        }

        let paths = self
            .searcher
            .search(map, &start, &location.screens, &target);
        if paths.is_empty() {
            return Err(PlannerError::PathNotFound {
                start,
                targets: location.screens.into_iter().collect(),
                target,
            });
        }

        let selected = self
            .selector
            .select(&paths)
            .ok_or_else(|| PlannerError::MultiplePaths {
                count: paths.len(),
                start: start.clone(),
                targets: location.screens.iter().cloned().collect(),
            })?;

        let planned_path =
            flow::generate(map, selected).map_err(|e| PlannerError::TargetSpecMismatch {
                target: target.clone(),
                reason: e.to_string(),
            })?;

        info!(
            start = %start,
            steps = planned_path.len(),
            candidates = paths.len(),
            "Semantic plan ready"
        );

        let output = PlannerOutput {
            assumptions: Assumptions {
                start_screen: start,
                confidence: target.confidence(),
            },
            target,
            planned_path,
            failure: None,
        };
        Ok((output, paths))
    }

    /// Like [`SemanticPlanner::plan`] but never fails: errors come back as an
    /// `ERROR` target with an empty path, zero confidence and the failure
    /// code attached.
    pub fn plan_safe(&self, intent: &str, map: &UiMap, current: Option<&str>) -> PlannerOutput {
        match self.plan(intent, map, current) {
            Ok((output, _)) => output,
            Err(e) => {
                warn!(code = e.code(), error = %e, "Semantic planning failed");
                PlannerOutput {
                    target: TargetSpec::state("ERROR", 0.0),
                    planned_path: Vec::new(),
                    assumptions: Assumptions {
                        start_screen: self.start_screen(intent, map, current),
                        confidence: 0.0,
                    },
                    failure: Some(PlanFailure::from(&e)),
                }
            }
        }
    }

    fn start_screen(&self, intent: &str, map: &UiMap, current: Option<&str>) -> String {
        match current {
            Some(screen) => screen.to_string(),
            None => {
                infer_current_screen(intent, map).unwrap_or_else(|| self.default_start.clone())
            }
        }
    }
}

/// Guess which screen the user is on from wording in the intent.
///
/// Tries, in order: a screen id mentioned verbatim, a screen id with its
/// `activity` suffix dropped, a level hint ("second level", "third level"),
/// and a back hint naming the first level.
pub fn infer_current_screen(intent: &str, map: &UiMap) -> Option<String> {
    let lower = intent.to_lowercase();

    for id in map.screen_ids() {
        let id_lower = id.to_lowercase();
        if lower.contains(&id_lower) {
            return Some(id.to_string());
        }
        let mut parts = id_lower.split("activity").filter(|p| !p.trim().is_empty());
        if parts.any(|p| lower.contains(p)) {
            return Some(id.to_string());
        }
    }

    let find_level = |words: [&str; 2]| {
        map.screen_ids()
            .find(|id| {
                let id = id.to_lowercase();
                words.iter().any(|w| id.contains(w))
            })
            .map(str::to_string)
    };

    if lower.contains("第二层级") || lower.contains("second level") {
        return find_level(["second", "2"]);
    }
    if lower.contains("第三层级") || lower.contains("third level") {
        return find_level(["third", "3"]);
    }

    // Returning to the first level means we are on the second one.
    if (lower.contains("返回") || lower.contains("back"))
        && (lower.contains("第一层级") || lower.contains("first level"))
    {
        return find_level(["second", "2"]);
    }

    None
}
