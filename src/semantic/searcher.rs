use std::collections::{BTreeSet, HashMap, VecDeque};

use serde::Serialize;
use tracing::debug;

use crate::graph::{Intent, Screen, UiMap};
use crate::semantic::matcher::{MatchProfile, matches};
use crate::semantic::target::TargetSpec;

/// One candidate path: the intents to fire and the screen ids they are
/// expected to pass through (`path.len() + 1` entries).
///
/// An intent without a declared target lands on an empty screen id in a
/// short-circuit path, meaning "decided by navigation history". Back intents
/// that name a screen are followed like any other.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathResult {
    pub path: Vec<Intent>,
    pub screen_sequence: Vec<String>,
}

impl PathResult {
    fn stay(screen: &str) -> Self {
        Self {
            path: Vec::new(),
            screen_sequence: vec![screen.to_string()],
        }
    }

    fn single(screen: &str, intent: &Intent) -> Self {
        Self {
            path: vec![intent.clone()],
            screen_sequence: vec![screen.to_string(), landing(intent)],
        }
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Whether the path ends somewhere other than where it began.
    pub fn changes_screen(&self) -> bool {
        match (self.screen_sequence.first(), self.screen_sequence.last()) {
            (Some(first), Some(last)) => self.screen_sequence.len() >= 2 && first != last,
            _ => false,
        }
    }
}

fn landing(intent: &Intent) -> String {
    if intent.has_declared_target() {
        intent.target_screen_id.clone()
    } else {
        String::new()
    }
}

/// Breadth-first search over the intent graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathSearcher;

impl PathSearcher {
    /// Every path from `start` that reaches one of `targets`.
    ///
    /// When `start` already satisfies the goal the search short-circuits to
    /// in-place paths instead (see [`PathSearcher::at_target`]).
    pub fn search(
        &self,
        map: &UiMap,
        start: &str,
        targets: &BTreeSet<String>,
        target: &TargetSpec,
    ) -> Vec<PathResult> {
        let Some(screen) = map.screen(start) else {
            debug!(start, "Start screen is not in the map");
            return Vec::new();
        };

        if targets.contains(start) {
            if let Some(paths) = self.at_target(screen, target) {
                debug!(start, paths = paths.len(), "Start screen satisfies target");
                return paths;
            }
            debug!(start, "Target element not on start screen, searching");
        }

        let mut results = Vec::new();
        let mut queue: VecDeque<(String, Vec<Intent>, Vec<String>)> =
            VecDeque::from([(start.to_string(), Vec::new(), vec![start.to_string()])]);
        let mut shortest: HashMap<String, usize> = HashMap::from([(start.to_string(), 0)]);

        while let Some((screen_id, path, sequence)) = queue.pop_front() {
            let Some(screen) = map.screen(&screen_id) else {
                continue;
            };

            for intent in screen.all_intents() {
                if !intent.has_declared_target() {
                    continue;
                }
                let next = &intent.target_screen_id;

                let mut next_path = path.clone();
                next_path.push(intent.clone());
                let mut next_sequence = sequence.clone();
                next_sequence.push(next.clone());

                if targets.contains(next) {
                    results.push(PathResult {
                        path: next_path,
                        screen_sequence: next_sequence,
                    });
                    continue;
                }
                if !map.contains(next) {
                    continue;
                }

                let known = shortest.get(next).copied().unwrap_or(usize::MAX);
                if next_path.len() <= known {
                    shortest.insert(next.clone(), next_path.len());
                    queue.push_back((next.clone(), next_path, next_sequence));
                }
            }
        }

        debug!(start, found = results.len(), "Intent search finished");
        results
    }

    /// In-place paths when the start screen is already a target.
    ///
    /// A state target stays put: one path per self-loop intent, or a single
    /// zero-length path when there is none. A component target only counts
    /// if a matching element is on screen; its intents become one-step
    /// paths. `None` means the goal needs a round trip, so the caller runs
    /// the full search.
    fn at_target(&self, screen: &Screen, target: &TargetSpec) -> Option<Vec<PathResult>> {
        let start = screen.screen_id.as_str();
        match target {
            TargetSpec::StateTarget(_) => {
                let paths: Vec<PathResult> = screen
                    .all_intents()
                    .filter(|i| i.target_screen_id == start)
                    .map(|i| PathResult::single(start, i))
                    .collect();
                if paths.is_empty() {
                    Some(vec![PathResult::stay(start)])
                } else {
                    Some(paths)
                }
            }
            TargetSpec::ComponentTarget(component) => {
                let matching: Vec<_> = screen
                    .elements
                    .iter()
                    .filter(|e| matches(e, component, MatchProfile::Searcher))
                    .collect();
                if matching.is_empty() {
                    return None;
                }
                let paths: Vec<PathResult> = matching
                    .iter()
                    .flat_map(|e| e.intents.iter())
                    .map(|i| PathResult::single(start, i))
                    .collect();
                if paths.is_empty() {
                    Some(vec![PathResult::stay(start)])
                } else {
                    Some(paths)
                }
            }
        }
    }
}
