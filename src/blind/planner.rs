use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::blind::similarity::{FUZZY_THRESHOLD, best_match};
use crate::graph::{ActionId, Destination, GraphError, ScreenIdx, TransitionMap};
use crate::model::{ActionPath, ExpectedScreen};
use crate::resolver::VisibleTextResolver;

// ============================================================================
// Inputs and outputs
// ============================================================================

/// Frontier discipline for the search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStrategy {
    /// Fewest actions wins
    #[default]
    Bfs,
    /// First discovered path wins
    Dfs,
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchStrategy::Bfs => f.write_str("bfs"),
            SearchStrategy::Dfs => f.write_str("dfs"),
        }
    }
}

impl FromStr for SearchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bfs" => Ok(SearchStrategy::Bfs),
            "dfs" => Ok(SearchStrategy::Dfs),
            other => Err(format!("unknown search strategy '{}' (expected bfs or dfs)", other)),
        }
    }
}

/// A goal for the blind planner: reach the action showing `target_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserGoal {
    pub target_text: String,
    pub start_screen: String,
    pub strategy: SearchStrategy,
}

impl UserGoal {
    pub fn new(target_text: impl Into<String>, start_screen: impl Into<String>) -> Self {
        Self {
            target_text: target_text.into(),
            start_screen: start_screen.into(),
            strategy: SearchStrategy::Bfs,
        }
    }

    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// Why blind planning failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlindFailure {
    #[error("NO_TARGET_ACTION: no indexed text matches '{text}'")]
    NoTargetAction { text: String },

    #[error("INVALID_START_PAGE: '{start}' is not in the page index")]
    InvalidStartPage { start: String },

    #[error("NO_PATH_FOUND: no path from '{start}' to any of {target_screens:?}")]
    NoPathFound {
        start: String,
        target_screens: Vec<String>,
        target_actions: Vec<ActionId>,
    },
}

impl BlindFailure {
    pub fn code(&self) -> &'static str {
        match self {
            BlindFailure::NoTargetAction { .. } => "NO_TARGET_ACTION",
            BlindFailure::InvalidStartPage { .. } => "INVALID_START_PAGE",
            BlindFailure::NoPathFound { .. } => "NO_PATH_FOUND",
        }
    }
}

/// Which search produced a blind plan.
///
/// The two-phase search only reaches screens the enhanced search already
/// visits, so after an enhanced miss it cannot succeed either; it stays in
/// the chain so callers see the same fallback order as before. The
/// whole-path search is different: it fires a target action from whichever
/// screen's transition row holds it, even when the action's metadata names
/// another page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    Enhanced,
    TwoPhase,
    WholePath,
}

/// Outcome of one blind planning call.
///
/// On success `screen_path` has exactly one more entry than `action_path`.
/// On failure both are empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanResult {
    pub success: bool,
    pub action_path: Vec<ActionId>,
    pub screen_path: Vec<ExpectedScreen>,

    /// Indexed text the goal resolved to (differs from the request on a
    /// fuzzy match)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub found_by: Option<SearchPhase>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<BlindFailure>,
}

impl PlanResult {
    fn found(node: SearchNode, matched_text: String, phase: SearchPhase) -> Self {
        Self {
            success: true,
            action_path: node.actions,
            screen_path: node.screens,
            matched_text: Some(matched_text),
            found_by: Some(phase),
            failure: None,
        }
    }

    fn failed(failure: BlindFailure) -> Self {
        Self {
            success: false,
            action_path: Vec::new(),
            screen_path: Vec::new(),
            matched_text: None,
            found_by: None,
            failure: Some(failure),
        }
    }

    pub fn failure_code(&self) -> Option<&'static str> {
        self.failure.as_ref().map(BlindFailure::code)
    }
}

// ============================================================================
// Search bookkeeping
// ============================================================================

#[derive(Debug, Clone)]
struct SearchNode {
    screen: ScreenIdx,
    actions: Vec<ActionId>,
    screens: Vec<ExpectedScreen>,
}

impl SearchNode {
    fn root(screen: ScreenIdx, name: ExpectedScreen) -> Self {
        Self {
            screen,
            actions: Vec::new(),
            screens: vec![name],
        }
    }

    fn extend(&self, action: ActionId, next: ScreenIdx, landing: ExpectedScreen) -> Self {
        let mut actions = self.actions.clone();
        actions.push(action);
        let mut screens = self.screens.clone();
        screens.push(landing);
        Self {
            screen: next,
            actions,
            screens,
        }
    }
}

/// Target actions grouped by the screen that owns them.
struct Targets {
    actions: BTreeSet<ActionId>,
    by_screen: BTreeMap<ScreenIdx, Vec<ActionId>>,
}

impl Targets {
    fn build(map: &TransitionMap, actions: BTreeSet<ActionId>) -> Self {
        let mut by_screen: BTreeMap<ScreenIdx, Vec<ActionId>> = BTreeMap::new();
        for action in &actions {
            if let Some(screen) = map.owning_screen(*action) {
                by_screen.entry(screen).or_default().push(*action);
            }
        }
        Self { actions, by_screen }
    }

    /// First target action that originates from `screen`.
    fn action_on(&self, screen: ScreenIdx) -> Option<ActionId> {
        self.by_screen
            .get(&screen)
            .and_then(|actions| actions.first())
            .copied()
    }
}

fn pop(frontier: &mut VecDeque<SearchNode>, strategy: SearchStrategy) -> Option<SearchNode> {
    match strategy {
        SearchStrategy::Bfs => frontier.pop_front(),
        SearchStrategy::Dfs => frontier.pop_back(),
    }
}

// ============================================================================
// Planner
// ============================================================================

/// Index-based planner over a flat [`TransitionMap`].
pub struct BlindPlanner<'a> {
    map: &'a TransitionMap,
}

impl<'a> BlindPlanner<'a> {
    pub fn new(map: &'a TransitionMap) -> Self {
        Self { map }
    }

    /// Plan a path from `start` to the action showing `target_text`.
    pub fn plan(&self, goal: &UserGoal) -> PlanResult {
        let Some((matched_text, actions)) = self.resolve_target(&goal.target_text) else {
            info!(target_text = %goal.target_text, "No indexed text matches goal");
            return PlanResult::failed(BlindFailure::NoTargetAction {
                text: goal.target_text.clone(),
            });
        };

        let targets = Targets::build(self.map, actions);
        if targets.by_screen.is_empty() {
            return PlanResult::failed(BlindFailure::NoTargetAction {
                text: goal.target_text.clone(),
            });
        }

        let Some(start) = self.map.screen_index(&goal.start_screen) else {
            return PlanResult::failed(BlindFailure::InvalidStartPage {
                start: goal.start_screen.clone(),
            });
        };

        debug!(
            matched_text = %matched_text,
            start = %goal.start_screen,
            strategy = %goal.strategy,
            target_actions = ?targets.actions,
            "Blind search started"
        );

        let found = self
            .enhanced_search(start, &targets, goal.strategy)
            .map(|node| (node, SearchPhase::Enhanced))
            .or_else(|| {
                debug!("Enhanced search failed, trying two-phase search");
                self.two_phase_search(start, &targets, goal.strategy)
                    .map(|node| (node, SearchPhase::TwoPhase))
            })
            .or_else(|| {
                debug!("Two-phase search failed, trying whole-path search");
                self.whole_path_search(start, &targets, goal.strategy)
                    .map(|node| (node, SearchPhase::WholePath))
            });

        match found {
            Some((node, phase)) => {
                info!(
                    actions = ?node.actions,
                    strategy = %goal.strategy,
                    phase = ?phase,
                    "Blind plan found"
                );
                PlanResult::found(node, matched_text, phase)
            }
            None => PlanResult::failed(BlindFailure::NoPathFound {
                start: goal.start_screen.clone(),
                target_screens: targets
                    .by_screen
                    .keys()
                    .map(|s| self.expected(*s).to_string())
                    .collect(),
                target_actions: targets.actions.into_iter().collect(),
            }),
        }
    }

    /// Ask a resolver which indexed text the intent refers to, then plan.
    pub fn plan_from_intent(
        &self,
        intent: &str,
        start_screen: &str,
        strategy: SearchStrategy,
        resolver: &dyn VisibleTextResolver,
    ) -> PlanResult {
        let candidates: Vec<&str> = self.map.visible_texts().collect();
        match resolver.resolve(intent, start_screen, &candidates) {
            Ok(text) => {
                let goal = UserGoal::new(text, start_screen).with_strategy(strategy);
                self.plan(&goal)
            }
            Err(e) => {
                info!(intent, error = %e, "Visible text resolution failed");
                PlanResult::failed(BlindFailure::NoTargetAction {
                    text: intent.to_string(),
                })
            }
        }
    }

    /// Turn a successful result into an executable path.
    pub fn action_path(&self, result: &PlanResult) -> Result<ActionPath, GraphError> {
        let steps = result
            .action_path
            .iter()
            .map(|a| self.map.step_for(*a))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ActionPath::new(steps, result.screen_path.clone())?)
    }

    // ------------------------------------------------------------------------
    // Target resolution
    // ------------------------------------------------------------------------

    fn resolve_target(&self, text: &str) -> Option<(String, BTreeSet<ActionId>)> {
        if let Some(actions) = self.map.resolve_actions_for_text(text) {
            return Some((text.to_string(), actions));
        }

        let (candidate, score) = best_match(text, self.map.visible_texts(), FUZZY_THRESHOLD)?;
        debug!(text, candidate, score, "Fuzzy text match");
        let actions = self.map.resolve_actions_for_text(candidate)?;
        Some((candidate.to_string(), actions))
    }

    fn expected(&self, screen: ScreenIdx) -> ExpectedScreen {
        match self.map.screen_name(screen) {
            Some(name) => ExpectedScreen::exact(name),
            None => ExpectedScreen::Unknown,
        }
    }

    /// Where firing `action` on `screen` is expected to land.
    fn landing(&self, screen: ScreenIdx, action: ActionId) -> ExpectedScreen {
        let dest = self
            .map
            .actions_from(screen)
            .and_then(|edges| edges.get(&action));
        match dest {
            Some(Destination::Screens(screens)) if screens.len() == 1 => self.expected(screens[0]),
            Some(Destination::Screens(screens)) => ExpectedScreen::AnyOf(
                screens
                    .iter()
                    .filter_map(|s| self.map.screen_name(*s))
                    .map(str::to_string)
                    .collect(),
            ),
            Some(Destination::Unknown) | None => ExpectedScreen::Unknown,
        }
    }

    fn finish(&self, node: &SearchNode, action: ActionId) -> SearchNode {
        node.extend(action, node.screen, self.landing(node.screen, action))
    }

    // ------------------------------------------------------------------------
    // Strategies
    // ------------------------------------------------------------------------

    /// Primary search. Unknown destinations keep the search on the same
    /// screen; visits are deduplicated per `(screen, action)`.
    fn enhanced_search(
        &self,
        start: ScreenIdx,
        targets: &Targets,
        strategy: SearchStrategy,
    ) -> Option<SearchNode> {
        let mut frontier = VecDeque::from([SearchNode::root(start, self.expected(start))]);
        let mut visited: HashSet<(ScreenIdx, ActionId)> = HashSet::new();

        while let Some(node) = pop(&mut frontier, strategy) {
            if let Some(action) = targets.action_on(node.screen) {
                return Some(self.finish(&node, action));
            }

            let Some(edges) = self.map.actions_from(node.screen) else {
                continue;
            };

            for (action, dest) in edges {
                if !visited.insert((node.screen, *action)) {
                    continue;
                }
                match dest {
                    Destination::Screens(screens) => {
                        for next in screens {
                            frontier.push_back(node.extend(*action, *next, self.expected(*next)));
                        }
                    }
                    Destination::Unknown => {
                        frontier.push_back(node.extend(
                            *action,
                            node.screen,
                            ExpectedScreen::Unknown,
                        ));
                    }
                }
            }
        }
        None
    }

    /// Reach each target screen in turn, then append its target action.
    fn two_phase_search(
        &self,
        start: ScreenIdx,
        targets: &Targets,
        strategy: SearchStrategy,
    ) -> Option<SearchNode> {
        for (screen, actions) in &targets.by_screen {
            let Some(node) = self.path_to_screen(start, *screen, strategy) else {
                continue;
            };
            let Some(edges) = self.map.actions_from(*screen) else {
                continue;
            };
            if let Some(action) = actions.iter().find(|a| edges.contains_key(a)) {
                return Some(self.finish(&node, *action));
            }
        }
        None
    }

    fn path_to_screen(
        &self,
        start: ScreenIdx,
        target: ScreenIdx,
        strategy: SearchStrategy,
    ) -> Option<SearchNode> {
        let mut frontier = VecDeque::from([SearchNode::root(start, self.expected(start))]);
        let mut visited: HashSet<(ScreenIdx, ActionId)> = HashSet::new();

        while let Some(node) = pop(&mut frontier, strategy) {
            if node.screen == target {
                return Some(node);
            }
            let Some(edges) = self.map.actions_from(node.screen) else {
                continue;
            };
            for (action, dest) in edges {
                if dest.contains(target) {
                    return Some(node.extend(*action, target, self.expected(target)));
                }
                if !visited.insert((node.screen, *action)) {
                    continue;
                }
                for next in dest.screens() {
                    frontier.push_back(node.extend(*action, *next, self.expected(*next)));
                }
            }
        }
        None
    }

    /// Last resort: stop as soon as any target action is on the frontier.
    fn whole_path_search(
        &self,
        start: ScreenIdx,
        targets: &Targets,
        strategy: SearchStrategy,
    ) -> Option<SearchNode> {
        let mut frontier = VecDeque::from([SearchNode::root(start, self.expected(start))]);
        let mut visited: HashSet<(ScreenIdx, ActionId)> = HashSet::new();

        while let Some(node) = pop(&mut frontier, strategy) {
            let Some(edges) = self.map.actions_from(node.screen) else {
                continue;
            };
            for (action, dest) in edges {
                if targets.actions.contains(action) {
                    return Some(self.finish(&node, *action));
                }
                if !visited.insert((node.screen, *action)) {
                    continue;
                }
                for next in dest.screens() {
                    frontier.push_back(node.extend(*action, *next, self.expected(*next)));
                }
            }
        }
        None
    }
}
