use ui_navigator::blind::{
    BlindFailure, BlindPlanner, SearchPhase, SearchStrategy, UserGoal, best_match, levenshtein,
    similarity,
};
use ui_navigator::model::{ActionRef, ExpectedScreen, Trigger};
use ui_navigator::resolver::{IdentityTextResolver, ResolverError, VisibleTextResolver};

use crate::common::graphs::{back_map, misfiled_map, scenario_map, shortcut_map};

mod common;

// =========================================================================
// Scenario graph
// =========================================================================

#[test]
fn bfs_reaches_target_through_both_levels() {
    let map = scenario_map();
    let planner = BlindPlanner::new(&map);

    let result = planner.plan(&UserGoal::new("Target", "Main"));

    assert!(result.success);
    assert_eq!(result.action_path, vec![0, 1, 3]);
    assert_eq!(
        result.screen_path,
        vec![
            ExpectedScreen::exact("Main"),
            ExpectedScreen::exact("Second"),
            ExpectedScreen::exact("Third"),
            ExpectedScreen::exact("Third"),
        ]
    );
    assert_eq!(result.matched_text.as_deref(), Some("Target"));
    assert_eq!(result.found_by, Some(SearchPhase::Enhanced));
    assert!(result.failure.is_none());
}

#[test]
fn unknown_text_fails_with_no_target_action() {
    let map = scenario_map();
    let result = BlindPlanner::new(&map).plan(&UserGoal::new("zzzzzzzz", "Main"));

    assert!(!result.success);
    assert!(result.action_path.is_empty());
    assert!(result.screen_path.is_empty());
    assert_eq!(result.failure_code(), Some("NO_TARGET_ACTION"));
}

#[test]
fn unknown_start_fails_with_invalid_start_page() {
    let map = scenario_map();
    let result = BlindPlanner::new(&map).plan(&UserGoal::new("Target", "Nowhere"));

    assert!(!result.success);
    assert_eq!(
        result.failure,
        Some(BlindFailure::InvalidStartPage {
            start: "Nowhere".into()
        })
    );
}

#[test]
fn close_text_matches_fuzzily() {
    let map = scenario_map();
    let result = BlindPlanner::new(&map).plan(&UserGoal::new("Targt", "Main"));

    assert!(result.success);
    assert_eq!(result.matched_text.as_deref(), Some("Target"));
    assert_eq!(result.action_path, vec![0, 1, 3]);
}

#[test]
fn target_on_start_screen_is_a_single_step() {
    let map = scenario_map();
    let result = BlindPlanner::new(&map).plan(&UserGoal::new("Go third", "Second"));

    assert!(result.success);
    assert_eq!(result.action_path, vec![1]);
    assert_eq!(result.screen_path.len(), 2);
}

#[test]
fn unreachable_target_fails_with_no_path_found() {
    let map = scenario_map();
    // Nothing leads back from Third to Second.
    let result = BlindPlanner::new(&map).plan(&UserGoal::new("Go third", "Third"));

    assert!(!result.success);
    match result.failure {
        Some(BlindFailure::NoPathFound {
            start,
            target_screens,
            target_actions,
        }) => {
            assert_eq!(start, "Third");
            assert_eq!(target_screens, vec!["Second".to_string()]);
            assert_eq!(target_actions, vec![1]);
        }
        other => panic!("Expected NO_PATH_FOUND, got {:?}", other),
    }
}

#[test]
fn found_path_converts_to_executable_steps() {
    let map = scenario_map();
    let planner = BlindPlanner::new(&map);
    let result = planner.plan(&UserGoal::new("Target", "Main"));

    let path = planner.action_path(&result).unwrap();

    assert_eq!(path.len(), 3);
    assert_eq!(path.screens().len(), path.len() + 1);
    let elements: Vec<&str> = path.steps().iter().map(|s| s.element_id.as_str()).collect();
    assert_eq!(elements, vec!["btnToSecond", "btnToThird", "btnTarget"]);
    assert_eq!(path.steps()[0].action, ActionRef::Indexed(0));
    assert!(path.steps().iter().all(|s| s.trigger == Trigger::Click));
}

// =========================================================================
// Strategies
// =========================================================================

#[test]
fn bfs_is_never_longer_than_dfs() {
    for map in [scenario_map(), shortcut_map()] {
        let planner = BlindPlanner::new(&map);
        let bfs = planner.plan(&UserGoal::new("Target", "Main"));
        let dfs = planner.plan(&UserGoal::new("Target", "Main").with_strategy(SearchStrategy::Dfs));

        assert!(bfs.success && dfs.success);
        assert!(bfs.action_path.len() <= dfs.action_path.len());
    }
}

#[test]
fn dfs_takes_the_first_discovered_branch() {
    let map = shortcut_map();
    let planner = BlindPlanner::new(&map);

    let bfs = planner.plan(&UserGoal::new("Target", "Main"));
    let dfs = planner.plan(&UserGoal::new("Target", "Main").with_strategy(SearchStrategy::Dfs));

    assert_eq!(bfs.action_path, vec![0, 3]);
    assert_eq!(dfs.action_path, vec![1, 2, 3]);
}

#[test]
fn planning_is_deterministic() {
    let map = shortcut_map();
    let planner = BlindPlanner::new(&map);
    let goal = UserGoal::new("Target", "Main").with_strategy(SearchStrategy::Dfs);

    let first = planner.plan(&goal);
    for _ in 0..5 {
        assert_eq!(planner.plan(&goal), first);
    }
}

#[test]
fn strategy_parses_case_insensitively() {
    assert_eq!("BFS".parse::<SearchStrategy>(), Ok(SearchStrategy::Bfs));
    assert_eq!(" dfs ".parse::<SearchStrategy>(), Ok(SearchStrategy::Dfs));
    assert!("astar".parse::<SearchStrategy>().is_err());
    assert_eq!(SearchStrategy::default(), SearchStrategy::Bfs);
}

// =========================================================================
// Unknown destinations
// =========================================================================

#[test]
fn back_target_lands_on_unknown_screen() {
    let map = back_map();
    let result = BlindPlanner::new(&map).plan(&UserGoal::new("Close", "Main"));

    assert!(result.success);
    assert_eq!(result.action_path, vec![1, 2]);
    assert_eq!(
        result.screen_path,
        vec![
            ExpectedScreen::exact("Main"),
            ExpectedScreen::exact("Detail"),
            ExpectedScreen::Unknown,
        ]
    );
}

#[test]
fn unknown_destinations_do_not_loop_forever() {
    let map = back_map();
    for strategy in [SearchStrategy::Bfs, SearchStrategy::Dfs] {
        let result =
            BlindPlanner::new(&map).plan(&UserGoal::new("Hidden", "Main").with_strategy(strategy));
        assert_eq!(result.failure_code(), Some("NO_PATH_FOUND"));
    }
}

#[test]
fn unknown_destination_is_not_an_absent_edge() {
    let map = back_map();
    let edges = map.actions_from(0).unwrap();

    assert!(edges[&0].is_unknown());
    assert!(!edges[&1].is_unknown());
    assert!(map.actions_from(1).is_some());
    assert!(map.actions_from(7).is_none());
}

// =========================================================================
// Intent resolution
// =========================================================================

struct PickFirst;

impl VisibleTextResolver for PickFirst {
    fn resolve(&self, _intent: &str, _start: &str, candidates: &[&str]) -> Result<String, ResolverError> {
        candidates
            .iter()
            .find(|c| c.starts_with('T'))
            .map(|c| c.to_string())
            .ok_or(ResolverError::NotACandidate { text: "T*".into() })
    }
}

struct Refuses;

impl VisibleTextResolver for Refuses {
    fn resolve(&self, _intent: &str, _start: &str, _candidates: &[&str]) -> Result<String, ResolverError> {
        Err(ResolverError::NotACandidate {
            text: "nothing".into(),
        })
    }
}

#[test]
fn intent_is_resolved_to_an_indexed_text_before_planning() {
    let map = scenario_map();
    let planner = BlindPlanner::new(&map);

    let result = planner.plan_from_intent("press the goal", "Main", SearchStrategy::Bfs, &PickFirst);
    assert_eq!(result.action_path, vec![0, 1, 3]);

    let verbatim =
        planner.plan_from_intent("  Target ", "Main", SearchStrategy::Bfs, &IdentityTextResolver);
    assert_eq!(verbatim.action_path, vec![0, 1, 3]);
}

#[test]
fn resolver_failure_reports_no_target_action() {
    let map = scenario_map();
    let result =
        BlindPlanner::new(&map).plan_from_intent("whatever", "Main", SearchStrategy::Bfs, &Refuses);

    assert_eq!(result.failure_code(), Some("NO_TARGET_ACTION"));
}

// =========================================================================
// Fallback searches
// =========================================================================

#[test]
fn whole_path_search_finds_an_action_filed_under_the_wrong_page() {
    let map = misfiled_map();
    let planner = BlindPlanner::new(&map);

    for strategy in [SearchStrategy::Bfs, SearchStrategy::Dfs] {
        let result = planner.plan(&UserGoal::new("Target", "Main").with_strategy(strategy));

        assert!(result.success, "{strategy}: {:?}", result.failure);
        assert_eq!(result.found_by, Some(SearchPhase::WholePath));
        assert_eq!(result.action_path, vec![0, 1]);
        assert_eq!(
            result.screen_path,
            vec![
                ExpectedScreen::exact("Main"),
                ExpectedScreen::exact("Second"),
                ExpectedScreen::exact("Second"),
            ]
        );
    }
}

// =========================================================================
// Similarity
// =========================================================================

#[test]
fn similarity_is_reflexive_and_symmetric() {
    let words = ["", "a", "Target", "Go third", "跳转到第二层级", "kitten", "sitting"];
    for a in words {
        assert_eq!(similarity(a, a), 1.0, "reflexive for {:?}", a);
        for b in words {
            assert_eq!(similarity(a, b), similarity(b, a), "symmetric for {:?}/{:?}", a, b);
        }
    }
}

#[test]
fn levenshtein_counts_edits() {
    assert_eq!(levenshtein("kitten", "sitting"), 3);
    assert_eq!(levenshtein("", "abc"), 3);
    assert_eq!(levenshtein("第二层级", "第三层级"), 1);
    assert!((similarity("Targt", "Target") - (1.0 - 1.0 / 6.0)).abs() < 1e-9);
}

#[test]
fn best_match_keeps_the_closest_candidate_above_threshold() {
    let candidates = ["abcdefghij", "Target"];
    assert_eq!(best_match("Targt", candidates, 0.70).map(|(c, _)| c), Some("Target"));

    assert!(best_match("abcdefwxyz", ["abcdefghij"], 0.70).is_none());
    assert!(best_match("abcdefghxy", ["abcdefghij"], 0.70).is_some());
    assert!(best_match("anything", Vec::<&str>::new(), 0.0).is_none());
}
