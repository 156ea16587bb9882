pub mod planner;
pub mod similarity;

pub use planner::{
    BlindFailure, BlindPlanner, PlanResult, SearchPhase, SearchStrategy, UserGoal,
};
pub use similarity::{FUZZY_THRESHOLD, best_match, levenshtein, similarity};
