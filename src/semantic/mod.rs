pub mod error;
pub mod flow;
pub mod locator;
pub mod matcher;
pub mod planner;
pub mod searcher;
pub mod selector;
pub mod target;

pub use error::PlannerError;
pub use flow::{ExecutorStep, FlowError, UiBinding};
pub use locator::{LocateSource, Location, TargetLocator};
pub use matcher::{MatchProfile, MatchScore};
pub use planner::{
    Assumptions, DEFAULT_START_SCREEN, PlanFailure, PlannerOutput, SemanticPlanner,
    infer_current_screen,
};
pub use searcher::{PathResult, PathSearcher};
pub use selector::{DefaultPathSelector, PathSelector, WeightedPathSelector};
pub use target::{ComponentTarget, StateTarget, TargetSpec};
