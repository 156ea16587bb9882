pub mod collaborators;
pub mod engine;
pub mod mock;
pub mod result;
pub mod retry;
pub mod simulator;
pub mod state;

pub use collaborators::{AtomicActionExecutor, ScreenIdSource, SettleDetector};
pub use engine::ExecutionEngine;
pub use result::{AtomicFailure, ExecuteFailReason, ExecuteResult};
pub use retry::{RetryPolicy, RetryingActionExecutor};
pub use simulator::SimulatedDevice;
pub use state::{CancelToken, ExecutionState, RunStatus};
