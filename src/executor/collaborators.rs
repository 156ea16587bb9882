use crate::executor::result::AtomicFailure;
use crate::model::Trigger;

/// Reads the identifier of the screen currently in the foreground.
pub trait ScreenIdSource: Send + Sync {
    fn current_screen_id(&self) -> Option<String>;
}

/// Fires one interaction on the live UI.
///
/// Implementations are responsible for marshaling onto whatever thread owns
/// the UI.
pub trait AtomicActionExecutor: Send + Sync {
    fn run(&self, element_id: &str, trigger: Trigger) -> Result<(), AtomicFailure>;
}

/// Blocks until the UI stops reacting. `false` means it did not settle in time.
pub trait SettleDetector: Send + Sync {
    fn wait_for_idle(&self) -> bool;
}
