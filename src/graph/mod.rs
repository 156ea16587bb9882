pub mod error;
pub mod flatten;
pub mod transition_map;
pub mod ui_map;

use serde::Serialize;

pub use error::GraphError;
pub use transition_map::{ActionId, ActionMeta, Destination, ScreenIdx, TransitionMap};
pub use ui_map::{Element, Intent, IntentOwner, Screen, UiMap};

/// Hex SHA-1 of a document's compact JSON form.
pub fn fingerprint<T: Serialize>(doc: &T) -> String {
    use sha1::{Digest, Sha1};

    let mut hasher = Sha1::new();
    // Serializing plain maps and strings cannot fail.
    if let Ok(bytes) = serde_json::to_vec(doc) {
        hasher.update(&bytes);
    }
    format!("{:x}", hasher.finalize())
}
