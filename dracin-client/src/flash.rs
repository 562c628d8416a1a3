//! One-shot status messages left by a mutation for the next screen/command.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::storage::{FLASH_KEY, KeyValueStore, load_json, save_json};

/// Success or error styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    /// Green.
    Success,
    /// Red.
    Error,
}

/// A message addressed to the screen named by `scope`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    /// Screen or command the message is meant for.
    pub scope: String,
    /// Serialized as `type`.
    #[serde(rename = "type")]
    pub kind: FlashKind,
    /// Text shown to the operator.
    pub message: String,
}

impl FlashMessage {
    /// A success toast for `scope`.
    pub fn success(scope: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    /// An error toast for `scope`.
    pub fn error(scope: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            kind: FlashKind::Error,
            message: message.into(),
        }
    }
}

/// At most one pending message; publishing replaces it.
#[derive(Debug, Clone)]
pub struct FlashStore {
    store: Arc<dyn KeyValueStore>,
}

impl FlashStore {
    /// Flash messages kept in `store`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Store `message`, replacing any pending one. Storage failures are logged.
    pub fn publish(&self, message: FlashMessage) {
        if let Err(err) = save_json(self.store.as_ref(), FLASH_KEY, &message) {
            warn!(error = %err, "failed to store flash message");
        }
    }

    /// Return the pending message if it belongs to `scope`, removing it.
    /// Messages for other scopes stay in place.
    pub fn take(&self, scope: &str) -> Option<FlashMessage> {
        let message =
            match load_json::<FlashMessage>(self.store.as_ref(), FLASH_KEY) {
                Ok(Some(message)) => message,
                Ok(None) => return None,
                Err(err) => {
                    warn!(error = %err, "discarding unreadable flash message");
                    self.clear();
                    return None;
                }
            };

        if message.scope != scope {
            return None;
        }
        self.clear();
        Some(message)
    }

    fn clear(&self) {
        if let Err(err) = self.store.remove(FLASH_KEY) {
            warn!(error = %err, "failed to clear flash message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn take_only_matches_scope_once() {
        let flash = FlashStore::new(Arc::new(MemoryStore::new()));
        flash.publish(FlashMessage::success("users", "User diperbarui"));

        assert_eq!(flash.take("orders"), None);
        let taken = flash.take("users").unwrap();
        assert_eq!(taken.kind, FlashKind::Success);
        assert_eq!(taken.message, "User diperbarui");
        assert_eq!(flash.take("users"), None);
    }

    #[test]
    fn publish_overwrites_and_uses_type_key() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let flash = FlashStore::new(Arc::clone(&store));
        flash.publish(FlashMessage::success("tags", "ok"));
        flash.publish(FlashMessage::error("tags", "gagal"));

        let raw = store.get(FLASH_KEY).unwrap().unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&raw).unwrap(),
            serde_json::json!({"scope":"tags","type":"error","message":"gagal"})
        );
    }
}
