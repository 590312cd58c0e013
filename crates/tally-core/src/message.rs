//! Message payloads observed by the ledger.
//!
//! The ledger never interprets a message beyond handing it to counter
//! predicates. Only [`Message::kind`] has built-in meaning (the default
//! predicate compares it against the counter name); every other field is
//! carried through untouched for custom predicates to inspect.

use serde::{Deserialize, Serialize};

/// A message carried by add/remove events.
///
/// Messages originate in the host system's stores, typically as validation
/// failures or loading markers, and reach the ledger only through its event
/// subscription. The ledger treats them as opaque payloads for predicate
/// evaluation; it never stores or mutates them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message type/category, e.g. `"errors"` or `"loading"`. Drives the
    /// default counter predicate.
    pub kind: String,
    /// Identifier of the message within its originating store.
    pub key: String,
    /// Whether the message blocks settlement-style workflows in the host
    /// system. Not interpreted by the ledger itself.
    pub blocking: bool,
    /// Freeform message content. Never inspected by the ledger.
    pub value: Option<serde_json::Value>,
}

impl Message {
    /// Create a non-blocking message of the given kind and key.
    pub fn new(kind: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            key: key.into(),
            blocking: false,
            value: None,
        }
    }

    /// Set whether the message is blocking.
    pub fn with_blocking(mut self, blocking: bool) -> Self {
        self.blocking = blocking;
        self
    }

    /// Attach freeform content to the message.
    pub fn with_value(mut self, value: serde_json::Value) -> Self {
        self.value = Some(value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_message_defaults() {
        let message = Message::new("errors", "required");
        assert_eq!(message.kind, "errors");
        assert_eq!(message.key, "required");
        assert!(!message.blocking);
        assert!(message.value.is_none());
    }

    #[test]
    fn builder_methods_set_fields() {
        let message = Message::new("errors", "length")
            .with_blocking(true)
            .with_value(json!("too short"));
        assert!(message.blocking);
        assert_eq!(message.value, Some(json!("too short")));
    }
}
