//! Ready-made message payloads for tests and demos.

use serde_json::json;
use tally_core::Message;

/// A plain validation error with kind `"errors"`.
pub fn validation_error(key: &str) -> Message {
    Message::new("errors", key)
}

/// A validation warning with kind `"warnings"`.
pub fn validation_warning(key: &str) -> Message {
    Message::new("warnings", key)
}

/// A blocking validation error, the shape a failing required rule produces.
pub fn failing(key: &str) -> Message {
    Message::new("errors", key)
        .with_blocking(true)
        .with_value(json!({ "rule": "required" }))
}
