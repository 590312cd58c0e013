//! Tally Testing Infrastructure
//!
//! Common fixtures for exercising the ledger: an in-memory scope tree that
//! emits message events, plus factories for ready-made messages.
//!
//! # Usage
//!
//! Add this to your crate's `Cargo.toml` dev-dependencies:
//! ```toml
//! [dev-dependencies]
//! tally-testkit = { path = "../tally-testkit" }
//! ```
//!
//! Then in your tests:
//! ```rust,ignore
//! use tally_core::Ledger;
//! use tally_testkit::{validation_error, ScopeTree};
//!
//! #[tokio::test]
//! async fn settles_once_errors_clear() {
//!     let tree = ScopeTree::new();
//!     let ledger = Ledger::new();
//!     ledger.attach(&tree.root());
//!
//!     let form = tree.root().child("form");
//!     let handle = ledger.declare("errors", 0);
//!     form.add_message(&validation_error("email"));
//!     form.remove_message(&validation_error("email"));
//!     handle.wait().await;
//! }
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

/// Ready-made message payloads.
pub mod messages;

/// The in-memory scope tree emitting message events.
pub mod tree;

// Re-export commonly used items
pub use messages::*;
pub use tree::{ScopeHandle, ScopeTree};
