//! # Tally - Message-Counting Ledger with Asynchronous Settlement
//!
//! **Purpose**: count messages entering and leaving a system, per named
//! counter, and let callers await the moment a counter returns to zero.
//!
//! A [`Ledger`] attaches to a message event source and routes every added
//! message as `+1` and every removed message as `-1` into the counters
//! whose predicate matches. Each counter hands out a [`Settlement`] handle
//! that is fulfilled exactly while its count sits at zero, so "no blocking
//! validation messages anywhere under this scope" becomes a value a task
//! can await.
//!
//! ## Core Concepts
//!
//! - **Counter**: a named running total; may go negative; created on first
//!   declaration and kept for the ledger's lifetime.
//! - **Predicate routing**: each counter filters the event stream with a
//!   pure `Fn(&Message) -> bool`; the default matches the message `kind`
//!   against the counter name.
//! - **Zero crossing**: leaving zero mints a fresh pending settlement
//!   channel; returning to zero fulfils the current one in place, so
//!   handles resolve exactly once per pending period.
//! - **Event-source capability**: the ledger only consumes the
//!   [`MessageEventSource`] trait; whatever tree or store emits the events
//!   lives elsewhere.
//!
//! ## What's NOT in this crate
//!
//! - The tree/store emitting message events (`tally-testkit` ships an
//!   in-memory fixture for tests and demos).
//! - Message classification or validation rules; messages arrive already
//!   shaped.
//! - Rendering, persistence, or transport of messages.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Message payloads carried by add/remove events.
pub mod message;

/// Event kinds, propagation scopes, and the event-source capability.
pub mod events;

/// Settlement handles and their resolvers.
pub mod settlement;

/// The ledger: named counters, predicate routing, zero-crossing settlement.
pub mod ledger;

// Re-export the working surface at the crate root.
pub use events::{
    MessageEvent, MessageEventKind, MessageEventSource, MessageListener, PropagationScope,
};
pub use ledger::{Ledger, Predicate};
pub use message::Message;
pub use settlement::Settlement;
