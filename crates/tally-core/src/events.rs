//! Event kinds and the subscription capability the ledger consumes.
//!
//! The ledger does not own an event system. The host, typically a tree of
//! nodes with per-node message stores, exposes subscription through
//! [`MessageEventSource`]. The ledger registers two deep listeners on it
//! (one per event kind) and everything else stays on the host's side of
//! the seam.

use crate::message::Message;

/// The two message-event kinds the ledger consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageEventKind {
    /// A message entered a store within the subscribed scope.
    Added,
    /// A message left a store within the subscribed scope.
    Removed,
}

/// How far from the subscribed scope an event may originate and still be
/// delivered to a listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropagationScope {
    /// Only events originating exactly at the subscribed scope.
    Local,
    /// Events originating at the subscribed scope or anywhere below it.
    Deep,
}

/// An emitted message event.
///
/// Exposes the payload the ledger routes plus the kind that fired, so a
/// single listener can serve both kinds if a host prefers that shape.
#[derive(Clone, Debug)]
pub struct MessageEvent {
    /// Which event kind fired.
    pub kind: MessageEventKind,
    /// The message the event is about.
    pub payload: Message,
}

/// Listener callback registered through [`MessageEventSource::subscribe`].
pub type MessageListener = Box<dyn Fn(&MessageEvent) + Send + Sync>;

/// Subscription capability supplied by the host's event system.
///
/// The contract the ledger relies on:
///
/// - Registration is for the lifetime of the source; there is no
///   unsubscribe operation.
/// - Delivery is synchronous with emission (run-to-completion on the
///   emitting thread). The ledger's counters are guaranteed consistent with
///   all delivered events the moment an emission call returns.
/// - A `Deep` subscription fires for events originating at or below the
///   subscribed scope; `Local` fires only for events originating exactly
///   at it.
pub trait MessageEventSource {
    /// Register `listener` for `kind` events within `scope`.
    fn subscribe(
        &self,
        kind: MessageEventKind,
        scope: PropagationScope,
        listener: MessageListener,
    );
}
