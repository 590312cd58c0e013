//! An in-memory scope tree that emits message events.
//!
//! Just enough hierarchy to exercise the ledger's subscription contract:
//! scopes form a tree, each scope accepts subscriptions, and emitting at a
//! scope delivers synchronously to the origin's listeners and to `Deep`
//! listeners on every ancestor, walking origin to root. This is test
//! tooling, not a node framework.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use tally_core::{
    Message, MessageEvent, MessageEventKind, MessageEventSource, MessageListener, PropagationScope,
};

type SharedListener = Arc<dyn Fn(&MessageEvent) + Send + Sync>;

struct Registration {
    kind: MessageEventKind,
    scope: PropagationScope,
    listener: SharedListener,
}

struct Node {
    name: String,
    parent: Option<usize>,
    listeners: Vec<Registration>,
}

struct TreeInner {
    nodes: Mutex<Vec<Node>>,
}

/// A tree of named scopes emitting message events.
///
/// Scopes are created through [`ScopeHandle::child`] and never removed; the
/// tree keeps them alive for its own lifetime. Cloning shares the tree.
#[derive(Clone)]
pub struct ScopeTree {
    inner: Arc<TreeInner>,
}

impl ScopeTree {
    /// Creates a tree containing only the root scope.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(TreeInner {
                nodes: Mutex::new(vec![Node {
                    name: "root".to_owned(),
                    parent: None,
                    listeners: Vec::new(),
                }]),
            }),
        }
    }

    /// A handle to the root scope.
    pub fn root(&self) -> ScopeHandle {
        ScopeHandle {
            tree: Arc::clone(&self.inner),
            index: 0,
        }
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

/// A handle to one scope in a [`ScopeTree`].
///
/// Cloning hands out another handle to the same scope.
#[derive(Clone)]
pub struct ScopeHandle {
    tree: Arc<TreeInner>,
    index: usize,
}

impl ScopeHandle {
    /// Creates a child scope under this one.
    pub fn child(&self, name: &str) -> ScopeHandle {
        let mut nodes = self.tree.nodes.lock();
        nodes.push(Node {
            name: name.to_owned(),
            parent: Some(self.index),
            listeners: Vec::new(),
        });
        ScopeHandle {
            tree: Arc::clone(&self.tree),
            index: nodes.len() - 1,
        }
    }

    /// This scope's name.
    pub fn name(&self) -> String {
        self.tree.nodes.lock()[self.index].name.clone()
    }

    /// Emits a message-added event originating at this scope.
    pub fn add_message(&self, message: &Message) {
        self.emit(MessageEventKind::Added, message);
    }

    /// Emits a message-removed event originating at this scope.
    pub fn remove_message(&self, message: &Message) {
        self.emit(MessageEventKind::Removed, message);
    }

    fn emit(&self, kind: MessageEventKind, message: &Message) {
        let event = MessageEvent {
            kind,
            payload: message.clone(),
        };
        // Snapshot the matching listeners first so they run outside the tree
        // lock; a listener may then subscribe or emit further events.
        let mut matched: Vec<SharedListener> = Vec::new();
        {
            let nodes = self.tree.nodes.lock();
            let mut at_origin = true;
            let mut cursor = Some(self.index);
            while let Some(index) = cursor {
                let node = &nodes[index];
                for registration in &node.listeners {
                    let in_scope = at_origin || registration.scope == PropagationScope::Deep;
                    if registration.kind == kind && in_scope {
                        matched.push(Arc::clone(&registration.listener));
                    }
                }
                cursor = node.parent;
                at_origin = false;
            }
            trace!(
                "{kind:?} event at scope \"{}\" matched {} listeners",
                nodes[self.index].name,
                matched.len()
            );
        }
        for listener in matched {
            listener(&event);
        }
    }
}

impl MessageEventSource for ScopeHandle {
    fn subscribe(
        &self,
        kind: MessageEventKind,
        scope: PropagationScope,
        listener: MessageListener,
    ) {
        let mut nodes = self.tree.nodes.lock();
        nodes[self.index].listeners.push(Registration {
            kind,
            scope,
            listener: Arc::from(listener),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(hits: &Arc<AtomicUsize>) -> MessageListener {
        let hits = Arc::clone(hits);
        Box::new(move |_event: &MessageEvent| {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn origin_listeners_fire_for_both_scopes() {
        let tree = ScopeTree::new();
        let root = tree.root();
        let local_hits = Arc::new(AtomicUsize::new(0));
        let deep_hits = Arc::new(AtomicUsize::new(0));
        root.subscribe(
            MessageEventKind::Added,
            PropagationScope::Local,
            counting(&local_hits),
        );
        root.subscribe(
            MessageEventKind::Added,
            PropagationScope::Deep,
            counting(&deep_hits),
        );

        root.add_message(&Message::new("errors", "a"));
        assert_eq!(local_hits.load(Ordering::SeqCst), 1);
        assert_eq!(deep_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn deep_subscription_hears_grandchildren() {
        let tree = ScopeTree::new();
        let root = tree.root();
        let grandchild = root.child("child").child("grandchild");
        let hits = Arc::new(AtomicUsize::new(0));
        root.subscribe(
            MessageEventKind::Added,
            PropagationScope::Deep,
            counting(&hits),
        );

        grandchild.add_message(&Message::new("errors", "a"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn local_subscription_ignores_descendants() {
        let tree = ScopeTree::new();
        let root = tree.root();
        let child = root.child("child");
        let hits = Arc::new(AtomicUsize::new(0));
        root.subscribe(
            MessageEventKind::Added,
            PropagationScope::Local,
            counting(&hits),
        );

        child.add_message(&Message::new("errors", "a"));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        root.add_message(&Message::new("errors", "b"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn siblings_do_not_hear_each_other() {
        let tree = ScopeTree::new();
        let root = tree.root();
        let left = root.child("left");
        let right = root.child("right");
        let hits = Arc::new(AtomicUsize::new(0));
        left.subscribe(
            MessageEventKind::Added,
            PropagationScope::Deep,
            counting(&hits),
        );

        right.add_message(&Message::new("errors", "a"));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn kind_filter_separates_added_from_removed() {
        let tree = ScopeTree::new();
        let root = tree.root();
        let hits = Arc::new(AtomicUsize::new(0));
        root.subscribe(
            MessageEventKind::Removed,
            PropagationScope::Deep,
            counting(&hits),
        );

        root.add_message(&Message::new("errors", "a"));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        root.remove_message(&Message::new("errors", "a"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn delivery_walks_origin_to_root() {
        let tree = ScopeTree::new();
        let root = tree.root();
        let child = root.child("child");
        let order = Arc::new(Mutex::new(Vec::new()));

        let seen = Arc::clone(&order);
        root.subscribe(
            MessageEventKind::Added,
            PropagationScope::Deep,
            Box::new(move |_event| seen.lock().push("root")),
        );
        let seen = Arc::clone(&order);
        child.subscribe(
            MessageEventKind::Added,
            PropagationScope::Local,
            Box::new(move |_event| seen.lock().push("child")),
        );

        child.add_message(&Message::new("errors", "a"));
        assert_eq!(*order.lock(), vec!["child", "root"]);
    }

    #[test]
    fn listener_may_emit_from_inside_delivery() {
        let tree = ScopeTree::new();
        let root = tree.root();
        let child = root.child("child");
        let hits = Arc::new(AtomicUsize::new(0));
        root.subscribe(
            MessageEventKind::Removed,
            PropagationScope::Deep,
            counting(&hits),
        );

        let echo = child.clone();
        root.subscribe(
            MessageEventKind::Added,
            PropagationScope::Deep,
            Box::new(move |event| echo.remove_message(&event.payload)),
        );

        child.add_message(&Message::new("errors", "a"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
