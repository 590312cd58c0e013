//! The ledger: named counters routed from message events.
//!
//! A [`Ledger`] tracks any number of named counters. Each counter carries a
//! running count (which may go negative), a predicate deciding which
//! messages belong to it, and a settlement channel that is fulfilled exactly
//! while the count sits at zero. Attaching the ledger to a
//! [`MessageEventSource`] routes every added message as `+1` and every
//! removed message as `-1` into all counters whose predicate matches.
//!
//! Counters are created on first declaration and live as long as the ledger;
//! reading an undeclared counter yields the neutral answers (count 0,
//! already-settled handle) without creating it.
//!
//! Predicates are trusted code. A panicking predicate propagates out of the
//! emission call, and counters not yet visited for that event keep their
//! previous counts; the ledger itself stays usable afterwards.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::events::{MessageEvent, MessageEventKind, MessageEventSource, PropagationScope};
use crate::message::Message;
use crate::settlement::{Resolver, Settlement};

/// Predicate deciding whether a message belongs to a counter.
///
/// Predicates must be pure: no side effects, and no calls back into the
/// ledger (they run under the ledger's lock).
pub type Predicate = Arc<dyn Fn(&Message) -> bool + Send + Sync>;

/// The default predicate for a counter: matches messages whose `kind`
/// equals the counter's name.
fn kind_predicate(name: &str) -> Predicate {
    let kind = name.to_owned();
    Arc::new(move |message: &Message| message.kind == kind)
}

/// One named tally: the running count, the predicate routing events into
/// it, and the resolver behind the current settlement channel.
struct Counter {
    count: i64,
    predicate: Predicate,
    resolver: Resolver,
}

impl Counter {
    fn new(predicate: Predicate) -> Self {
        Self {
            count: 0,
            predicate,
            resolver: Resolver::settled(),
        }
    }

    /// Applies a delta to the count, adjusting the settlement channel on
    /// zero crossings: leaving zero replaces the channel with a pending one,
    /// returning to zero fulfils the current channel in place. Transitions
    /// between two nonzero values keep the channel untouched.
    fn apply(&mut self, delta: i64) {
        let before = self.count;
        self.count = before + delta;
        if before == 0 && self.count != 0 {
            self.resolver = Resolver::pending();
        } else if before != 0 && self.count == 0 {
            self.resolver.resolve();
        }
    }
}

struct LedgerInner {
    counters: Mutex<HashMap<String, Counter>>,
    attached: AtomicBool,
}

impl LedgerInner {
    /// Routes one event payload: every counter whose predicate matches the
    /// message takes the delta. Counter visiting order is unspecified.
    fn route(&self, payload: &Message, delta: i64) {
        let mut counters = self.counters.lock();
        for (name, counter) in counters.iter_mut() {
            if (counter.predicate)(payload) {
                counter.apply(delta);
                if counter.count == 0 {
                    trace!("counter \"{name}\" settled after {delta:+}");
                } else {
                    trace!("counter \"{name}\" now {} after {delta:+}", counter.count);
                }
            }
        }
    }
}

/// A set of named counters fed by message add/remove events.
///
/// Cloning is cheap and hands out another handle to the same counters; all
/// operations take `&self`, and a single coarse mutex guards the counter
/// map, so a ledger can be shared freely across tasks and threads.
///
/// ```rust,ignore
/// let ledger = Ledger::new();
/// ledger.attach(&scope);
/// let clear = ledger.declare_with("blocking", |m| m.blocking, 0);
/// clear.wait().await;
/// ```
#[derive(Clone)]
pub struct Ledger {
    inner: Arc<LedgerInner>,
}

impl Ledger {
    /// Creates an empty ledger.
    ///
    /// Counters appear on first declaration; events only move counters once
    /// the ledger is attached to a source.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(LedgerInner {
                counters: Mutex::new(HashMap::new()),
                attached: AtomicBool::new(false),
            }),
        }
    }

    /// Subscribes the ledger to a message event source.
    ///
    /// Registers deep listeners for added and removed message events, so a
    /// message entering anywhere at or below the source's scope counts `+1`
    /// and a message leaving counts `-1` on every counter whose predicate
    /// matches it.
    ///
    /// Attaching a ledger more than once makes every attachment count events
    /// independently (a single event then moves matching counters once per
    /// attachment). That is never intended, so a repeat call warns, but it
    /// still subscribes.
    pub fn attach<S>(&self, source: &S)
    where
        S: MessageEventSource + ?Sized,
    {
        if self.inner.attached.swap(true, Ordering::Relaxed) {
            warn!("ledger attached more than once; every attachment counts events independently");
        } else {
            debug!("ledger attached to event source");
        }
        let inner = Arc::clone(&self.inner);
        source.subscribe(
            MessageEventKind::Added,
            PropagationScope::Deep,
            Box::new(move |event: &MessageEvent| inner.route(&event.payload, 1)),
        );
        let inner = Arc::clone(&self.inner);
        source.subscribe(
            MessageEventKind::Removed,
            PropagationScope::Deep,
            Box::new(move |event: &MessageEvent| inner.route(&event.payload, -1)),
        );
    }

    /// Declares (or re-declares) a counter with the default predicate,
    /// which matches messages whose `kind` equals the counter name.
    ///
    /// Same semantics as [`Ledger::declare_with`] otherwise; re-declaring
    /// through this method installs the default predicate.
    pub fn declare(&self, name: &str, initial: i64) -> Settlement {
        self.declare_counter(name, kind_predicate(name), initial)
    }

    /// Declares (or re-declares) a counter with a custom predicate and
    /// returns its current settlement handle.
    ///
    /// For a new name the counter starts at `initial`: the returned handle
    /// is already fulfilled when `initial` is zero and pending otherwise.
    /// For an existing name the predicate is replaced and `initial` is
    /// applied as a *delta* to the running count. Declaring is additive,
    /// never a reset.
    pub fn declare_with<P>(&self, name: &str, predicate: P, initial: i64) -> Settlement
    where
        P: Fn(&Message) -> bool + Send + Sync + 'static,
    {
        self.declare_counter(name, Arc::new(predicate), initial)
    }

    fn declare_counter(&self, name: &str, predicate: Predicate, initial: i64) -> Settlement {
        let mut counters = self.inner.counters.lock();
        match counters.entry(name.to_owned()) {
            Entry::Occupied(mut occupied) => {
                debug!("redeclared counter \"{name}\", applying {initial:+} to its count");
                let counter = occupied.get_mut();
                counter.predicate = predicate;
                counter.apply(initial);
                counter.resolver.handle()
            }
            Entry::Vacant(vacant) => {
                debug!("declared counter \"{name}\" at {initial}");
                let counter = vacant.insert(Counter::new(predicate));
                counter.apply(initial);
                counter.resolver.handle()
            }
        }
    }

    /// The current settlement handle for `name`.
    ///
    /// A counter that was never declared is trivially settled: the handle
    /// comes back already fulfilled, and no counter is created.
    pub fn settled(&self, name: &str) -> Settlement {
        let counters = self.inner.counters.lock();
        match counters.get(name) {
            Some(counter) => counter.resolver.handle(),
            None => Settlement::ready(),
        }
    }

    /// The current count for `name`, or 0 if it was never declared.
    pub fn value(&self, name: &str) -> i64 {
        let counters = self.inner.counters.lock();
        counters.get(name).map_or(0, |counter| counter.count)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counters = self.inner.counters.lock();
        f.debug_map()
            .entries(counters.iter().map(|(name, counter)| (name, counter.count)))
            .finish()
    }
}
