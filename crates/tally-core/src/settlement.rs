//! Settlement signals: per-counter completion handles.
//!
//! Each counter owns a `Resolver` holding the sending half of a
//! `tokio::sync::watch` channel carrying one bool ("settled"). Handles
//! ([`Settlement`]) wrap receivers of that channel:
//!
//! - a counter sitting at zero holds a channel reading `true`;
//! - leaving zero replaces the whole channel with a fresh pending one, so
//!   handles minted earlier keep observing the old, already-fulfilled
//!   channel;
//! - returning to zero flips the current channel in place, waking every
//!   waiter without replacing the handle they hold.
//!
//! The channel is never flipped back to pending; pending states only ever
//! arrive as brand-new channels.

use tokio::sync::watch;

/// A completion handle for one counter.
///
/// Fulfilled exactly while the counter's count is zero; a counter that
/// leaves zero hands out a *new* handle for the new pending period, leaving
/// previously minted handles fulfilled.
///
/// Cloning is cheap; clones observe the same underlying channel.
#[derive(Clone, Debug)]
pub struct Settlement {
    pub(crate) rx: watch::Receiver<bool>,
}

impl Settlement {
    /// An already-fulfilled handle.
    ///
    /// Used for counters that were never declared (trivially settled) and
    /// anywhere else an immediately-complete signal is needed.
    pub fn ready() -> Self {
        let (_tx, rx) = watch::channel(true);
        Self { rx }
    }

    /// Whether the handle is currently fulfilled.
    pub fn is_settled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until the handle is fulfilled.
    ///
    /// Completes immediately if the handle already is. If the owning ledger
    /// is dropped while the counter is unsettled, this future never
    /// completes: a settlement that can no longer happen is not reported as
    /// having happened. Callers wanting an upper bound race this against a
    /// timer.
    pub async fn wait(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                // Resolver dropped while pending: this counter can never
                // settle now, so park instead of resolving spuriously.
                std::future::pending::<()>().await;
            }
        }
    }
}

/// The fulfilling side of a settlement channel.
///
/// One per counter; replaced wholesale on each zero-to-nonzero crossing and
/// resolved in place on each nonzero-to-zero crossing.
#[derive(Debug)]
pub(crate) struct Resolver {
    tx: watch::Sender<bool>,
}

impl Resolver {
    /// A resolver whose channel is still pending.
    pub(crate) fn pending() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// A resolver whose channel is already fulfilled.
    pub(crate) fn settled() -> Self {
        let (tx, _rx) = watch::channel(true);
        Self { tx }
    }

    /// Fulfil the current channel in place, waking every waiter.
    pub(crate) fn resolve(&self) {
        // send_replace rather than send: the value must stick even when no
        // receiver is outstanding, so handles minted later read `true`.
        self.tx.send_replace(true);
    }

    /// Mint a handle observing the current channel.
    pub(crate) fn handle(&self) -> Settlement {
        Settlement {
            rx: self.tx.subscribe(),
        }
    }
}
