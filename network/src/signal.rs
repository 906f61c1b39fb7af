//! Stopping every node and link of a simulation.
//!
//! A [Stopper] hands out [Signal]s. Each task checks its signal between units of work and exits
//! once the signal reports a [Reason]. [Stopper::stop] resolves only after every signal has
//! been dropped, that is, after every task holding one has returned.
//!
//! # Example
//!
//! ```rust
//! use netsim::signal::{Reason, Stopper};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let stopper = Stopper::new();
//! let mut signal = stopper.stopped();
//! let task = tokio::spawn(async move { signal.wait().await });
//! stopper.stop().await;
//! assert_eq!(task.await.unwrap(), Reason::Requested);
//! # });
//! ```

use tokio::sync::watch;

/// Why a [Signal] resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reason {
    /// [Stopper::stop] was called.
    Requested,
    /// The [Stopper] was dropped without stopping (the simulation was torn down).
    Abandoned,
}

/// Tells a node or link when to stop.
///
/// Cheap to clone. Every clone counts as a holder for [Stopper::stop].
#[derive(Clone, Debug)]
pub struct Signal {
    // None if the signal was created already resolved
    rx: Option<watch::Receiver<Option<Reason>>>,
}

impl Signal {
    /// A signal that has already resolved with [Reason::Requested].
    pub fn resolved() -> Self {
        Self { rx: None }
    }

    /// Returns the stop reason without waiting, if the signal has resolved.
    pub fn reason(&self) -> Option<Reason> {
        let Some(rx) = &self.rx else {
            return Some(Reason::Requested);
        };
        if let Some(reason) = *rx.borrow() {
            return Some(reason);
        }
        rx.has_changed().is_err().then_some(Reason::Abandoned)
    }

    /// Wait until the signal resolves.
    ///
    /// Cancel safe, and may be awaited again after it has returned.
    pub async fn wait(&mut self) -> Reason {
        let Some(rx) = &mut self.rx else {
            return Reason::Requested;
        };
        let reason = match rx.wait_for(Option::is_some).await {
            Ok(reason) => *reason,
            Err(_) => None,
        };
        reason.unwrap_or(Reason::Abandoned)
    }
}

/// Hands out [Signal]s and resolves them all at once.
#[derive(Debug)]
pub struct Stopper {
    tx: watch::Sender<Option<Reason>>,
}

impl Stopper {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// Get a signal to hand to a node or link.
    ///
    /// A signal taken after [Stopper::stop] is already resolved.
    pub fn stopped(&self) -> Signal {
        Signal {
            rx: Some(self.tx.subscribe()),
        }
    }

    /// Resolve every [Signal] with [Reason::Requested] and wait until all of them are dropped.
    ///
    /// May be called more than once.
    pub async fn stop(&self) {
        self.tx.send_replace(Some(Reason::Requested));
        self.tx.closed().await;
    }
}

impl Default for Stopper {
    fn default() -> Self {
        Self::new()
    }
}
