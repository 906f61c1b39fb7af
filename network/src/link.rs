//! Bandwidth-limited links between two interfaces.

use crate::{interface::Interface, metrics, signal::Signal, Error};
use serde::{Deserialize, Serialize};
use std::{
    sync::{Arc, Weak},
    time::Duration,
};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, trace, warn};

/// Configuration for a [Link].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Bits per second the link can serialize (shared by both directions).
    pub capacity: u64,
}

/// Outcome of a single [Link::tick].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// A unit was taken from an outbound queue (delivered or dropped).
    Transferred,
    /// The link is still serializing the previous unit until the given instant.
    Busy(Instant),
    /// Neither outbound queue holds a unit.
    Idle,
    /// One of the interfaces no longer exists.
    Closed,
}

/// Moves units between two interfaces, one at a time, at a bounded rate.
///
/// The link does not own the interfaces it connects (they belong to their nodes) and stops
/// once either is dropped.
pub struct Link {
    capacity: u64,
    a: Weak<Interface>,
    b: Weak<Interface>,

    /// Earliest instant the next unit may be transmitted
    next_available: Instant,
    /// Whether the next tick services `a -> b` first
    a_first: bool,

    metrics: metrics::Link,
}

impl Link {
    /// Connect two interfaces.
    pub fn new(cfg: Config, a: &Arc<Interface>, b: &Arc<Interface>) -> Result<Self, Error> {
        if a.owner() == b.owner() {
            return Err(Error::LinkingSelf(a.owner()));
        }
        if cfg.capacity == 0 {
            return Err(Error::InvalidCapacity);
        }
        Ok(Self {
            capacity: cfg.capacity,
            a: Arc::downgrade(a),
            b: Arc::downgrade(b),
            next_available: Instant::now(),
            a_first: true,
            metrics: metrics::Link::default(),
        })
    }

    pub fn metrics(&self) -> &metrics::Link {
        &self.metrics
    }

    /// Time needed to serialize `len` bytes, rounded up to the next nanosecond.
    pub fn serialization_delay(&self, len: usize) -> Duration {
        let bits = len as u128 * 8;
        let nanos = (bits * 1_000_000_000).div_ceil(self.capacity as u128);
        Duration::from_nanos(nanos.min(u64::MAX as u128) as u64)
    }

    /// Move at most one unit, if the link is free at `now`.
    ///
    /// Directions alternate between ticks that find both sides with queued data.
    pub fn tick(&mut self, now: Instant) -> Tick {
        let (Some(a), Some(b)) = (self.a.upgrade(), self.b.upgrade()) else {
            return Tick::Closed;
        };
        if now < self.next_available {
            return Tick::Busy(self.next_available);
        }

        let order = if self.a_first {
            [(&a, &b), (&b, &a)]
        } else {
            [(&b, &a), (&a, &b)]
        };
        for (from, to) in order {
            let Some(unit) = from.outbound().get() else {
                continue;
            };
            self.a_first = Arc::ptr_eq(from, &b);

            let len = unit.len();
            self.next_available = now + self.serialization_delay(len);
            self.metrics.bits.inc_by(len as u64 * 8);
            match to.inbound().try_put(unit) {
                Ok(()) => {
                    self.metrics.transferred.inc();
                    trace!(from = %from, to = %to, len, "transferred unit");
                }
                Err(_) => {
                    self.metrics.dropped.inc();
                    warn!(from = %from, to = %to, len, "dropping unit: inbound queue full");
                }
            }
            return Tick::Transferred;
        }
        Tick::Idle
    }

    /// Carry units until `stop` resolves or an interface is dropped.
    ///
    /// Returns the link so its metrics can be inspected.
    pub async fn run(mut self, mut stop: Signal) -> Self {
        let reason = loop {
            if let Some(reason) = stop.reason() {
                break Some(reason);
            }
            match self.tick(Instant::now()) {
                Tick::Transferred => {}
                Tick::Busy(until) => {
                    tokio::select! {
                        reason = stop.wait() => break Some(reason),
                        _ = sleep_until(until) => {},
                    }
                }
                Tick::Idle => {
                    let (Some(a), Some(b)) = (self.a.upgrade(), self.b.upgrade()) else {
                        break None;
                    };
                    tokio::select! {
                        reason = stop.wait() => break Some(reason),
                        _ = a.outbound().readable() => {},
                        _ = b.outbound().readable() => {},
                    }
                }
                Tick::Closed => break None,
            }
        };
        match reason {
            Some(reason) => debug!(?reason, "link stopped"),
            None => debug!("interface dropped, closing link"),
        }
        self
    }
}
