//! Simulate hosts and routers exchanging packets over bandwidth-limited links.
//!
//! # Overview
//!
//! A simulated network is built from four pieces:
//!
//! - [interface::Interface]: a pair of bounded FIFO queues (inbound and outbound) owned by a node.
//! - [link::Link]: moves encoded units between the interfaces of two nodes, throttled by a
//!   capacity in bits per second.
//! - [host::Host]: fragments outgoing messages to fit an MTU and reassembles incoming ones.
//! - [router::Router]: decodes arrivals and hands them to a forwarding [router::Plane]:
//!   [router::StaticTable], [router::DistanceVector] or [router::LabelSwitching].
//!
//! Every node and link is driven by its own task ([node::run] and [link::Link::run]) until a
//! shared [signal::Signal] resolves. Only the interface queues are shared between tasks.
//!
//! # Errors
//!
//! Malformed units and full queues never stop a node: they are logged, counted and dropped.
//! Unknown protocol tags, unknown frame kinds and missing forwarding entries are fatal to the
//! node that observed them (its task returns [Error]) but never to the rest of the network.
//!
//! # Example
//!
//! ```rust
//! use netsim::{host, link::{self, Link}, node, signal::Stopper};
//! use netsim_codec::{Address, HeaderLayout};
//! use futures::StreamExt;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().start_paused(true).build().unwrap().block_on(async {
//! let layout = HeaderLayout::Full;
//! let (alice, _) = host::Host::new(host::Config {
//!     address: Address::new("H1").unwrap(),
//!     queue_size: 0,
//!     layout,
//! });
//! let (bob, mut deliveries) = host::Host::new(host::Config {
//!     address: Address::new("H2").unwrap(),
//!     queue_size: 0,
//!     layout,
//! });
//! let link = Link::new(link::Config { capacity: 1_000 }, alice.interface(), bob.interface()).unwrap();
//!
//! let stopper = Stopper::new();
//! let sender = alice.sender();
//! tokio::spawn(link.run(stopper.stopped()));
//! tokio::spawn(node::run(alice, stopper.stopped()));
//! tokio::spawn(node::run(bob, stopper.stopped()));
//!
//! sender.send(Address::new("H2").unwrap(), "hello", 50).unwrap();
//! let delivery = deliveries.next().await.unwrap();
//! assert_eq!(&delivery.message[..], b"hello");
//! stopper.stop().await;
//! # });
//! ```

use netsim_codec::{Address, FrameKind, Label};
use thiserror::Error;

pub mod assembler;
pub mod host;
pub mod interface;
pub mod link;
pub mod metrics;
pub mod node;
pub mod router;
pub mod signal;

#[cfg(test)]
mod telemetry;

/// Errors that can occur when configuring or running a simulated network.
#[derive(Debug, Error)]
pub enum Error {
    #[error("codec error: {0}")]
    Codec(#[from] netsim_codec::Error),
    #[error("no forwarding entry for destination {0}")]
    UnresolvedDestination(Address),
    #[error("no forwarding entry for label {0}")]
    UnresolvedLabel(Label),
    #[error("no encapsulation entry for source {0}")]
    UnresolvedSource(Address),
    #[error("control packet from unknown neighbor {0}")]
    UnknownNeighbor(Address),
    #[error("unexpected {0} frame")]
    UnexpectedFrame(FrameKind),
    #[error("interface {0} does not exist")]
    InvalidInterface(usize),
    #[error("node requires at least one interface")]
    NoInterfaces,
    #[error("mtu {mtu} leaves no room after the {header}-byte header")]
    MtuTooSmall { mtu: usize, header: usize },
    #[error("link capacity must be positive")]
    InvalidCapacity,
    #[error("not valid to link two interfaces of {0}")]
    LinkingSelf(Address),
}

impl Error {
    /// Returns true if the error only concerns the unit being processed (the unit is discarded
    /// and the node continues).
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::Codec(err) if !err.is_fatal())
    }
}
