//! Routers: decode arrivals and forward them according to a pluggable [Plane].
//!
//! A [Router] owns its interfaces and metrics; the forwarding decision is delegated to one of:
//!
//! - [StaticTable]: fixed routes keyed by inbound interface or destination.
//! - [DistanceVector]: routes learned from neighbor advertisements.
//! - [LabelSwitching]: MPLS push, swap and pop.

use crate::{
    interface::{Full, Interface},
    metrics,
    node::{discard_malformed, Node},
    Error,
};
use futures::future::select_all;
use netsim_codec::{Address, DecodeExt, EncodeExt, LinkFrame};
use serde::{Deserialize, Serialize};
use std::{future::Future, sync::Arc};
use tracing::{debug, trace, warn};

pub mod distance_vector;
pub use distance_vector::{CostTable, DistanceVector, Neighbor, NeighborKind, RoutingTable};
pub mod mpls;
pub use mpls::{LabelEntry, LabelSwitching};
pub mod static_table;
pub use static_table::StaticTable;

/// A frame to place on the outbound queue of an interface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Forward {
    pub interface: usize,
    pub frame: LinkFrame,
}

/// Decides where the frames received by a [Router] go.
pub trait Plane: Send + 'static {
    /// Outbound interfaces referenced by the plane's tables.
    fn interfaces(&self) -> Vec<usize>;

    /// Frames to send once the router starts.
    fn on_startup(&mut self) -> Result<Vec<Forward>, Error> {
        Ok(Vec::new())
    }

    /// Handle a frame received on `interface`.
    ///
    /// Returning an empty list consumes the frame. Errors for which
    /// [Error::is_malformed] holds discard the frame; any other error is fatal to the router.
    fn decide(&mut self, interface: usize, frame: LinkFrame) -> Result<Vec<Forward>, Error>;
}

/// Configuration for a [Router].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Address of the router.
    pub name: Address,

    /// Number of interfaces (numbered from 0).
    pub interfaces: usize,

    /// Bound of every interface queue (0 means unbounded).
    #[serde(default)]
    pub queue_size: usize,
}

/// A node with one or more interfaces that forwards frames between them.
pub struct Router<P: Plane> {
    name: Address,
    interfaces: Vec<Arc<Interface>>,
    plane: P,
    metrics: metrics::Router,
}

impl<P: Plane> Router<P> {
    /// Create a router, checking that every interface `plane` forwards to exists.
    pub fn new(cfg: Config, plane: P) -> Result<Self, Error> {
        if cfg.interfaces == 0 {
            return Err(Error::NoInterfaces);
        }
        if let Some(missing) = plane
            .interfaces()
            .into_iter()
            .find(|index| *index >= cfg.interfaces)
        {
            return Err(Error::InvalidInterface(missing));
        }
        let interfaces = (0..cfg.interfaces)
            .map(|index| Interface::new(cfg.name, index, cfg.queue_size))
            .collect();
        Ok(Self {
            name: cfg.name,
            interfaces,
            plane,
            metrics: metrics::Router::default(),
        })
    }

    /// Interface `index`, to connect a [Link](crate::link::Link) to.
    pub fn interface(&self, index: usize) -> Option<&Arc<Interface>> {
        self.interfaces.get(index)
    }

    pub fn plane(&self) -> &P {
        &self.plane
    }

    pub fn metrics(&self) -> &metrics::Router {
        &self.metrics
    }

    fn dispatch(&self, inbound: Option<usize>, forwards: Vec<Forward>) -> Result<(), Error> {
        for Forward { interface, frame } in forwards {
            let outbound = self
                .interfaces
                .get(interface)
                .ok_or(Error::InvalidInterface(interface))?;
            let kind = frame.kind;
            match outbound.outbound().try_put(frame.encode()) {
                Ok(()) => {
                    self.metrics.forwarded.inc();
                    trace!(node = %self.name, ?inbound, outbound = interface, %kind, "forwarded frame");
                }
                Err(Full(_)) => {
                    self.metrics.dropped.inc();
                    warn!(node = %self.name, ?inbound, outbound = interface, %kind, "dropping frame: outbound queue full");
                }
            }
        }
        Ok(())
    }

    fn process(&mut self, interface: usize, raw: bytes::Bytes) -> Result<(), Error> {
        let frame = LinkFrame::decode(raw)?;
        let forwards = self.plane.decide(interface, frame)?;
        self.dispatch(Some(interface), forwards)
    }
}

impl<P: Plane> Node for Router<P> {
    fn address(&self) -> Address {
        self.name
    }

    fn on_startup(&mut self) -> Result<(), Error> {
        let forwards = self.plane.on_startup()?;
        debug!(node = %self.name, frames = forwards.len(), "started");
        self.dispatch(None, forwards)
    }

    fn poll_once(&mut self) -> Result<bool, Error> {
        let mut progress = false;
        for index in 0..self.interfaces.len() {
            let Some(raw) = self.interfaces[index].inbound().get() else {
                continue;
            };
            progress = true;
            self.metrics.received.inc();
            let result = self.process(index, raw);
            discard_malformed(result, self.name, index, &self.metrics.malformed)?;
        }
        Ok(progress)
    }

    fn readable(&self) -> impl Future<Output = ()> + Send + '_ {
        let waiters = self
            .interfaces
            .iter()
            .map(|interface| Box::pin(interface.inbound().readable()));
        async move {
            select_all(waiters).await;
        }
    }
}
