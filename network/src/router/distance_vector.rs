//! Routing with a distributed distance-vector protocol.
//!
//! # Protocol
//!
//! Every router starts with a [RoutingTable] holding one entry per direct neighbor
//! (`table[neighbor] = {self: cost}`) and advertises it to its router neighbors. When an
//! advertisement arrives from neighbor `n` over a link of cost `c`, every destination `d`
//! it lists (other than this router) yields the candidate `min(T[d]) + c` through `n`. The
//! candidate is installed when there is no entry for `d` through `n` yet or when it is strictly
//! lower than that entry. If anything changed, the full table is re-advertised.
//!
//! Data packets for `d` leave through the next hop with the lowest cost (ties go to the
//! smallest address). A next hop equal to this router means `d` is a direct neighbor.
//!
//! # Limitations
//!
//! There is no split horizon or poison reverse, and an entry is only ever lowered. On a static
//! topology routes converge to shortest paths, but cost increases and link removals are never
//! reflected.

use super::{Forward, Plane};
use crate::{metrics, Error};
use netsim_codec::{
    Address, Advertisement, Cost, Decode, DecodeExt, FrameKind, HeaderLayout,
    LinkFrame, NetworkPacket, Protocol, Routes,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Advertisements carry a source, so distance-vector networks use the full header.
const LAYOUT: HeaderLayout = HeaderLayout::Full;

/// Whether a neighbor takes part in route advertisement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborKind {
    Router,
    Host,
}

/// A directly connected node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Interface the neighbor is reached through.
    pub interface: usize,
    /// Cost of the link to the neighbor.
    pub cost: Cost,
    pub kind: NeighborKind,
}

/// Direct neighbors of a router, fixed at construction.
pub type CostTable = BTreeMap<Address, Neighbor>;

/// Known paths: destination -> (next hop -> cost).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutingTable {
    me: Address,
    routes: Routes,
}

impl RoutingTable {
    /// Seed a table with one entry per direct neighbor.
    pub fn new(me: Address, costs: &CostTable) -> Self {
        let routes = costs
            .iter()
            .map(|(neighbor, link)| (*neighbor, BTreeMap::from([(me, link.cost)])))
            .collect();
        Self { me, routes }
    }

    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    /// Cost of reaching `destination` through `next_hop`, if known.
    pub fn cost(&self, destination: &Address, next_hop: &Address) -> Option<Cost> {
        self.routes.get(destination)?.get(next_hop).copied()
    }

    /// Cheapest `(next hop, cost)` towards `destination`.
    pub fn best(&self, destination: &Address) -> Option<(Address, Cost)> {
        self.routes
            .get(destination)?
            .iter()
            .min_by_key(|(next_hop, cost)| (**cost, **next_hop))
            .map(|(next_hop, cost)| (*next_hop, *cost))
    }

    /// Merge the table advertised by `neighbor`, reached over a link of cost `link_cost`.
    ///
    /// Returns whether any entry changed.
    pub fn merge(&mut self, neighbor: Address, link_cost: Cost, advertised: &Routes) -> bool {
        let mut changed = false;
        for (destination, hops) in advertised {
            if *destination == self.me {
                continue;
            }
            let Some(best) = hops.values().min() else {
                continue;
            };
            let candidate = best.saturating_add(link_cost);
            let entry = self.routes.entry(*destination).or_default();
            match entry.get(&neighbor) {
                Some(current) if *current <= candidate => {}
                _ => {
                    entry.insert(neighbor, candidate);
                    changed = true;
                }
            }
        }
        changed
    }

    /// The table as sent to neighbors.
    pub fn advertisement(&self) -> Advertisement {
        Advertisement::new(self.routes.clone())
    }
}

/// A forwarding plane that learns routes from its neighbors.
pub struct DistanceVector {
    name: Address,
    costs: CostTable,
    table: RoutingTable,
    metrics: metrics::DistanceVector,
}

impl DistanceVector {
    pub fn new(name: Address, costs: CostTable) -> Self {
        let table = RoutingTable::new(name, &costs);
        Self {
            name,
            costs,
            table,
            metrics: metrics::DistanceVector::default(),
        }
    }

    pub fn table(&self) -> &RoutingTable {
        &self.table
    }

    pub fn costs(&self) -> &CostTable {
        &self.costs
    }

    pub fn metrics(&self) -> &metrics::DistanceVector {
        &self.metrics
    }

    /// Interface that leads to `destination`.
    pub fn next_interface(&self, destination: &Address) -> Result<usize, Error> {
        let (next_hop, _) = self
            .table
            .best(destination)
            .ok_or(Error::UnresolvedDestination(*destination))?;
        let neighbor = if next_hop == self.name {
            destination
        } else {
            &next_hop
        };
        self.costs
            .get(neighbor)
            .map(|neighbor| neighbor.interface)
            .ok_or(Error::UnresolvedDestination(*destination))
    }

    /// Control frames carrying the current table to every router neighbor.
    fn advertise(&self) -> Result<Vec<Forward>, Error> {
        let payload = self.table.advertisement().to_json()?;
        let forwards: Vec<Forward> = self
            .costs
            .iter()
            .filter(|(_, neighbor)| neighbor.kind == NeighborKind::Router)
            .map(|(address, neighbor)| {
                let packet = NetworkPacket::control(*address, self.name, payload.clone());
                Forward {
                    interface: neighbor.interface,
                    frame: LinkFrame::network(&packet, LAYOUT),
                }
            })
            .collect();
        self.metrics.advertisements.inc();
        debug!(node = %self.name, neighbors = forwards.len(), "advertising routes");
        Ok(forwards)
    }
}

impl Plane for DistanceVector {
    fn interfaces(&self) -> Vec<usize> {
        self.costs.values().map(|neighbor| neighbor.interface).collect()
    }

    fn on_startup(&mut self) -> Result<Vec<Forward>, Error> {
        self.advertise()
    }

    fn decide(&mut self, interface: usize, frame: LinkFrame) -> Result<Vec<Forward>, Error> {
        if frame.kind != FrameKind::Network {
            return Err(Error::UnexpectedFrame(frame.kind));
        }
        let packet = NetworkPacket::decode_cfg(frame.payload, LAYOUT)?;
        match packet.protocol {
            Protocol::Data => {
                let outbound = self.next_interface(&packet.destination)?;
                trace!(node = %self.name, inbound = interface, outbound, %packet, "routing packet");
                Ok(vec![Forward {
                    interface: outbound,
                    frame: LinkFrame::network(&packet, LAYOUT),
                }])
            }
            Protocol::Control => {
                let neighbor = *self
                    .costs
                    .get(&packet.source)
                    .ok_or(Error::UnknownNeighbor(packet.source))?;
                let advertisement = Advertisement::decode(packet.payload)?;
                if !self
                    .table
                    .merge(packet.source, neighbor.cost, &advertisement.routes)
                {
                    trace!(node = %self.name, from = %packet.source, "routing table unchanged");
                    return Ok(Vec::new());
                }
                self.metrics.route_changes.inc();
                debug!(node = %self.name, from = %packet.source, "routing table updated");
                self.advertise()
            }
        }
    }
}
