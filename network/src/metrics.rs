//! Counters reported by nodes, links and forwarding planes.
//!
//! Every component starts with unregistered counters. Call `register` with a (sub-)registry
//! to expose them, for example one labeled with the node address:
//!
//! ```rust
//! use netsim::metrics;
//! use prometheus_client::registry::Registry;
//!
//! let mut registry = Registry::default();
//! let host = metrics::Host::default();
//! host.register(registry.sub_registry_with_label(("node".into(), "H1".into())));
//! ```

use prometheus_client::{metrics::counter::Counter, registry::Registry};

/// Metrics for a [Host](crate::host::Host).
#[derive(Clone, Default)]
pub struct Host {
    /// Number of units taken from the inbound queue
    pub received: Counter,
    /// Number of reassembled messages handed to the application
    pub delivered: Counter,
    /// Number of fragments placed on the outbound queue
    pub sent: Counter,
    /// Number of fragments dropped because the outbound queue was full
    pub dropped: Counter,
    /// Number of units discarded because they could not be decoded
    pub malformed: Counter,
}

impl Host {
    pub fn register(&self, registry: &mut Registry) {
        registry.register(
            "received",
            "Number of units taken from the inbound queue",
            self.received.clone(),
        );
        registry.register(
            "delivered",
            "Number of reassembled messages handed to the application",
            self.delivered.clone(),
        );
        registry.register(
            "sent",
            "Number of fragments placed on the outbound queue",
            self.sent.clone(),
        );
        registry.register(
            "dropped",
            "Number of fragments dropped because the outbound queue was full",
            self.dropped.clone(),
        );
        registry.register(
            "malformed",
            "Number of units discarded because they could not be decoded",
            self.malformed.clone(),
        );
    }
}

/// Metrics for a [Router](crate::router::Router).
#[derive(Clone, Default)]
pub struct Router {
    /// Number of units taken from inbound queues
    pub received: Counter,
    /// Number of frames placed on outbound queues
    pub forwarded: Counter,
    /// Number of frames dropped because an outbound queue was full
    pub dropped: Counter,
    /// Number of units discarded because they could not be decoded
    pub malformed: Counter,
}

impl Router {
    pub fn register(&self, registry: &mut Registry) {
        registry.register(
            "received",
            "Number of units taken from inbound queues",
            self.received.clone(),
        );
        registry.register(
            "forwarded",
            "Number of frames placed on outbound queues",
            self.forwarded.clone(),
        );
        registry.register(
            "dropped",
            "Number of frames dropped because an outbound queue was full",
            self.dropped.clone(),
        );
        registry.register(
            "malformed",
            "Number of units discarded because they could not be decoded",
            self.malformed.clone(),
        );
    }
}

/// Metrics for a [DistanceVector](crate::router::DistanceVector) plane.
#[derive(Clone, Default)]
pub struct DistanceVector {
    /// Number of advertisements generated
    pub advertisements: Counter,
    /// Number of received advertisements that changed the routing table
    pub route_changes: Counter,
}

impl DistanceVector {
    pub fn register(&self, registry: &mut Registry) {
        registry.register(
            "advertisements",
            "Number of advertisements generated",
            self.advertisements.clone(),
        );
        registry.register(
            "route_changes",
            "Number of received advertisements that changed the routing table",
            self.route_changes.clone(),
        );
    }
}

/// Metrics for a [Link](crate::link::Link).
#[derive(Clone, Default)]
pub struct Link {
    /// Number of units delivered to the peer inbound queue
    pub transferred: Counter,
    /// Number of units dropped because the peer inbound queue was full
    pub dropped: Counter,
    /// Number of bits serialized onto the link
    pub bits: Counter,
}

impl Link {
    pub fn register(&self, registry: &mut Registry) {
        registry.register(
            "transferred",
            "Number of units delivered to the peer inbound queue",
            self.transferred.clone(),
        );
        registry.register(
            "dropped",
            "Number of units dropped because the peer inbound queue was full",
            self.dropped.clone(),
        );
        registry.register(
            "bits",
            "Number of bits serialized onto the link",
            self.bits.clone(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus_client::encoding::text::encode;

    #[test]
    fn test_register_labeled() {
        let mut registry = Registry::default();
        let router = Router::default();
        router.register(registry.sub_registry_with_label(("node".into(), "RA".into())));
        router.forwarded.inc();
        router.forwarded.inc();
        router.dropped.inc();

        let mut buffer = String::new();
        encode(&mut buffer, &registry).unwrap();
        assert!(buffer.contains("forwarded_total{node=\"RA\"} 2"));
        assert!(buffer.contains("dropped_total{node=\"RA\"} 1"));
        assert!(buffer.contains("malformed_total{node=\"RA\"} 0"));
    }
}
