//! Forwarding with a table fixed at construction.

use super::{Forward, Plane};
use crate::Error;
use netsim_codec::{Address, Decode, FrameKind, HeaderLayout, LinkFrame, NetworkPacket};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;

/// Routes keyed by inbound interface or by destination address.
///
/// An inbound-interface entry takes precedence over a destination entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticTable {
    /// Header layout of the packets being forwarded.
    #[serde(default)]
    pub layout: HeaderLayout,

    /// Inbound interface -> outbound interface.
    #[serde(default)]
    pub by_interface: BTreeMap<usize, usize>,

    /// Destination -> outbound interface.
    #[serde(default)]
    pub by_destination: BTreeMap<Address, usize>,
}

impl StaticTable {
    pub fn new(layout: HeaderLayout) -> Self {
        Self {
            layout,
            ..Default::default()
        }
    }

    /// Forward everything arriving on `inbound` out of `outbound`.
    pub fn route_interface(mut self, inbound: usize, outbound: usize) -> Self {
        self.by_interface.insert(inbound, outbound);
        self
    }

    /// Forward packets for `destination` out of `outbound`.
    pub fn route_destination(mut self, destination: Address, outbound: usize) -> Self {
        self.by_destination.insert(destination, outbound);
        self
    }

    /// Outbound interface for a packet to `destination` arriving on `inbound`.
    pub fn lookup(&self, inbound: usize, destination: Address) -> Result<usize, Error> {
        self.by_interface
            .get(&inbound)
            .or_else(|| self.by_destination.get(&destination))
            .copied()
            .ok_or(Error::UnresolvedDestination(destination))
    }
}

impl Plane for StaticTable {
    fn interfaces(&self) -> Vec<usize> {
        self.by_interface
            .values()
            .chain(self.by_destination.values())
            .copied()
            .collect()
    }

    fn decide(&mut self, interface: usize, frame: LinkFrame) -> Result<Vec<Forward>, Error> {
        if frame.kind != FrameKind::Network {
            return Err(Error::UnexpectedFrame(frame.kind));
        }
        let packet = NetworkPacket::decode_cfg(frame.payload, self.layout)?;
        let outbound = self.lookup(interface, packet.destination)?;
        trace!(inbound = interface, outbound, %packet, "routing packet");
        Ok(vec![Forward {
            interface: outbound,
            frame: LinkFrame::network(&packet, self.layout),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netsim_codec::{EncodeExt, Label, MplsFrame};

    fn address(name: &str) -> Address {
        Address::new(name).unwrap()
    }

    fn frame(destination: Address) -> LinkFrame {
        let packet = NetworkPacket::data(destination, Address::UNSPECIFIED, "hi".into());
        LinkFrame::network(&packet, HeaderLayout::Compact)
    }

    #[test]
    fn test_interface_takes_precedence() {
        let mut table = StaticTable::new(HeaderLayout::Compact)
            .route_interface(0, 2)
            .route_destination(Address::from(3), 1);
        let forwards = table.decide(0, frame(Address::from(3))).unwrap();
        assert_eq!(forwards[0].interface, 2);
        let forwards = table.decide(1, frame(Address::from(3))).unwrap();
        assert_eq!(forwards[0].interface, 1);
        assert_eq!(forwards[0].frame, frame(Address::from(3)));
    }

    #[test]
    fn test_unresolved() {
        let mut table =
            StaticTable::new(HeaderLayout::Compact).route_destination(Address::from(3), 1);
        assert!(matches!(
            table.decide(0, frame(Address::from(4))),
            Err(Error::UnresolvedDestination(destination)) if destination == Address::from(4)
        ));
    }

    #[test]
    fn test_rejects_mpls() {
        let mut table = StaticTable::new(HeaderLayout::Full).route_interface(0, 1);
        let mpls = LinkFrame::mpls(&MplsFrame {
            label: Label::new("AB").unwrap(),
            payload: frame(address("H2")).encode(),
        });
        assert!(matches!(
            table.decide(0, mpls),
            Err(Error::UnexpectedFrame(FrameKind::Mpls))
        ));
    }

    #[test]
    fn test_from_json() {
        let table: StaticTable = serde_json::from_str(
            r#"{"layout": "compact", "by_interface": {"0": 1}, "by_destination": {"H2": 1}}"#,
        )
        .unwrap();
        assert_eq!(table.layout, HeaderLayout::Compact);
        assert_eq!(table.lookup(0, address("H9")).unwrap(), 1);
        assert_eq!(table.lookup(5, address("H2")).unwrap(), 1);
        assert_eq!(table.interfaces(), [1, 1]);
    }
}
