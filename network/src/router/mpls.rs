//! MPLS-style label switching.

use super::{Forward, Plane};
use crate::Error;
use netsim_codec::{
    Address, Decode, DecodeExt, Encode, FrameKind, HeaderLayout, Label, LinkFrame, MplsFrame,
    NetworkPacket,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Packets switched by [LabelSwitching] always use the full header (ingress matches on the
/// source address).
const LAYOUT: HeaderLayout = HeaderLayout::Full;

/// What to do with a frame carrying a given label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEntry {
    /// Label to swap in, or `None` to pop the label and forward the inner packet.
    pub label: Option<Label>,
    /// Outbound interface.
    pub interface: usize,
}

/// Pushes, swaps and pops labels.
///
/// Network packets are encapsulated (ingress) with the label configured for their source and
/// then switched like any labeled frame.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSwitching {
    /// Source address -> label to push.
    #[serde(default)]
    pub encapsulation: BTreeMap<Address, Label>,

    /// Inbound label -> outbound label and interface.
    #[serde(default)]
    pub forwarding: BTreeMap<Label, LabelEntry>,
}

impl LabelSwitching {
    pub fn new(
        encapsulation: BTreeMap<Address, Label>,
        forwarding: BTreeMap<Label, LabelEntry>,
    ) -> Self {
        Self {
            encapsulation,
            forwarding,
        }
    }

    fn encapsulate(&self, packet: NetworkPacket) -> Result<MplsFrame, Error> {
        let label = *self
            .encapsulation
            .get(&packet.source)
            .ok_or(Error::UnresolvedSource(packet.source))?;
        debug!(%label, %packet, "encapsulating packet");
        Ok(MplsFrame {
            label,
            payload: packet.encode_cfg(LAYOUT),
        })
    }

    fn switch(&self, frame: MplsFrame) -> Result<Forward, Error> {
        let entry = self
            .forwarding
            .get(&frame.label)
            .ok_or(Error::UnresolvedLabel(frame.label))?;
        match entry.label {
            None => {
                // The payload must be a packet before it can leave the label-switched domain
                let packet = NetworkPacket::decode_cfg(frame.payload.clone(), LAYOUT)?;
                debug!(label = %frame.label, interface = entry.interface, %packet, "decapsulating packet");
                Ok(Forward {
                    interface: entry.interface,
                    frame: LinkFrame {
                        kind: FrameKind::Network,
                        payload: frame.payload,
                    },
                })
            }
            Some(label) => {
                trace!(inbound = %frame.label, outbound = %label, interface = entry.interface, "swapping label");
                Ok(Forward {
                    interface: entry.interface,
                    frame: LinkFrame::mpls(&MplsFrame {
                        label,
                        payload: frame.payload,
                    }),
                })
            }
        }
    }
}

impl Plane for LabelSwitching {
    fn interfaces(&self) -> Vec<usize> {
        self.forwarding.values().map(|entry| entry.interface).collect()
    }

    fn decide(&mut self, _interface: usize, frame: LinkFrame) -> Result<Vec<Forward>, Error> {
        let labeled = match frame.kind {
            FrameKind::Network => {
                let packet = NetworkPacket::decode_cfg(frame.payload, LAYOUT)?;
                self.encapsulate(packet)?
            }
            FrameKind::Mpls => MplsFrame::decode(frame.payload)?,
        };
        Ok(vec![self.switch(labeled)?])
    }
}
