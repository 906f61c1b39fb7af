//! Network-layer packets.

use crate::{fixed, Address, EncodeSize, Error, Read, Write, ADDRESS_LENGTH};
use bytes::{Buf, BufMut, Bytes};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper-layer protocol carried by a [NetworkPacket].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Application payload (tag `1`).
    Data,
    /// Routing advertisement (tag `2`).
    Control,
}

impl Protocol {
    fn digit(self) -> u8 {
        match self {
            Protocol::Data => 1,
            Protocol::Control => 2,
        }
    }

    fn from_digit(digit: u8) -> Result<Self, Error> {
        match digit {
            1 => Ok(Protocol::Data),
            2 => Ok(Protocol::Control),
            other => Err(Error::UnknownProtocolTag((b'0' + other) as char)),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Data => f.write_str("data"),
            Protocol::Control => f.write_str("control"),
        }
    }
}

/// Header layout used to encode and decode a [NetworkPacket].
///
/// All nodes of a simulated network must agree on the layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderLayout {
    /// `destination(5) | more_fragments(1)`.
    ///
    /// Packets decoded with this layout carry [Address::UNSPECIFIED] as source and
    /// [Protocol::Data] as protocol. Those fields are not written when encoding.
    Compact,

    /// `destination(5) | source(5) | protocol(1) | more_fragments(1)`.
    #[default]
    Full,
}

impl HeaderLayout {
    /// Number of header bytes preceding the payload.
    pub const fn header_len(self) -> usize {
        match self {
            HeaderLayout::Compact => ADDRESS_LENGTH + 1,
            HeaderLayout::Full => 2 * ADDRESS_LENGTH + 2,
        }
    }
}

/// A network-layer packet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkPacket {
    /// Address of the node the packet is for.
    pub destination: Address,
    /// Address of the node that created the packet.
    pub source: Address,
    /// Upper-layer protocol of the payload.
    pub protocol: Protocol,
    /// Whether more fragments of the same message follow.
    pub more_fragments: bool,
    /// Application or control bytes.
    pub payload: Bytes,
}

impl NetworkPacket {
    /// Create an unfragmented data packet.
    pub fn data(destination: Address, source: Address, payload: Bytes) -> Self {
        Self {
            destination,
            source,
            protocol: Protocol::Data,
            more_fragments: false,
            payload,
        }
    }

    /// Create a control packet.
    pub fn control(destination: Address, source: Address, payload: Bytes) -> Self {
        Self {
            destination,
            source,
            protocol: Protocol::Control,
            more_fragments: false,
            payload,
        }
    }
}

impl fmt::Display for NetworkPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}->{} {} more={} len={}",
            self.source,
            self.destination,
            self.protocol,
            self.more_fragments as u8,
            self.payload.len()
        )
    }
}

impl Write<HeaderLayout> for NetworkPacket {
    fn write_cfg(&self, buf: &mut impl BufMut, layout: HeaderLayout) {
        buf.put_slice(self.destination.as_bytes());
        if layout == HeaderLayout::Full {
            buf.put_slice(self.source.as_bytes());
            fixed::write_digit(buf, self.protocol.digit());
        }
        fixed::write_digit(buf, self.more_fragments as u8);
        buf.put_slice(&self.payload);
    }
}

impl EncodeSize<HeaderLayout> for NetworkPacket {
    fn encode_size_cfg(&self, layout: HeaderLayout) -> usize {
        layout.header_len() + self.payload.len()
    }
}

impl Read<HeaderLayout> for NetworkPacket {
    fn read_cfg(buf: &mut impl Buf, layout: HeaderLayout) -> Result<Self, Error> {
        let destination = Address::from_wire(fixed::take(buf, "destination")?)?;
        let (source, protocol) = match layout {
            HeaderLayout::Compact => (Address::UNSPECIFIED, Protocol::Data),
            HeaderLayout::Full => {
                let source = Address::from_wire(fixed::take(buf, "source")?)?;
                let protocol = Protocol::from_digit(fixed::read_digit(buf, "protocol")?)?;
                (source, protocol)
            }
        };
        let more_fragments = match fixed::read_digit(buf, "more_fragments")? {
            0 => false,
            1 => true,
            other => {
                return Err(Error::InvalidData(
                    "more_fragments",
                    format!("expected 0 or 1, found {other}"),
                ))
            }
        };
        let payload = buf.copy_to_bytes(buf.remaining());
        Ok(Self {
            destination,
            source,
            protocol,
            more_fragments,
            payload,
        })
    }
}
