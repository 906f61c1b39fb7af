//! Link-layer envelopes and MPLS frames.

use crate::{
    fixed, Encode, EncodeSize, Error, HeaderLayout, Label, NetworkPacket, Read, Write,
    LABEL_LENGTH,
};
use bytes::{Buf, BufMut, Bytes};
use std::fmt;

/// Which codec the payload of a [LinkFrame] must be decoded with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// Payload is a [NetworkPacket] (tag `N`).
    Network,
    /// Payload is an [MplsFrame] (tag `M`).
    Mpls,
}

impl FrameKind {
    fn tag(self) -> u8 {
        match self {
            FrameKind::Network => b'N',
            FrameKind::Mpls => b'M',
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameKind::Network => f.write_str("network"),
            FrameKind::Mpls => f.write_str("mpls"),
        }
    }
}

/// The unit carried by links: `kind(1) | payload`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkFrame {
    pub kind: FrameKind,
    pub payload: Bytes,
}

impl LinkFrame {
    /// Wrap a network packet encoded with `layout`.
    pub fn network(packet: &NetworkPacket, layout: HeaderLayout) -> Self {
        Self {
            kind: FrameKind::Network,
            payload: packet.encode_cfg(layout),
        }
    }

    /// Wrap an MPLS frame.
    pub fn mpls(frame: &MplsFrame) -> Self {
        Self {
            kind: FrameKind::Mpls,
            payload: frame.encode_cfg(()),
        }
    }
}

impl Write for LinkFrame {
    fn write_cfg(&self, buf: &mut impl BufMut, _: ()) {
        buf.put_u8(self.kind.tag());
        buf.put_slice(&self.payload);
    }
}

impl EncodeSize for LinkFrame {
    fn encode_size_cfg(&self, _: ()) -> usize {
        1 + self.payload.len()
    }
}

impl Read for LinkFrame {
    fn read_cfg(buf: &mut impl Buf, _: ()) -> Result<Self, Error> {
        let [tag] = fixed::take::<1>(buf, "kind")?;
        let kind = match tag {
            b'N' => FrameKind::Network,
            b'M' => FrameKind::Mpls,
            other => return Err(Error::UnknownFrameKind(other as char)),
        };
        let payload = buf.copy_to_bytes(buf.remaining());
        Ok(Self { kind, payload })
    }
}

/// A label-switched frame: `label(2) | payload`.
///
/// The payload is an encoded [NetworkPacket].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MplsFrame {
    pub label: Label,
    pub payload: Bytes,
}

impl fmt::Display for MplsFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "label={} len={}", self.label, self.payload.len())
    }
}

impl Write for MplsFrame {
    fn write_cfg(&self, buf: &mut impl BufMut, _: ()) {
        buf.put_slice(self.label.as_bytes());
        buf.put_slice(&self.payload);
    }
}

impl EncodeSize for MplsFrame {
    fn encode_size_cfg(&self, _: ()) -> usize {
        LABEL_LENGTH + self.payload.len()
    }
}

impl Read for MplsFrame {
    fn read_cfg(buf: &mut impl Buf, _: ()) -> Result<Self, Error> {
        let label = Label::from_wire(fixed::take(buf, "label")?)?;
        let payload = buf.copy_to_bytes(buf.remaining());
        Ok(Self { label, payload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Address, DecodeExt, EncodeExt};

    #[test]
    fn test_network_frame() {
        let packet = NetworkPacket::data(
            Address::new("H3").unwrap(),
            Address::new("H1").unwrap(),
            Bytes::from_static(b"hello"),
        );
        let frame = LinkFrame::network(&packet, HeaderLayout::Full);
        let encoded = frame.encode();
        assert_eq!(&encoded[..], b"N000H3000H110hello");
        let decoded = LinkFrame::decode(encoded).unwrap();
        assert_eq!(decoded.kind, FrameKind::Network);
        assert_eq!(decoded, frame);
    }

    #[test]
    fn test_mpls_frame() {
        let frame = MplsFrame {
            label: Label::new("RB").unwrap(),
            payload: Bytes::from_static(b"000H3000H110hello"),
        };
        let link = LinkFrame::mpls(&frame);
        let encoded = link.encode();
        assert_eq!(&encoded[..], b"MRB000H3000H110hello");
        let decoded = LinkFrame::decode(encoded).unwrap();
        assert_eq!(decoded.kind, FrameKind::Mpls);
        assert_eq!(MplsFrame::decode(decoded.payload).unwrap(), frame);
    }

    #[test]
    fn test_unknown_kind() {
        let err = LinkFrame::decode(&b"Xpayload"[..]).unwrap_err();
        assert_eq!(err, Error::UnknownFrameKind('X'));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_empty_frame() {
        assert!(matches!(
            LinkFrame::decode(&b""[..]),
            Err(Error::EndOfBuffer("kind", 1, 0))
        ));
        assert!(matches!(
            MplsFrame::decode(&b"R"[..]),
            Err(Error::EndOfBuffer("label", 2, 1))
        ));
    }
}
