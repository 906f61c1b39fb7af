//! Split messages into MTU-sized fragments and put them back together.

use crate::Error;
use bytes::{Bytes, BytesMut};
use netsim_codec::{Address, HeaderLayout, NetworkPacket};

/// Split `message` into data packets whose encoded size (with `layout`) is at most `mtu`.
///
/// Every packet but the last has `more_fragments` set. An empty message yields a single empty
/// packet.
pub fn fragment(
    destination: Address,
    source: Address,
    message: Bytes,
    mtu: usize,
    layout: HeaderLayout,
) -> Result<Vec<NetworkPacket>, Error> {
    let header = layout.header_len();
    if mtu <= header {
        return Err(Error::MtuTooSmall { mtu, header });
    }
    let chunk = mtu - header;
    if message.len() <= chunk {
        return Ok(vec![NetworkPacket::data(destination, source, message)]);
    }

    let count = message.len().div_ceil(chunk);
    let packets = (0..count)
        .map(|i| {
            let start = i * chunk;
            let end = (start + chunk).min(message.len());
            let mut packet = NetworkPacket::data(destination, source, message.slice(start..end));
            packet.more_fragments = i + 1 < count;
            packet
        })
        .collect();
    Ok(packets)
}

/// Reassembles fragments into messages.
///
/// There is a single buffer: fragments of messages from different sources that arrive
/// interleaved are concatenated together.
#[derive(Debug, Default)]
pub struct Assembler {
    buffer: BytesMut,
}

impl Assembler {
    /// Append a fragment, returning the message it completes (if any).
    pub fn push(&mut self, packet: &NetworkPacket) -> Option<Bytes> {
        self.buffer.extend_from_slice(&packet.payload);
        if packet.more_fragments {
            return None;
        }
        Some(self.buffer.split().freeze())
    }

    /// Number of bytes buffered for an incomplete message.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netsim_codec::{Encode, EncodeSize};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn address(name: &str) -> Address {
        Address::new(name).unwrap()
    }

    #[test]
    fn test_compact_example() {
        let message = Bytes::from(vec![b'x'; 65]);
        let packets = fragment(
            Address::from(2),
            Address::UNSPECIFIED,
            message,
            30,
            HeaderLayout::Compact,
        )
        .unwrap();
        let flags: Vec<bool> = packets.iter().map(|p| p.more_fragments).collect();
        assert_eq!(flags, [true, true, false]);
        let lens: Vec<usize> = packets.iter().map(|p| p.payload.len()).collect();
        assert_eq!(lens, [24, 24, 17]);
        for packet in &packets {
            assert!(packet.encode_cfg(HeaderLayout::Compact).len() <= 30);
        }
    }

    #[test]
    fn test_fits_unfragmented() {
        let packets = fragment(
            address("H2"),
            address("H1"),
            Bytes::from_static(b"exactly eighteen!!"),
            30,
            HeaderLayout::Full,
        )
        .unwrap();
        assert_eq!(packets.len(), 1);
        assert!(!packets[0].more_fragments);
    }

    #[test]
    fn test_empty_message() {
        let packets = fragment(
            address("H2"),
            address("H1"),
            Bytes::new(),
            13,
            HeaderLayout::Full,
        )
        .unwrap();
        assert_eq!(packets.len(), 1);
        assert!(packets[0].payload.is_empty());

        let mut assembler = Assembler::default();
        assert_eq!(assembler.push(&packets[0]), Some(Bytes::new()));
    }

    #[test]
    fn test_mtu_too_small() {
        let result = fragment(
            address("H2"),
            address("H1"),
            Bytes::from_static(b"hi"),
            12,
            HeaderLayout::Full,
        );
        assert!(matches!(
            result,
            Err(Error::MtuTooSmall { mtu: 12, header: 12 })
        ));
    }

    #[test]
    fn test_reassembly_is_exact() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut assembler = Assembler::default();
        for _ in 0..200 {
            let layout = if rng.gen_bool(0.5) {
                HeaderLayout::Full
            } else {
                HeaderLayout::Compact
            };
            let len = rng.gen_range(0..300);
            let message: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
            let mtu = rng.gen_range(layout.header_len() + 1..layout.header_len() + 64);
            let packets = fragment(
                address("H2"),
                address("H1"),
                Bytes::from(message.clone()),
                mtu,
                layout,
            )
            .unwrap();

            let (last, rest) = packets.split_last().unwrap();
            for packet in rest {
                assert!(packet.more_fragments);
                assert_eq!(packet.encode_size_cfg(layout), mtu);
                assert!(assembler.push(packet).is_none());
            }
            assert!(!last.more_fragments);
            assert_eq!(assembler.push(last).unwrap()[..], message[..]);
            assert_eq!(assembler.pending(), 0);
        }
    }

    #[test]
    fn test_interleaved_sources_concatenate() {
        let mut assembler = Assembler::default();
        let mut first = NetworkPacket::data(address("H3"), address("H1"), "ab".into());
        first.more_fragments = true;
        let second = NetworkPacket::data(address("H3"), address("H2"), "cd".into());
        assert!(assembler.push(&first).is_none());
        assert_eq!(assembler.pending(), 2);
        assert_eq!(&assembler.push(&second).unwrap()[..], b"abcd");
    }
}
