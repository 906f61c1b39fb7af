//! Encode and decode the fixed-width wire formats of the network simulator.
//!
//! # Overview
//!
//! Every unit that crosses a simulated link is a sequence of ASCII header fields of constant
//! width followed by a raw payload. This crate defines those units and the traits used to
//! serialize them:
//!
//! - [LinkFrame]: `kind(1) | payload`, where `kind` selects the codec of the payload.
//! - [NetworkPacket]: a header described by [HeaderLayout] followed by the payload.
//! - [MplsFrame]: `label(2) | payload`, where the payload is an encoded [NetworkPacket].
//! - [Advertisement]: the JSON routing table carried by [Protocol::Control] packets.
//!
//! | Field | Width | Notes |
//! |---|---|---|
//! | destination | 5 | left-padded with `'0'` |
//! | source | 5 | [HeaderLayout::Full] only |
//! | protocol | 1 | `1` data, `2` control ([HeaderLayout::Full] only) |
//! | more fragments | 1 | `0` last, `1` more follow |
//! | label | 2 | opaque |
//! | frame kind | 1 | `N` network, `M` MPLS |
//!
//! # Errors
//!
//! Encoding never fails. Decoding returns an [Error] whose [Error::is_fatal] tells a receiver
//! whether to discard the unit (a malformed field) or to treat the sender as misconfigured
//! (an unknown protocol tag or frame kind).
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use netsim_codec::{Address, Decode, DecodeExt, EncodeExt, HeaderLayout, LinkFrame, NetworkPacket};
//!
//! let packet = NetworkPacket::data(
//!     Address::new("H3").unwrap(),
//!     Address::new("H1").unwrap(),
//!     Bytes::from_static(b"hello"),
//! );
//! let frame = LinkFrame::network(&packet, HeaderLayout::Full);
//! let wire = frame.encode();
//! assert_eq!(&wire[..], b"N000H3000H110hello");
//!
//! let frame = LinkFrame::decode(wire).unwrap();
//! let decoded = NetworkPacket::decode_cfg(frame.payload, HeaderLayout::Full).unwrap();
//! assert_eq!(decoded, packet);
//! ```

pub mod address;
pub use address::{Address, Label, ADDRESS_LENGTH, LABEL_LENGTH};
pub mod advertisement;
pub use advertisement::{Advertisement, Cost, Routes};
pub mod codec;
pub use codec::{Decode, DecodeExt, Encode, EncodeExt, EncodeSize, Read, ReadExt, Write};
pub mod error;
pub use error::Error;
mod fixed;
pub mod frame;
pub use frame::{FrameKind, LinkFrame, MplsFrame};
pub mod packet;
pub use packet::{HeaderLayout, NetworkPacket, Protocol};
