//! Core codec traits

use crate::error::Error;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Trait for types that can be written (encoded) to a buffer.
///
/// The `Cfg` type parameter selects between encodings of the same value (for example,
/// which header layout a packet is written with). Use `()` for types with a single encoding.
pub trait Write<Cfg = ()> {
    /// Encodes this value by writing to a buffer.
    ///
    /// Implementations should panic if the buffer doesn't have enough capacity.
    fn write_cfg(&self, buf: &mut impl BufMut, cfg: Cfg);
}

/// Trait for types that know how many bytes [Write::write_cfg] produces.
pub trait EncodeSize<Cfg = ()> {
    /// Returns the encoded length of this value.
    ///
    /// This method MUST return the exact number of bytes that will be written by `write_cfg()`.
    fn encode_size_cfg(&self, cfg: Cfg) -> usize;
}

/// Trait for types that can be read/decoded from a buffer.
///
/// The `Cfg` type parameter allows for configuration during the read process (for example,
/// which header layout to expect). Use `()` for types that do not require configuration.
pub trait Read<Cfg = ()>: Sized {
    /// Reads a value from the buffer using the provided configuration `cfg`, consuming the
    /// necessary bytes.
    ///
    /// Returns an error if decoding fails (e.g., invalid data, not enough bytes initially).
    fn read_cfg(buf: &mut impl Buf, cfg: Cfg) -> Result<Self, Error>;
}

/// Trait for types that can be encoded to a buffer.
pub trait Encode<Cfg: Copy = ()>: Write<Cfg> + EncodeSize<Cfg> {
    /// Encodes a value to a [Bytes] buffer.
    ///
    /// Panics if the `write_cfg` implementation does not write the expected number of bytes.
    ///
    /// (Provided method).
    fn encode_cfg(&self, cfg: Cfg) -> Bytes {
        let len = self.encode_size_cfg(cfg);
        let mut buffer = BytesMut::with_capacity(len);
        self.write_cfg(&mut buffer, cfg);
        assert_eq!(buffer.len(), len, "write_cfg() did not write expected bytes");
        buffer.freeze()
    }
}

// Automatically implement `Encode` for types that can be written and sized.
impl<Cfg: Copy, T: Write<Cfg> + EncodeSize<Cfg>> Encode<Cfg> for T {}

/// Trait for types that can be decoded from a buffer, ensuring the entire buffer is consumed.
pub trait Decode<Cfg = ()>: Read<Cfg> {
    /// Decodes a value from a buffer, ensuring the buffer is fully consumed.
    ///
    /// (Provided method).
    fn decode_cfg(mut buf: impl Buf, cfg: Cfg) -> Result<Self, Error> {
        let result = Self::read_cfg(&mut buf, cfg)?;

        // Check that the buffer is fully consumed.
        let remaining = buf.remaining();
        if remaining > 0 {
            return Err(Error::ExtraData(remaining));
        }

        Ok(result)
    }
}

// Automatically implement `Decode` for types that implement `Read`.
impl<Cfg, T: Read<Cfg>> Decode<Cfg> for T {}

/// Extension trait providing an ergonomic encode method for types requiring no configuration.
pub trait EncodeExt: Encode<()> {
    /// Encodes a value using the default `()` config.
    fn encode(&self) -> Bytes {
        self.encode_cfg(())
    }
}

// Automatically implement `EncodeExt` for types that implement `Encode` with no config.
impl<T: Encode<()>> EncodeExt for T {}

/// Extension trait providing an ergonomic read method for types requiring no configuration.
pub trait ReadExt: Read<()> {
    /// Reads a value using the default `()` config.
    fn read(buf: &mut impl Buf) -> Result<Self, Error> {
        <Self as Read<()>>::read_cfg(buf, ())
    }
}

// Automatically implement `ReadExt` for types that implement `Read` with no config.
impl<T: Read<()>> ReadExt for T {}

/// Extension trait providing ergonomic decode method for types requiring no configuration.
pub trait DecodeExt: Decode<()> {
    /// Decodes a value using the default `()` config.
    fn decode(buf: impl Buf) -> Result<Self, Error> {
        <Self as Decode<()>>::decode_cfg(buf, ())
    }
}

// Automatically implement `DecodeExt` for types that implement `Decode` with no config.
impl<T: Decode<()>> DecodeExt for T {}
