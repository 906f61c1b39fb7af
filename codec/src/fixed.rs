//! Helpers for fixed-width ASCII fields.
//!
//! Every header field on the wire occupies a constant number of bytes. Numeric fields are
//! single decimal digits; identifiers are left-padded with `'0'`.

use crate::Error;
use bytes::{Buf, BufMut};

/// Take exactly `N` bytes for `field` or fail without consuming anything.
pub(crate) fn take<const N: usize>(
    buf: &mut impl Buf,
    field: &'static str,
) -> Result<[u8; N], Error> {
    let remaining = buf.remaining();
    if remaining < N {
        return Err(Error::EndOfBuffer(field, N, remaining));
    }
    let mut out = [0u8; N];
    buf.copy_to_slice(&mut out);
    Ok(out)
}

/// Read a single decimal digit.
pub(crate) fn read_digit(buf: &mut impl Buf, field: &'static str) -> Result<u8, Error> {
    let [byte] = take::<1>(buf, field)?;
    if !byte.is_ascii_digit() {
        return Err(Error::InvalidData(
            field,
            format!("expected digit, found {:?}", byte as char),
        ));
    }
    Ok(byte - b'0')
}

/// Write a single decimal digit.
pub(crate) fn write_digit(buf: &mut impl BufMut, digit: u8) {
    assert!(digit < 10, "not a digit: {digit}");
    buf.put_u8(b'0' + digit);
}

/// Left-pad `value` with `'0'` to exactly `N` bytes.
///
/// Returns `None` if `value` is longer than `N`.
pub(crate) fn pad<const N: usize>(value: &[u8]) -> Option<[u8; N]> {
    if value.len() > N {
        return None;
    }
    let mut out = [b'0'; N];
    out[N - value.len()..].copy_from_slice(value);
    Some(out)
}
