//! Node addresses and MPLS labels.

use crate::{fixed, Error};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Width of an encoded [Address].
pub const ADDRESS_LENGTH: usize = 5;

/// Width of an encoded [Label].
pub const LABEL_LENGTH: usize = 2;

/// Opaque identifier of a host or router.
///
/// An address is 1 to [ADDRESS_LENGTH] ASCII alphanumeric characters (`"H1"`, `"RA"`, `"3"`).
/// It is stored in its wire form: left-padded with `'0'` to exactly [ADDRESS_LENGTH] bytes.
/// Two addresses are equal iff their padded forms are equal, so `"007"` and `"7"` name the
/// same node.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// The all-zero address, used as the source of packets whose layout carries no source.
    pub const UNSPECIFIED: Self = Self([b'0'; ADDRESS_LENGTH]);

    /// Create an address from a human-readable name.
    pub fn new(name: &str) -> Result<Self, Error> {
        if name.is_empty() || !name.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(Error::InvalidAddress(name.to_string()));
        }
        fixed::pad(name.as_bytes())
            .map(Self)
            .ok_or_else(|| Error::InvalidAddress(name.to_string()))
    }

    /// Create an address from its padded wire form.
    pub fn from_wire(bytes: [u8; ADDRESS_LENGTH]) -> Result<Self, Error> {
        if !bytes.iter().all(|b| b.is_ascii_alphanumeric()) {
            return Err(Error::InvalidAddress(
                String::from_utf8_lossy(&bytes).into_owned(),
            ));
        }
        Ok(Self(bytes))
    }

    /// The padded wire form of the address.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Returns true if this is [Address::UNSPECIFIED].
    pub fn is_unspecified(&self) -> bool {
        *self == Self::UNSPECIFIED
    }
}

impl From<u16> for Address {
    fn from(value: u16) -> Self {
        // u16::MAX has 5 digits, so padding cannot fail
        let digits = value.to_string();
        let mut out = [b'0'; ADDRESS_LENGTH];
        out[ADDRESS_LENGTH - digits.len()..].copy_from_slice(digits.as_bytes());
        Self(out)
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Address {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = self
            .0
            .iter()
            .position(|b| *b != b'0')
            .unwrap_or(ADDRESS_LENGTH - 1);
        // Always ASCII (validated on construction)
        f.write_str(std::str::from_utf8(&self.0[start..]).unwrap_or("?"))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

/// Opaque MPLS label of exactly [LABEL_LENGTH] printable ASCII characters.
///
/// Labels are never parsed as numbers.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Label([u8; LABEL_LENGTH]);

impl Label {
    /// Create a label from its textual form.
    pub fn new(code: &str) -> Result<Self, Error> {
        let bytes: [u8; LABEL_LENGTH] = code
            .as_bytes()
            .try_into()
            .map_err(|_| Error::InvalidLabel(code.to_string()))?;
        Self::from_wire(bytes)
    }

    /// Create a label from its wire form.
    pub fn from_wire(bytes: [u8; LABEL_LENGTH]) -> Result<Self, Error> {
        if !bytes.iter().all(|b| b.is_ascii_graphic()) {
            return Err(Error::InvalidLabel(
                String::from_utf8_lossy(&bytes).into_owned(),
            ));
        }
        Ok(Self(bytes))
    }

    /// The wire form of the label.
    pub fn as_bytes(&self) -> &[u8; LABEL_LENGTH] {
        &self.0
    }
}

impl FromStr for Label {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Label {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Label> for String {
    fn from(value: Label) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(std::str::from_utf8(&self.0).unwrap_or("??"))
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Label({self})")
    }
}
