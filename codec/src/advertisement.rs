//! Distance-vector route advertisements (the payload of control packets).

use crate::{Address, Error, Read};
use bytes::{Buf, Bytes};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cost of a path (sum of link costs). Costs are never negative.
pub type Cost = u32;

/// Known paths: destination -> (next hop -> cost).
pub type Routes = BTreeMap<Address, BTreeMap<Address, Cost>>;

/// A router's full routing table, as sent to its neighbors.
///
/// Encoded as a JSON object `{"destination": {"next_hop": cost}}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Advertisement {
    pub routes: Routes,
}

impl Advertisement {
    pub fn new(routes: Routes) -> Self {
        Self { routes }
    }

    /// Serialize the table once, for use as the payload of every control packet sent.
    pub fn to_json(&self) -> Result<Bytes, Error> {
        serde_json::to_vec(&self.routes)
            .map(Bytes::from)
            .map_err(|err| Error::InvalidData("advertisement", err.to_string()))
    }
}

impl Read for Advertisement {
    fn read_cfg(buf: &mut impl Buf, _: ()) -> Result<Self, Error> {
        let raw = buf.copy_to_bytes(buf.remaining());
        let routes = serde_json::from_slice(&raw)
            .map_err(|err| Error::InvalidData("advertisement", err.to_string()))?;
        Ok(Self { routes })
    }
}
