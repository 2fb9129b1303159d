//! Descriptor Format
//!
//! `data` is the standard (padded) base64 encoding of `count` fixed-width
//! records of `prefixLength` bytes each. Record order carries no meaning.

#[cfg(feature = "ts")]
use ts_rs::TS;

use serde::{Deserialize, Serialize};

/// Default HTTP path the descriptor is served under.
pub const DESCRIPTOR_PATH: &str = "/url-data";

/// Compact, transmittable representation of a hashed allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS))]
#[serde(rename_all = "camelCase")]
pub struct FilterDescriptor {
    /// Base64 of the concatenated hash prefixes.
    pub data: String,
    /// Bytes per record.
    pub prefix_length: usize,
    /// Number of records (hosts in the source list, duplicates included).
    pub count: usize,
}

impl FilterDescriptor {
    /// Raw record blob size implied by the header fields.
    #[inline]
    pub fn expected_byte_len(&self) -> Option<usize> {
        self.count.checked_mul(self.prefix_length)
    }
}
