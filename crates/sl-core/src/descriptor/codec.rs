//! Descriptor encoding and decoding

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use super::format::FilterDescriptor;
use crate::types::{HashPrefix, PrefixLength};

/// Error type for malformed descriptors.
///
/// A malformed descriptor is an operational error, distinct from a host not
/// being on the list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    #[error("Invalid prefix length: {0} (expected 1..=32)")]
    InvalidPrefixLength(usize),
    #[error("Prefix length mismatch: descriptor={actual}, expected={expected}")]
    PrefixLengthMismatch { expected: usize, actual: usize },
    #[error("Invalid base64 data: {0}")]
    InvalidBase64(String),
    #[error("Empty data for {0} records")]
    EmptyData(usize),
    #[error("Data length mismatch: decoded={actual} bytes, expected={expected} ({count} x {prefix_length})")]
    LengthMismatch {
        expected: usize,
        actual: usize,
        count: usize,
        prefix_length: usize,
    },
    #[error("Record count overflow: {count} x {prefix_length}")]
    CountOverflow { count: usize, prefix_length: usize },
}

/// Concatenate prefixes and wrap them in a descriptor.
///
/// All prefixes must share `prefix_length`.
pub fn encode_prefixes<'a, I>(prefixes: I, prefix_length: PrefixLength) -> FilterDescriptor
where
    I: IntoIterator<Item = &'a HashPrefix>,
{
    let mut buf = Vec::new();
    let mut count = 0usize;
    for prefix in prefixes {
        debug_assert_eq!(prefix.prefix_length(), prefix_length);
        buf.extend_from_slice(prefix.as_bytes());
        count += 1;
    }

    FilterDescriptor {
        data: BASE64.encode(&buf),
        prefix_length: prefix_length.get(),
        count,
    }
}

impl FilterDescriptor {
    /// Validated prefix length of this descriptor.
    pub fn prefix_length(&self) -> Result<PrefixLength, DescriptorError> {
        PrefixLength::new(self.prefix_length)
    }

    /// Fail unless the descriptor was built with `expected` bytes per record.
    pub fn expect_prefix_length(&self, expected: PrefixLength) -> Result<(), DescriptorError> {
        if self.prefix_length != expected.get() {
            return Err(DescriptorError::PrefixLengthMismatch {
                expected: expected.get(),
                actual: self.prefix_length,
            });
        }
        Ok(())
    }

    /// Decode and validate the record blob.
    pub fn decode_records(&self) -> Result<Vec<u8>, DescriptorError> {
        let prefix_length = self.prefix_length()?;
        let expected = self
            .expected_byte_len()
            .ok_or(DescriptorError::CountOverflow {
                count: self.count,
                prefix_length: prefix_length.get(),
            })?;

        if self.data.is_empty() && self.count > 0 {
            return Err(DescriptorError::EmptyData(self.count));
        }

        let bytes = BASE64
            .decode(self.data.as_bytes())
            .map_err(|e| DescriptorError::InvalidBase64(e.to_string()))?;

        if bytes.len() != expected {
            return Err(DescriptorError::LengthMismatch {
                expected,
                actual: bytes.len(),
                count: self.count,
                prefix_length: prefix_length.get(),
            });
        }

        Ok(bytes)
    }
}
