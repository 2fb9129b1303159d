//! Core type definitions for Safelist
//!
//! These types map directly to the descriptor wire format and are shared by
//! the builder and the checker.

use std::fmt;

use crate::descriptor::DescriptorError;
use crate::hash::DIGEST_LEN;

// =============================================================================
// Prefix Length
// =============================================================================

/// Number of leading digest bytes kept per host.
///
/// Always in `1..=32`. The value is fixed for a whole descriptor and must be
/// the same at build and check time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrefixLength(u8);

impl PrefixLength {
    /// 6 bytes = 48 bits per host.
    pub const DEFAULT: Self = Self(6);
    pub const MIN: usize = 1;
    pub const MAX: usize = DIGEST_LEN;

    /// Validate a raw prefix length.
    pub fn new(len: usize) -> Result<Self, DescriptorError> {
        if (Self::MIN..=Self::MAX).contains(&len) {
            Ok(Self(len as u8))
        } else {
            Err(DescriptorError::InvalidPrefixLength(len))
        }
    }

    #[inline]
    pub const fn get(self) -> usize {
        self.0 as usize
    }
}

impl Default for PrefixLength {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<usize> for PrefixLength {
    type Error = DescriptorError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for PrefixLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Hash Prefix
// =============================================================================

/// Truncated SHA-256 digest of a normalized domain.
///
/// Stored inline so that deriving a prefix on the check path does not
/// allocate.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashPrefix {
    bytes: [u8; DIGEST_LEN],
    len: PrefixLength,
}

impl HashPrefix {
    /// Truncate a full digest to `len` bytes.
    #[inline]
    pub fn from_digest(digest: &[u8; DIGEST_LEN], len: PrefixLength) -> Self {
        let mut bytes = [0u8; DIGEST_LEN];
        bytes[..len.get()].copy_from_slice(&digest[..len.get()]);
        Self { bytes, len }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len.get()]
    }

    #[inline]
    pub fn prefix_length(&self) -> PrefixLength {
        self.len
    }
}

impl AsRef<[u8]> for HashPrefix {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for HashPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashPrefix(")?;
        for b in self.as_bytes() {
            write!(f, "{:02x}", b)?;
        }
        f.write_str(")")
    }
}

// =============================================================================
// Build Options
// =============================================================================

/// Options for building a descriptor from a host list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    pub prefix_length: PrefixLength,
}
