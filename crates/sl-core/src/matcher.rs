//! Membership checker
//!
//! A [`Filter`] is the decoded form of a [`FilterDescriptor`]: a flat buffer of
//! fixed-width records. Lookups derive the prefix of the URL's host and scan
//! the buffer in `prefix_length` strides. The check path does no I/O.
//!
//! Every check fails closed: a URL without a parseable host is never safe.

use log::debug;

use crate::descriptor::{DescriptorError, FilterDescriptor};
use crate::domain::normalize;
use crate::hash::{hash_prefix, hash_prefix_async, hash_prefix_with, AsyncDigestBackend, DigestBackend, DigestError};
use crate::types::{HashPrefix, PrefixLength};
use crate::url::extract_host;

/// Error type for checks that decode a descriptor or await a digest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
    #[error(transparent)]
    Digest(#[from] DigestError),
}

// =============================================================================
// Filter
// =============================================================================

/// Decoded, immutable allow-list filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    prefix_length: PrefixLength,
    records: Vec<u8>,
    sorted: bool,
}

impl Filter {
    /// Decode a descriptor. Fails on a malformed descriptor.
    pub fn from_descriptor(descriptor: &FilterDescriptor) -> Result<Self, DescriptorError> {
        let prefix_length = descriptor.prefix_length()?;
        let records = descriptor.decode_records()?;
        Ok(Self {
            prefix_length,
            records,
            sorted: false,
        })
    }

    /// Sort records so lookups use binary search instead of a linear scan.
    ///
    /// Membership answers are unchanged; only lookup cost differs.
    pub fn into_sorted(mut self) -> Self {
        if !self.sorted {
            let k = self.prefix_length.get();
            let mut chunks: Vec<&[u8]> = self.records.chunks_exact(k).collect();
            chunks.sort_unstable();
            self.records = chunks.concat();
            self.sorted = true;
        }
        self
    }

    #[inline]
    pub fn prefix_length(&self) -> PrefixLength {
        self.prefix_length
    }

    /// Number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len() / self.prefix_length.get()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// Iterate over the raw records.
    pub fn records(&self) -> std::slice::ChunksExact<'_, u8> {
        self.records.chunks_exact(self.prefix_length.get())
    }

    /// Check a prefix against the stored records.
    ///
    /// A prefix of a different length never matches.
    pub fn contains_prefix(&self, prefix: &HashPrefix) -> bool {
        if prefix.prefix_length() != self.prefix_length {
            return false;
        }
        let needle = prefix.as_bytes();

        if self.sorted {
            let k = self.prefix_length.get();
            let len = self.len();
            let (mut lo, mut hi) = (0usize, len);
            while lo < hi {
                let mid = lo + (hi - lo) / 2;
                let record = &self.records[mid * k..(mid + 1) * k];
                match record.cmp(needle) {
                    std::cmp::Ordering::Equal => return true,
                    std::cmp::Ordering::Less => lo = mid + 1,
                    std::cmp::Ordering::Greater => hi = mid,
                }
            }
            return false;
        }

        self.records().any(|record| record == needle)
    }

    /// Check a bare host name (normalized here).
    #[inline]
    pub fn contains_host(&self, host: &str) -> bool {
        self.contains_prefix(&hash_prefix(&normalize(host), self.prefix_length))
    }

    /// Check a host name with an explicit synchronous backend.
    pub fn contains_host_with<B: DigestBackend + ?Sized>(&self, backend: &B, host: &str) -> bool {
        self.contains_prefix(&hash_prefix_with(backend, &normalize(host), self.prefix_length))
    }

    /// Decide whether a URL's host is on the allow-list.
    pub fn is_safe(&self, url: &str) -> bool {
        match extract_host(url) {
            Some(host) => self.contains_host(&host),
            None => false,
        }
    }

    /// Same as [`Filter::is_safe`], awaiting an asynchronous digest backend.
    pub async fn is_safe_async<B: AsyncDigestBackend + ?Sized>(
        &self,
        backend: &B,
        url: &str,
    ) -> Result<bool, DigestError> {
        let host = match extract_host(url) {
            Some(host) => host,
            None => return Ok(false),
        };
        let prefix = hash_prefix_async(backend, &normalize(&host), self.prefix_length).await?;
        Ok(self.contains_prefix(&prefix))
    }
}

impl TryFrom<&FilterDescriptor> for Filter {
    type Error = DescriptorError;

    fn try_from(descriptor: &FilterDescriptor) -> Result<Self, Self::Error> {
        Self::from_descriptor(descriptor)
    }
}

// =============================================================================
// One-shot Checks
// =============================================================================

/// Decode `descriptor` and check `url` against it.
///
/// The descriptor is validated before the URL is looked at, so a malformed
/// descriptor is always reported, even for unparseable URLs.
pub fn is_safe(url: &str, descriptor: &FilterDescriptor) -> Result<bool, DescriptorError> {
    let filter = Filter::from_descriptor(descriptor)?;
    let safe = filter.is_safe(url);
    debug!("is_safe({:?}) = {}", url, safe);
    Ok(safe)
}

/// Asynchronous variant of [`is_safe`].
pub async fn is_safe_async<B: AsyncDigestBackend + ?Sized>(
    url: &str,
    descriptor: &FilterDescriptor,
    backend: &B,
) -> Result<bool, CheckError> {
    let filter = Filter::from_descriptor(descriptor)?;
    Ok(filter.is_safe_async(backend, url).await?)
}

// =============================================================================
// False Positive Model
// =============================================================================

/// Probability that an unrelated host collides with at least one of `count`
/// stored prefixes of `prefix_length` bytes: `1 - (1 - 2^(-8k))^n`.
pub fn false_positive_probability(prefix_length: PrefixLength, count: usize) -> f64 {
    let per_record = 2f64.powi(-8 * prefix_length.get() as i32);
    // ln_1p keeps precision when per_record is tiny
    -f64::exp_m1(count as f64 * f64::ln_1p(-per_record))
}
