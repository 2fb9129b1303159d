//! Hash-prefix derivation for Safelist
//!
//! Prefixes are the first `k` bytes of the SHA-256 digest of a normalized
//! domain. The digest itself comes from a backend:
//!
//! - [`DigestBackend`]: synchronous, used by the builder and server-side checks.
//!   [`Sha256Digest`] implements it with the `sha2` crate.
//! - [`AsyncDigestBackend`]: for environments whose digest primitive is
//!   non-blocking (e.g. `SubtleCrypto.digest` in a browser).
//!
//! Every backend must produce the same bytes for the same input. The golden
//! vectors in the tests below pin that down.

use std::future::Future;

use sha2::{Digest, Sha256};

use crate::types::{HashPrefix, PrefixLength};

/// SHA-256 output size in bytes.
pub const DIGEST_LEN: usize = 32;

/// Error type for digest backends.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DigestError {
    #[error("Digest backend unavailable: {0}")]
    Unavailable(String),
    #[error("Digest failed: {0}")]
    Failed(String),
    #[error("Digest has unexpected length: {0} (expected 32)")]
    UnexpectedLength(usize),
}

// =============================================================================
// Backends
// =============================================================================

/// Synchronous SHA-256 capability.
pub trait DigestBackend {
    fn sha256(&self, data: &[u8]) -> [u8; DIGEST_LEN];
}

/// Asynchronous SHA-256 capability.
///
/// The returned future is the only suspension point of a check.
pub trait AsyncDigestBackend {
    fn sha256(&self, data: &[u8]) -> impl Future<Output = Result<[u8; DIGEST_LEN], DigestError>>;
}

/// Native SHA-256 via the `sha2` crate. Works on every target, wasm included.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Digest;

impl DigestBackend for Sha256Digest {
    #[inline]
    fn sha256(&self, data: &[u8]) -> [u8; DIGEST_LEN] {
        Sha256::digest(data).into()
    }
}

impl AsyncDigestBackend for Sha256Digest {
    fn sha256(&self, data: &[u8]) -> impl Future<Output = Result<[u8; DIGEST_LEN], DigestError>> {
        std::future::ready(Ok(DigestBackend::sha256(self, data)))
    }
}

/// Convert a digest returned by a foreign API into a fixed-size array.
pub fn digest_from_slice(bytes: &[u8]) -> Result<[u8; DIGEST_LEN], DigestError> {
    <[u8; DIGEST_LEN]>::try_from(bytes).map_err(|_| DigestError::UnexpectedLength(bytes.len()))
}

// =============================================================================
// Prefix Derivation
// =============================================================================

/// Derive the hash prefix of an already-normalized domain.
#[inline]
pub fn hash_prefix(domain: &str, prefix_length: PrefixLength) -> HashPrefix {
    hash_prefix_with(&Sha256Digest, domain, prefix_length)
}

/// Derive a hash prefix with an explicit synchronous backend.
#[inline]
pub fn hash_prefix_with<B: DigestBackend + ?Sized>(
    backend: &B,
    domain: &str,
    prefix_length: PrefixLength,
) -> HashPrefix {
    let digest = backend.sha256(domain.as_bytes());
    HashPrefix::from_digest(&digest, prefix_length)
}

/// Derive a hash prefix with an asynchronous backend.
pub async fn hash_prefix_async<B: AsyncDigestBackend + ?Sized>(
    backend: &B,
    domain: &str,
    prefix_length: PrefixLength,
) -> Result<HashPrefix, DigestError> {
    let digest = backend.sha256(domain.as_bytes()).await?;
    Ok(HashPrefix::from_digest(&digest, prefix_length))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FACEBOOK_DIGEST_HEX: &str =
        "31193328f8e21dfb6c99f322d22d7b0b508778e64ffbba86e52293379031b874";

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    #[test]
    fn test_sha256_golden_vectors() {
        assert_eq!(hex(&DigestBackend::sha256(&Sha256Digest, b"facebook.com")), FACEBOOK_DIGEST_HEX);
        assert_eq!(
            hex(&DigestBackend::sha256(&Sha256Digest, b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hash_prefix_default_length() {
        let prefix = hash_prefix("facebook.com", PrefixLength::DEFAULT);
        assert_eq!(prefix.as_bytes(), &[0x31, 0x19, 0x33, 0x28, 0xf8, 0xe2]);
    }

    #[test]
    fn test_hash_prefix_deterministic() {
        let k = PrefixLength::new(8).unwrap();
        let a = hash_prefix("google.com", k);
        let b = hash_prefix("google.com", k);
        assert_eq!(a, b);
        assert_eq!(hex(a.as_bytes()), "d4c9d9027326271a");
    }

    #[test]
    fn test_hash_prefix_different_domains() {
        let k = PrefixLength::DEFAULT;
        assert_ne!(hash_prefix("facebook.com", k), hash_prefix("evil-facebook.com", k));
    }

    #[test]
    fn test_hash_prefix_full_length() {
        let prefix = hash_prefix("facebook.com", PrefixLength::new(DIGEST_LEN).unwrap());
        assert_eq!(hex(prefix.as_bytes()), FACEBOOK_DIGEST_HEX);
    }

    #[tokio::test]
    async fn test_async_backend_matches_sync() {
        for domain in ["facebook.com", "my.site", "social.gifts", ""] {
            for k in [1usize, 6, 16, 32] {
                let k = PrefixLength::new(k).unwrap();
                let sync = hash_prefix(domain, k);
                let async_ = hash_prefix_async(&Sha256Digest, domain, k).await.unwrap();
                assert_eq!(sync, async_);
            }
        }
    }

    #[test]
    fn test_digest_from_slice() {
        assert!(digest_from_slice(&[0u8; 32]).is_ok());
        assert_eq!(digest_from_slice(&[0u8; 20]), Err(DigestError::UnexpectedLength(20)));
    }
}
