//! Safelist Core Library
//!
//! This crate provides the hash-prefix allow-list filter: given a list of safe
//! host names, it produces a compact descriptor that any consumer (server or
//! browser) can use to decide whether a URL's host is on the list, without
//! shipping the list itself.
//!
//! # Architecture
//!
//! Each host is normalized, hashed with SHA-256 and truncated to a fixed
//! prefix length. The prefixes are concatenated and base64-encoded into a
//! [`FilterDescriptor`] (`{data, prefixLength, count}`). Checks derive the
//! prefix of a URL's host and scan the decoded records for an exact match.
//! Prefixes cannot be reversed into host names.
//!
//! # Modules
//!
//! - `domain`: Host name normalization
//! - `url`: Host extraction from free-text URLs
//! - `hash`: SHA-256 digest backends and prefix derivation
//! - `descriptor`: Descriptor format and base64 codec
//! - `matcher`: Decoded filter and membership checks
//! - `types`: Shared type definitions

pub mod descriptor;
pub mod domain;
pub mod hash;
pub mod matcher;
pub mod types;
pub mod url;

// Re-export commonly used types
pub use descriptor::{encode_prefixes, DescriptorError, FilterDescriptor};
pub use domain::normalize;
pub use hash::{hash_prefix, AsyncDigestBackend, DigestBackend, DigestError, Sha256Digest};
pub use matcher::{false_positive_probability, is_safe, is_safe_async, CheckError, Filter};
pub use types::{BuildOptions, HashPrefix, PrefixLength};
pub use url::extract_host;
