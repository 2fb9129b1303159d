//! Domain canonicalization
//!
//! Every host goes through [`normalize`] before it is hashed, both when the
//! allow-list is built and when a URL is checked. The full hostname is kept:
//! no reduction to the registrable domain is applied, so `evil.example.com`
//! and `example.com` hash differently.

/// Lower-case and trim a host name. No DNS syntax validation.
#[inline]
pub fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}
