//! Filter descriptor format and codec
//!
//! This module provides the JSON-transportable descriptor
//! (`{data, prefixLength, count}`) and the base64 codec for its record blob.

mod codec;
mod format;

pub use codec::*;
pub use format::*;
