//! Safelist Host List Compiler
//!
//! This crate turns host list files into filter descriptors.

pub mod builder;
pub mod parser;

pub use builder::{build_descriptor, build_descriptor_with_stats, BuildStats};
pub use parser::{parse_host_list, parse_host_list_json, HostListError, HostListWarning, ParsedHostList};
