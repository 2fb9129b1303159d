use std::collections::HashSet;

use log::info;

use sl_core::descriptor::{encode_prefixes, FilterDescriptor};
use sl_core::domain::normalize;
use sl_core::hash::hash_prefix;
use sl_core::matcher::false_positive_probability;
use sl_core::types::{BuildOptions, HashPrefix};

#[derive(Debug, Clone, PartialEq)]
pub struct BuildStats {
    /// Records written (input hosts, duplicates included).
    pub hosts: usize,
    /// Distinct hosts after normalization.
    pub unique_hosts: usize,
    /// Decoded record blob size.
    pub raw_bytes: usize,
    /// Length of the base64 `data` string.
    pub encoded_bytes: usize,
    /// Chance an unrelated host collides with some record.
    pub false_positive_rate: f64,
}

/// Build a descriptor from a host list.
///
/// Each host is normalized and hashed; prefixes are concatenated in input
/// order. Duplicates are kept.
pub fn build_descriptor<S: AsRef<str>>(hosts: &[S], options: BuildOptions) -> FilterDescriptor {
    let k = options.prefix_length;
    let prefixes: Vec<HashPrefix> = hosts
        .iter()
        .map(|host| hash_prefix(&normalize(host.as_ref()), k))
        .collect();
    encode_prefixes(&prefixes, k)
}

/// Build a descriptor and report size/accuracy figures for it.
pub fn build_descriptor_with_stats<S: AsRef<str>>(
    hosts: &[S],
    options: BuildOptions,
) -> (FilterDescriptor, BuildStats) {
    let descriptor = build_descriptor(hosts, options);

    let unique_hosts = hosts
        .iter()
        .map(|host| normalize(host.as_ref()))
        .collect::<HashSet<_>>()
        .len();

    let stats = BuildStats {
        hosts: descriptor.count,
        unique_hosts,
        raw_bytes: descriptor.count * descriptor.prefix_length,
        encoded_bytes: descriptor.data.len(),
        false_positive_rate: false_positive_probability(options.prefix_length, unique_hosts),
    };

    info!(
        "Built descriptor: {} hosts ({} unique), {} bytes raw, {} bytes base64, prefix {}",
        stats.hosts, stats.unique_hosts, stats.raw_bytes, stats.encoded_bytes, options.prefix_length
    );

    (descriptor, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sl_core::matcher::{is_safe, Filter};
    use sl_core::types::PrefixLength;

    #[test]
    fn test_builds_known_descriptor() {
        let hosts = ["facebook.com", "my.site", "example-good.com", "google.com", "social.gifts"];
        let descriptor = build_descriptor(&hosts, BuildOptions::default());
        assert_eq!(descriptor.data, "MRkzKPjiKTj8o9D80+73AzmU1MnZAnMmOxFU/Jvx");
        assert_eq!(descriptor.prefix_length, 6);
        assert_eq!(descriptor.count, 5);
    }

    #[test]
    fn test_normalizes_before_hashing() {
        let a = build_descriptor(&["Facebook.com "], BuildOptions::default());
        let b = build_descriptor(&["facebook.com"], BuildOptions::default());
        assert_eq!(a, b);
    }

    #[test]
    fn test_respects_prefix_length() {
        let options = BuildOptions { prefix_length: PrefixLength::new(4).unwrap() };
        let descriptor = build_descriptor(&["a.com", "b.com"], options);
        assert_eq!(descriptor.prefix_length, 4);
        assert_eq!(descriptor.decode_records().unwrap().len(), 8);
        assert_eq!(is_safe("https://b.com/", &descriptor), Ok(true));
    }

    #[test]
    fn test_keeps_input_order() {
        let forward = build_descriptor(&["a.com", "b.com"], BuildOptions::default());
        let reverse = build_descriptor(&["b.com", "a.com"], BuildOptions::default());
        assert_ne!(forward.data, reverse.data);

        let f = Filter::from_descriptor(&forward).unwrap();
        let r = Filter::from_descriptor(&reverse).unwrap();
        let f_records: Vec<&[u8]> = f.records().collect();
        let r_records: Vec<&[u8]> = r.records().collect();
        assert_eq!(f_records[0], r_records[1]);
        assert_eq!(f_records[1], r_records[0]);
    }

    #[test]
    fn test_reports_stats() {
        let hosts = vec!["a.com".to_string(), "A.com".to_string(), "b.com".to_string()];
        let (descriptor, stats) = build_descriptor_with_stats(&hosts, BuildOptions::default());
        assert_eq!(stats.hosts, 3);
        assert_eq!(stats.unique_hosts, 2);
        assert_eq!(stats.raw_bytes, 18);
        assert_eq!(stats.encoded_bytes, descriptor.data.len());
        assert_eq!(stats.encoded_bytes, 24);
        assert!(stats.false_positive_rate > 0.0 && stats.false_positive_rate < 1e-13);
    }

    #[test]
    fn test_builds_empty_descriptor() {
        let hosts: [&str; 0] = [];
        let descriptor = build_descriptor(&hosts, BuildOptions::default());
        assert_eq!(descriptor.count, 0);
        assert_eq!(is_safe("https://a.com/", &descriptor), Ok(false));
    }
}
