use sl_compiler::{build_descriptor, parse_host_list, parse_host_list_json};
use sl_core::{is_safe, BuildOptions, Filter, FilterDescriptor};

const HOST_LIST: &str = "\
# Known safe hosts
facebook.com
My.Site
0.0.0.0 example-good.com
||google.com^
https://social.gifts/
";

fn descriptor() -> FilterDescriptor {
    let parsed = parse_host_list(HOST_LIST);
    assert!(parsed.warnings.is_empty());
    build_descriptor(&parsed.hosts, BuildOptions::default())
}

#[test]
fn test_every_listed_host_is_safe() {
    let d = descriptor();
    for host in ["facebook.com", "my.site", "example-good.com", "google.com", "social.gifts"] {
        let url = format!("https://{}/anything", host);
        assert_eq!(is_safe(&url, &d), Ok(true), "{}", url);
    }
}

#[test]
fn test_matches_descriptor_of_plain_list() {
    let d = descriptor();
    assert_eq!(d.data, "MRkzKPjiKTj8o9D80+73AzmU1MnZAnMmOxFU/Jvx");
    assert_eq!(d.count, 5);
}

#[test]
fn test_subdomains_and_lookalikes_are_not_safe() {
    let d = descriptor();
    assert_eq!(is_safe("https://evil.facebook.com/malware", &d), Ok(false));
    assert_eq!(is_safe("https://evil-facebook.com/x", &d), Ok(false));
    assert_eq!(is_safe("https://invalid-domain.com/test", &d), Ok(false));
}

#[test]
fn test_survives_json_transport() {
    let d = descriptor();
    let json = serde_json::to_string(&d).unwrap();
    assert!(json.contains("\"prefixLength\":6"));

    let received: FilterDescriptor = serde_json::from_str(&json).unwrap();
    let filter = Filter::from_descriptor(&received).unwrap();
    assert!(filter.is_safe("https://Facebook.com/profile"));
    assert!(!filter.is_safe("not a url"));
}

#[test]
fn test_pasted_entries_do_not_become_dead_records() {
    let parsed = parse_host_list("facebook.com/\nexample.com:8080\nmy.site\n");
    assert_eq!(parsed.hosts, vec!["my.site"]);
    assert_eq!(parsed.warnings.len(), 2);

    let d = build_descriptor(&parsed.hosts, BuildOptions::default());
    assert_eq!(d.count, 1);
    assert_eq!(is_safe("https://my.site/", &d), Ok(true));
}

#[test]
fn test_internationalized_hosts_match_urls() {
    let text = build_descriptor(&parse_host_list("bücher.de\n").hosts, BuildOptions::default());
    let json = build_descriptor(
        &parse_host_list_json(r#"["https://Bücher.de/shop"]"#).unwrap().hosts,
        BuildOptions::default(),
    );
    assert_eq!(text, json);
    assert_eq!(is_safe("https://bücher.de/", &text), Ok(true));
    assert_eq!(is_safe("https://xn--bcher-kva.de/", &text), Ok(true));
}
