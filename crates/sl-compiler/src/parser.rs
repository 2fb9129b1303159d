use log::{debug, warn};
use url::Host;

use sl_core::domain::normalize;
use sl_core::url::extract_host;

/// Error type for structured host lists.
#[derive(Debug, thiserror::Error)]
pub enum HostListError {
    #[error("Invalid JSON host list: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Host list contains no hosts")]
    NoHosts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostListWarning {
    /// Entry could not be read as a host. `line` is 1-based: the line number
    /// of a text list, or the array position of a JSON list.
    Unrecognized { line: usize, text: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedHostList {
    pub hosts: Vec<String>,
    pub warnings: Vec<HostListWarning>,
}

impl ParsedHostList {
    fn push_entry(&mut self, line: usize, text: &str) {
        match extract_entry_host(text) {
            Some(host) => self.hosts.push(host),
            None => {
                warn!("Skipping unrecognized host list entry {}: {:?}", line, text);
                self.warnings.push(HostListWarning::Unrecognized {
                    line,
                    text: text.to_string(),
                });
            }
        }
    }
}

/// Parse a line-oriented host list.
///
/// Accepted entries:
/// - a bare host (`facebook.com`)
/// - a hosts-file entry (`0.0.0.0 facebook.com`)
/// - a host-anchored filter (`||facebook.com^`)
/// - a URL (`https://facebook.com/`), reduced to its host
///
/// Hosts are stored in the form URL parsing produces: lower-case, with
/// internationalized labels punycoded (`bücher.de` -> `xn--bcher-kva.de`).
/// Anything else (`facebook.com/`, `example.com:8080`) is skipped with a
/// warning.
///
/// Blank lines and lines starting with `#`, `!` or `[` are skipped, as are
/// trailing ` #` comments. Hosts are kept in input order and not deduplicated.
pub fn parse_host_list(text: &str) -> ParsedHostList {
    let mut parsed = ParsedHostList::default();

    for (idx, raw_line) in text.lines().enumerate() {
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() || is_comment_line(line) {
            continue;
        }
        parsed.push_entry(idx + 1, line);
    }

    parsed
}

/// Parse a JSON array of host strings.
///
/// Each element goes through the same per-entry handling as a line of
/// [`parse_host_list`].
pub fn parse_host_list_json(text: &str) -> Result<ParsedHostList, HostListError> {
    let entries: Vec<String> = serde_json::from_str(text)?;
    if entries.is_empty() {
        return Err(HostListError::NoHosts);
    }

    let mut parsed = ParsedHostList::default();
    for (idx, entry) in entries.iter().enumerate() {
        parsed.push_entry(idx + 1, entry.trim());
    }
    Ok(parsed)
}

fn is_comment_line(line: &str) -> bool {
    line.starts_with('!') || line.starts_with('[') || line.starts_with('#')
}

fn strip_inline_comment(line: &str) -> &str {
    match line.find(" #") {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn extract_entry_host(entry: &str) -> Option<String> {
    if entry.contains("://") {
        return extract_host(entry);
    }

    if let Some(rest) = entry.strip_prefix("||") {
        return parse_host_anchor(rest);
    }

    let mut parts = entry.split_whitespace();
    let first = parts.next()?;
    match (parts.next(), parts.next()) {
        (None, _) => canonical_host(first),
        (Some(host), None) if is_sink_address(first) => canonical_host(host),
        _ => None,
    }
}

fn parse_host_anchor(rest: &str) -> Option<String> {
    let rest = rest.strip_prefix('.').unwrap_or(rest);

    let end = rest
        .find(|ch: char| ch == '^' || ch == '|' || ch == '$')
        .unwrap_or(rest.len());
    canonical_host(&rest[..end])
}

/// Validate a host token and convert it to the form URL hosts take.
fn canonical_host(token: &str) -> Option<String> {
    let normalized = normalize(token);
    if normalized.contains('*') {
        return None;
    }

    match Host::parse(&normalized) {
        Ok(host) => {
            let host = host.to_string();
            if host != normalized {
                debug!("Listing host {:?} as {:?}", normalized, host);
            }
            Some(host)
        }
        Err(e) => {
            debug!("Rejecting host {:?}: {}", normalized, e);
            None
        }
    }
}

fn is_sink_address(addr: &str) -> bool {
    matches!(addr, "0.0.0.0" | "127.0.0.1" | "::" | "::1")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unrecognized(line: usize, text: &str) -> HostListWarning {
        HostListWarning::Unrecognized { line, text: text.into() }
    }

    #[test]
    fn test_parses_plain_hosts_in_order() {
        let parsed = parse_host_list("facebook.com\nMy.Site \n\ngoogle.com\n");
        assert_eq!(parsed.hosts, vec!["facebook.com", "my.site", "google.com"]);
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_skips_comments() {
        let parsed = parse_host_list("# safe hosts\n! also a comment\n[Adblock Plus]\nfacebook.com # main site\n");
        assert_eq!(parsed.hosts, vec!["facebook.com"]);
    }

    #[test]
    fn test_parses_hosts_file_entries() {
        let parsed = parse_host_list("0.0.0.0 facebook.com\n127.0.0.1\tgoogle.com\n");
        assert_eq!(parsed.hosts, vec!["facebook.com", "google.com"]);
    }

    #[test]
    fn test_parses_host_anchor_rules() {
        let parsed = parse_host_list("||facebook.com^\n||.my.site^$third-party\n||example.com/path\n");
        assert_eq!(parsed.hosts, vec!["facebook.com", "my.site"]);
        assert_eq!(parsed.warnings, vec![unrecognized(3, "||example.com/path")]);
    }

    #[test]
    fn test_parses_urls() {
        let parsed = parse_host_list("https://Social.Gifts/profile\n");
        assert_eq!(parsed.hosts, vec!["social.gifts"]);
    }

    #[test]
    fn test_keeps_duplicates() {
        let parsed = parse_host_list("a.com\na.com\nA.com\n");
        assert_eq!(parsed.hosts.len(), 3);
    }

    #[test]
    fn test_warns_on_unrecognized_lines() {
        let parsed = parse_host_list("this is not a host\n");
        assert!(parsed.hosts.is_empty());
        assert_eq!(parsed.warnings, vec![unrecognized(1, "this is not a host")]);
    }

    #[test]
    fn test_rejects_paths_and_ports() {
        let parsed = parse_host_list("facebook.com/\nexample.com:8080\n0.0.0.0 my.site/x\n*.example.com\n");
        assert!(parsed.hosts.is_empty());
        assert_eq!(
            parsed.warnings,
            vec![
                unrecognized(1, "facebook.com/"),
                unrecognized(2, "example.com:8080"),
                unrecognized(3, "0.0.0.0 my.site/x"),
                unrecognized(4, "*.example.com"),
            ]
        );
    }

    #[test]
    fn test_punycodes_internationalized_hosts() {
        let parsed = parse_host_list("bücher.de\nBÜCHER.de\n");
        assert_eq!(parsed.hosts, vec!["xn--bcher-kva.de", "xn--bcher-kva.de"]);
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_keeps_ip_hosts() {
        let parsed = parse_host_list("192.168.0.1\n");
        assert_eq!(parsed.hosts, vec!["192.168.0.1"]);
    }

    #[test]
    fn test_parses_json_lists() {
        let parsed = parse_host_list_json(r#"["facebook.com", "My.Site"]"#).unwrap();
        assert_eq!(parsed.hosts, vec!["facebook.com", "my.site"]);
        assert!(matches!(parse_host_list_json("[]"), Err(HostListError::NoHosts)));
        assert!(matches!(parse_host_list_json("{"), Err(HostListError::Json(_))));
    }

    #[test]
    fn test_json_entries_match_text_entries() {
        let parsed = parse_host_list_json(
            r#"["https://Social.Gifts/profile", "bücher.de", "facebook.com/", "example.com:8080"]"#,
        )
        .unwrap();
        assert_eq!(parsed.hosts, vec!["social.gifts", "xn--bcher-kva.de"]);
        assert_eq!(
            parsed.warnings,
            vec![unrecognized(3, "facebook.com/"), unrecognized(4, "example.com:8080")]
        );
    }
}
