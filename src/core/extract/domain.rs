//! Domain derivation from source URLs.

use url::Url;

/// Host of `url` without scheme, credentials, port, path or `www.` prefix
///
/// Lowercased. Applying it to its own output returns the same value.
/// Input without a recognisable host yields whatever remains after
/// stripping, possibly an empty string.
pub fn domain_of(url: &str) -> String {
    let url = url.trim();

    if url.contains("://") {
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                return normalize_host(host);
            }
        }
    }

    normalize_host(manual_host(url))
}

/// Best-effort host extraction for strings the URL parser rejects
fn manual_host(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, host)| host);

    if host_port.starts_with('[') {
        return host_port
            .find(']')
            .map_or(host_port, |end| &host_port[..=end]);
    }
    host_port.split(':').next().unwrap_or_default()
}

fn normalize_host(host: &str) -> String {
    let mut host = host.trim_end_matches('.').to_lowercase();
    while let Some(stripped) = host.strip_prefix("www.") {
        host = stripped.to_string();
    }
    host
}
