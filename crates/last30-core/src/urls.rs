//! Small URL helpers shared by sources and ranking.
//!
//! Only what the pipeline needs: host extraction, domain matching, and a
//! canonical form for duplicate detection.

/// Lowercased host of `url` without a leading `www.` or port.
#[must_use]
pub fn host_of(url: &str) -> Option<String> {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next()?;
    let host = authority.rsplit('@').next()?;
    let host = host.split(':').next()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

/// Path component of `url` (always starts with `/`).
#[must_use]
pub fn path_of(url: &str) -> String {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = rest
        .find('/')
        .map_or("", |idx| &rest[idx..])
        .split(['?', '#'])
        .next()
        .unwrap_or("");
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

/// Whether `host` is `domain` or one of its subdomains.
#[must_use]
pub fn domain_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Whether `url` points at `domain` or one of its subdomains.
#[must_use]
pub fn is_on_domain(url: &str, domain: &str) -> bool {
    host_of(url).is_some_and(|host| domain_matches(&host, domain))
}

/// Query parameters that only track where a click came from.
const TRACKING_PARAMS: [&str; 7] = ["ref", "ref_src", "ref_url", "fbclid", "gclid", "igshid", "si"];

fn is_tracking_param(pair: &str) -> bool {
    let key = pair.split('=').next().unwrap_or(pair).to_ascii_lowercase();
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key.as_str())
}

/// Canonical form used to detect the same page under different spellings.
///
/// Drops the scheme, `www.`, fragment, trailing slash and tracking
/// parameters; lowercases the host; keeps every other query parameter in
/// its original order.
#[must_use]
pub fn canonical_url(url: &str) -> String {
    let trimmed = url.trim();
    let Some(host) = host_of(trimmed) else {
        return trimmed.to_ascii_lowercase();
    };
    let rest = trimmed.split_once("://").map_or(trimmed, |(_, rest)| rest);
    let tail = rest.find(['/', '?']).map_or("", |idx| &rest[idx..]);
    let tail = tail.split('#').next().unwrap_or("");
    let (path, query) = tail.split_once('?').map_or((tail, None), |(p, q)| (p, Some(q)));
    let path = path.trim_end_matches('/');
    let query = query
        .unwrap_or("")
        .split('&')
        .filter(|pair| !pair.is_empty() && !is_tracking_param(pair))
        .collect::<Vec<_>>()
        .join("&");
    if query.is_empty() {
        format!("{host}{path}")
    } else {
        format!("{host}{path}?{query}")
    }
}
