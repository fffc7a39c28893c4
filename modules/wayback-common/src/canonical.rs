// URL canonicalization: archived URLs carry credential and port noise
// that would otherwise split one resource into several.

/// Strip userinfo and port from a URL's authority.
///
/// Total: URLs the `url` crate rejects still get the authority stripped
/// by plain string splitting and are otherwise passed through untouched.
/// Idempotent.
pub fn canonicalize(raw: &str) -> String {
    let stripped = strip_authority_noise(raw);
    match url::Url::parse(&stripped) {
        Ok(mut parsed) => {
            // Both setters only fail for URLs without a host, which have
            // no credentials or port to begin with.
            let _ = parsed.set_username("");
            let _ = parsed.set_password(None);
            let _ = parsed.set_port(None);
            parsed.to_string()
        }
        Err(_) => stripped,
    }
}

/// Reduce user input to a bare domain: no scheme, no trailing slash.
pub fn normalize_domain(input: &str) -> String {
    let trimmed = input.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    without_scheme.trim_end_matches('/').to_string()
}

/// Top-level folder of a URL as `/segment/`, or `Root` when the path is empty.
pub fn top_folder(url: &str) -> String {
    let path = path_component(url).trim_matches('/');
    match path.split('/').next() {
        Some(first) if !first.is_empty() => format!("/{first}/"),
        _ => "Root".to_string(),
    }
}

/// The URL with its query string and fragment removed.
pub fn url_path(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

/// Byte range of the authority section, if the URL has one.
fn authority_range(raw: &str) -> Option<(usize, usize)> {
    let start = match raw.find("://") {
        Some(idx) if is_scheme(&raw[..idx]) => idx + 3,
        _ if raw.starts_with("//") => 2,
        _ => return None,
    };
    let len = raw[start..]
        .find(['/', '?', '#'])
        .unwrap_or(raw.len() - start);
    Some((start, start + len))
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn strip_authority_noise(raw: &str) -> String {
    let Some((start, end)) = authority_range(raw) else {
        return raw.to_string();
    };
    let authority = &raw[start..end];
    let host_port = authority.rsplit('@').next().unwrap_or(authority);
    let host = if host_port.starts_with('[') {
        // IPv6 literal: keep everything through the closing bracket
        match host_port.find(']') {
            Some(close) => &host_port[..=close],
            None => host_port,
        }
    } else {
        host_port.split(':').next().unwrap_or(host_port)
    };

    let mut out = String::with_capacity(raw.len());
    out.push_str(&raw[..start]);
    out.push_str(host);
    out.push_str(&raw[end..]);
    out
}

/// Path portion of a URL, without query or fragment.
fn path_component(url: &str) -> &str {
    let path_and_more = match authority_range(url) {
        Some((_, end)) => &url[end..],
        None => url,
    };
    url_path(path_and_more)
}
