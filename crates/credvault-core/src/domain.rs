//! Canonical display domains for platform names and URLs
//!
//! Collapses a URL or free-text platform to something like `int.pl`:
//! - scheme, path, query and fragment are dropped
//! - a `www.` prefix and `:port` suffix are dropped
//! - hosts with more than two labels keep only the last two
//!
//! This is a display heuristic, not public-suffix resolution: `a.b.co.uk`
//! becomes `co.uk`.

const SCHEMES: [&str; 2] = ["https://", "http://"];
const WWW: &str = "www.";

/// Normalize a URL or platform name to its root display domain.
///
/// Total: every input maps to some string, and `normalize(normalize(x))`
/// equals `normalize(x)`. Each pass only removes characters, so repeating it
/// until nothing changes terminates.
pub fn normalize(raw: &str) -> String {
    let mut current = raw;
    loop {
        let next = normalize_once(current);
        if next.len() == current.len() {
            return next.to_string();
        }
        current = next;
    }
}

fn normalize_once(raw: &str) -> &str {
    let mut host = raw.trim();

    for scheme in SCHEMES {
        if let Some(rest) = strip_prefix_ignore_case(host, scheme) {
            host = rest;
            break;
        }
    }

    host = cut_at(host, &['/']);
    host = cut_at(host, &['?', '#']);
    host = strip_www(host);
    host = strip_port(host);
    host = host.trim_end_matches('.');

    // keep the last two labels
    if let Some(idx) = host.rmatch_indices('.').nth(1).map(|(idx, _)| idx) {
        host = &host[idx + 1..];
    }

    strip_www(host)
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

fn cut_at<'a>(s: &'a str, stops: &[char]) -> &'a str {
    match s.find(stops) {
        Some(idx) => &s[..idx],
        None => s,
    }
}

fn strip_www(mut host: &str) -> &str {
    while let Some(rest) = strip_prefix_ignore_case(host, WWW) {
        host = rest;
    }
    host
}

fn strip_port(host: &str) -> &str {
    match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    }
}
