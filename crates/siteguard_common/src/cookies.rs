//! Cookie metrics, including the third-party estimate.
//!
//! The cookie list itself comes from an external snapshot; this module only
//! derives figures from it.

use serde::{Deserialize, Serialize};

/// A cookie as reported by the external snapshot. Only the fields the
/// heuristics need.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
}

/// Aggregate cookie metrics for one origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieStats {
    pub cookies_count: u32,
    pub cookies_bytes_estimate: u64,
    pub third_party_cookies: u32,
}

/// Fixed per-cookie overhead added to the byte estimate. All byte figures
/// here are proxies, not exact accounting.
const COOKIE_OVERHEAD_BYTES: u64 = 32;

/// Compute metrics for the cookies visible to `origin_host`.
///
/// A cookie counts as third-party when its domain (leading dot and `www.`
/// stripped) is neither equal to, an ancestor of, nor a descendant of the
/// origin's hostname. Domain-suffix comparison only; not perfect, but
/// strong enough.
pub fn cookie_stats(origin_host: &str, cookies: &[Cookie]) -> CookieStats {
    let host = origin_host.strip_prefix("www.").unwrap_or(origin_host);

    let mut third_party = 0u32;
    let mut bytes = 0u64;

    for cookie in cookies {
        let domain = cookie.domain.trim_start_matches('.');
        let domain = domain.strip_prefix("www.").unwrap_or(domain);

        if !domain.is_empty()
            && domain != host
            && !host.ends_with(&format!(".{domain}"))
            && !domain.ends_with(&format!(".{host}"))
        {
            third_party += 1;
        }

        bytes += (cookie.name.len() + cookie.value.len() + cookie.domain.len() + cookie.path.len())
            as u64
            + COOKIE_OVERHEAD_BYTES;
    }

    CookieStats {
        cookies_count: cookies.len() as u32,
        cookies_bytes_estimate: bytes,
        third_party_cookies: third_party,
    }
}
