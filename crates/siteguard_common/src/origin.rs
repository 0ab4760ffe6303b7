//! Origin and hostname parsing.
//!
//! All handlers funnel through these two functions. Invalid input yields
//! `None` ("cannot process"), never a fault.

use url::Url;

/// Normalize a URL or origin string to its origin (scheme://host[:port],
/// default ports omitted).
pub fn parse_origin(input: &str) -> Option<String> {
    let url = Url::parse(input).ok()?;
    let origin = url.origin();
    if !origin.is_tuple() {
        return None;
    }
    Some(origin.ascii_serialization())
}

/// Hostname of a URL or origin string.
pub fn hostname(input: &str) -> Option<String> {
    let url = Url::parse(input).ok()?;
    url.host_str().map(str::to_string)
}
