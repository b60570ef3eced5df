//! # Domain Extraction
//!
//! Derives a candidate apex zone from free-form message text.
//!
//! ```text
//! "see https://user@Sub.Example.com:8443/x?y=1 please"
//!      └── first URL-like / bare-host token
//!          └── strip scheme, userinfo, path/query/fragment, port
//!              └── "sub.example.com" → ApexZone("example.com")
//! ```

use super::apex_zone::ApexZone;
use super::errors::MalformedInputError;

/// Characters stripped from both ends of a candidate token (quotes, brackets,
/// sentence punctuation, markdown code ticks).
const TOKEN_TRIM: &[char] = &[
    '"', '\'', '`', '<', '>', '(', ')', '[', ']', '{', '}', ',', ';', '!', '?', '.', '«', '»',
];

/// Extract the apex zone of the first URL or host name in `message`.
pub fn extract_apex_zone(message: &str) -> Result<ApexZone, MalformedInputError> {
    let token = first_host_token(message).ok_or(MalformedInputError::NoHostToken)?;
    let host = host_part(token);
    if host.is_empty() {
        return Err(MalformedInputError::NoHostToken);
    }
    ApexZone::from_host(host)
}

/// First whitespace-separated token that looks like a URL or a dotted host.
fn first_host_token(message: &str) -> Option<&str> {
    message
        .split_whitespace()
        .map(|token| token.trim_matches(TOKEN_TRIM))
        .find(|token| token.contains("://") || token.contains('.'))
}

/// Reduce a URL-like token to its host component.
fn host_part(token: &str) -> &str {
    let rest = match token.find("://") {
        Some(idx) => &token[idx + 3..],
        None => token,
    };
    let authority = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host_port = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host);
    let host = match host_port.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => host_port,
    };
    host.trim_end_matches('.')
}
