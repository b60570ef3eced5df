//! # Apex Zone
//!
//! Normalized `<second-level-label>.<top-level-label>` value object.

use super::errors::MalformedInputError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum dot-separated labels accepted in a submitted host.
///
/// `a.b.c.d.e.com` (6 labels) is rejected; `a.b.c.example.com` (5) is
/// accepted.
pub const MAX_LABELS: usize = 5;

/// A registrable domain with subdomains stripped, lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApexZone(String);

impl ApexZone {
    /// Reduce a host name to its apex zone.
    ///
    /// The host is lowercased and split on `.`. It must have between 2 and
    /// [`MAX_LABELS`] labels, each non-empty and made of alphanumerics or
    /// inner hyphens. The TLD must not be purely numeric (rejects IPv4).
    pub fn from_host(host: &str) -> Result<Self, MalformedInputError> {
        let host = host.to_lowercase();
        let labels: Vec<&str> = host.split('.').collect();

        if labels.len() < 2 {
            return Err(MalformedInputError::TooFewLabels { host });
        }
        if labels.len() > MAX_LABELS {
            return Err(MalformedInputError::TooDeep {
                labels: labels.len(),
                max: MAX_LABELS,
                host,
            });
        }
        if !labels.iter().all(|label| is_valid_label(label)) {
            return Err(MalformedInputError::InvalidLabel { host });
        }

        let tld = labels[labels.len() - 1];
        if tld.chars().all(|c| c.is_ascii_digit()) {
            return Err(MalformedInputError::InvalidLabel { host });
        }
        let apex = labels[labels.len() - 2];

        Ok(Self(format!("{apex}.{tld}")))
    }

    /// Parse an already-reduced zone. Exactly two labels are required.
    pub fn parse(zone: &str) -> Result<Self, MalformedInputError> {
        let parsed = Self::from_host(zone)?;
        if parsed.0 != zone.to_lowercase() {
            return Err(MalformedInputError::InvalidLabel {
                host: zone.to_string(),
            });
        }
        Ok(parsed)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The second-level label (`example` in `example.com`).
    pub fn apex(&self) -> &str {
        self.0.split_once('.').map_or(&self.0[..], |(apex, _)| apex)
    }

    /// The top-level label (`com` in `example.com`).
    pub fn tld(&self) -> &str {
        self.0.split_once('.').map_or(&self.0[..], |(_, tld)| tld)
    }
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_alphanumeric() || c == '-')
}

impl fmt::Display for ApexZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ApexZone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ApexZone {
    type Error = MalformedInputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ApexZone> for String {
    fn from(zone: ApexZone) -> Self {
        zone.0
    }
}
