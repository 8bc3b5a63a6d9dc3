//! Canonical repository identity

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical `owner/name` identity of a GitHub repository.
///
/// Never carries a scheme, a host prefix or a trailing `.git`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoIdentity {
    owner: String,
    name: String,
}

impl RepoIdentity {
    /// Parse an already-normalized `owner/name` string.
    ///
    /// Returns `None` unless the input is exactly two non-empty segments
    /// without whitespace, `:` or a `.git` suffix.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let (owner, name) = value.split_once('/')?;
        let valid = |segment: &str| {
            !segment.is_empty()
                && !segment.contains('/')
                && !segment.contains(':')
                && !segment.chars().any(char::is_whitespace)
        };
        if !valid(owner) || !valid(name) || name.ends_with(".git") {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RepoIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl From<RepoIdentity> for String {
    fn from(identity: RepoIdentity) -> Self {
        identity.to_string()
    }
}

impl TryFrom<String> for RepoIdentity {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid repository identity: {value}"))
    }
}
