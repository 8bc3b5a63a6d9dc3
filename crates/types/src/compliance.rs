//! Manifest parse outcomes and whitelist compliance results

use serde::{Deserialize, Serialize};

/// A parsed `package.json`: string keys to arbitrary JSON values.
pub type Manifest = serde_json::Map<String, serde_json::Value>;

/// Outcome of parsing manifest text.
///
/// Parse failures are kept as a distinct state so that a corrupt manifest is
/// never mistaken for one that simply declares nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestParse {
    Parsed(Manifest),
    ParseFailed { reason: String },
}

impl ManifestParse {
    /// Parse JSON text into a manifest object.
    ///
    /// Documents that are valid JSON but not an object count as failures.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(text) {
            Ok(serde_json::Value::Object(map)) => Self::Parsed(map),
            Ok(_) => Self::ParseFailed {
                reason: "manifest is not a JSON object".to_string(),
            },
            Err(e) => Self::ParseFailed {
                reason: e.to_string(),
            },
        }
    }

    #[must_use]
    pub fn manifest(&self) -> Option<&Manifest> {
        match self {
            Self::Parsed(manifest) => Some(manifest),
            Self::ParseFailed { .. } => None,
        }
    }

    /// String value of a top-level manifest field, if present.
    #[must_use]
    pub fn string_field(&self, key: &str) -> Option<String> {
        self.manifest()?
            .get(key)
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
    }
}

/// Whether a manifest declares a publish whitelist (`files`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum Compliance {
    /// `files` is present and is an array; entries in declaration order.
    Whitelist(Vec<String>),
    /// No `files` array.
    NotDeclared,
    /// The manifest could not be parsed.
    Unknown(String),
}

impl Compliance {
    #[must_use]
    pub fn is_whitelist(&self) -> bool {
        matches!(self, Self::Whitelist(_))
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }

    /// Short label used in tables and logs.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Whitelist(entries) => format!("files ({})", entries.len()),
            Self::NotDeclared => "not declared".to_string(),
            Self::Unknown(_) => "unknown".to_string(),
        }
    }
}
