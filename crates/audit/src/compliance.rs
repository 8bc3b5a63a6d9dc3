//! Whitelist compliance evaluation

use serde_json::Value;
use tawata_types::{Compliance, Manifest, ManifestParse};

/// Evaluate a parsed manifest.
///
/// Only an array-valued `files` field counts as a whitelist. Non-string
/// entries are kept as their JSON text.
#[must_use]
pub fn evaluate(manifest: &Manifest) -> Compliance {
    match manifest.get("files") {
        Some(Value::Array(entries)) => Compliance::Whitelist(
            entries
                .iter()
                .map(|entry| match entry {
                    Value::String(pattern) => pattern.clone(),
                    other => other.to_string(),
                })
                .collect(),
        ),
        _ => Compliance::NotDeclared,
    }
}

/// Evaluate a parse outcome; unparsable manifests are `Unknown`.
#[must_use]
pub fn evaluate_parse(parse: &ManifestParse) -> Compliance {
    match parse {
        ManifestParse::Parsed(manifest) => evaluate(manifest),
        ManifestParse::ParseFailed { reason } => Compliance::Unknown(reason.clone()),
    }
}
