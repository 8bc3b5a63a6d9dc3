//! Repository identity resolution from manifest metadata

use serde_json::Value;
use tawata_types::{Manifest, RepoIdentity};

/// Resolve the upstream `owner/name` from a manifest's `repository` field.
///
/// Accepts the string form and the object form (`{ "url": ... }`). Any other
/// shape, or a URL that does not point at GitHub, yields `None`.
#[must_use]
pub fn resolve_identity(manifest: &Manifest) -> Option<RepoIdentity> {
    let raw = match manifest.get("repository")? {
        Value::String(url) => url.as_str(),
        Value::Object(fields) => fields.get("url")?.as_str()?,
        _ => return None,
    };
    normalize_repository_url(raw)
}

/// Reduce a repository URL to its canonical identity.
///
/// Drops any `#fragment`, trailing slashes and `.git`, then everything up to
/// and including the last `github.com/` (or scp-style `github.com:`).
#[must_use]
pub fn normalize_repository_url(raw: &str) -> Option<RepoIdentity> {
    let url = raw.trim();
    let url = url.split_once('#').map_or(url, |(head, _)| head);
    let url = url.trim_end_matches('/');
    let url = url.strip_suffix(".git").unwrap_or(url);

    let path = ["github.com/", "github.com:"]
        .iter()
        .filter_map(|marker| url.rfind(marker).map(|at| at + marker.len()))
        .max()
        .map_or(url, |start| &url[start..]);

    // npm shorthand: "github:owner/name"
    let path = path.strip_prefix("github:").unwrap_or(path);

    RepoIdentity::parse(path)
}
