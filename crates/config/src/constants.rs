//! Fixed names that are deliberately not configurable

/// Directory holding installed dependencies, relative to the working directory
pub const DEPENDENCY_DIR: &str = "node_modules";

/// Manifest file name inside each dependency and upstream repository
pub const MANIFEST_FILE: &str = "package.json";

/// Ignore-list file name looked up upstream
pub const IGNORE_FILE: &str = ".npmignore";

pub const GITHUB_API: &str = "https://api.github.com";

/// Versioned media type sent on every API request
pub const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

pub const GITHUB_API_VERSION: &str = "2022-11-28";
