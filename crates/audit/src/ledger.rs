//! Persistent record of filed remediation issues

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tawata_errors::{Error, ScanError};
use tawata_types::RepoIdentity;

const LEDGER_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct LedgerFile {
    version: u32,
    #[serde(default)]
    entries: BTreeMap<String, DateTime<Utc>>,
}

/// Repository identities with the time an issue was last filed on them
#[derive(Debug)]
pub struct RemediationLedger {
    path: PathBuf,
    entries: DashMap<String, DateTime<Utc>>,
}

impl RemediationLedger {
    /// Load the ledger at `path`; a missing file is an empty ledger.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::LedgerUnavailable` if the file exists but cannot be
    /// read or parsed.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let mut entries = DashMap::new();

        match tokio::fs::read_to_string(&path).await {
            Ok(text) => {
                let file: LedgerFile =
                    serde_json::from_str(&text).map_err(|e| unavailable(&path, &e))?;
                if file.version != LEDGER_VERSION {
                    return Err(ScanError::LedgerUnavailable {
                        path: path.display().to_string(),
                        message: format!("unsupported ledger version {}", file.version),
                    }
                    .into());
                }
                entries.extend(file.entries);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(unavailable(&path, &e)),
        }

        Ok(Self { path, entries })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn last_attempt(&self, identity: &RepoIdentity) -> Option<DateTime<Utc>> {
        self.entries.get(&identity.to_string()).map(|entry| *entry)
    }

    /// Last attempt on `identity` if it falls inside the cooldown window.
    #[must_use]
    pub fn within_cooldown(
        &self,
        identity: &RepoIdentity,
        cooldown_days: u32,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        if cooldown_days == 0 {
            return None;
        }
        self.last_attempt(identity)
            .filter(|last| now - *last < Duration::days(i64::from(cooldown_days)))
    }

    pub fn record(&self, identity: &RepoIdentity, at: DateTime<Utc>) {
        self.entries.insert(identity.to_string(), at);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the ledger back to disk, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::LedgerUnavailable` if the file cannot be written.
    pub async fn save(&self) -> Result<(), Error> {
        let file = LedgerFile {
            version: LEDGER_VERSION,
            entries: self
                .entries
                .iter()
                .map(|entry| (entry.key().clone(), *entry.value()))
                .collect(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|e| unavailable(&self.path, &e))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| unavailable(&self.path, &e))?;
        }
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| unavailable(&self.path, &e))?;
        Ok(())
    }
}

fn unavailable(path: &Path, error: &dyn std::fmt::Display) -> Error {
    ScanError::LedgerUnavailable {
        path: path.display().to_string(),
        message: error.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn widget() -> RepoIdentity {
        RepoIdentity::parse("acme/widget").unwrap()
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let temp = tempdir().unwrap();
        let ledger = RemediationLedger::load(temp.path().join("ledger.json"))
            .await
            .unwrap();
        assert!(ledger.is_empty());
        assert!(ledger.last_attempt(&widget()).is_none());
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("state/ledger.json");
        let at = Utc::now();

        let ledger = RemediationLedger::load(&path).await.unwrap();
        ledger.record(&widget(), at);
        ledger.save().await.unwrap();

        let reloaded = RemediationLedger::load(&path).await.unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.last_attempt(&widget()), Some(at));
    }

    #[tokio::test]
    async fn test_cooldown_window() {
        let temp = tempdir().unwrap();
        let ledger = RemediationLedger::load(temp.path().join("l.json"))
            .await
            .unwrap();
        let now = Utc::now();
        ledger.record(&widget(), now - Duration::days(3));

        assert!(ledger.within_cooldown(&widget(), 30, now).is_some());
        assert!(ledger.within_cooldown(&widget(), 2, now).is_none());
        assert!(ledger.within_cooldown(&widget(), 0, now).is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_unavailable() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("ledger.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let err = RemediationLedger::load(&path).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Scan(ScanError::LedgerUnavailable { .. })
        ));
    }
}
