//! Lock records and the lock store contract
//!
//! The lock file (verlock.lock) records the exact version and checksum each
//! dependency resolved to, for reproducible downloads. A lock is replaced as a
//! whole on the next successful resolution and never partially updated.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::core::version::DependencyVersion;
use crate::error::LockStoreError;

/// Current lock file format version
pub const LOCK_FORMAT_VERSION: u32 = 1;

/// A resolved, downloaded dependency
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DependencyLock {
    /// Dependency name (one lock per name)
    pub name: String,

    /// Resolved version
    pub version: DependencyVersion,

    /// Strategy that produced the version
    pub strategy: String,

    /// Artifact URL
    pub url: String,

    /// SHA256 checksum of the artifact
    pub sha256: String,

    /// Artifact size in bytes
    pub size: u64,
}

/// Lock file structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockFile {
    /// Lock file format version
    pub version: u32,

    /// Locks keyed by dependency name, sorted for stable output
    #[serde(default)]
    pub dependencies: BTreeMap<String, LockEntry>,
}

/// A lock as stored in the lock file, keyed by its name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockEntry {
    /// Resolved version
    pub version: DependencyVersion,
    /// Strategy that produced the version
    pub strategy: String,
    /// Artifact URL
    pub url: String,
    /// SHA256 checksum of the artifact
    pub sha256: String,
    /// Artifact size in bytes
    #[serde(default)]
    pub size: u64,
}

impl LockEntry {
    fn into_lock(self, name: String) -> DependencyLock {
        DependencyLock {
            name,
            version: self.version,
            strategy: self.strategy,
            url: self.url,
            sha256: self.sha256,
            size: self.size,
        }
    }
}

impl From<&DependencyLock> for LockEntry {
    fn from(lock: &DependencyLock) -> Self {
        Self {
            version: lock.version.clone(),
            strategy: lock.strategy.clone(),
            url: lock.url.clone(),
            sha256: lock.sha256.clone(),
            size: lock.size,
        }
    }
}

impl LockFile {
    /// Create an empty lock file
    pub fn new() -> Self {
        Self {
            version: LOCK_FORMAT_VERSION,
            dependencies: BTreeMap::new(),
        }
    }

    /// Parse from TOML string
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Insert or replace the lock for its name
    pub fn upsert(&mut self, lock: &DependencyLock) {
        self.dependencies
            .insert(lock.name.clone(), LockEntry::from(lock));
    }

    /// Remove a lock, returning whether one existed
    pub fn remove(&mut self, name: &str) -> bool {
        self.dependencies.remove(name).is_some()
    }

    /// All locks keyed by name
    pub fn locks(&self) -> BTreeMap<String, DependencyLock> {
        self.dependencies
            .iter()
            .map(|(name, entry)| (name.clone(), entry.clone().into_lock(name.clone())))
            .collect()
    }
}

impl Default for LockFile {
    fn default() -> Self {
        Self::new()
    }
}

/// Persistent mapping from dependency name to its lock
///
/// `write` is an atomic per-name upsert; concurrent writes for different
/// names must both land without interleaving.
#[async_trait]
pub trait LockStore: Send + Sync {
    /// Read every lock
    async fn read_all(&self) -> Result<BTreeMap<String, DependencyLock>, LockStoreError>;

    /// Read the lock for one name
    async fn get(&self, name: &str) -> Result<Option<DependencyLock>, LockStoreError> {
        Ok(self.read_all().await?.remove(name))
    }

    /// Insert or replace the lock for `lock.name`
    async fn write(&self, lock: &DependencyLock) -> Result<(), LockStoreError>;

    /// Remove the lock for a name, returning whether one existed
    async fn remove(&self, name: &str) -> Result<bool, LockStoreError>;
}

/// In-process lock store
#[derive(Debug, Default)]
pub struct MemoryLockStore {
    file: RwLock<LockFile>,
}

impl MemoryLockStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with locks
    pub fn with_locks(locks: impl IntoIterator<Item = DependencyLock>) -> Self {
        let mut file = LockFile::new();
        for lock in locks {
            file.upsert(&lock);
        }
        Self {
            file: RwLock::new(file),
        }
    }
}

#[async_trait]
impl LockStore for MemoryLockStore {
    async fn read_all(&self) -> Result<BTreeMap<String, DependencyLock>, LockStoreError> {
        Ok(self.file.read().await.locks())
    }

    async fn get(&self, name: &str) -> Result<Option<DependencyLock>, LockStoreError> {
        Ok(self
            .file
            .read()
            .await
            .dependencies
            .get(name)
            .cloned()
            .map(|entry| entry.into_lock(name.to_string())))
    }

    async fn write(&self, lock: &DependencyLock) -> Result<(), LockStoreError> {
        self.file.write().await.upsert(lock);
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<bool, LockStoreError> {
        Ok(self.file.write().await.remove(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::generators::{dependency_name, sha256_hash};
    use proptest::prelude::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn lock(name: &str, version: &str) -> DependencyLock {
        DependencyLock {
            name: name.to_string(),
            version: DependencyVersion::parse(version).unwrap(),
            strategy: "remote-tag".to_string(),
            url: format!("https://api.github.com/repos/o/{name}/tarball/v{version}"),
            sha256: "ab".repeat(32),
            size: 42,
        }
    }

    #[test]
    fn test_lock_file_toml_round_trip() {
        let mut file = LockFile::new();
        file.upsert(&lock("zlib", "1.3.1"));
        file.upsert(&lock("busybox", "1.36-rc.1"));

        let text = file.to_toml().unwrap();
        assert!(text.contains("version = 1"));
        assert!(text.contains("[dependencies.busybox]"));
        assert!(text.contains("version = \"1.36-rc.1\""));
        // BTreeMap keeps names sorted
        assert!(text.find("busybox").unwrap() < text.find("zlib").unwrap());

        let parsed = LockFile::from_toml(&text).unwrap();
        assert_eq!(parsed, file);
        assert_eq!(parsed.locks()["zlib"], lock("zlib", "1.3.1"));
    }

    #[test]
    fn test_lock_file_rejects_bad_version() {
        let text = r#"
version = 1

[dependencies.x]
version = "not-a-version"
strategy = "static"
url = "u"
sha256 = "s"
"#;
        assert!(LockFile::from_toml(text).is_err());
    }

    #[test]
    fn test_upsert_replaces_whole_entry() {
        let mut file = LockFile::new();
        file.upsert(&lock("a", "1.0"));
        let mut newer = lock("a", "2.0");
        newer.size = 7;
        file.upsert(&newer);

        assert_eq!(file.dependencies.len(), 1);
        assert_eq!(file.locks()["a"], newer);
    }

    #[tokio::test]
    async fn test_memory_store_operations() {
        let store = MemoryLockStore::with_locks([lock("a", "1.0")]);
        assert_eq!(store.get("a").await.unwrap(), Some(lock("a", "1.0")));
        assert_eq!(store.get("b").await.unwrap(), None);

        store.write(&lock("b", "0.1")).await.unwrap();
        assert_eq!(store.read_all().await.unwrap().len(), 2);

        assert!(store.remove("a").await.unwrap());
        assert!(!store.remove("a").await.unwrap());
        assert_eq!(store.read_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_concurrent_writes() {
        let store = Arc::new(MemoryLockStore::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.write(&lock(&format!("dep{i}"), "1.0")).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(store.read_all().await.unwrap().len(), 16);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The lock file holds one entry per name, from the last upsert
        #[test]
        fn prop_last_upsert_per_name_wins(
            writes in proptest::collection::vec((dependency_name(), sha256_hash()), 1..12),
        ) {
            let mut file = LockFile::new();
            let mut expected = HashMap::new();
            for (name, hash) in &writes {
                let mut entry = lock(name, "1.0");
                entry.sha256 = hash.clone();
                file.upsert(&entry);
                expected.insert(name.clone(), hash.clone());
            }

            let parsed = LockFile::from_toml(&file.to_toml().unwrap()).unwrap();
            prop_assert_eq!(parsed.dependencies.len(), expected.len());
            for (name, hash) in &expected {
                prop_assert_eq!(&parsed.dependencies[name].sha256, hash);
            }
        }
    }
}
