use crate::error::PrefixStoreError;
use graphdesk_model::PrefixTable;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

/// The durable prefix registry.
///
/// The table is loaded eagerly when the store is opened and rewritten in full
/// on every mutation, before the in-memory table is updated. A persistence
/// failure therefore leaves the in-memory table at its pre-call state, so
/// memory and disk never diverge.
///
/// The file holds the flat `prefix -> namespace` map as JSON; the default
/// namespace is configuration, not data, and is not persisted.
#[derive(Debug)]
pub struct PrefixStore {
    path: PathBuf,
    table: RwLock<PrefixTable>,
}

impl PrefixStore {
    /// Opens the store, loading the table from `path`.
    ///
    /// A missing file yields an empty table; a file that exists but does not
    /// parse is an error.
    pub fn open(
        path: impl Into<PathBuf>,
        default_namespace: impl Into<String>,
    ) -> Result<Self, PrefixStoreError> {
        let path = path.into();
        let entries: BTreeMap<String, String> = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            table: RwLock::new(PrefixTable::from_entries(default_namespace, entries)),
        })
    }

    /// Returns a read-only snapshot of the current table.
    pub fn snapshot(&self) -> PrefixTable {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Registers a new prefix. Fails if the prefix is already registered.
    pub fn add(&self, prefix: &str, namespace: &str) -> Result<(), PrefixStoreError> {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        if table.contains(prefix) {
            return Err(PrefixStoreError::AlreadyExists(prefix.to_owned()));
        }
        let mut next = table.clone();
        next.insert(prefix, namespace);
        self.persist(&next)?;
        *table = next;
        Ok(())
    }

    /// Inserts or overwrites a prefix unconditionally.
    pub fn update(&self, prefix: &str, namespace: &str) -> Result<(), PrefixStoreError> {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = table.clone();
        next.insert(prefix, namespace);
        self.persist(&next)?;
        *table = next;
        Ok(())
    }

    /// Removes a prefix. Fails if the prefix is not registered.
    pub fn remove(&self, prefix: &str) -> Result<(), PrefixStoreError> {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        if !table.contains(prefix) {
            return Err(PrefixStoreError::NotFound(prefix.to_owned()));
        }
        let mut next = table.clone();
        next.remove(prefix);
        self.persist(&next)?;
        *table = next;
        Ok(())
    }

    fn persist(&self, table: &PrefixTable) -> Result<(), PrefixStoreError> {
        let json = serde_json::to_vec_pretty(table.entries())?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
