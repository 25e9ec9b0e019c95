//! SQLite-backed vehicle store
//!
//! A single `vehicles` table keyed internally by `p_key`, with VEH_ID as the
//! user-facing unique identifier. Every call runs one statement and commits;
//! multi-row writes (import, placeholder generation) go through
//! [`StoreTx`], which rolls back unless committed.

mod queries;
mod schema;

pub use queries::SearchField;

use miette::Diagnostic;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::entities::vehicle::VehicleRecord;

/// Table holding every vehicle
pub(crate) const TABLE: &str = "vehicles";

/// Internal key column, never shown to users
pub const KEY_COLUMN: &str = "p_key";

/// The vehicle store backed by SQLite
pub struct VehicleStore {
    conn: Connection,
}

/// Errors raised by the storage layer
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("database error: {0}")]
    #[diagnostic(code(fleet::store::sqlite))]
    Sqlite(#[from] rusqlite::Error),

    #[error("cannot create database directory {path:?}: {source}")]
    #[diagnostic(code(fleet::store::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl VehicleStore {
    /// Open or create the store at `path`, creating the table if missing
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened vehicle store");

        let store = Self { conn };
        store.create_if_missing()?;
        Ok(store)
    }

    /// Open a throwaway store (tests and dry runs)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.create_if_missing()?;
        Ok(store)
    }

    /// Start a multi-statement write; dropped without `commit` it rolls back
    pub fn begin(&mut self) -> Result<StoreTx<'_>, StoreError> {
        Ok(StoreTx {
            tx: self.conn.transaction()?,
        })
    }
}

/// An open write transaction on the store
pub struct StoreTx<'a> {
    tx: rusqlite::Transaction<'a>,
}

impl StoreTx<'_> {
    /// Plain insert; a colliding VEH_ID fails
    pub fn insert(&self, record: &VehicleRecord) -> Result<i64, StoreError> {
        queries::insert_record(&self.tx, record)
    }

    /// Insert or overwrite by VEH_ID
    pub fn upsert(&self, record: &VehicleRecord) -> Result<i64, StoreError> {
        queries::upsert_record(&self.tx, record)
    }

    /// Number of rows whose VEHICLE_TYPE equals `label`
    pub fn count_of_type(&self, label: &str) -> Result<u64, StoreError> {
        queries::count_of_type(&self.tx, label)
    }

    pub fn veh_id_exists(&self, veh_id: &str) -> Result<bool, StoreError> {
        queries::veh_id_exists(&self.tx, veh_id)
    }

    pub fn commit(self) -> Result<(), StoreError> {
        self.tx.commit()?;
        Ok(())
    }
}
