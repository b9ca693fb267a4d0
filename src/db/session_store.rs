use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{de::DeserializeOwned, Serialize};

use crate::db::Database;

/// Independently persisted piece of a recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slice {
    Parameters,
    Values,
    Problems,
    Cursor,
    View,
}

impl Slice {
    pub const ALL: [Slice; 5] = [
        Slice::Parameters,
        Slice::Values,
        Slice::Problems,
        Slice::Cursor,
        Slice::View,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Slice::Parameters => "parameters",
            Slice::Values => "values",
            Slice::Problems => "problems",
            Slice::Cursor => "cursor",
            Slice::View => "view",
        }
    }
}

/// JSON slices of one record type's session, keyed `<namespace>.<slice>`.
#[derive(Clone)]
pub struct SessionStore {
    db: Database,
    namespace: &'static str,
}

impl SessionStore {
    pub fn new(db: Database, namespace: &'static str) -> Self {
        Self { db, namespace }
    }

    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn key(&self, slice: Slice) -> String {
        format!("{}.{}", self.namespace, slice.as_str())
    }

    /// Stored slice, or `default` when it is absent or does not decode.
    pub async fn load<T: DeserializeOwned>(&self, slice: Slice, default: T) -> Result<T> {
        let key = self.key(slice);
        let Some(raw) = self.db.get_value(&key).await? else {
            return Ok(default);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!("Discarding malformed stored value for {key}: {err}");
                Ok(default)
            }
        }
    }

    pub async fn save<T: Serialize>(&self, slice: Slice, value: &T) -> Result<()> {
        let key = self.key(slice);
        let serialized = serde_json::to_string(value)
            .with_context(|| format!("failed to serialize {key}"))?;
        debug!("Persisting {key} ({} bytes)", serialized.len());
        self.db.put_value(&key, serialized).await
    }

    /// Wipes every slice of this namespace.
    pub async fn clear(&self) -> Result<()> {
        let keys = Slice::ALL.iter().map(|slice| self.key(*slice)).collect();
        let removed = self.db.delete_values(keys).await?;
        info!("Cleared {removed} stored slices for {}", self.namespace);
        Ok(())
    }
}
