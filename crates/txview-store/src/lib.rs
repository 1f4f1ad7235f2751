//! JSON document store
//!
//! The document maps user ids to transaction arrays:
//!
//! ```json
//! { "Fake-ID": [ { "id": "tx-1", "type": "card", ... } ] }
//! ```
//!
//! It is re-read on every fetch. Deletions flip the record's `deleted`
//! flag and rewrite the document; records are never removed.

pub mod error;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use txview_core::{
    is_deleted, DeletedFlag, DeletionCapability, DeletionError, SourceLoadError, Transaction,
    TransactionSource, TransactionStatus,
};

pub use error::StoreError;

/// Transaction source and deletion capability backed by one JSON file
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<String, StoreError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))
    }

    /// Records of one user; an unknown user has none
    pub async fn load(&self, user_id: &str) -> Result<Vec<Transaction>, StoreError> {
        let content = self.read_document().await?;
        let mut document: HashMap<String, Vec<Transaction>> = serde_json::from_str(&content)?;
        let records = document.remove(user_id).unwrap_or_default();
        log::debug!("Loaded {} transactions for {} from {}", records.len(), user_id, self.path.display());
        Ok(records)
    }

    /// Set `deleted: true` on an authorization
    pub async fn soft_delete(&self, transaction_id: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let content = self.read_document().await?;
        let mut document: Value = serde_json::from_str(&content)?;
        let users = document.as_object_mut().ok_or_else(|| StoreError::InvalidDocument {
            message: "top level must be an object of user ids".to_string(),
        })?;

        let record = users
            .values_mut()
            .filter_map(Value::as_array_mut)
            .flatten()
            .find(|record| {
                record.get("id").and_then(Value::as_str) == Some(transaction_id)
                    && !is_marked_deleted(record)
            })
            .ok_or_else(|| StoreError::NotFound { id: transaction_id.to_string() })?;

        let status = record
            .get("status")
            .and_then(Value::as_str)
            .map(|s| TransactionStatus::from(s.to_string()))
            .unwrap_or_else(|| TransactionStatus::Other(String::new()));
        if !status.is_deletable() {
            return Err(StoreError::NotDeletable {
                id: transaction_id.to_string(),
                status: status.to_string(),
            });
        }

        if let Some(fields) = record.as_object_mut() {
            fields.insert("deleted".to_string(), Value::Bool(true));
        }

        let serialized = serde_json::to_string_pretty(&document)?;
        self.write_atomic(&serialized).await?;
        log::info!("Soft-deleted transaction {} in {}", transaction_id, self.path.display());
        Ok(())
    }

    /// Write through a sibling temp file and rename over the document
    async fn write_atomic(&self, content: &str) -> Result<(), StoreError> {
        let mut temp_name = self.path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        tokio::fs::write(&temp_path, content)
            .await
            .map_err(|e| StoreError::io(&temp_path, e))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))
    }
}

/// Raw-document view of the soft-delete marker
fn is_marked_deleted(record: &Value) -> bool {
    record
        .get("deleted")
        .and_then(|flag| serde_json::from_value::<DeletedFlag>(flag.clone()).ok())
        .map(|flag| is_deleted(&flag))
        .unwrap_or(false)
}

#[async_trait]
impl TransactionSource for JsonFileStore {
    async fn fetch(&self, user_id: &str) -> Result<Vec<Transaction>, SourceLoadError> {
        self.load(user_id).await.map_err(SourceLoadError::from)
    }
}

#[async_trait]
impl DeletionCapability for JsonFileStore {
    async fn delete(&self, transaction_id: &str) -> Result<(), DeletionError> {
        self.soft_delete(transaction_id).await.map_err(DeletionError::from)
    }
}
