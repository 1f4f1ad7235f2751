//! Collaborators consumed by the engine and the state of the last fetch

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{DeletionError, SourceLoadError};
use crate::models::Transaction;

/// Supplies the raw transaction records for a user
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Fetch the current records; re-invocable
    async fn fetch(&self, user_id: &str) -> Result<Vec<Transaction>, SourceLoadError>;
}

/// Removes (cancels) a transaction on the remote side
#[async_trait]
pub trait DeletionCapability: Send + Sync {
    /// Delete the transaction with the given id
    async fn delete(&self, transaction_id: &str) -> Result<(), DeletionError>;
}

/// Synchronous yes/no prompt shown before a deletion
pub trait ConfirmationPrompt: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

/// Prompt whose answer was already given, e.g. by a request parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedAnswer(pub bool);

impl ConfirmationPrompt for FixedAnswer {
    fn confirm(&self, message: &str) -> bool {
        log::debug!("Confirmation '{}' answered {}", message, self.0);
        self.0
    }
}

/// Source reference type
pub type SourceRef = Arc<dyn TransactionSource>;

/// Deletion capability reference type
pub type CapabilityRef = Arc<dyn DeletionCapability>;

/// State of the transaction query
///
/// Records from the previous successful fetch stay available while a
/// refetch is pending and after it fails.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState {
    Loading { previous: Option<Vec<Transaction>> },
    Ready(Vec<Transaction>),
    Failed { error: SourceLoadError, previous: Option<Vec<Transaction>> },
}

impl Default for QueryState {
    fn default() -> Self {
        QueryState::Loading { previous: None }
    }
}

impl QueryState {
    /// Records to feed the pipeline
    pub fn records(&self) -> &[Transaction] {
        match self {
            QueryState::Ready(records) => records,
            QueryState::Loading { previous } | QueryState::Failed { previous, .. } => {
                previous.as_deref().unwrap_or(&[])
            }
        }
    }

    /// Move into `Loading`, keeping whatever records are known
    pub fn start_loading(&mut self) {
        let previous = match std::mem::take(self) {
            QueryState::Ready(records) => Some(records),
            QueryState::Loading { previous } | QueryState::Failed { previous, .. } => previous,
        };
        *self = QueryState::Loading { previous };
    }

    /// Record the result of a fetch
    pub fn finish(&mut self, result: Result<Vec<Transaction>, SourceLoadError>) {
        *self = match (result, std::mem::take(self)) {
            (Ok(records), _) => QueryState::Ready(records),
            (Err(error), QueryState::Ready(records)) => QueryState::Failed {
                error,
                previous: Some(records),
            },
            (Err(error), QueryState::Loading { previous } | QueryState::Failed { previous, .. }) => {
                QueryState::Failed { error, previous }
            }
        };
    }

    /// Loading with nothing to show yet
    pub fn is_initial_load(&self) -> bool {
        matches!(self, QueryState::Loading { previous: None })
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading { .. })
    }

    pub fn error(&self) -> Option<&SourceLoadError> {
        match self {
            QueryState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}
