//! Deletion workflow
//!
//! One workflow instance is owned by the whole list, so its phase doubles
//! as the global busy flag: while it is not `Idle`, no row may start a
//! deletion.
//!
//! ```text
//! Idle --request--> Confirming --no--> Idle
//!                        |
//!                       yes
//!                        v
//!                    InFlight --ok--> Idle (+ refresh request)
//!                        |
//!                       err
//!                        v
//!                     Failed --reported--> Idle
//! ```

use serde::Serialize;
use tokio::sync::mpsc;

use crate::error::{CoreError, CoreResult, DeletionError, ErrorContext, ErrorLogger};
use crate::models::Transaction;

/// Workflow phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DeletionPhase {
    #[default]
    Idle,
    Confirming,
    InFlight,
    Failed,
}

impl std::fmt::Display for DeletionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeletionPhase::Idle => write!(f, "idle"),
            DeletionPhase::Confirming => write!(f, "confirming"),
            DeletionPhase::InFlight => write!(f, "in-flight"),
            DeletionPhase::Failed => write!(f, "failed"),
        }
    }
}

/// Phase and target, as exposed to the render surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct DeletionState {
    pub phase: DeletionPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// Most recent failed deletion, kept until the next request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastFailure {
    pub id: String,
    pub message: String,
}

/// Named query a refresh request invalidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QueryKey {
    Transactions,
}

impl QueryKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKey::Transactions => "GetTransactions",
        }
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cache invalidation message sent to the transaction source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRequest {
    pub query: QueryKey,
}

/// How a confirmed (or declined) deletion ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum DeletionOutcome {
    Declined { id: String },
    Deleted { id: String },
    Failed { id: String, message: String },
}

impl DeletionOutcome {
    pub fn id(&self) -> &str {
        match self {
            DeletionOutcome::Declined { id }
            | DeletionOutcome::Deleted { id }
            | DeletionOutcome::Failed { id, .. } => id,
        }
    }
}

/// The confirm-then-mutate state machine
#[derive(Debug)]
pub struct DeletionWorkflow {
    state: DeletionState,
    last_failure: Option<LastFailure>,
    refresh: mpsc::UnboundedSender<RefreshRequest>,
}

impl DeletionWorkflow {
    /// Create a workflow that sends refresh requests on `refresh`
    pub fn new(refresh: mpsc::UnboundedSender<RefreshRequest>) -> Self {
        Self {
            state: DeletionState::default(),
            last_failure: None,
            refresh,
        }
    }

    /// Create a workflow together with the receiving end of its refresh channel
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<RefreshRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn state(&self) -> &DeletionState {
        &self.state
    }

    pub fn phase(&self) -> DeletionPhase {
        self.state.phase
    }

    pub fn target(&self) -> Option<&str> {
        self.state.target.as_deref()
    }

    /// Global busy flag
    pub fn is_busy(&self) -> bool {
        self.state.phase != DeletionPhase::Idle
    }

    pub fn last_failure(&self) -> Option<&LastFailure> {
        self.last_failure.as_ref()
    }

    fn transition(&mut self, next: DeletionPhase) {
        log::debug!(
            "Deletion {:?}: {} -> {}",
            self.state.target,
            self.state.phase,
            next
        );
        self.state.phase = next;
        if next == DeletionPhase::Idle {
            self.state.target = None;
        }
    }

    /// `Idle -> Confirming` for an authorization
    pub fn request(&mut self, tx: &Transaction) -> CoreResult<()> {
        if self.is_busy() {
            return Err(CoreError::invalid_transition(
                "request_delete",
                format!(
                    "deletion of {} is {}",
                    self.state.target.as_deref().unwrap_or("?"),
                    self.state.phase
                ),
            ));
        }
        if !tx.is_deletable() {
            return Err(CoreError::invalid_transition(
                "request_delete",
                format!("transaction {} has status '{}'", tx.id, tx.status),
            ));
        }

        self.last_failure = None;
        self.state.target = Some(tx.id.clone());
        self.transition(DeletionPhase::Confirming);
        Ok(())
    }

    /// Apply the prompt's answer.
    ///
    /// Returns the id to hand to the deletion capability when confirmed,
    /// `None` when declined.
    pub fn resolve_confirmation(&mut self, confirmed: bool) -> CoreResult<Option<String>> {
        if self.state.phase != DeletionPhase::Confirming {
            return Err(CoreError::invalid_transition(
                "confirm_delete",
                format!("no confirmation pending (phase {})", self.state.phase),
            ));
        }

        if confirmed {
            let target = self.state.target.clone();
            self.transition(DeletionPhase::InFlight);
            Ok(target)
        } else {
            self.transition(DeletionPhase::Idle);
            Ok(None)
        }
    }

    /// Settle an in-flight deletion.
    ///
    /// A capability failure is reported to `reporter`, remembered as the
    /// last failure and returned as an outcome, not as an error.
    pub fn complete(
        &mut self,
        result: Result<(), DeletionError>,
        reporter: &dyn ErrorLogger,
        context: ErrorContext,
    ) -> CoreResult<DeletionOutcome> {
        if self.state.phase != DeletionPhase::InFlight {
            return Err(CoreError::invalid_transition(
                "complete_delete",
                format!("no deletion in flight (phase {})", self.state.phase),
            ));
        }
        let id = self.state.target.clone().unwrap_or_default();

        match result {
            Ok(()) => {
                self.transition(DeletionPhase::Idle);
                log::info!("Deleted authorization {}", id);
                self.request_refresh();
                Ok(DeletionOutcome::Deleted { id })
            }
            Err(error) => {
                self.transition(DeletionPhase::Failed);
                let message = error.to_string();
                let context = context.with_data("transaction_id", serde_json::json!(id));
                reporter.log_error(&CoreError::Deletion(error), &context);
                self.last_failure = Some(LastFailure {
                    id: id.clone(),
                    message: message.clone(),
                });
                self.transition(DeletionPhase::Idle);
                Ok(DeletionOutcome::Failed { id, message })
            }
        }
    }

    fn request_refresh(&self) {
        let request = RefreshRequest { query: QueryKey::Transactions };
        log::info!("Requesting refresh of {}", request.query);
        if self.refresh.send(request).is_err() {
            log::warn!("Refresh request dropped: receiver closed");
        }
    }
}
