//! Error types for txview-core
//!
//! The engine distinguishes three families of failure: the source could
//! not deliver records, the deletion capability failed, or a caller asked
//! for a transition the workflow does not allow. Each error carries a
//! stable code, a severity and suggestions for the render surface.

use thiserror::Error;
use serde::{Deserialize, Serialize};

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Transaction source failed
    SourceLoadError,
    /// Deletion capability failed
    DeletionError,
    /// Transition not allowed in the current state
    InvalidTransition,
    /// Transaction not found
    TransactionNotFound,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::SourceLoadError => write!(f, "SOURCE_LOAD_ERROR"),
            ErrorCode::DeletionError => write!(f, "DELETION_ERROR"),
            ErrorCode::InvalidTransition => write!(f, "INVALID_TRANSITION"),
            ErrorCode::TransactionNotFound => write!(f, "TRANSACTION_NOT_FOUND"),
        }
    }
}

/// Detailed error information for the render surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// How loudly the surface should show it
    pub severity: ErrorSeverity,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, severity: ErrorSeverity, message: String) -> Self {
        Self {
            code,
            severity,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational
    Info,
    /// Warning - operation may be affected
    Warning,
    /// Error - operation failed
    Error,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// The transaction source could not deliver records
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum SourceLoadError {
    #[error("Transactions unavailable: {message}")]
    Unavailable { message: String },

    #[error("Invalid transaction data: {message}")]
    InvalidData { message: String },
}

/// The deletion capability reported a failure
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum DeletionError {
    #[error("Transaction not found: {id}")]
    NotFound { id: String },

    #[error("Transaction {id} cannot be deleted: {reason}")]
    Rejected { id: String, reason: String },

    #[error("Deletion failed: {message}")]
    Failed { message: String },
}

/// Main error type for txview-core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error(transparent)]
    SourceLoad(#[from] SourceLoadError),

    #[error(transparent)]
    Deletion(#[from] DeletionError),

    #[error("Invalid transition '{action}': {reason}")]
    InvalidTransition { action: String, reason: String },

    #[error("Transaction not found: {id}")]
    TransactionNotFound { id: String },
}

impl CoreError {
    pub(crate) fn invalid_transition(action: &str, reason: impl Into<String>) -> Self {
        CoreError::InvalidTransition {
            action: action.to_string(),
            reason: reason.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::SourceLoad(_) => ErrorCode::SourceLoadError,
            CoreError::Deletion(_) => ErrorCode::DeletionError,
            CoreError::InvalidTransition { .. } => ErrorCode::InvalidTransition,
            CoreError::TransactionNotFound { .. } => ErrorCode::TransactionNotFound,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::SourceLoad(_) => ErrorSeverity::Error,
            CoreError::Deletion(_) => ErrorSeverity::Error,
            CoreError::InvalidTransition { .. } => ErrorSeverity::Warning,
            CoreError::TransactionNotFound { .. } => ErrorSeverity::Info,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.severity(), self.to_string());

        match self {
            CoreError::SourceLoad(_) => {
                details = details.with_suggestion(
                    "Reload the list to fetch the transactions again.".to_string()
                );
            }
            CoreError::Deletion(error) => {
                if let DeletionError::NotFound { id } | DeletionError::Rejected { id, .. } = error {
                    details = details.with_detail(serde_json::json!({ "transaction_id": id }));
                }
                details = details.with_suggestion(
                    "The list was not changed. Try deleting the authorization again.".to_string()
                );
            }
            CoreError::InvalidTransition { action, .. } => {
                details = details.with_detail(serde_json::json!({ "action": action }));
                details = details.with_suggestion(
                    "Only pending authorizations can be deleted, one at a time.".to_string()
                );
            }
            CoreError::TransactionNotFound { .. } => {
                details = details.with_suggestion(
                    "The transaction may have been removed. Reload the list.".to_string()
                );
            }
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// User whose list is shown
    pub user_id: Option<String>,
    /// Operation being performed
    pub operation: String,
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            user_id: None,
            operation: operation.into(),
            data: serde_json::json!({}),
        }
    }

    /// Add user ID
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Add context data
    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// External error surface
pub trait ErrorLogger: Send + Sync {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    /// Log a warning
    fn log_warning(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Debug, Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        let level = match error.severity() {
            ErrorSeverity::Info => log::Level::Info,
            ErrorSeverity::Warning => log::Level::Warn,
            ErrorSeverity::Error => log::Level::Error,
        };
        log::log!(
            target: "txview::error",
            level,
            "{} [{}] {} - Operation: {} - User: {:?} - Data: {}",
            error.severity().to_string().to_uppercase(),
            error.code(),
            error.to_details(),
            context.operation,
            context.user_id,
            context.data
        );
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "txview::error",
            "WARNING: {} - Operation: {} - User: {:?}",
            message,
            context.operation,
            context.user_id
        );
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::SourceLoadError.to_string(), "SOURCE_LOAD_ERROR");
        assert_eq!(ErrorCode::InvalidTransition.to_string(), "INVALID_TRANSITION");
        assert_eq!(ErrorCode::TransactionNotFound.to_string(), "TRANSACTION_NOT_FOUND");
    }

    #[test]
    fn test_core_error_code_and_severity() {
        let error = CoreError::from(SourceLoadError::Unavailable { message: "down".to_string() });
        assert_eq!(error.code(), ErrorCode::SourceLoadError);
        assert_eq!(error.severity(), ErrorSeverity::Error);
        assert_eq!(error.to_string(), "Transactions unavailable: down");

        let error = CoreError::invalid_transition("request_delete", "busy");
        assert_eq!(error.code(), ErrorCode::InvalidTransition);
        assert_eq!(error.severity(), ErrorSeverity::Warning);
    }

    #[test]
    fn test_error_details_deletion() {
        let error = CoreError::from(DeletionError::Rejected {
            id: "tx-1".to_string(),
            reason: "settled".to_string(),
        });
        let details = error.to_details();

        assert_eq!(details.code, ErrorCode::DeletionError);
        assert_eq!(details.severity, ErrorSeverity::Error);
        assert!(details.details.is_some());
        assert!(!details.suggestions.is_empty());
        assert!(details.message.contains("tx-1"));
    }

    #[test]
    fn test_error_details_display() {
        let details = ErrorDetails::new(
            ErrorCode::TransactionNotFound,
            ErrorSeverity::Info,
            "gone".to_string(),
        )
            .with_suggestion("Reload".to_string());
        let text = details.to_string();
        assert!(text.starts_with("[TRANSACTION_NOT_FOUND] gone"));
        assert!(text.contains("  - Reload"));
    }

    #[test]
    fn test_error_context() {
        let context = ErrorContext::new("delete_authorization")
            .with_user_id("user-456")
            .with_data("transaction_id", serde_json::json!("tx-1"));

        assert_eq!(context.operation, "delete_authorization");
        assert_eq!(context.user_id.as_deref(), Some("user-456"));
        assert_eq!(context.data["transaction_id"], "tx-1");
    }
}
