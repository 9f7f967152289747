//! Error handling for the Unmonitarr daemon
//!
//! This module provides a unified error type using thiserror for job
//! dispatch and reconciliation runs.

use thiserror::Error;
use unmonitarr_arr_client::ArrError;

use crate::queue::Category;

/// Main worker error type
#[derive(Error, Debug)]
pub enum WorkerError {
    // ========== Job Dispatch Errors ==========
    /// A trigger named a category the system does not manage
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    /// A job reached the worker for a category with no registered handler
    #[error("no handler registered for category {0}")]
    NoHandler(Category),

    /// A handler panicked; the job is abandoned
    #[error("{category} handler panicked: {message}")]
    HandlerPanicked { category: Category, message: String },

    // ========== Reconciliation Errors ==========
    /// Catalog gateway call failed
    #[error("catalog request failed: {0}")]
    Catalog(#[from] ArrError),

    /// The auto-managed or season-pack tag could not be resolved or created
    #[error("failed to ensure tag '{label}': {reason}")]
    TagCreation { label: String, reason: String },

    /// Run failed after exhausting its retry budget
    #[error("run failed after {attempts} attempts: {reason}")]
    MaxRetriesExceeded { attempts: u32, reason: String },

    // ========== Internal Errors ==========
    /// Internal worker error (catch-all for unexpected errors)
    #[error("internal worker error: {0}")]
    Internal(String),
}

impl WorkerError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Catalog(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Whether this is a catalog request timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Catalog(e) if e.is_timeout())
    }

    /// Get a severity level for logging
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // Critical errors that should alert operators
            Self::MaxRetriesExceeded { .. } => ErrorSeverity::Critical,

            // Errors that indicate service issues
            Self::UnknownCategory(_)
            | Self::NoHandler(_)
            | Self::HandlerPanicked { .. }
            | Self::TagCreation { .. }
            | Self::Internal(_) => ErrorSeverity::Error,

            // Transient failures are expected occasionally
            Self::Catalog(e) if e.is_retryable() => ErrorSeverity::Warning,
            Self::Catalog(_) => ErrorSeverity::Error,
        }
    }

    /// Get the category this error relates to, if known
    pub fn category_context(&self) -> Option<Category> {
        match self {
            Self::NoHandler(category) | Self::HandlerPanicked { category, .. } => Some(*category),
            _ => None,
        }
    }

    /// Log the error with appropriate severity
    pub fn log(&self) {
        let context = self
            .category_context()
            .map(|c| c.as_str())
            .unwrap_or("general");
        match self.severity() {
            ErrorSeverity::Critical => {
                tracing::error!(
                    error = %self,
                    context = context,
                    retryable = self.is_retryable(),
                    "Critical worker error"
                );
            }
            ErrorSeverity::Error => {
                tracing::error!(
                    error = %self,
                    context = context,
                    retryable = self.is_retryable(),
                    "Worker error"
                );
            }
            ErrorSeverity::Warning => {
                tracing::warn!(
                    error = %self,
                    context = context,
                    retryable = self.is_retryable(),
                    "Worker warning"
                );
            }
        }
    }

    /// Create a tag creation error
    pub fn tag_creation(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TagCreation {
            label: label.into(),
            reason: reason.into(),
        }
    }
}

/// Error severity levels for logging and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical errors that should trigger alerts
    Critical,
    /// Standard errors
    Error,
    /// Warnings for expected failures
    Warning,
}

/// Result type alias for worker operations
pub type WorkerResult<T> = Result<T, WorkerError>;
