//! Error taxonomy for Hatena AtomPub operations
//!
//! Every failure a client operation can produce is one of the six
//! [`HatenaError`] variants. HTTP-level failures carry the status code, the
//! response body (truncated) and the operation that was attempted.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum number of characters of a response body kept for diagnostics
pub const MAX_BODY_CHARS: usize = 512;

/// The AtomPub operation that was being attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    ServiceDocument,
    ListEntries,
    CreateEntry,
    GetEntry,
    UpdateEntry,
    DeleteEntry,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ServiceDocument => "service_document",
            Operation::ListEntries => "list_entries",
            Operation::CreateEntry => "create_entry",
            Operation::GetEntry => "get_entry",
            Operation::UpdateEntry => "update_entry",
            Operation::DeleteEntry => "delete_entry",
        }
    }

    /// HTTP method used for this operation
    pub fn method(&self) -> &'static str {
        match self {
            Operation::ServiceDocument | Operation::ListEntries | Operation::GetEntry => "GET",
            Operation::CreateEntry => "POST",
            Operation::UpdateEntry => "PUT",
            Operation::DeleteEntry => "DELETE",
        }
    }

    /// Whether `status` counts as success for this operation
    pub fn is_success(&self, status: u16) -> bool {
        match self {
            Operation::CreateEntry => status == 201,
            Operation::DeleteEntry => status == 200 || status == 204,
            _ => status == 200,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse error category, used by callers to decide how to react
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    Network,
    Authentication,
    NotFound,
    Validation,
    Protocol,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HatenaError {
    /// Missing or empty credential or setting, detected before any request
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{operation}: network error: {message}")]
    Network { operation: Operation, message: String },

    #[error("{operation}: authentication failed [{status}]: {body}")]
    Authentication {
        operation: Operation,
        status: u16,
        body: String,
    },

    #[error("{operation}: not found [{status}]: {body}")]
    NotFound {
        operation: Operation,
        status: u16,
        body: String,
    },

    /// HTTP 400, a response that is not well-formed XML, or a draft rejected
    /// before sending
    #[error("{operation}: validation error{}: {body}", fmt_status(.status))]
    Validation {
        operation: Operation,
        status: Option<u16>,
        body: String,
    },

    #[error("{operation}: protocol error{}: {body}", fmt_status(.status))]
    Protocol {
        operation: Operation,
        status: Option<u16>,
        body: String,
    },
}

fn fmt_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" [{s}]")).unwrap_or_default()
}

impl HatenaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HatenaError::Configuration(_) => ErrorKind::Configuration,
            HatenaError::Network { .. } => ErrorKind::Network,
            HatenaError::Authentication { .. } => ErrorKind::Authentication,
            HatenaError::NotFound { .. } => ErrorKind::NotFound,
            HatenaError::Validation { .. } => ErrorKind::Validation,
            HatenaError::Protocol { .. } => ErrorKind::Protocol,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            HatenaError::Configuration(_) | HatenaError::Network { .. } => None,
            HatenaError::Authentication { status, .. } | HatenaError::NotFound { status, .. } => {
                Some(*status)
            }
            HatenaError::Validation { status, .. } | HatenaError::Protocol { status, .. } => {
                *status
            }
        }
    }

    pub fn operation(&self) -> Option<Operation> {
        match self {
            HatenaError::Configuration(_) => None,
            HatenaError::Network { operation, .. }
            | HatenaError::Authentication { operation, .. }
            | HatenaError::NotFound { operation, .. }
            | HatenaError::Validation { operation, .. }
            | HatenaError::Protocol { operation, .. } => Some(*operation),
        }
    }

    /// Network failures and upstream 5xx are worth retrying; nothing else is
    pub fn is_retryable(&self) -> bool {
        match self {
            HatenaError::Network { .. } => true,
            HatenaError::Protocol {
                status: Some(status),
                ..
            } => (500..600).contains(status),
            _ => false,
        }
    }

    pub fn network(operation: Operation, message: impl Into<String>) -> Self {
        HatenaError::Network {
            operation,
            message: message.into(),
        }
    }

    pub fn validation(operation: Operation, message: impl Into<String>) -> Self {
        HatenaError::Validation {
            operation,
            status: None,
            body: message.into(),
        }
    }
}

/// Truncate a response body to [`MAX_BODY_CHARS`] characters
pub fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_BODY_CHARS) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

/// Map an HTTP status to the operation outcome.
///
/// | Status | Outcome |
/// |---|---|
/// | operation success status | `Ok(())` |
/// | 400 | `Validation` |
/// | 401 | `Authentication` |
/// | 404 | `NotFound` |
/// | anything else | `Protocol` |
pub fn check_status(operation: Operation, status: u16, body: &str) -> Result<(), HatenaError> {
    if operation.is_success(status) {
        return Ok(());
    }

    let body = truncate_body(body);
    Err(match status {
        400 => HatenaError::Validation {
            operation,
            status: Some(status),
            body,
        },
        401 => HatenaError::Authentication {
            operation,
            status,
            body,
        },
        404 => HatenaError::NotFound {
            operation,
            status,
            body,
        },
        _ => HatenaError::Protocol {
            operation,
            status: Some(status),
            body,
        },
    })
}
