use std::fmt;

use serde::Serialize;
use ts_rs::TS;

/// Structured error type for the pipeline. Replaces stringly-typed errors
/// so callers (and the frontend) can match on error codes.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(tag = "code", content = "detail")]
#[ts(export)]
pub enum AppError {
    /// A mutating entry point was called before `initialize`.
    NotInitialized,
    UnknownIndicator { alias: String },
    UnknownPreset { name: String },
    /// The chart surface rejected a create/remove call.
    ChartError { message: String },
    /// The dispatch callback rejected an action.
    DispatchError { message: String },
    ValidationError { message: String },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotInitialized => {
                write!(f, "Chart pipeline not initialized — call initialize first")
            }
            AppError::UnknownIndicator { alias } => {
                write!(f, "Unknown indicator: {alias}")
            }
            AppError::UnknownPreset { name } => write!(f, "Unknown preset: {name}"),
            AppError::ChartError { message } => write!(f, "Chart error: {message}"),
            AppError::DispatchError { message } => write!(f, "Dispatch error: {message}"),
            AppError::ValidationError { message } => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for AppError {}

/// Allow converting AppError to String for result messages.
impl From<AppError> for String {
    fn from(e: AppError) -> String {
        e.to_string()
    }
}

impl From<String> for AppError {
    fn from(s: String) -> Self {
        AppError::ValidationError { message: s }
    }
}

impl From<&str> for AppError {
    fn from(s: &str) -> Self {
        AppError::ValidationError {
            message: s.to_string(),
        }
    }
}
