//! Standardized error payload.

use serde::{Deserialize, Serialize};

/// Error body returned by every failing endpoint: all violations found in
/// one validation pass, or a single message for not-found and persistence
/// failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub errors: Vec<String>,
}

impl ErrorBody {
    pub fn new(errors: Vec<String>) -> Self {
        Self { errors }
    }

    pub fn single(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
        }
    }
}
