/// API route handlers
///
/// - `health`: Health check endpoint
/// - `fields`: Field definition management
/// - `settings`: Admin settings diagnostics

use serde::{Deserialize, Serialize};

pub mod fields;
pub mod health;
pub mod settings;

/// Body of responses that only carry a confirmation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
