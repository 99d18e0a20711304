use crate::HuddleError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_STATUS_CHARS: usize = 140;

/// A user's free-form status line, e.g. "in a meeting".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatus {
    pub username: String,
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl UserStatus {
    /// Trims `raw` and enforces the length limit. An empty status is allowed
    /// and clears the line.
    pub fn normalize(raw: &str) -> Result<String, HuddleError> {
        let status = raw.trim();
        if status.chars().count() > MAX_STATUS_CHARS {
            return Err(HuddleError::StatusTooLong(MAX_STATUS_CHARS));
        }
        Ok(status.to_owned())
    }
}
