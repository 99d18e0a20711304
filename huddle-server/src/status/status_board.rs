use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use huddle_core::{HuddleError, UserStatus};
use std::sync::Arc;

/// How far back `recent` looks, in days.
pub const RECENT_STATUS_DAYS: i64 = 7;

/// Latest status per username. Outlives connections, so a status set before a
/// reconnect is still listed afterwards.
#[derive(Clone, Default)]
pub struct StatusBoard {
    statuses: Arc<DashMap<String, UserStatus>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, username: &str, raw: &str, now: DateTime<Utc>) -> Result<UserStatus, HuddleError> {
        let status = UserStatus {
            username: username.to_owned(),
            status: UserStatus::normalize(raw)?,
            timestamp: now,
        };
        self.statuses.insert(status.username.clone(), status.clone());
        Ok(status)
    }

    pub fn get(&self, username: &str) -> Option<UserStatus> {
        self.statuses.get(username).map(|entry| entry.value().clone())
    }

    /// Statuses set within the window before `now`, newest first.
    pub fn recent(&self, now: DateTime<Utc>) -> Vec<UserStatus> {
        let since = now - Duration::days(RECENT_STATUS_DAYS);
        let mut recent: Vec<UserStatus> = self
            .statuses
            .iter()
            .filter(|entry| entry.timestamp >= since)
            .map(|entry| entry.value().clone())
            .collect();
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        recent
    }
}
