use super::ClientSession;
use crate::SessionError;
use huddle_core::{ClientEvent, MAX_STATUS_CHARS, UserStatus};
use tracing::debug;

impl ClientSession {
    /// Builds a status change. Needs no room; the update reaches everyone.
    pub fn set_status(&self, text: &str) -> Result<ClientEvent, SessionError> {
        let status = UserStatus::normalize(text)
            .map_err(|_| SessionError::StatusTooLong(MAX_STATUS_CHARS))?;
        Ok(ClientEvent::SetStatus { status })
    }

    /// Last known status of `username`, from any room.
    pub fn status_of(&self, username: &str) -> Option<&UserStatus> {
        self.statuses.get(username)
    }

    pub(super) fn on_status(&mut self, status: UserStatus) {
        debug!("{} is now '{}'", status.username, status.status);
        self.statuses.insert(status.username.clone(), status);
    }
}
