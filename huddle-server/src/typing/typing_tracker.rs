use huddle_core::ConnectionId;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Typing flags of one room. Every `typing: true` pushes the member's
/// deadline out by `timeout`; a deadline that passes counts as an explicit stop.
#[derive(Debug)]
pub struct TypingTracker {
    timeout: Duration,
    active: HashMap<ConnectionId, (String, Instant)>,
}

impl TypingTracker {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            active: HashMap::new(),
        }
    }

    pub fn set(&mut self, id: ConnectionId, username: &str, typing: bool, now: Instant) {
        if typing {
            self.active
                .insert(id, (username.to_owned(), now + self.timeout));
        } else {
            self.active.remove(&id);
        }
    }

    /// Forgets `id`. Returns the username when a stop has to be announced.
    pub fn clear(&mut self, id: &ConnectionId) -> Option<String> {
        self.active.remove(id).map(|(username, _)| username)
    }

    /// Drops every flag whose deadline is at or before `now`.
    pub fn expire(&mut self, now: Instant) -> Vec<(ConnectionId, String)> {
        let expired: Vec<ConnectionId> = self
            .active
            .iter()
            .filter(|(_, (_, deadline))| *deadline <= now)
            .map(|(id, _)| *id)
            .collect();

        expired
            .into_iter()
            .filter_map(|id| self.active.remove(&id).map(|(username, _)| (id, username)))
            .collect()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.active.values().map(|(_, deadline)| *deadline).min()
    }

    pub fn is_typing(&self, id: &ConnectionId) -> bool {
        self.active.contains_key(id)
    }
}
