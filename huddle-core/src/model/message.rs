use crate::model::room::RoomId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl From<u64> for MessageId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Emoji -> names of the users who reacted with it. Empty sets are never kept.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Reactions(BTreeMap<String, BTreeSet<String>>);

impl Reactions {
    /// Adds `user` under `emoji`, or removes them if already present.
    /// Returns `true` when the reaction was added.
    pub fn toggle(&mut self, emoji: &str, user: &str) -> bool {
        let users = self.0.entry(emoji.to_owned()).or_default();
        if users.remove(user) {
            if users.is_empty() {
                self.0.remove(emoji);
            }
            false
        } else {
            users.insert(user.to_owned());
            true
        }
    }

    pub fn users(&self, emoji: &str) -> Option<&BTreeSet<String>> {
        self.0.get(emoji)
    }

    pub fn count(&self, emoji: &str) -> usize {
        self.0.get(emoji).map_or(0, BTreeSet::len)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub room: RoomId,
    pub sender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub reactions: Reactions,
    #[serde(default)]
    pub read: bool,
}

impl Message {
    /// Normalizes the body: text is trimmed and blank parts become `None`.
    /// Returns `None` when nothing is left to post.
    pub fn normalize_body(
        text: Option<&str>,
        attachment: Option<&str>,
    ) -> Option<(Option<String>, Option<String>)> {
        let text = text.map(str::trim).filter(|t| !t.is_empty()).map(str::to_owned);
        let attachment = attachment
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_owned);

        if text.is_none() && attachment.is_none() {
            None
        } else {
            Some((text, attachment))
        }
    }
}
