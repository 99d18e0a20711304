use crate::HuddleError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_ROOM: &str = "global";

const MAX_ROOM_LEN: usize = 64;

/// Room key. Every value is trimmed, non-empty, at most 64 chars and free of control chars.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    pub fn parse(raw: &str) -> Result<Self, HuddleError> {
        let name = raw.trim();
        if name.is_empty()
            || name.chars().count() > MAX_ROOM_LEN
            || name.chars().any(char::is_control)
        {
            return Err(HuddleError::InvalidRoom(raw.to_owned()));
        }
        Ok(Self(name.to_owned()))
    }

    pub fn global() -> Self {
        Self(DEFAULT_ROOM.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = HuddleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoomId> for String {
    fn from(room: RoomId) -> Self {
        room.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
