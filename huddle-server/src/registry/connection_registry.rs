use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use huddle_core::{ConnectionId, HuddleError, RoomId};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    /// Fixed for the whole session.
    pub username: String,
    pub room: Option<RoomId>,
}

/// Live connections by transport id. Membership itself is owned by the room
/// actors; `room` here only records where a connection currently lives.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<DashMap<ConnectionId, Connection>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, id: ConnectionId, username: &str) -> Result<Connection, HuddleError> {
        match self.connections.entry(id) {
            Entry::Occupied(_) => Err(HuddleError::DuplicateConnection(id)),
            Entry::Vacant(slot) => {
                let connection = Connection {
                    id,
                    username: username.to_owned(),
                    room: None,
                };
                slot.insert(connection.clone());
                debug!("Registered connection {} as '{}'", id, username);
                Ok(connection)
            }
        }
    }

    /// Removes the connection, returning its last state. Unknown ids are a no-op.
    pub fn unregister(&self, id: &ConnectionId) -> Option<Connection> {
        self.connections.remove(id).map(|(_, connection)| connection)
    }

    pub fn lookup(&self, id: &ConnectionId) -> Result<Connection, HuddleError> {
        self.connections
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or(HuddleError::ConnectionNotFound(*id))
    }

    pub fn room_of(&self, id: &ConnectionId) -> Option<RoomId> {
        self.connections.get(id).and_then(|entry| entry.room.clone())
    }

    /// Records the connection's current room and returns the previous one.
    pub fn set_room(
        &self,
        id: &ConnectionId,
        room: Option<RoomId>,
    ) -> Result<Option<RoomId>, HuddleError> {
        let mut entry = self
            .connections
            .get_mut(id)
            .ok_or(HuddleError::ConnectionNotFound(*id))?;
        Ok(std::mem::replace(&mut entry.room, room))
    }

    pub fn ids(&self) -> Vec<ConnectionId> {
        self.connections.iter().map(|entry| *entry.key()).collect()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
