use crate::SessionError;
use huddle_core::{ConnectionId, EndReason, ErrorKind, IceServerConfig, RoomId, UserStatus};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::time::{Duration, Instant};

mod audio_impl;
mod call_impl;
mod compose_impl;
mod handle_event_impl;
mod status_impl;
mod view;

pub use view::{MessageView, PendingMessage};

/// While typing, the indicator is re-announced at most this often.
pub const TYPING_RESEND_INTERVAL: Duration = Duration::from_millis(1200);

/// A recorded clip waiting for the user to send or discard it.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum AudioState {
    #[default]
    Idle,
    Recording,
    Previewing(AudioClip),
}

impl AudioState {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Previewing(_) => "previewing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallRole {
    Caller,
    Callee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallState {
    #[default]
    Idle,
    /// `peer` is unknown for a caller that offered to the whole room, and for a
    /// glare loser still waiting for the winner's offer.
    Negotiating {
        role: CallRole,
        peer: Option<ConnectionId>,
    },
    InCall {
        peer: ConnectionId,
    },
}

impl CallState {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Negotiating { .. } => "negotiating",
            Self::InCall { .. } => "in a call",
        }
    }

    pub fn peer(&self) -> Option<ConnectionId> {
        match self {
            Self::Idle => None,
            Self::Negotiating { peer, .. } => *peer,
            Self::InCall { peer } => Some(*peer),
        }
    }
}

/// Negotiation input for the embedding media layer, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteSignal {
    Offer { from: ConnectionId, payload: Value },
    Answer { from: ConnectionId, payload: Value },
    Ice { from: ConnectionId, payload: Value },
    Ended { reason: EndReason },
}

/// Something the user should be told about.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    PeerBusy,
    Server { kind: ErrorKind, message: String },
}

/// Client-side state for one connection, driven by local actions and server events.
#[derive(Debug)]
pub struct ClientSession {
    username: Option<String>,
    connection_id: Option<ConnectionId>,
    ice_servers: Vec<IceServerConfig>,
    home_room: RoomId,
    room: Option<RoomId>,
    view: MessageView,
    typing: BTreeSet<String>,
    typing_sent: Option<Instant>,
    statuses: BTreeMap<String, UserStatus>,
    audio: AudioState,
    call: CallState,
    next_client_id: u64,
    signals: VecDeque<RemoteSignal>,
    notices: VecDeque<Notice>,
}

impl ClientSession {
    /// `home_room` is joined automatically once the server greets us.
    pub fn new(home_room: RoomId) -> Self {
        Self {
            username: None,
            connection_id: None,
            ice_servers: Vec::new(),
            home_room,
            room: None,
            view: MessageView::default(),
            typing: BTreeSet::new(),
            typing_sent: None,
            statuses: BTreeMap::new(),
            audio: AudioState::Idle,
            call: CallState::Idle,
            next_client_id: 0,
            signals: VecDeque::new(),
            notices: VecDeque::new(),
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn connection_id(&self) -> Option<ConnectionId> {
        self.connection_id
    }

    pub fn ice_servers(&self) -> &[IceServerConfig] {
        &self.ice_servers
    }

    pub fn room(&self) -> Option<&RoomId> {
        self.room.as_ref()
    }

    pub fn view(&self) -> &MessageView {
        &self.view
    }

    /// Other users currently typing in the joined room, sorted.
    pub fn typing_users(&self) -> impl Iterator<Item = &str> {
        self.typing.iter().map(String::as_str)
    }

    pub fn audio(&self) -> &AudioState {
        &self.audio
    }

    pub fn call(&self) -> CallState {
        self.call
    }

    pub fn drain_signals(&mut self) -> Vec<RemoteSignal> {
        self.signals.drain(..).collect()
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    fn current_room(&self) -> Result<RoomId, SessionError> {
        self.room.clone().ok_or(SessionError::NoRoom)
    }

    fn reset_room_state(&mut self) {
        self.view.clear();
        self.typing.clear();
        self.typing_sent = None;
    }
}

impl Default for ClientSession {
    fn default() -> Self {
        Self::new(RoomId::global())
    }
}
