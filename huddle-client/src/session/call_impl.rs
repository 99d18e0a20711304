use super::{CallRole, CallState, ClientSession, Notice, RemoteSignal};
use crate::SessionError;
use huddle_core::{ClientEvent, ConnectionId, EndReason};
use serde_json::Value;
use tracing::{debug, info, warn};

impl ClientSession {
    /// Offers a call to `target`, or to the whole room when `None`.
    pub fn start_call(
        &mut self,
        offer: Value,
        target: Option<ConnectionId>,
    ) -> Result<ClientEvent, SessionError> {
        let room = self.current_room()?;
        if self.call != CallState::Idle {
            return Err(self.invalid("start a call"));
        }

        self.call = CallState::Negotiating {
            role: CallRole::Caller,
            peer: target,
        };
        Ok(ClientEvent::Offer {
            room,
            target,
            offer,
        })
    }

    /// Sends a new offer inside an established call.
    pub fn renegotiate(&mut self, offer: Value) -> Result<ClientEvent, SessionError> {
        let room = self.current_room()?;
        let CallState::InCall { peer } = self.call else {
            return Err(self.invalid("renegotiate"));
        };

        self.call = CallState::Negotiating {
            role: CallRole::Caller,
            peer: Some(peer),
        };
        Ok(ClientEvent::Offer {
            room,
            target: Some(peer),
            offer,
        })
    }

    /// Answers the pending offer.
    pub fn accept_call(&mut self, answer: Value) -> Result<ClientEvent, SessionError> {
        let room = self.current_room()?;
        let CallState::Negotiating {
            role: CallRole::Callee,
            peer: Some(peer),
        } = self.call
        else {
            return Err(self.invalid("answer"));
        };

        self.call = CallState::InCall { peer };
        Ok(ClientEvent::Answer {
            room,
            target: Some(peer),
            answer,
        })
    }

    pub fn send_ice(&self, candidate: Value) -> Result<ClientEvent, SessionError> {
        let room = self.current_room()?;
        if self.call == CallState::Idle {
            return Err(self.invalid("send ICE candidates"));
        }

        Ok(ClientEvent::IceCandidate {
            room,
            target: self.call.peer(),
            candidate,
        })
    }

    /// Hangs up, or declines an incoming offer.
    pub fn hang_up(&mut self) -> Result<ClientEvent, SessionError> {
        let room = self.current_room()?;
        if self.call == CallState::Idle {
            return Err(self.invalid("hang up"));
        }

        self.call = CallState::Idle;
        Ok(ClientEvent::EndCall { room })
    }

    pub(super) fn on_remote_offer(&mut self, from: ConnectionId, payload: Value) {
        match self.call {
            CallState::Idle => {
                info!("Incoming call from {}", from);
            }
            // Our own offer crossed theirs; the lower id keeps the caller role.
            CallState::Negotiating {
                role: CallRole::Caller,
                ..
            } => {
                if self.connection_id.is_some_and(|me| me < from) {
                    debug!("Ignoring crossed offer from {}", from);
                    return;
                }
                info!("Lost offer race to {}", from);
            }
            CallState::Negotiating {
                role: CallRole::Callee,
                peer,
            } => {
                if peer.is_some_and(|p| p != from) {
                    warn!("Offer from {} while negotiating with another peer", from);
                    return;
                }
            }
            CallState::InCall { peer } => {
                if peer != from {
                    warn!("Offer from {} during a call with {}", from, peer);
                    return;
                }
                debug!("Renegotiation from {}", from);
            }
        }

        self.call = CallState::Negotiating {
            role: CallRole::Callee,
            peer: Some(from),
        };
        self.signals.push_back(RemoteSignal::Offer { from, payload });
    }

    pub(super) fn on_remote_answer(&mut self, from: ConnectionId, payload: Value) {
        let CallState::Negotiating {
            role: CallRole::Caller,
            peer,
        } = self.call
        else {
            warn!("Unexpected answer from {} while {}", from, self.call.name());
            return;
        };
        if peer.is_some_and(|p| p != from) {
            warn!("Answer from {} but offered to another peer", from);
            return;
        }

        self.call = CallState::InCall { peer: from };
        self.signals.push_back(RemoteSignal::Answer { from, payload });
    }

    pub(super) fn on_remote_ice(&mut self, from: ConnectionId, payload: Value) {
        if self.call == CallState::Idle {
            debug!("Dropping ICE candidate from {} outside a call", from);
            return;
        }
        self.signals.push_back(RemoteSignal::Ice { from, payload });
    }

    pub(super) fn on_glare(&mut self, winner: ConnectionId) {
        if self.connection_id == Some(winner) {
            debug!("Won offer race");
            return;
        }

        match self.call {
            CallState::Negotiating {
                role: CallRole::Caller,
                ..
            } => {
                // Wait for the winner's offer.
                self.call = CallState::Negotiating {
                    role: CallRole::Callee,
                    peer: None,
                };
            }
            CallState::Negotiating {
                role: CallRole::Callee,
                peer: Some(peer),
            } if peer == winner => {}
            other => {
                debug!("Glare notice ignored while {}", other.name());
            }
        }
    }

    pub(super) fn on_busy(&mut self) {
        if let CallState::Negotiating {
            role: CallRole::Caller,
            ..
        } = self.call
        {
            self.call = CallState::Idle;
        }
        self.notices.push_back(Notice::PeerBusy);
    }

    pub(super) fn on_remote_end(&mut self, reason: EndReason) {
        if self.call == CallState::Idle {
            return;
        }
        info!("Call ended: {:?}", reason);
        self.call = CallState::Idle;
        self.signals.push_back(RemoteSignal::Ended { reason });
    }

    fn invalid(&self, action: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            action,
            state: self.call.name(),
        }
    }
}
