use huddle_core::{ConnectionId, EndReason, HuddleError, RoomId, ServerEvent};
use serde_json::Value;
use tracing::{debug, info};

/// Call negotiation input from one member of the room.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Offer {
        target: Option<ConnectionId>,
        payload: Value,
    },
    Answer {
        payload: Value,
    },
    Ice {
        target: Option<ConnectionId>,
        payload: Value,
    },
    EndCall,
}

impl Signal {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Offer { .. } => "offer",
            Self::Answer { .. } => "answer",
            Self::Ice { .. } => "ice-candidate",
            Self::EndCall => "end_call",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipients {
    One(ConnectionId),
    AllExcept(ConnectionId),
}

/// An event the room actor has to fan out on behalf of the relay.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub to: Recipients,
    pub event: ServerEvent,
}

impl Outbound {
    fn one(to: ConnectionId, event: ServerEvent) -> Self {
        Self {
            to: Recipients::One(to),
            event,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    Offered,
    Connected,
}

/// Where the pending offer went: an addressed peer or everyone else in the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Audience {
    Peer(ConnectionId),
    Room,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CallSession {
    initiator: ConnectionId,
    responder: Option<ConnectionId>,
    /// Author of the pending offer. Differs from `initiator` when the
    /// responder renegotiates.
    offerer: ConnectionId,
    phase: CallPhase,
    audience: Audience,
}

impl CallSession {
    fn is_party(&self, id: ConnectionId) -> bool {
        self.initiator == id || self.responder == Some(id)
    }

    fn other_party(&self, id: ConnectionId) -> Option<ConnectionId> {
        if self.initiator == id {
            self.responder
        } else if self.responder == Some(id) {
            Some(self.initiator)
        } else {
            None
        }
    }

    /// Whether `id` may answer the pending offer.
    fn may_answer(&self, id: ConnectionId) -> bool {
        if id == self.offerer {
            return false;
        }
        match (self.responder, self.audience) {
            (Some(_), _) => self.is_party(id),
            (None, Audience::Peer(peer)) => peer == id,
            (None, Audience::Room) => true,
        }
    }

    fn offer_recipients(&self) -> Recipients {
        match self.audience {
            Audience::Peer(peer) => Recipients::One(peer),
            Audience::Room => Recipients::AllExcept(self.offerer),
        }
    }
}

/// Per-room WebRTC signaling state. At most one call per room; payloads are
/// forwarded verbatim and never inspected.
///
/// Glare (two members offering at once) is settled by connection id: the lower
/// id keeps or takes the pending offer and the other side gets `call_glare`.
#[derive(Debug)]
pub struct SignalingRelay {
    room: RoomId,
    session: Option<CallSession>,
}

impl SignalingRelay {
    pub fn new(room: RoomId) -> Self {
        Self {
            room,
            session: None,
        }
    }

    pub fn phase(&self) -> Option<CallPhase> {
        self.session.as_ref().map(|s| s.phase)
    }

    pub fn initiator(&self) -> Option<ConnectionId> {
        self.session.as_ref().map(|s| s.initiator)
    }

    pub fn responder(&self) -> Option<ConnectionId> {
        self.session.as_ref().and_then(|s| s.responder)
    }

    pub fn is_idle(&self) -> bool {
        self.session.is_none()
    }

    /// Applies one signal from `from`. `is_member` answers room membership for
    /// addressed targets.
    pub fn handle(
        &mut self,
        from: ConnectionId,
        signal: Signal,
        is_member: impl Fn(&ConnectionId) -> bool,
    ) -> Result<Vec<Outbound>, HuddleError> {
        debug!("[{}] {} from {}", self.room, signal.name(), from);

        match signal {
            Signal::Offer { target, payload } => {
                if let Some(target) = target {
                    if target == from || !is_member(&target) {
                        return Err(HuddleError::ConnectionNotFound(target));
                    }
                }
                Ok(self.on_offer(from, target, payload))
            }
            Signal::Answer { payload } => self.on_answer(from, payload),
            Signal::Ice { target, payload } => self.on_ice(from, target, payload),
            Signal::EndCall => self.on_end_call(from),
        }
    }

    /// Ends any session `id` takes part in. Called when it leaves or disconnects.
    pub fn member_left(&mut self, id: ConnectionId) -> Vec<Outbound> {
        let Some(session) = &self.session else {
            return Vec::new();
        };

        let affected = session.is_party(id)
            || session.offerer == id
            || session.audience == Audience::Peer(id);
        if !affected {
            return Vec::new();
        }

        info!("[{}] Call ended: {} left", self.room, id);
        self.terminate(id, EndReason::PeerLeft)
    }

    fn on_offer(
        &mut self,
        from: ConnectionId,
        target: Option<ConnectionId>,
        payload: Value,
    ) -> Vec<Outbound> {
        let audience = target.map_or(Audience::Room, Audience::Peer);

        let Some(session) = self.session.as_mut() else {
            let session = CallSession {
                initiator: from,
                responder: None,
                offerer: from,
                phase: CallPhase::Offered,
                audience,
            };
            info!("[{}] Call offered by {}", self.room, from);
            let to = session.offer_recipients();
            self.session = Some(session);
            return vec![self.forward_offer(to, from, payload)];
        };

        match session.phase {
            CallPhase::Connected => {
                let Some(other) = session.other_party(from) else {
                    return vec![self.busy(from)];
                };
                // Renegotiation keeps both parties and their roles.
                session.phase = CallPhase::Offered;
                session.offerer = from;
                session.audience = Audience::Peer(other);
                debug!("[{}] Renegotiation offered by {}", self.room, from);
                vec![self.forward_offer(Recipients::One(other), from, payload)]
            }

            CallPhase::Offered if from == session.offerer => {
                if target.is_some() && session.responder.is_none() {
                    session.audience = audience;
                }
                let to = session.offer_recipients();
                vec![self.forward_offer(to, from, payload)]
            }

            CallPhase::Offered => {
                if session.responder.is_some() && !session.is_party(from) {
                    return vec![self.busy(from)];
                }

                let incumbent = session.offerer;
                let winner = incumbent.min(from);
                info!(
                    "[{}] Glare between {} and {}, {} keeps the offer",
                    self.room, incumbent, from, winner
                );

                if winner == incumbent {
                    return vec![Outbound::one(
                        from,
                        ServerEvent::CallGlare {
                            room: self.room.clone(),
                            winner,
                        },
                    )];
                }

                session.offerer = from;
                if session.responder.is_some() {
                    session.audience = Audience::Peer(incumbent);
                } else {
                    session.initiator = from;
                    session.audience = audience;
                }
                let to = session.offer_recipients();

                vec![
                    Outbound::one(
                        incumbent,
                        ServerEvent::CallGlare {
                            room: self.room.clone(),
                            winner,
                        },
                    ),
                    self.forward_offer(to, from, payload),
                ]
            }
        }
    }

    fn on_answer(
        &mut self,
        from: ConnectionId,
        payload: Value,
    ) -> Result<Vec<Outbound>, HuddleError> {
        let Some(session) = self.session.as_mut() else {
            return Err(HuddleError::StateConflict("no call is being negotiated"));
        };

        if session.phase == CallPhase::Connected {
            return Err(HuddleError::StateConflict("call is already connected"));
        }
        if from == session.offerer {
            return Err(HuddleError::StateConflict(
                "the caller cannot answer its own offer",
            ));
        }
        if !session.may_answer(from) {
            return Ok(vec![self.busy(from)]);
        }

        let offerer = session.offerer;
        if session.responder.is_none() {
            session.responder = Some(from);
        }
        session.phase = CallPhase::Connected;
        session.audience = Audience::Peer(from);
        info!("[{}] Call connected: {} <-> {}", self.room, offerer, from);

        Ok(vec![Outbound::one(
            offerer,
            ServerEvent::Answer {
                room: self.room.clone(),
                from,
                answer: payload,
            },
        )])
    }

    fn on_ice(
        &mut self,
        from: ConnectionId,
        target: Option<ConnectionId>,
        payload: Value,
    ) -> Result<Vec<Outbound>, HuddleError> {
        let Some(session) = &self.session else {
            return Err(HuddleError::StateConflict("no call in progress"));
        };

        let to = match session.phase {
            CallPhase::Connected => match session.other_party(from) {
                Some(other) => Recipients::One(other),
                None => return Err(HuddleError::StateConflict("not a party to the call")),
            },
            CallPhase::Offered if from == session.offerer => match target {
                Some(target)
                    if session.audience == Audience::Room
                        || session.audience == Audience::Peer(target) =>
                {
                    Recipients::One(target)
                }
                Some(_) => return Err(HuddleError::StateConflict("not a party to the call")),
                None => session.offer_recipients(),
            },
            CallPhase::Offered if session.may_answer(from) || session.is_party(from) => {
                Recipients::One(session.offerer)
            }
            CallPhase::Offered => {
                return Err(HuddleError::StateConflict("not a party to the call"));
            }
        };

        Ok(vec![Outbound {
            to,
            event: ServerEvent::IceCandidate {
                room: self.room.clone(),
                from,
                candidate: payload,
            },
        }])
    }

    fn on_end_call(&mut self, from: ConnectionId) -> Result<Vec<Outbound>, HuddleError> {
        let Some(session) = &self.session else {
            return Ok(Vec::new());
        };

        let declining = session.phase == CallPhase::Offered && session.may_answer(from);
        if !session.is_party(from) && !declining {
            return Err(HuddleError::StateConflict("not a party to the call"));
        }

        info!("[{}] Call hung up by {}", self.room, from);
        Ok(self.terminate(from, EndReason::HangUp))
    }

    /// Drops the session and notifies whoever is still on the other end.
    fn terminate(&mut self, by: ConnectionId, reason: EndReason) -> Vec<Outbound> {
        let Some(session) = self.session.take() else {
            return Vec::new();
        };

        let to = if let Some(other) = session.other_party(by) {
            Recipients::One(other)
        } else if by == session.offerer {
            session.offer_recipients()
        } else {
            Recipients::One(session.offerer)
        };

        vec![Outbound {
            to,
            event: ServerEvent::EndCall {
                room: self.room.clone(),
                reason,
            },
        }]
    }

    fn busy(&self, to: ConnectionId) -> Outbound {
        Outbound::one(
            to,
            ServerEvent::CallBusy {
                room: self.room.clone(),
            },
        )
    }

    fn forward_offer(&self, to: Recipients, from: ConnectionId, payload: Value) -> Outbound {
        Outbound {
            to,
            event: ServerEvent::Offer {
                room: self.room.clone(),
                from,
                offer: payload,
            },
        }
    }
}
