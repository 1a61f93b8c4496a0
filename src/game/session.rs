use log::{debug, warn};

use crate::engine::{Color, Coord, GameState, Outcome, Phase, Promotion, TurnReport};
use crate::models::{ClientMessage, ServerMessage, WireMove};

/// What an incoming relay message meant, for the host UI to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    OpponentMoved {
        from: Coord,
        to: Coord,
        in_check: bool,
    },
    /// The opponent's pawn is parked on our back row awaiting their choice.
    OpponentPromoting { square: Coord },
    OpponentPromoted {
        square: Coord,
        promotion: Promotion,
        in_check: bool,
    },
    OpponentCheckedUs,
    GameEnded(Outcome),
    OpponentLeft(Outcome),
    RematchRequested,
    RematchAccepted,
    RematchDeclined,
}

/// The result of feeding the session one input: messages to push through
/// the relay, and the event to surface locally.
#[derive(Debug, Default)]
pub struct SessionUpdate {
    pub outgoing: Vec<ClientMessage>,
    pub event: Option<SessionEvent>,
}

impl SessionUpdate {
    fn event(event: SessionEvent) -> Self {
        Self {
            outgoing: Vec::new(),
            event: Some(event),
        }
    }
}

/// One client's side of a match: owns the engine state and translates
/// between it and the wire contract. Local moves outside the legal set are
/// dropped silently (no state change, no message); incoming opponent
/// traffic is applied on trust, with only sequencing violations refused.
pub struct ClientGame {
    room_id: String,
    minutes: u32,
    state: GameState,
}

impl ClientGame {
    /// Build from the `game_ready` signal. Colors follow join order: the
    /// client that created the room plays White.
    pub fn from_game_ready(room_id: &str, created_room: bool, minutes: u32) -> Self {
        let us = if created_room {
            Color::White
        } else {
            Color::Black
        };
        Self {
            room_id: room_id.to_string(),
            minutes,
            state: GameState::new(us, minutes),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Which color's clock the host should be ticking, if any. At most one
    /// timer per session: re-scope it on every event this returns a new
    /// value after, and stop it when this goes `None`.
    pub fn active_clock(&self) -> Option<Color> {
        self.state.active_clock()
    }

    fn base(&self, message_type: &str) -> ClientMessage {
        ClientMessage {
            message_type: message_type.to_string(),
            room_id: Some(self.room_id.clone()),
            ..ClientMessage::default()
        }
    }

    /// Play one of our own moves and produce the traffic it generates:
    /// the mirrored `move`, plus `promote` when our pawn reached the far
    /// rank, plus `checked` when the completed move gives check.
    pub fn submit_move(&mut self, from: Coord, to: Coord) -> SessionUpdate {
        let record = match self.state.play_move(from, to) {
            Ok(record) => record,
            Err(err) => {
                debug!("rejected local move {:?} -> {:?}: {}", from, to, err);
                return SessionUpdate::default();
            }
        };
        let mut outgoing = vec![ClientMessage {
            game_move: Some(WireMove {
                row_origin: 7 - from.row,
                col_origin: 7 - from.col,
                row_dest: 7 - to.row,
                col_dest: 7 - to.col,
            }),
            ..self.base("move")
        }];
        if let Phase::AwaitingPromotion { square, .. } = self.state.phase() {
            outgoing.push(ClientMessage {
                col: Some(7 - square.col),
                ..self.base("promote")
            });
        } else if record.gives_check {
            outgoing.push(self.base("checked"));
        }
        SessionUpdate {
            outgoing,
            event: None,
        }
    }

    /// Resolve our pending promotion; emits `promoted` (and `checked` when
    /// the new piece delivers check).
    pub fn submit_promotion(&mut self, promotion: Promotion) -> SessionUpdate {
        let record = match self.state.choose_promotion(promotion) {
            Ok(record) => record,
            Err(err) => {
                debug!("rejected promotion choice: {}", err);
                return SessionUpdate::default();
            }
        };
        let mut outgoing = vec![ClientMessage {
            col: Some(7 - record.square.col),
            piece_code: Some(record.promotion.code().to_string()),
            ..self.base("promoted")
        }];
        if record.gives_check {
            outgoing.push(self.base("checked"));
        }
        SessionUpdate {
            outgoing,
            event: None,
        }
    }

    /// One elapsed second on the active clock. A flag fall ends the game
    /// and tells the peer.
    pub fn tick(&mut self) -> SessionUpdate {
        match self.state.tick() {
            Some(outcome) => self.announce(outcome),
            None => SessionUpdate::default(),
        }
    }

    pub fn resign(&mut self) -> SessionUpdate {
        let outcome = self.state.resign();
        self.announce(outcome)
    }

    pub fn leave(&self) -> ClientMessage {
        self.base("leave")
    }

    pub fn request_rematch(&self) -> ClientMessage {
        self.base("rematch_request")
    }

    pub fn decline_rematch(&self) -> ClientMessage {
        self.base("rematch_decline")
    }

    /// Accept the opponent's rematch offer: fresh board, same pairing and
    /// colors.
    pub fn accept_rematch(&mut self) -> SessionUpdate {
        self.reset();
        SessionUpdate {
            outgoing: vec![self.base("rematch_accept")],
            event: Some(SessionEvent::RematchAccepted),
        }
    }

    /// Apply a message relayed from the peer.
    pub fn handle_server(&mut self, msg: &ServerMessage) -> SessionUpdate {
        match msg.message_type.as_str() {
            "move" => self.on_move(msg),
            "promote" => self.on_promote_notice(msg),
            "promoted" => self.on_promoted(msg),
            "checked" => SessionUpdate::event(SessionEvent::OpponentCheckedUs),
            "game_over" => self.on_game_over(msg),
            "opponent_left" => {
                let outcome = self.state.opponent_left();
                SessionUpdate::event(SessionEvent::OpponentLeft(outcome))
            }
            "rematch_request" => SessionUpdate::event(SessionEvent::RematchRequested),
            "rematch_accept" => {
                self.reset();
                SessionUpdate::event(SessionEvent::RematchAccepted)
            }
            "rematch_decline" => SessionUpdate::event(SessionEvent::RematchDeclined),
            other => {
                debug!("ignoring server message type {}", other);
                SessionUpdate::default()
            }
        }
    }

    fn on_move(&mut self, msg: &ServerMessage) -> SessionUpdate {
        let Some(wire) = msg.game_move else {
            warn!("move message without coordinates");
            return SessionUpdate::default();
        };
        if wire.row_origin > 7 || wire.col_origin > 7 || wire.row_dest > 7 || wire.col_dest > 7 {
            warn!("move message out of bounds");
            return SessionUpdate::default();
        }
        let from = Coord::new(wire.row_origin, wire.col_origin);
        let to = Coord::new(wire.row_dest, wire.col_dest);
        let report = match self.state.apply_opponent_move(from, to) {
            Ok(report) => report,
            Err(err) => {
                debug!("dropping opponent move: {}", err);
                return SessionUpdate::default();
            }
        };
        self.settle(
            report,
            SessionEvent::OpponentMoved {
                from,
                to,
                in_check: report.in_check,
            },
        )
    }

    fn on_promote_notice(&mut self, msg: &ServerMessage) -> SessionUpdate {
        match (self.state.phase(), msg.col) {
            (Phase::AwaitingPromotion { color, square }, Some(col))
                if color != self.state.us() && square.col == col =>
            {
                SessionUpdate::event(SessionEvent::OpponentPromoting { square })
            }
            _ => {
                debug!("promote notice without a matching pending pawn");
                SessionUpdate::default()
            }
        }
    }

    fn on_promoted(&mut self, msg: &ServerMessage) -> SessionUpdate {
        let Some(col) = msg.col.filter(|&col| col < 8) else {
            warn!("promoted message without a valid column");
            return SessionUpdate::default();
        };
        let promotion = msg
            .piece_code
            .as_deref()
            .and_then(|code| code.chars().next())
            .and_then(Promotion::from_code);
        let Some(promotion) = promotion else {
            warn!("promoted message without a valid piece code");
            return SessionUpdate::default();
        };
        let report = match self.state.apply_opponent_promotion(col, promotion) {
            Ok(report) => report,
            Err(err) => {
                debug!("dropping opponent promotion: {}", err);
                return SessionUpdate::default();
            }
        };
        self.settle(
            report,
            SessionEvent::OpponentPromoted {
                square: Coord::new(7, col),
                promotion,
                in_check: report.in_check,
            },
        )
    }

    fn on_game_over(&mut self, msg: &ServerMessage) -> SessionUpdate {
        let Some(outcome) = msg.outcome else {
            warn!("game over message without an outcome");
            return SessionUpdate::default();
        };
        let outcome = self.state.conclude(outcome);
        SessionUpdate::event(SessionEvent::GameEnded(outcome))
    }

    /// After an opponent event it is our turn (or our loss): when the
    /// classification ends the game we are the side that announces it.
    fn settle(&mut self, report: TurnReport, event: SessionEvent) -> SessionUpdate {
        match report.outcome {
            Some(outcome) => self.announce(outcome),
            None => SessionUpdate::event(event),
        }
    }

    fn announce(&self, outcome: Outcome) -> SessionUpdate {
        let msg = ClientMessage {
            outcome: Some(outcome),
            message: Some(outcome.to_string()),
            ..self.base("game_over")
        };
        SessionUpdate {
            outgoing: vec![msg],
            event: Some(SessionEvent::GameEnded(outcome)),
        }
    }

    fn reset(&mut self) {
        self.state = GameState::new(self.state.us(), self.minutes);
    }
}
