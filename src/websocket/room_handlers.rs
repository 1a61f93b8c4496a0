use actix_web_actors::ws;
use log::{info, warn};

use crate::models::{ClientMessage, Participant, RelayText, Room, RoomLifecycle, ServerMessage};
use crate::websocket::handler::RelayWebSocket;

impl RelayWebSocket {
    pub fn handle_message(&mut self, msg: ClientMessage, ctx: &mut ws::WebsocketContext<Self>) {
        match msg.message_type.as_str() {
            "create_room" => self.handle_create(msg, ctx),
            "join_request" => self.handle_join(msg, ctx),
            "move" | "checked" | "promote" | "promoted" | "game_over" | "rematch_request"
            | "rematch_accept" | "rematch_decline" => self.handle_relay(msg, ctx),
            "leave" => self.leave_room(),
            other => {
                info!("Unknown message type: {}", other);
                self.send_json(
                    ctx,
                    &ServerMessage::error(format!("Unknown message type: {}", other)),
                );
            }
        }
    }

    pub fn handle_create(&mut self, msg: ClientMessage, ctx: &mut ws::WebsocketContext<Self>) {
        let Some(room_id) = msg.room_id.filter(|id| !id.is_empty()) else {
            self.send_json(ctx, &ServerMessage::error("No room ID provided"));
            return;
        };
        let time_control = msg.time_control.unwrap_or(10);
        let name = msg.player_name.unwrap_or_else(|| "anonymous".to_string());

        let created = {
            let mut rooms = self.app_state.rooms.lock().unwrap();
            if rooms.contains_key(&room_id) {
                false
            } else {
                let creator = Participant {
                    session_id: self.id.clone(),
                    name,
                };
                rooms.insert(
                    room_id.clone(),
                    Room::new(room_id.clone(), time_control, creator),
                );
                true
            }
        };
        if !created {
            warn!("Room {} already exists", room_id);
            self.send_json(ctx, &ServerMessage::error("Room already exists"));
            return;
        }

        self.room_id = room_id.clone();
        info!(
            "Player {} created room {} ({} min per side)",
            self.id, room_id, time_control
        );

        let response = ServerMessage {
            room_id: Some(room_id),
            time_control: Some(time_control),
            ..ServerMessage::new("room_created")
        };
        self.send_json(ctx, &response);
    }

    pub fn handle_join(&mut self, msg: ClientMessage, ctx: &mut ws::WebsocketContext<Self>) {
        let Some(room_id) = msg.room_id.filter(|id| !id.is_empty()) else {
            self.send_json(ctx, &ServerMessage::error("No room ID provided"));
            return;
        };
        let name = msg.player_name.unwrap_or_else(|| "anonymous".to_string());

        // Slot allocation is a single check-and-append under one lock
        // acquisition, so two racing joiners cannot both observe the free
        // slot.
        let joined = {
            let mut rooms = self.app_state.rooms.lock().unwrap();
            rooms.get_mut(&room_id).and_then(|room| {
                let participant = Participant {
                    session_id: self.id.clone(),
                    name,
                };
                if room.try_join(participant) {
                    let session_ids: Vec<String> = room
                        .players()
                        .iter()
                        .map(|p| p.session_id.clone())
                        .collect();
                    Some((room.time_control, room.player_names(), session_ids))
                } else {
                    None
                }
            })
        };

        let response = ServerMessage {
            room_id: Some(room_id.clone()),
            accepted: Some(joined.is_some()),
            ..ServerMessage::new("join_response")
        };
        self.send_json(ctx, &response);

        let Some((time_control, names, session_ids)) = joined else {
            info!("Join request for room {} rejected", room_id);
            return;
        };
        self.room_id = room_id.clone();
        info!("Player {} joined room {}; game ready", self.id, room_id);

        // Both participants get the same start signal; colors follow join
        // order, the creator playing White.
        let ready = ServerMessage {
            room_id: Some(room_id),
            players: Some(names),
            time_control: Some(time_control),
            ..ServerMessage::new("game_ready")
        };
        if let Ok(text) = serde_json::to_string(&ready) {
            let sessions = self.app_state.sessions.lock().unwrap();
            for session_id in session_ids {
                if let Some(addr) = sessions.get(&session_id) {
                    addr.do_send(RelayText(text.clone()));
                }
            }
        }
    }

    /// Game traffic is a pure pass-through to the peer. No legality check
    /// happens at this layer: each client's engine is authoritative for its
    /// own side and trusts the opponent's.
    pub fn handle_relay(&mut self, msg: ClientMessage, ctx: &mut ws::WebsocketContext<Self>) {
        if self.room_id.is_empty() {
            self.send_json(ctx, &ServerMessage::error("Not in a room"));
            return;
        }
        info!("Relaying {} in room {}", msg.message_type, self.room_id);

        {
            let mut rooms = self.app_state.rooms.lock().unwrap();
            if let Some(room) = rooms.get_mut(&self.room_id) {
                match msg.message_type.as_str() {
                    "game_over" => room.lifecycle = RoomLifecycle::Ended,
                    "rematch_accept" => room.lifecycle = RoomLifecycle::Active,
                    _ => {}
                }
            }
        }

        self.send_to_peer(&ServerMessage::relay(&msg));
    }
}
