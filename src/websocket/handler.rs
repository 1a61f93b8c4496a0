use actix::{Actor, ActorContext, AsyncContext, Handler, Running, StreamHandler};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use log::{info, warn};
use uuid::Uuid;

use crate::models::{AppState, ClientMessage, RelayText, ServerMessage};

/// One connected client. Holds only the connection identity and the room
/// it sits in; game state lives in the clients' engines, never here.
pub struct RelayWebSocket {
    pub id: String,
    pub room_id: String,
    pub app_state: web::Data<AppState>,
}

impl Actor for RelayWebSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        // Register the actor with the application state
        let addr = ctx.address();
        self.app_state
            .sessions
            .lock()
            .unwrap()
            .insert(self.id.clone(), addr);

        let total_sessions = self.app_state.sessions.lock().unwrap().len();
        info!("WebSocket connection started: {}", self.id);
        info!("Total active sessions: {}", total_sessions);
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        // A dropped connection tears the session down exactly like an
        // explicit leave: the peer is told and the room goes away.
        self.leave_room();
        self.app_state.sessions.lock().unwrap().remove(&self.id);
        info!("WebSocket connection closed: {}", self.id);
        Running::Stop
    }
}

impl Handler<RelayText> for RelayWebSocket {
    type Result = ();

    fn handle(&mut self, msg: RelayText, ctx: &mut Self::Context) {
        ctx.text(msg.0);
    }
}

// WebSocket message handler
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for RelayWebSocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {}
            Ok(ws::Message::Text(text)) => {
                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => self.handle_message(client_msg, ctx),
                    Err(e) => {
                        warn!("Error parsing client message: {}", e);
                        self.send_json(
                            ctx,
                            &ServerMessage::error(format!("Invalid message format: {}", e)),
                        );
                    }
                }
            }
            Ok(ws::Message::Binary(_)) => {
                warn!("Binary messages are not supported");
                self.send_json(ctx, &ServerMessage::error("Binary messages are not supported"));
            }
            Ok(ws::Message::Close(reason)) => {
                info!("Connection closed: {:?}", reason);
                ctx.close(reason);
                ctx.stop();
            }
            _ => {
                ctx.stop();
            }
        }
    }
}

impl RelayWebSocket {
    pub fn send_json(&self, ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMessage) {
        match serde_json::to_string(msg) {
            Ok(text) => ctx.text(text),
            Err(e) => warn!("Failed to serialize server message: {}", e),
        }
    }

    /// Forward a message to the other participant of our room, if any.
    pub fn send_to_peer(&self, msg: &ServerMessage) {
        let peer_id = {
            let rooms = self.app_state.rooms.lock().unwrap();
            match rooms
                .get(&self.room_id)
                .and_then(|room| room.peer_of(&self.id))
            {
                Some(peer) => peer.session_id.clone(),
                None => {
                    info!("No peer to relay to in room {}", self.room_id);
                    return;
                }
            }
        };
        let addr = self
            .app_state
            .sessions
            .lock()
            .unwrap()
            .get(&peer_id)
            .cloned();
        match addr {
            Some(addr) => match serde_json::to_string(msg) {
                Ok(text) => addr.do_send(RelayText(text)),
                Err(e) => warn!("Failed to serialize relay message: {}", e),
            },
            None => info!("Peer {} not found in sessions", peer_id),
        }
    }

    /// Drop out of the current room, notifying the peer that the session
    /// is over. Shared by the explicit leave message and disconnects.
    pub fn leave_room(&mut self) {
        if self.room_id.is_empty() {
            return;
        }
        let room_id = std::mem::take(&mut self.room_id);
        let peer_id = {
            let mut rooms = self.app_state.rooms.lock().unwrap();
            let Some(room) = rooms.remove(&room_id) else {
                return;
            };
            if !room.contains(&self.id) {
                rooms.insert(room_id.clone(), room);
                return;
            }
            room.peer_of(&self.id).map(|p| p.session_id.clone())
        };
        info!("Player {} left room {}", self.id, room_id);

        if let Some(peer_id) = peer_id {
            let addr = self
                .app_state
                .sessions
                .lock()
                .unwrap()
                .get(&peer_id)
                .cloned();
            if let Some(addr) = addr {
                let notice = ServerMessage {
                    room_id: Some(room_id),
                    ..ServerMessage::new("opponent_left")
                };
                if let Ok(text) = serde_json::to_string(&notice) {
                    addr.do_send(RelayText(text));
                }
            }
        }
    }
}

/// WebSocket connection handler
pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let id = Uuid::new_v4().to_string();
    info!("New WebSocket connection: {}", id);

    let session = RelayWebSocket {
        id,
        room_id: String::new(),
        app_state,
    };
    ws::start(session, &req, stream)
}
