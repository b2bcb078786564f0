//! Game socket handler: one task pair per connected client.
//!
//! The reader task applies `join_game` / `get_valid_moves` / `make_move`
//! against the shared rooms; replies go to the client's own queue, room
//! updates fan out through the `WsManager`.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::types::{Square, Variant};
use crate::ws::messages::{ClientCommand, ServerEvent};

use super::manager::{ClientId, ClientSender};
use super::room::{Room, RoomError};
use super::state::SharedState;

/// GET /ws: upgrade to the game socket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Seat held by a connection after a successful `join_game`.
#[derive(Debug, Clone)]
struct Seat {
    game_id: String,
    player_id: String,
}

async fn handle_socket(socket: WebSocket, state: SharedState) {
    let client_id = state.ws.next_client_id();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();
    let (mut sink, mut stream) = socket.split();
    debug!(client_id, "client connected");

    // Writer task: queued events → WS sink.
    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if sink
                .send(Message::Text(event.to_json().into()))
                .await
                .is_err()
            {
                break;
            }
        }
        let _ = sink.close().await;
    });

    // Reader task: client commands → rooms. Yields the seat it held.
    let reader_state = state.clone();
    let reader = tokio::spawn(async move {
        let mut seat: Option<Seat> = None;
        while let Some(Ok(msg)) = stream.next().await {
            match msg {
                Message::Text(text) => {
                    handle_client_message(&reader_state, client_id, &tx, &mut seat, text.as_str()).await;
                }
                Message::Close(_) => break,
                _ => {} // Binary / Ping / Pong handled by Axum
            }
        }
        seat
    });

    // The reader ends when the client goes away; the writer is useless then.
    let seat = reader.await.ok().flatten();
    writer.abort();

    if let Some(seat) = seat {
        leave(&state, client_id, &seat).await;
    }
    debug!(client_id, "client session cleaned up");
}

/// Process one client text frame.
async fn handle_client_message(
    state: &SharedState,
    client_id: ClientId,
    tx: &ClientSender,
    seat: &mut Option<Seat>,
    text: &str,
) {
    let cmd = match serde_json::from_str::<ClientCommand>(text) {
        Ok(c) => c,
        Err(e) => {
            debug!(client_id, "invalid command: {e}");
            let _ = tx.send(ServerEvent::error("Invalid message"));
            return;
        }
    };
    debug!(client_id, tag = cmd.tag(), "command");

    let result = match cmd {
        ClientCommand::JoinGame {
            game_id,
            game_type,
            player_id,
        } => join(state, client_id, tx, seat, game_id, game_type, player_id).await,
        ClientCommand::GetValidMoves { game_id, position } => {
            let rooms = state.rooms.read().await;
            match rooms.get(&game_id) {
                Some(room) => {
                    let moves = Square::from_pair(position)
                        .map(|sq| room.valid_moves(sq))
                        .unwrap_or_default();
                    let _ = tx.send(ServerEvent::valid_moves(&moves));
                    Ok(())
                }
                None => Err(RoomError::NotFound),
            }
        }
        ClientCommand::MakeMove {
            game_id,
            from_pos,
            to_pos,
            player_id,
        } => {
            let event = {
                let mut rooms = state.rooms.write().await;
                let room = rooms.get_mut(&game_id).ok_or(RoomError::NotFound);
                room.and_then(|room| {
                    // Moves are only taken for the player this connection joined as.
                    let seated = seat
                        .as_ref()
                        .is_some_and(|s| s.game_id == game_id && s.player_id == player_id);
                    if !seated {
                        return Err(RoomError::NotSeated);
                    }
                    let from = Square::from_pair(from_pos).map_err(|_| RoomError::InvalidMove)?;
                    let to = Square::from_pair(to_pos).map_err(|_| RoomError::InvalidMove)?;
                    room.make_move(&player_id, from, to)
                })
            };
            match event {
                Ok(event) => {
                    info!(game_id, player_id, ?from_pos, ?to_pos, "move applied");
                    state.ws.broadcast(&game_id, event).await;
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
    };

    if let Err(err) = result {
        debug!(client_id, %err, "command rejected");
        let _ = tx.send(ServerEvent::error(&err.to_string()));
    }
}

async fn join(
    state: &SharedState,
    client_id: ClientId,
    tx: &ClientSender,
    seat: &mut Option<Seat>,
    game_id: String,
    game_type: Variant,
    player_id: String,
) -> Result<(), RoomError> {
    if game_id.is_empty() {
        return Err(RoomError::MissingGameId);
    }

    let (color, joined) = {
        let mut rooms = state.rooms.write().await;
        let room = rooms
            .entry(game_id.clone())
            .or_insert_with(|| Room::new(&game_id, game_type));
        let color = room.join(&player_id)?;
        (color, room.joined_event(color))
    };

    let _ = tx.send(joined);
    state.ws.register(&game_id, client_id, tx.clone()).await;
    state
        .ws
        .broadcast_except(
            &game_id,
            client_id,
            ServerEvent::PlayerJoined {
                player_id: player_id.clone(),
                color,
            },
        )
        .await;
    info!(game_id, player_id, %color, "player joined");

    if let Some(previous) = seat.take()
        && previous.game_id != game_id
    {
        state.ws.unregister(&previous.game_id, client_id).await;
    }
    *seat = Some(Seat { game_id, player_id });
    Ok(())
}

/// Tell the rest of the room the player is gone; drop the room when
/// nobody is left.
async fn leave(state: &SharedState, client_id: ClientId, seat: &Seat) {
    state.ws.unregister(&seat.game_id, client_id).await;
    state
        .ws
        .broadcast(&seat.game_id, ServerEvent::OpponentDisconnected)
        .await;

    if state.ws.subscriber_count(&seat.game_id).await == 0 {
        state.rooms.write().await.remove(&seat.game_id);
        debug!(game_id = %seat.game_id, "empty room removed");
    }
    warn!(game_id = %seat.game_id, player_id = %seat.player_id, "player disconnected");
}
