use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::ws::ClientCommand,
    services::room_service,
    state::{SharedState, hub::ConnectionSender},
};

/// Handle the full lifecycle of one participant WebSocket connection.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps broadcasts flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let conn = Uuid::new_v4();
    info!(conn = %conn, "participant connected");

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match ClientCommand::from_json_str(&text) {
                Ok(command) => dispatch(&state, conn, &outbound_tx, command).await,
                Err(err) => {
                    debug!(conn = %conn, error = %err, "dropping unparseable command");
                }
            },
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(conn = %conn, "participant closed");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) | Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(conn = %conn, error = %err, "websocket error");
                break;
            }
        }
    }

    room_service::handle_disconnect(&state, conn).await;
    info!(conn = %conn, "participant disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// Bind one inbound command to the owning subsystem.
async fn dispatch(
    state: &SharedState,
    conn: Uuid,
    outbound_tx: &ConnectionSender,
    command: ClientCommand,
) {
    match command {
        ClientCommand::Join { room_id, player } => {
            room_service::join_room(state, conn, outbound_tx.clone(), &room_id, player).await;
        }
        ClientCommand::Leave { room_id, player_id } => {
            room_service::leave_room(state, conn, &room_id, &player_id).await;
        }
        ClientCommand::Cross { room_id, letter } => {
            room_service::cross_letter(state, &room_id, &letter).await;
        }
        ClientCommand::Uncross { room_id, letter } => {
            room_service::uncross_letter(state, &room_id, &letter).await;
        }
        ClientCommand::TimerStart { room_id, player_id } => {
            room_service::start_timer(state, &room_id, &player_id).await;
        }
        ClientCommand::TimerPause { room_id, player_id } => {
            room_service::pause_timer(state, &room_id, &player_id).await;
        }
        ClientCommand::TimerReset { room_id, player_id } => {
            room_service::reset_timer(state, &room_id, &player_id).await;
        }
        ClientCommand::PassTurn {
            room_id,
            from_id,
            to_id,
        } => {
            room_service::pass_turn(state, &room_id, &from_id, &to_id).await;
        }
        ClientCommand::Kick { room_id, player_id } => {
            room_service::kick_player(state, &room_id, &player_id).await;
        }
        ClientCommand::Reorder { room_id, order } => {
            room_service::reorder(state, &room_id, order).await;
        }
        ClientCommand::Start { room_id } => {
            room_service::start_training(state, &room_id).await;
        }
        ClientCommand::Unknown => {
            debug!(conn = %conn, "ignoring unknown command type");
        }
    }
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
