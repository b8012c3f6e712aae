use crate::domain::EntityId;
use crate::domain::controls::ControlState;
use crate::interface_adapters::protocol::KeyStateDto;
use crate::interface_adapters::state::AppState;
use crate::use_cases::{Connection, Hub};

use axum::{
    extract::{
        State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures::SinkExt;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{mpsc, watch};
use tracing::{Instrument, debug, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    // The player behavior dropped its control receiver (player pruned).
    ControlsClosed,
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

enum LoopControl {
    Continue,
    Disconnect,
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let hub = state.hub.clone();
    let span = info_span!("conn", player_id = tracing::field::Empty);
    ws.on_upgrade(move |socket| handle_socket(socket, hub).instrument(span))
}

async fn handle_socket(mut socket: WebSocket, hub: Arc<Hub>) {
    // Registration happens on upgrade; the player is in the roster before the first tick.
    let conn = hub.connect().await;
    let player_id = conn.player_id;
    tracing::Span::current().record("player_id", tracing::field::display(player_id));
    info!("client connected");

    let mut ctx = ConnCtx::new(conn);
    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = ?e, "client loop exited with error");
    }

    // A no-op when the hub already evicted this connection.
    hub.disconnect(player_id).await;
    debug!(
        msgs_in = ctx.msgs_in,
        msgs_out = ctx.msgs_out,
        bytes_in = ctx.bytes_in,
        bytes_out = ctx.bytes_out,
        invalid_json = ctx.invalid_json,
        "connection stats"
    );
    info!("client disconnected");
}

struct ConnCtx {
    pub player_id: EntityId,
    pub controls: watch::Sender<ControlState>,
    pub outbound: mpsc::Receiver<Utf8Bytes>,

    pub msgs_in: u64,
    pub msgs_out: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,

    pub invalid_json: u32,
    pub last_invalid_input_log: Instant,

    pub close_frame: Option<CloseFrame>,
}

impl ConnCtx {
    fn new(conn: Connection) -> Self {
        Self {
            player_id: conn.player_id,
            controls: conn.controls,
            outbound: conn.outbound,
            msgs_in: 0,
            msgs_out: 0,
            bytes_in: 0,
            bytes_out: 0,
            invalid_json: 0,
            last_invalid_input_log: Instant::now() - LOG_THROTTLE,
            close_frame: None,
        }
    }
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    let ConnCtx {
        player_id,
        controls,
        outbound,
        msgs_in,
        msgs_out,
        bytes_in,
        bytes_out,
        invalid_json,
        last_invalid_input_log,
        close_frame,
    } = ctx;
    let player_id = *player_id;

    let mut fatal: Option<NetError> = None;

    loop {
        let disconnect: bool = tokio::select! {
            // Incoming Message from Client
            incoming = socket.recv() => {
                match handle_incoming_ws(
                    incoming,
                    player_id,
                    controls,
                    msgs_in,
                    bytes_in,
                    invalid_json,
                    last_invalid_input_log,
                ) {
                    Ok(LoopControl::Continue) => false,
                    Ok(LoopControl::Disconnect) => true,
                    Err(e) => {
                        fatal = Some(e);
                        true
                    }
                }
            }

            // Outgoing World Update
            payload = outbound.recv() => {
                match payload {
                    Some(bytes) => match forward_world_bytes(bytes, socket, msgs_out, bytes_out).await {
                        LoopControl::Continue => false,
                        LoopControl::Disconnect => true,
                    },
                    None => {
                        // The hub dropped our queue: evicted as a slow consumer.
                        *close_frame = Some(CloseFrame {
                            code: close_code::POLICY,
                            reason: "too slow".into(),
                        });
                        info!(player_id = %player_id, "connection evicted by hub");
                        true
                    }
                }
            }
        };

        if disconnect {
            if let Some(frame) = close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn handle_incoming_ws(
    incoming: Option<Result<Message, axum::Error>>,
    player_id: EntityId,
    controls: &watch::Sender<ControlState>,
    msgs_in: &mut u64,
    bytes_in: &mut u64,
    invalid_json: &mut u32,
    last_invalid_input_log: &mut Instant,
) -> Result<LoopControl, NetError> {
    match incoming {
        Some(Ok(msg)) => match msg {
            Message::Text(text) => {
                *msgs_in += 1;
                *bytes_in += text.len() as u64;

                match serde_json::from_str::<KeyStateDto>(&text) {
                    Ok(dto) => {
                        if controls.is_closed() {
                            return Err(NetError::ControlsClosed);
                        }
                        // Keys are latest-wins; resync requests accumulate until the next tick.
                        controls.send_modify(|state| dto.apply_to(state));
                        Ok(LoopControl::Continue)
                    }
                    Err(parse_err) => {
                        *invalid_json += 1;
                        if should_log(last_invalid_input_log) {
                            warn!(
                                player_id = %player_id,
                                bytes = text.len(),
                                error = %parse_err,
                                "failed to parse client message"
                            );
                        }
                        Ok(LoopControl::Continue)
                    }
                }
            }
            Message::Binary(bytes) => {
                *msgs_in += 1;
                *bytes_in += bytes.len() as u64;
                if should_log(last_invalid_input_log) {
                    warn!(player_id = %player_id, bytes = bytes.len(), "binary message ignored");
                }
                Ok(LoopControl::Continue)
            }
            Message::Ping(_) | Message::Pong(_) => Ok(LoopControl::Continue),
            Message::Close(_) => Ok(LoopControl::Disconnect),
        },
        Some(Err(e)) => {
            warn!(player_id = %player_id, error = %e, "websocket recv error");
            Ok(LoopControl::Disconnect)
        }
        None => {
            info!(player_id = %player_id, "websocket closed");
            Ok(LoopControl::Disconnect)
        }
    }
}

async fn forward_world_bytes(
    world_msg: Utf8Bytes,
    socket: &mut WebSocket,
    msgs_out: &mut u64,
    bytes_out: &mut u64,
) -> LoopControl {
    let bytes_len = world_msg.len();
    match socket
        .send(Message::Text(world_msg))
        .await
        .map_err(NetError::Ws)
    {
        Ok(()) => {
            *msgs_out += 1;
            *bytes_out += bytes_len as u64;
            LoopControl::Continue
        }
        Err(err) => {
            // Log unexpected send failures; disconnect will follow immediately.
            debug!(error = ?err, "failed to send world update");
            LoopControl::Disconnect
        }
    }
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}
