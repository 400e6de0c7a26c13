use crate::agent::ChatAgent;
use crate::history::SnapshotStore;
use crate::llm::chat::ChatClient;
use crate::models::websocket::{ ClientMessage, ServerMessage };
use futures::{ SinkExt, StreamExt };
use log::{ info, warn, error, debug };
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{ AsyncRead, AsyncWrite };
use tokio::sync::mpsc;
use tokio_tungstenite::{ tungstenite::protocol::Message, WebSocketStream };
use uuid::Uuid;

// attachments travel inline as base64
pub const MAX_MESSAGE_SIZE: usize = 8 * 1024 * 1024;

fn encode(event: &ServerMessage) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(json) => Some(json),
        Err(e) => {
            error!("Failed to serialize server message: {}", e);
            None
        }
    }
}

pub async fn handle_connection<S>(
    peer: SocketAddr,
    websocket: WebSocketStream<S>,
    chat_client: Arc<dyn ChatClient>,
    snapshot: Option<SnapshotStore>
)
    where S: AsyncRead + AsyncWrite + Unpin + Send + 'static
{
    let session_id = Uuid::new_v4();
    info!("New WebSocket connection: {} (session {})", peer, session_id);

    let (mut tx, mut rx) = websocket.split();
    let (events_tx, mut events_rx) = mpsc::unbounded_channel::<ServerMessage>();

    let writer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            let Some(json) = encode(&event) else {
                continue;
            };
            if let Err(e) = tx.send(Message::Text(json)).await {
                error!("Error sending message to {}: {}", peer, e);
                break;
            }
        }
        let _ = tx.close().await;
    });

    let mut agent = ChatAgent::new(chat_client, snapshot, events_tx.clone());
    agent.ready();

    while let Some(msg) = rx.next().await {
        match msg {
            Ok(message) => {
                if message.len() > MAX_MESSAGE_SIZE {
                    warn!(
                        "Message from {} exceeds size limit ({} > {})",
                        peer,
                        message.len(),
                        MAX_MESSAGE_SIZE
                    );
                    let _ = events_tx.send(ServerMessage::Error {
                        message: "Message too large".to_string(),
                    });
                    break;
                }

                match message {
                    Message::Text(text) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(command) => {
                                debug!("Command from {}: {:?}", peer, command);
                                agent.dispatch(command).await;
                            }
                            Err(e) => {
                                error!("Failed to parse message from {}: {}", peer, e);
                                let _ = events_tx.send(ServerMessage::Error {
                                    message: format!("Failed to parse message: {}", e),
                                });
                            }
                        }
                    }
                    Message::Close(_) => {
                        info!("Received close frame from {}", peer);
                        break;
                    }
                    Message::Binary(_) => {
                        warn!("Ignoring binary message from {}", peer);
                    }
                    // tungstenite queues pong replies itself
                    Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
                }
            }
            Err(e) => {
                match e {
                    | tokio_tungstenite::tungstenite::Error::ConnectionClosed
                    | tokio_tungstenite::tungstenite::Error::Protocol(_)
                    | tokio_tungstenite::tungstenite::Error::Utf8 => {
                        info!("WebSocket connection closed or protocol error for {}: {}", peer, e);
                    }
                    tokio_tungstenite::tungstenite::Error::Io(ref io_err) if
                        io_err.kind() == std::io::ErrorKind::ConnectionReset
                    => {
                        info!("WebSocket connection reset by peer {}", peer);
                    }
                    tokio_tungstenite::tungstenite::Error::Capacity(ref cap_err) => {
                        error!("WebSocket capacity error for {}: {}", peer, cap_err);
                        let _ = events_tx.send(ServerMessage::Error {
                            message: "Server capacity error".to_string(),
                        });
                    }
                    _ => {
                        error!("Error receiving message from {}: {}", peer, e);
                    }
                }
                break;
            }
        }
    }

    drop(agent);
    drop(events_tx);
    if let Err(e) = writer.await {
        error!("Writer task for {} failed: {}", peer, e);
    }
    info!("WebSocket connection closed for {} (session {})", peer, session_id);
}
