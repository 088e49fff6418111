use axum::{
    extract::{State, ws::{Message, WebSocket, WebSocketUpgrade}},
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::time::{interval, Duration};

use crate::models::Tab;
use crate::services::DashboardEvent;
use super::rest::{dispatch, AppState};

const HEARTBEAT: Duration = Duration::from_secs(10);
const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Commands a client may send over the socket.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientCommand {
    Ping,
    SelectTab { tab: String },
    Page { page: u32 },
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut update_ticker = interval(state.push_interval);
    let mut heartbeat_ticker = interval(HEARTBEAT);

    loop {
        tokio::select! {
            _ = update_ticker.tick() => {
                let view = state.controller.view();
                let msg = serde_json::json!({
                    "type": "tab_update",
                    "tab": view.tab,
                    "data": view,
                });

                match tokio::time::timeout(SEND_TIMEOUT, sender.send(Message::Text(msg.to_string()))).await {
                    Ok(Ok(_)) => {}
                    _ => return,
                }
            }

            _ = heartbeat_ticker.tick() => {
                if sender.send(Message::Ping(vec![])).await.is_err() {
                    return;
                }
            }

            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = match serde_json::from_str::<ClientCommand>(&text) {
                            Ok(command) => apply(&state, command),
                            Err(e) => serde_json::json!({ "type": "error", "error": e.to_string() }),
                        };
                        if sender.send(Message::Text(reply.to_string())).await.is_err() {
                            return;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => return,
                    Some(Ok(Message::Pong(_))) => {}
                    _ => {}
                }
            }
        }
    }
}

fn apply(state: &AppState, command: ClientCommand) -> serde_json::Value {
    match command {
        ClientCommand::Ping => serde_json::json!({ "type": "pong" }),
        ClientCommand::SelectTab { tab } => match tab.parse::<Tab>() {
            Ok(tab) => {
                dispatch(&state.controller, DashboardEvent::TabSelected(tab));
                serde_json::json!({ "type": "ack", "tab": tab })
            }
            Err(e) => serde_json::json!({ "type": "error", "error": e.to_string() }),
        },
        ClientCommand::Page { page } => match state.controller.check_page(page) {
            Ok(category) => {
                dispatch(&state.controller, DashboardEvent::PageRequested(page));
                serde_json::json!({ "type": "ack", "category": category, "page": page })
            }
            Err(e) => serde_json::json!({ "type": "error", "error": e.to_string() }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_client_commands() {
        assert_eq!(serde_json::from_str::<ClientCommand>(r#"{"type":"ping"}"#).unwrap(), ClientCommand::Ping);
        assert_eq!(
            serde_json::from_str::<ClientCommand>(r#"{"type":"select_tab","tab":"last-trade"}"#).unwrap(),
            ClientCommand::SelectTab { tab: "last-trade".to_string() }
        );
        assert_eq!(
            serde_json::from_str::<ClientCommand>(r#"{"type":"page","page":3}"#).unwrap(),
            ClientCommand::Page { page: 3 }
        );
        assert!(serde_json::from_str::<ClientCommand>(r#"{"type":"page","page":-1}"#).is_err());
    }
}
