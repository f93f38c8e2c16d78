use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{error, info, warn};
use warp::ws::{Message, WebSocket};

use crate::auth::{AuthError, AuthService};
use crate::broadcast::ListenerId;
use crate::game_service::GameService;
use game_core::GameStore;
use game_types::{ConnectionError, GameError, GameId, ServerMessage};

pub fn encode_message(message: &ServerMessage) -> Option<Message> {
    match serde_json::to_string(message) {
        Ok(json) => Some(Message::text(json)),
        Err(e) => {
            error!("Failed to serialize message: {:?}", e);
            None
        }
    }
}

pub fn connection_error(err: &AuthError) -> ConnectionError {
    match err {
        AuthError::TokenExpired => ConnectionError::SessionExpired,
        AuthError::MissingToken | AuthError::InvalidToken => ConnectionError::InvalidToken,
        other => ConnectionError::InternalError {
            message: other.to_string(),
        },
    }
}

/// Streams every committed snapshot of `game_id` to the socket until either
/// side goes away or the game ends.
pub async fn handle_listener<S: GameStore>(
    websocket: WebSocket,
    game_id: GameId,
    token: Option<String>,
    game_service: Arc<GameService<S>>,
    auth_service: Arc<AuthService>,
) {
    let (mut ws_sender, mut ws_receiver) = websocket.split();

    let player_id = match token
        .as_deref()
        .ok_or(AuthError::MissingToken)
        .and_then(|token| auth_service.validate_token(token))
    {
        Ok(player_id) => player_id,
        Err(e) => {
            warn!("Listener for game {} refused: {}", game_id, e);
            let reply = ServerMessage::ConnectionFailed {
                reason: connection_error(&e),
            };
            if let Some(message) = encode_message(&reply) {
                let _ = ws_sender.send(message).await;
            }
            let _ = ws_sender.close().await;
            return;
        }
    };

    let listener_id = ListenerId::new();
    let mut updates = match game_service.subscribe(game_id, listener_id).await {
        Ok(receiver) => receiver,
        Err(e) => {
            warn!("Player {} cannot listen to game {}: {}", player_id, game_id, e);
            let reply = ServerMessage::Error {
                error: GameError::from(&e),
            };
            if let Some(message) = encode_message(&reply) {
                let _ = ws_sender.send(message).await;
            }
            let _ = ws_sender.close().await;
            return;
        }
    };
    info!(
        "Player {} listening to game {} as {}",
        player_id, game_id, listener_id
    );

    // Current state first so the client never starts blank
    match game_service.get_game(game_id).await {
        Ok(game) => {
            if let Some(message) = encode_message(&ServerMessage::GameUpdate { game }) {
                if let Err(e) = ws_sender.send(message).await {
                    warn!("Failed to send snapshot to {}: {:?}", listener_id, e);
                    return;
                }
            }
        }
        Err(e) => warn!("Initial snapshot of game {} failed: {}", game_id, e),
    }

    let incoming_handler = async move {
        while let Some(result) = ws_receiver.next().await {
            match result {
                Ok(msg) if msg.is_close() => break,
                Ok(_) => {}
                Err(e) => {
                    warn!("WebSocket error for {}: {}", listener_id, e);
                    break;
                }
            }
        }
    };

    let outgoing_handler = async move {
        while let Some(game) = updates.recv().await {
            let Some(message) = encode_message(&ServerMessage::GameUpdate { game }) else {
                continue;
            };

            if let Err(e) = ws_sender.send(message).await {
                warn!("Failed to send message to {}: {:?}", listener_id, e);
                return;
            }
        }

        // Hub let go of us: game over or replaced
        let _ = ws_sender.close().await;
    };

    tokio::select! {
        _ = incoming_handler => {},
        _ = outgoing_handler => {},
    }

    // Dropping the receiver is what unsubscribes the listener.
    info!("Listener {} for game {} disconnected", listener_id, game_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_types::Game;
    use uuid::Uuid;

    #[test]
    fn test_connection_error_mapping() {
        assert!(matches!(
            connection_error(&AuthError::TokenExpired),
            ConnectionError::SessionExpired
        ));
        assert!(matches!(
            connection_error(&AuthError::InvalidToken),
            ConnectionError::InvalidToken
        ));
        assert!(matches!(
            connection_error(&AuthError::Signing),
            ConnectionError::InternalError { .. }
        ));
    }

    #[test]
    fn test_encode_game_update() {
        let game = Game::new(Uuid::new_v4(), 2, vec![0; 25]);
        let message = encode_message(&ServerMessage::GameUpdate { game: game.clone() }).unwrap();
        let text = message.to_str().unwrap();

        let decoded: ServerMessage = serde_json::from_str(text).unwrap();
        match decoded {
            ServerMessage::GameUpdate { game: decoded } => assert_eq!(decoded.id, game.id),
            other => panic!("unexpected message: {:?}", other),
        }
    }
}
