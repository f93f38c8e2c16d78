use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use warp::Filter;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};

use crate::auth::{AuthError, AuthService};
use crate::game_service::GameService;
use game_core::{ErrorCategory, GameStore, ServiceError};
use game_types::{
    AuthenticateRequest, AuthenticateResponse, GameError, NewGameRequest, TakeTurnRequest,
};

pub mod auth;
pub mod broadcast;
pub mod config;
pub mod dictionary;
pub mod game_service;
pub mod websocket;

#[derive(Deserialize)]
struct ListenQuery {
    token: Option<String>,
}

type JsonReply = WithStatus<Json>;

pub fn create_routes<S: GameStore>(
    game_service: Arc<GameService<S>>,
    auth_service: Arc<AuthService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let game_service_filter = warp::any().map({
        let game_service = game_service.clone();
        move || game_service.clone()
    });

    let auth_filter = warp::any().map({
        let auth_service = auth_service.clone();
        move || auth_service.clone()
    });

    let authorization = warp::header::optional::<String>("authorization");

    // Live updates for one game
    let listen = warp::path!("games" / Uuid / "listen")
        .and(warp::ws())
        .and(warp::query::<ListenQuery>())
        .and(game_service_filter.clone())
        .and(auth_filter.clone())
        .map(
            |game_id: Uuid, ws: warp::ws::Ws, query: ListenQuery, service, auth| {
                ws.on_upgrade(move |socket| {
                    websocket::handle_listener(socket, game_id, query.token, service, auth)
                })
            },
        );

    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    let authenticate = warp::path("authenticate")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(game_service_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_authenticate);

    let new_game = warp::path("games")
        .and(warp::path::end())
        .and(warp::post())
        .and(authorization.clone())
        .and(warp::body::json())
        .and(game_service_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_new_game);

    let join_game = warp::path!("games" / Uuid / "join")
        .and(warp::post())
        .and(authorization.clone())
        .and(game_service_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_join_game);

    let take_turn = warp::path!("games" / Uuid / "turn")
        .and(warp::post())
        .and(authorization.clone())
        .and(warp::body::json())
        .and(game_service_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_take_turn);

    let get_game = warp::path!("games" / Uuid)
        .and(warp::get())
        .and(authorization.clone())
        .and(game_service_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_get_game);

    let get_games = warp::path("games")
        .and(warp::path::end())
        .and(warp::get())
        .and(authorization.clone())
        .and(game_service_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_get_games);

    let get_player = warp::path!("players" / Uuid)
        .and(warp::get())
        .and(authorization.clone())
        .and(game_service_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_get_player);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type", "authorization"])
        .allow_methods(vec!["GET", "POST"]);

    listen
        .or(health)
        .or(authenticate)
        .or(new_game)
        .or(join_game)
        .or(take_turn)
        .or(get_game)
        .or(get_games)
        .or(get_player)
        .with(cors)
        .with(warp::log("letter_block"))
}

fn error_body(error: GameError) -> Json {
    warp::reply::json(&serde_json::json!({ "error": error }))
}

pub fn status_for(category: ErrorCategory) -> StatusCode {
    match category {
        ErrorCategory::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorCategory::NotFound => StatusCode::NOT_FOUND,
        ErrorCategory::Conflict => StatusCode::CONFLICT,
        ErrorCategory::Rejected => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCategory::Dictionary => StatusCode::BAD_GATEWAY,
        ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn service_error_reply(err: ServiceError) -> JsonReply {
    let category = err.category();
    match category {
        ErrorCategory::Internal | ErrorCategory::Dictionary => {
            tracing::error!("Request failed: {}", err)
        }
        _ => tracing::debug!("Request refused: {}", err),
    }
    warp::reply::with_status(error_body(GameError::from(&err)), status_for(category))
}

fn auth_error_reply(err: AuthError) -> JsonReply {
    match err {
        AuthError::Store(store_err) => service_error_reply(store_err.into()),
        AuthError::Signing => warp::reply::with_status(
            error_body(GameError::InternalError {
                message: err.to_string(),
            }),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        AuthError::MissingFingerprint => warp::reply::with_status(
            error_body(GameError::AuthenticationRequired),
            StatusCode::BAD_REQUEST,
        ),
        AuthError::MissingToken | AuthError::InvalidToken | AuthError::TokenExpired => {
            warp::reply::with_status(
                error_body(GameError::AuthenticationRequired),
                StatusCode::UNAUTHORIZED,
            )
        }
    }
}

fn ok_reply<T: serde::Serialize>(value: &T, status: StatusCode) -> JsonReply {
    warp::reply::with_status(warp::reply::json(value), status)
}

fn reply<T: serde::Serialize>(result: Result<T, ServiceError>, status: StatusCode) -> JsonReply {
    match result {
        Ok(value) => ok_reply(&value, status),
        Err(err) => service_error_reply(err),
    }
}

async fn handle_authenticate<S: GameStore>(
    request: AuthenticateRequest,
    game_service: Arc<GameService<S>>,
    auth_service: Arc<AuthService>,
) -> Result<JsonReply, warp::Rejection> {
    match auth_service
        .authenticate(
            game_service.store().as_ref(),
            &request.device_fingerprint,
            &request.username,
        )
        .await
    {
        Ok(session) => Ok(ok_reply(
            &AuthenticateResponse {
                token: session.token,
                expires_in: session.expires_in,
            },
            StatusCode::OK,
        )),
        Err(err) => Ok(auth_error_reply(err)),
    }
}

async fn handle_new_game<S: GameStore>(
    auth_header: Option<String>,
    request: NewGameRequest,
    game_service: Arc<GameService<S>>,
    auth_service: Arc<AuthService>,
) -> Result<JsonReply, warp::Rejection> {
    let player_id = match auth_service.validate_header(auth_header.as_deref()) {
        Ok(player_id) => player_id,
        Err(err) => return Ok(auth_error_reply(err)),
    };

    let result = game_service
        .new_game(player_id, request.number_of_players)
        .await;
    Ok(reply(result, StatusCode::CREATED))
}

async fn handle_join_game<S: GameStore>(
    game_id: Uuid,
    auth_header: Option<String>,
    game_service: Arc<GameService<S>>,
    auth_service: Arc<AuthService>,
) -> Result<JsonReply, warp::Rejection> {
    let player_id = match auth_service.validate_header(auth_header.as_deref()) {
        Ok(player_id) => player_id,
        Err(err) => return Ok(auth_error_reply(err)),
    };

    Ok(reply(
        game_service.join_game(game_id, player_id).await,
        StatusCode::OK,
    ))
}

async fn handle_take_turn<S: GameStore>(
    game_id: Uuid,
    auth_header: Option<String>,
    request: TakeTurnRequest,
    game_service: Arc<GameService<S>>,
    auth_service: Arc<AuthService>,
) -> Result<JsonReply, warp::Rejection> {
    let player_id = match auth_service.validate_header(auth_header.as_deref()) {
        Ok(player_id) => player_id,
        Err(err) => return Ok(auth_error_reply(err)),
    };

    Ok(reply(
        game_service
            .take_turn(game_id, player_id, &request.word)
            .await,
        StatusCode::OK,
    ))
}

async fn handle_get_game<S: GameStore>(
    game_id: Uuid,
    auth_header: Option<String>,
    game_service: Arc<GameService<S>>,
    auth_service: Arc<AuthService>,
) -> Result<JsonReply, warp::Rejection> {
    if let Err(err) = auth_service.validate_header(auth_header.as_deref()) {
        return Ok(auth_error_reply(err));
    }

    Ok(reply(game_service.get_game(game_id).await, StatusCode::OK))
}

async fn handle_get_games<S: GameStore>(
    auth_header: Option<String>,
    game_service: Arc<GameService<S>>,
    auth_service: Arc<AuthService>,
) -> Result<JsonReply, warp::Rejection> {
    let player_id = match auth_service.validate_header(auth_header.as_deref()) {
        Ok(player_id) => player_id,
        Err(err) => return Ok(auth_error_reply(err)),
    };

    Ok(reply(game_service.get_games(player_id).await, StatusCode::OK))
}

async fn handle_get_player<S: GameStore>(
    player_id: Uuid,
    auth_header: Option<String>,
    game_service: Arc<GameService<S>>,
    auth_service: Arc<AuthService>,
) -> Result<JsonReply, warp::Rejection> {
    if let Err(err) = auth_service.validate_header(auth_header.as_deref()) {
        return Ok(auth_error_reply(err));
    }

    Ok(reply(game_service.get_player(player_id).await, StatusCode::OK))
}
