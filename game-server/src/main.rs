use std::collections::HashMap;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

use game_core::{CachedDictionary, Dictionaries, Dictionary, WordListDictionary};
use game_persistence::{GameRepository, connection::connect_and_migrate};
use game_server::{
    auth::AuthService, broadcast::BroadcastHub, config::Config, create_routes,
    dictionary::KbbiDictionary, game_service::GameService,
};

fn load_dictionary(config: &Config) -> Arc<dyn Dictionary> {
    match &config.words_file {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(word_list) => {
                let dictionary = WordListDictionary::new(&word_list);
                info!("Loaded {} words from {}", dictionary.len(), path);
                Arc::new(dictionary)
            }
            Err(e) => {
                tracing::error!("Failed to read word list '{}': {}", path, e);
                tracing::error!("Unset WORDS_FILE to use the online dictionary instead.");
                std::process::exit(1);
            }
        },
        None => {
            info!(
                "Validating words against KBBI, results cached for {}h",
                config.dictionary_cache_ttl_hours
            );
            Arc::new(CachedDictionary::new(
                KbbiDictionary::new(),
                config.dictionary_cache_ttl(),
            ))
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    info!("Starting Letter Block server...");

    let config = Config::new();
    let rules = config.rules();
    if let Err(e) = rules.validate() {
        tracing::error!("Invalid game rules: {}", e);
        std::process::exit(1);
    }

    let db = match connect_and_migrate(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to connect to database and run migrations: {}", e);
            std::process::exit(1);
        }
    };
    let store = Arc::new(GameRepository::new(db));

    let mut dictionaries: Dictionaries = HashMap::new();
    dictionaries.insert(rules.language.clone(), load_dictionary(&config));

    let hub = Arc::new(BroadcastHub::new(config.listener_buffer));
    let game_service = Arc::new(GameService::new(store, dictionaries, rules, hub));

    let auth_service = if config.auth_dev_mode {
        info!("Starting in development authentication mode - player ids accepted as tokens");
        Arc::new(AuthService::new_dev_mode(
            &config.jwt_secret,
            config.session_ttl(),
        ))
    } else {
        Arc::new(AuthService::new(&config.jwt_secret, config.session_ttl()))
    };

    let routes = create_routes(game_service, auth_service);

    info!("Server starting on {}:{}", config.host, config.port);

    let ip = match config.host.parse::<std::net::IpAddr>() {
        Ok(ip) => ip,
        Err(e) => {
            tracing::error!("Invalid HOST '{}': {}", config.host, e);
            std::process::exit(1);
        }
    };

    let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown((ip, config.port), async {
        // Wait for SIGINT (Ctrl+C) or SIGTERM
        #[cfg(unix)]
        {
            let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt())
                .expect("Failed to install SIGINT handler");
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler");

            tokio::select! {
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully...");
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            signal::ctrl_c().await.expect("Failed to listen for ctrl+c");
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    });

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
}
