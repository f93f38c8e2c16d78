use game_core::GameRules;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub game_language: String,
    pub max_strength: u8,
    pub listener_buffer: usize,
    pub jwt_secret: String,
    pub session_ttl_hours: u64,
    pub dictionary_cache_ttl_hours: u64,
    /// Local word list; the online dictionary is used when unset.
    pub words_file: Option<String>,
    pub auth_dev_mode: bool,
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("Invalid PORT"),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://letter_block.db?mode=rwc".to_string()),
            game_language: env::var("GAME_LANGUAGE").unwrap_or_else(|_| "id-id".to_string()),
            max_strength: env::var("MAX_STRENGTH")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .expect("Invalid MAX_STRENGTH"),
            listener_buffer: env::var("LISTENER_BUFFER")
                .unwrap_or_else(|_| "16".to_string())
                .parse()
                .expect("Invalid LISTENER_BUFFER"),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| "letter-block-dev-secret".to_string()),
            session_ttl_hours: env::var("SESSION_TTL_HOURS")
                .unwrap_or_else(|_| "72".to_string())
                .parse()
                .expect("Invalid SESSION_TTL_HOURS"),
            dictionary_cache_ttl_hours: env::var("DICTIONARY_CACHE_TTL_HOURS")
                .unwrap_or_else(|_| "72".to_string())
                .parse()
                .expect("Invalid DICTIONARY_CACHE_TTL_HOURS"),
            words_file: env::var("WORDS_FILE").ok().filter(|path| !path.trim().is_empty()),
            auth_dev_mode: env::var("AUTH_DEV_MODE").unwrap_or_else(|_| "false".to_string())
                == "true",
        }
    }

    pub fn rules(&self) -> GameRules {
        GameRules {
            language: self.game_language.clone(),
            max_strength: self.max_strength,
        }
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_hours * 60 * 60)
    }

    pub fn dictionary_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.dictionary_cache_ttl_hours * 60 * 60)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
