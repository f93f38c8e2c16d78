//! Persistence contract consumed by the turn engine.

use async_trait::async_trait;
use game_types::{Game, GameId, GamePlayer, PlayedWord, Player, PlayerId};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("{kind:?} constraint violated: {detail}")]
    ConstraintViolation { kind: ConstraintKind, detail: String },
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StoreError::ConstraintViolation {
                kind: ConstraintKind::Unique,
                ..
            }
        )
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Transactional storage of games, join records, played words and players.
///
/// Operations that mutate game state take the transaction handle returned by
/// [`GameStore::begin_transaction`]; the handle is consumed by exactly one of
/// [`GameStore::commit`] or [`GameStore::rollback`].
#[async_trait]
pub trait GameStore: Send + Sync + 'static {
    type Transaction: Send;

    async fn begin_transaction(&self) -> StoreResult<Self::Transaction>;
    async fn commit(&self, tx: Self::Transaction) -> StoreResult<()>;
    async fn rollback(&self, tx: Self::Transaction) -> StoreResult<()>;

    async fn insert_game(&self, tx: &mut Self::Transaction, game: Game) -> StoreResult<Game>;
    async fn insert_game_player(
        &self,
        tx: &mut Self::Transaction,
        game_player: &GamePlayer,
    ) -> StoreResult<()>;
    /// Game row only; `players` and `played_words` are left empty.
    async fn get_game_by_id(&self, tx: &mut Self::Transaction, id: GameId) -> StoreResult<Game>;
    /// Join records ordered by slot.
    async fn get_game_players_by_game_id(
        &self,
        tx: &mut Self::Transaction,
        id: GameId,
    ) -> StoreResult<Vec<GamePlayer>>;
    async fn get_player_by_id(
        &self,
        tx: &mut Self::Transaction,
        id: PlayerId,
    ) -> StoreResult<Player>;
    /// Seated players ordered by slot, as seen by the transaction.
    async fn get_players_by_game_id(
        &self,
        tx: &mut Self::Transaction,
        id: GameId,
    ) -> StoreResult<Vec<Player>>;
    async fn get_played_words_by_game_id(
        &self,
        tx: &mut Self::Transaction,
        id: GameId,
    ) -> StoreResult<Vec<PlayedWord>>;
    /// Fails with a unique [`StoreError::ConstraintViolation`] when the word
    /// was already logged for the game.
    async fn log_played_word(
        &self,
        tx: &mut Self::Transaction,
        played_word: &PlayedWord,
    ) -> StoreResult<()>;
    /// Writes positioning, turn pointer and state.
    async fn update_game(&self, tx: &mut Self::Transaction, game: &Game) -> StoreResult<()>;

    async fn find_game(&self, id: GameId) -> StoreResult<Game>;
    /// Seated players ordered by slot.
    async fn find_players_by_game(&self, id: GameId) -> StoreResult<Vec<Player>>;
    async fn find_played_words_by_game(&self, id: GameId) -> StoreResult<Vec<PlayedWord>>;
    async fn find_games_by_player(&self, id: PlayerId) -> StoreResult<Vec<Game>>;
    async fn find_player(&self, id: PlayerId) -> StoreResult<Player>;
    /// Creates the player for `device_fingerprint` or returns the existing one.
    async fn upsert_player(&self, device_fingerprint: &str, username: &str) -> StoreResult<Player>;
    async fn update_player_session(&self, id: PlayerId, expires_at: i64) -> StoreResult<()>;
}
