use async_trait::async_trait;
use game_core::{ConstraintKind, GameStore, StoreError, StoreResult};
use game_types::{Game, GameId, GamePlayer, GameState, PlayedWord, Player, PlayerId};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveValue::{NotSet, Set, Unchanged},
    ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, SqlErr, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use crate::entities::{games, games_players, played_words, players, prelude::*};

pub struct GameRepository {
    db: DatabaseConnection,
}

/// Classifies a driver error without looking at its message.
fn db_err(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => StoreError::ConstraintViolation {
            kind: ConstraintKind::Unique,
            detail,
        },
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => StoreError::ConstraintViolation {
            kind: ConstraintKind::ForeignKey,
            detail,
        },
        _ => StoreError::Backend(Box::new(err)),
    }
}

fn corrupt(message: String) -> StoreError {
    StoreError::Backend(message.into())
}

fn to_u8(value: i32, column: &str) -> StoreResult<u8> {
    u8::try_from(value).map_err(|_| corrupt(format!("{column} out of range: {value}")))
}

fn now() -> sea_orm::prelude::DateTimeWithTimeZone {
    chrono::Utc::now().into()
}

impl GameRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_game(model: games::Model) -> StoreResult<Game> {
        let state = model
            .state
            .parse::<GameState>()
            .map_err(|e| StoreError::Backend(Box::new(e)))?;

        Ok(Game {
            id: model.id,
            current_player_order: to_u8(model.current_player_order, "current_player_order")?,
            number_of_players: to_u8(model.number_of_players, "number_of_players")?,
            players: Vec::new(),
            played_words: Vec::new(),
            state,
            board_base: model.board_base,
            board_positioning: model.board_positioning,
        })
    }

    fn model_to_game_player(model: games_players::Model) -> StoreResult<GamePlayer> {
        Ok(GamePlayer {
            game_id: model.game_id,
            player_id: model.player_id,
            ordering: to_u8(model.ordering, "ordering")?,
        })
    }

    fn model_to_player(model: players::Model) -> Player {
        Player {
            id: model.id,
            username: model.username,
            device_fingerprint: model.device_fingerprint,
            session_expires_at: model.session_expires_at,
        }
    }

    fn model_to_played_word(model: played_words::Model) -> PlayedWord {
        PlayedWord {
            game_id: model.game_id,
            player_id: model.player_id,
            word: model.word,
        }
    }

    async fn load_game<C: ConnectionTrait>(db: &C, id: GameId) -> StoreResult<Game> {
        let model = Games::find_by_id(id)
            .one(db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StoreError::not_found("game", id))?;
        Self::model_to_game(model)
    }

    async fn load_player<C: ConnectionTrait>(db: &C, id: PlayerId) -> StoreResult<Player> {
        Players::find_by_id(id)
            .one(db)
            .await
            .map_err(db_err)?
            .map(Self::model_to_player)
            .ok_or_else(|| StoreError::not_found("player", id))
    }

    async fn load_players<C: ConnectionTrait>(db: &C, game_id: GameId) -> StoreResult<Vec<Player>> {
        let rows = GamesPlayers::find()
            .filter(games_players::Column::GameId.eq(game_id))
            .order_by_asc(games_players::Column::Ordering)
            .find_also_related(Players)
            .all(db)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .filter_map(|(_, player)| player.map(Self::model_to_player))
            .collect())
    }

    async fn load_played_words<C: ConnectionTrait>(
        db: &C,
        game_id: GameId,
    ) -> StoreResult<Vec<PlayedWord>> {
        let rows = PlayedWords::find()
            .filter(played_words::Column::GameId.eq(game_id))
            .order_by_asc(played_words::Column::Id)
            .all(db)
            .await
            .map_err(db_err)?;

        Ok(rows.into_iter().map(Self::model_to_played_word).collect())
    }
}

#[async_trait]
impl GameStore for GameRepository {
    type Transaction = DatabaseTransaction;

    async fn begin_transaction(&self) -> StoreResult<DatabaseTransaction> {
        self.db.begin().await.map_err(db_err)
    }

    async fn commit(&self, tx: DatabaseTransaction) -> StoreResult<()> {
        tx.commit().await.map_err(db_err)
    }

    async fn rollback(&self, tx: DatabaseTransaction) -> StoreResult<()> {
        tx.rollback().await.map_err(db_err)
    }

    async fn insert_game(&self, tx: &mut DatabaseTransaction, game: Game) -> StoreResult<Game> {
        let now = now();
        let model = games::ActiveModel {
            id: Set(game.id),
            current_player_order: Set(game.current_player_order as i32),
            number_of_players: Set(game.number_of_players as i32),
            state: Set(game.state.as_str().to_string()),
            board_base: Set(game.board_base.clone()),
            board_positioning: Set(game.board_positioning.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Games::insert(model)
            .exec_without_returning(&*tx)
            .await
            .map_err(db_err)?;

        debug!("Inserted game {}", game.id);
        Ok(game)
    }

    async fn insert_game_player(
        &self,
        tx: &mut DatabaseTransaction,
        game_player: &GamePlayer,
    ) -> StoreResult<()> {
        let model = games_players::ActiveModel {
            game_id: Set(game_player.game_id),
            player_id: Set(game_player.player_id),
            ordering: Set(game_player.ordering as i32),
            created_at: Set(now()),
        };

        GamesPlayers::insert(model)
            .exec_without_returning(&*tx)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn get_game_by_id(&self, tx: &mut DatabaseTransaction, id: GameId) -> StoreResult<Game> {
        Self::load_game(&*tx, id).await
    }

    async fn get_game_players_by_game_id(
        &self,
        tx: &mut DatabaseTransaction,
        id: GameId,
    ) -> StoreResult<Vec<GamePlayer>> {
        GamesPlayers::find()
            .filter(games_players::Column::GameId.eq(id))
            .order_by_asc(games_players::Column::Ordering)
            .all(&*tx)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(Self::model_to_game_player)
            .collect()
    }

    async fn get_player_by_id(
        &self,
        tx: &mut DatabaseTransaction,
        id: PlayerId,
    ) -> StoreResult<Player> {
        Self::load_player(&*tx, id).await
    }

    async fn get_players_by_game_id(
        &self,
        tx: &mut DatabaseTransaction,
        id: GameId,
    ) -> StoreResult<Vec<Player>> {
        Self::load_players(&*tx, id).await
    }

    async fn get_played_words_by_game_id(
        &self,
        tx: &mut DatabaseTransaction,
        id: GameId,
    ) -> StoreResult<Vec<PlayedWord>> {
        Self::load_played_words(&*tx, id).await
    }

    async fn log_played_word(
        &self,
        tx: &mut DatabaseTransaction,
        played_word: &PlayedWord,
    ) -> StoreResult<()> {
        let model = played_words::ActiveModel {
            id: NotSet,
            game_id: Set(played_word.game_id),
            player_id: Set(played_word.player_id),
            word: Set(played_word.word.clone()),
            created_at: Set(now()),
        };

        PlayedWords::insert(model)
            .exec_without_returning(&*tx)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn update_game(&self, tx: &mut DatabaseTransaction, game: &Game) -> StoreResult<()> {
        let model = games::ActiveModel {
            id: Unchanged(game.id),
            current_player_order: Set(game.current_player_order as i32),
            state: Set(game.state.as_str().to_string()),
            board_positioning: Set(game.board_positioning.clone()),
            updated_at: Set(now()),
            ..Default::default()
        };

        match Games::update(model).exec(&*tx).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => Err(StoreError::not_found("game", game.id)),
            Err(err) => Err(db_err(err)),
        }
    }

    async fn find_game(&self, id: GameId) -> StoreResult<Game> {
        Self::load_game(&self.db, id).await
    }

    async fn find_players_by_game(&self, id: GameId) -> StoreResult<Vec<Player>> {
        Self::load_players(&self.db, id).await
    }

    async fn find_played_words_by_game(&self, id: GameId) -> StoreResult<Vec<PlayedWord>> {
        Self::load_played_words(&self.db, id).await
    }

    async fn find_games_by_player(&self, id: PlayerId) -> StoreResult<Vec<Game>> {
        Games::find()
            .inner_join(GamesPlayers)
            .filter(games_players::Column::PlayerId.eq(id))
            .order_by_desc(games::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(Self::model_to_game)
            .collect()
    }

    async fn find_player(&self, id: PlayerId) -> StoreResult<Player> {
        Self::load_player(&self.db, id).await
    }

    async fn upsert_player(&self, device_fingerprint: &str, username: &str) -> StoreResult<Player> {
        let tx = self.db.begin().await.map_err(db_err)?;

        let existing = Players::find()
            .filter(players::Column::DeviceFingerprint.eq(device_fingerprint))
            .one(&tx)
            .await
            .map_err(db_err)?;

        let id = match existing {
            Some(model) => {
                Players::update_many()
                    .col_expr(players::Column::Username, Expr::value(username))
                    .col_expr(players::Column::UpdatedAt, Expr::value(now()))
                    .filter(players::Column::Id.eq(model.id))
                    .exec(&tx)
                    .await
                    .map_err(db_err)?;
                model.id
            }
            None => {
                let id = Uuid::new_v4();
                let now = now();
                let model = players::ActiveModel {
                    id: Set(id),
                    username: Set(username.to_string()),
                    device_fingerprint: Set(device_fingerprint.to_string()),
                    session_expires_at: Set(0),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                Players::insert(model)
                    .exec_without_returning(&tx)
                    .await
                    .map_err(db_err)?;
                debug!("Created player {}", id);
                id
            }
        };

        let player = Self::load_player(&tx, id).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(player)
    }

    async fn update_player_session(&self, id: PlayerId, expires_at: i64) -> StoreResult<()> {
        let result = Players::update_many()
            .col_expr(players::Column::SessionExpiresAt, Expr::value(expires_at))
            .col_expr(players::Column::UpdatedAt, Expr::value(now()))
            .filter(players::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(StoreError::not_found("player", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use game_types::BOARD_CELLS;
    use migration::{Migrator, MigratorTrait};

    async fn setup_test_db() -> GameRepository {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        GameRepository::new(db)
    }

    async fn create_game_with_creator(repo: &GameRepository, creator: &Player) -> Game {
        let game = Game::new(Uuid::new_v4(), 2, vec![3; BOARD_CELLS]);
        let mut tx = repo.begin_transaction().await.unwrap();
        let game = repo.insert_game(&mut tx, game).await.unwrap();
        repo.insert_game_player(
            &mut tx,
            &GamePlayer {
                game_id: game.id,
                player_id: creator.id,
                ordering: 0,
            },
        )
        .await
        .unwrap();
        repo.commit(tx).await.unwrap();
        game
    }

    #[tokio::test]
    async fn test_create_and_find_game() {
        let repo = setup_test_db().await;
        let alice = repo.upsert_player("device-alice", "alice").await.unwrap();
        let bob = repo.upsert_player("device-bob", "bob").await.unwrap();

        let game = create_game_with_creator(&repo, &alice).await;

        let mut tx = repo.begin_transaction().await.unwrap();
        repo.insert_game_player(
            &mut tx,
            &GamePlayer {
                game_id: game.id,
                player_id: bob.id,
                ordering: 1,
            },
        )
        .await
        .unwrap();
        let seated = repo.get_game_players_by_game_id(&mut tx, game.id).await.unwrap();
        repo.commit(tx).await.unwrap();

        assert_eq!(seated.len(), 2);
        assert_eq!(seated[0].player_id, alice.id);
        assert_eq!(seated[1].ordering, 1);

        let found = repo.find_game(game.id).await.unwrap();
        assert_eq!(found.state, GameState::Ongoing);
        assert_eq!(found.board_base, vec![3; BOARD_CELLS]);
        assert_eq!(found.board_positioning, vec![0; BOARD_CELLS]);

        let players = repo.find_players_by_game(game.id).await.unwrap();
        let names: Vec<_> = players.iter().map(|p| p.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob"]);
    }

    #[tokio::test]
    async fn test_missing_rows_are_not_found() {
        let repo = setup_test_db().await;
        assert!(matches!(
            repo.find_game(Uuid::new_v4()).await,
            Err(StoreError::NotFound { entity: "game", .. })
        ));
        assert!(matches!(
            repo.find_player(Uuid::new_v4()).await,
            Err(StoreError::NotFound { entity: "player", .. })
        ));
        assert!(repo.update_player_session(Uuid::new_v4(), 10).await.is_err());
    }

    #[tokio::test]
    async fn test_rollback_discards_writes() {
        let repo = setup_test_db().await;
        let game = Game::new(Uuid::new_v4(), 3, vec![0; BOARD_CELLS]);

        let mut tx = repo.begin_transaction().await.unwrap();
        repo.insert_game(&mut tx, game.clone()).await.unwrap();
        repo.rollback(tx).await.unwrap();

        assert!(repo.find_game(game.id).await.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_word_is_unique_violation() {
        let repo = setup_test_db().await;
        let alice = repo.upsert_player("device-alice", "alice").await.unwrap();
        let game = create_game_with_creator(&repo, &alice).await;

        let word = PlayedWord {
            game_id: game.id,
            player_id: alice.id,
            word: "kata".to_string(),
        };

        let mut tx = repo.begin_transaction().await.unwrap();
        repo.log_played_word(&mut tx, &word).await.unwrap();
        let duplicate = repo.log_played_word(&mut tx, &word).await.unwrap_err();
        repo.commit(tx).await.unwrap();

        assert!(duplicate.is_unique_violation());
        let words = repo.find_played_words_by_game(game.id).await.unwrap();
        assert_eq!(words, vec![word]);
    }

    #[tokio::test]
    async fn test_transaction_reads_its_own_writes() {
        let repo = setup_test_db().await;
        let alice = repo.upsert_player("device-alice", "alice").await.unwrap();
        let bob = repo.upsert_player("device-bob", "bob").await.unwrap();
        let game = create_game_with_creator(&repo, &alice).await;

        let word = PlayedWord {
            game_id: game.id,
            player_id: bob.id,
            word: "meja".to_string(),
        };

        let mut tx = repo.begin_transaction().await.unwrap();
        repo.insert_game_player(
            &mut tx,
            &GamePlayer {
                game_id: game.id,
                player_id: bob.id,
                ordering: 1,
            },
        )
        .await
        .unwrap();
        repo.log_played_word(&mut tx, &word).await.unwrap();

        let players = repo.get_players_by_game_id(&mut tx, game.id).await.unwrap();
        let words = repo.get_played_words_by_game_id(&mut tx, game.id).await.unwrap();
        repo.rollback(tx).await.unwrap();

        let names: Vec<_> = players.iter().map(|p| p.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob"]);
        assert_eq!(words, vec![word]);

        assert_eq!(repo.find_players_by_game(game.id).await.unwrap().len(), 1);
        assert!(repo.find_played_words_by_game(game.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_join_record_requires_known_player() {
        let repo = setup_test_db().await;
        let alice = repo.upsert_player("device-alice", "alice").await.unwrap();
        let game = create_game_with_creator(&repo, &alice).await;

        let mut tx = repo.begin_transaction().await.unwrap();
        let error = repo
            .insert_game_player(
                &mut tx,
                &GamePlayer {
                    game_id: game.id,
                    player_id: Uuid::new_v4(),
                    ordering: 1,
                },
            )
            .await
            .unwrap_err();
        repo.rollback(tx).await.unwrap();

        assert!(matches!(
            error,
            StoreError::ConstraintViolation {
                kind: ConstraintKind::ForeignKey,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_update_game() {
        let repo = setup_test_db().await;
        let alice = repo.upsert_player("device-alice", "alice").await.unwrap();
        let mut game = create_game_with_creator(&repo, &alice).await;

        game.board_positioning[0] = 1;
        game.current_player_order = 1;
        game.state = GameState::End;

        let mut tx = repo.begin_transaction().await.unwrap();
        repo.update_game(&mut tx, &game).await.unwrap();
        repo.commit(tx).await.unwrap();

        let found = repo.find_game(game.id).await.unwrap();
        assert_eq!(found.board_positioning[0], 1);
        assert_eq!(found.current_player_order, 1);
        assert_eq!(found.state, GameState::End);
        assert_eq!(found.number_of_players, 2);
    }

    #[tokio::test]
    async fn test_upsert_player_by_fingerprint() {
        let repo = setup_test_db().await;

        let first = repo.upsert_player("device-1", "budi").await.unwrap();
        let again = repo.upsert_player("device-1", "budi2").await.unwrap();
        let other = repo.upsert_player("device-2", "sari").await.unwrap();

        assert_eq!(first.id, again.id);
        assert_eq!(again.username, "budi2");
        assert_ne!(first.id, other.id);

        repo.update_player_session(first.id, 1_700_000_000).await.unwrap();
        let found = repo.find_player(first.id).await.unwrap();
        assert_eq!(found.session_expires_at, 1_700_000_000);
        assert_eq!(found.device_fingerprint, "device-1");
    }

    #[tokio::test]
    async fn test_find_games_by_player() {
        let repo = setup_test_db().await;
        let alice = repo.upsert_player("device-alice", "alice").await.unwrap();
        let bob = repo.upsert_player("device-bob", "bob").await.unwrap();

        let first = create_game_with_creator(&repo, &alice).await;
        let second = create_game_with_creator(&repo, &alice).await;
        create_game_with_creator(&repo, &bob).await;

        let games = repo.find_games_by_player(alice.id).await.unwrap();
        let mut ids: Vec<_> = games.iter().map(|g| g.id).collect();
        ids.sort();
        let mut expected = vec![first.id, second.id];
        expected.sort();
        assert_eq!(ids, expected);

        assert!(repo.find_games_by_player(Uuid::new_v4()).await.unwrap().is_empty());
    }
}
