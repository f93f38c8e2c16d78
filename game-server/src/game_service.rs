use std::sync::Arc;

use futures_util::future::try_join_all;
use game_core::{
    Dictionaries, GameRules, GameStore, ServiceError, ServiceResult, StoreError, acting_slot,
    apply_word, random_board, spell_word, validate_player_count,
};
use game_types::{BOARD_CELLS, Game, GameId, GamePlayer, PlayedWord, Player, PlayerId};
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::broadcast::{BroadcastHub, ListenerId};

fn game_lookup(err: StoreError, id: GameId) -> ServiceError {
    match err {
        StoreError::NotFound { .. } => ServiceError::GameNotFound(id),
        other => other.into(),
    }
}

fn player_lookup(err: StoreError, id: PlayerId) -> ServiceError {
    match err {
        StoreError::NotFound { .. } => ServiceError::PlayerNotFound(id),
        other => other.into(),
    }
}

/// The turn engine: creates games, seats players, resolves turns and hands
/// every committed turn to the broadcast hub.
pub struct GameService<S: GameStore> {
    store: Arc<S>,
    dictionaries: Dictionaries,
    rules: GameRules,
    hub: Arc<BroadcastHub>,
}

impl<S: GameStore> GameService<S> {
    pub fn new(
        store: Arc<S>,
        dictionaries: Dictionaries,
        rules: GameRules,
        hub: Arc<BroadcastHub>,
    ) -> Self {
        Self {
            store,
            dictionaries,
            rules,
            hub,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Commits on success; otherwise rolls back and hands back the original error.
    async fn finish<T>(&self, tx: S::Transaction, result: ServiceResult<T>) -> ServiceResult<T> {
        match result {
            Ok(value) => {
                self.store.commit(tx).await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.store.rollback(tx).await {
                    error!("Rollback failed after '{}': {}", err, rollback_err);
                }
                Err(err)
            }
        }
    }

    pub async fn new_game(&self, creator_id: PlayerId, number_of_players: u8) -> ServiceResult<Game> {
        validate_player_count(number_of_players)?;

        let creator = self
            .store
            .find_player(creator_id)
            .await
            .map_err(|e| player_lookup(e, creator_id))?;
        let board_base = random_board(&self.rules.language, BOARD_CELLS)?;

        let mut tx = self.store.begin_transaction().await?;
        let result = self
            .insert_new_game(&mut tx, creator, number_of_players, board_base)
            .await;
        let game = self.finish(tx, result).await?;

        info!(
            "Player {} created game {} for {} players",
            creator_id, game.id, number_of_players
        );
        Ok(game)
    }

    async fn insert_new_game(
        &self,
        tx: &mut S::Transaction,
        creator: Player,
        number_of_players: u8,
        board_base: Vec<u8>,
    ) -> ServiceResult<Game> {
        let game = Game::new(Uuid::new_v4(), number_of_players, board_base);
        let mut game = self.store.insert_game(tx, game).await?;

        self.store
            .insert_game_player(
                tx,
                &GamePlayer {
                    game_id: game.id,
                    player_id: creator.id,
                    ordering: 0,
                },
            )
            .await?;

        game.players.push(creator);
        Ok(game)
    }

    pub async fn join_game(&self, game_id: GameId, player_id: PlayerId) -> ServiceResult<Game> {
        let mut tx = self.store.begin_transaction().await?;
        let result = self.seat_player(&mut tx, game_id, player_id).await;
        let game = self.finish(tx, result).await?;

        info!(
            "Player {} joined game {} ({}/{})",
            player_id,
            game_id,
            game.players.len(),
            game.number_of_players
        );
        Ok(game)
    }

    async fn seat_player(
        &self,
        tx: &mut S::Transaction,
        game_id: GameId,
        player_id: PlayerId,
    ) -> ServiceResult<Game> {
        let mut game = self
            .store
            .get_game_by_id(tx, game_id)
            .await
            .map_err(|e| game_lookup(e, game_id))?;
        let game_players = self.store.get_game_players_by_game_id(tx, game_id).await?;

        if game_players.len() >= game.number_of_players as usize {
            return Err(ServiceError::TableFull);
        }
        if game_players.iter().any(|seated| seated.player_id == player_id) {
            return Err(ServiceError::AlreadyJoined);
        }

        let player = self
            .store
            .get_player_by_id(tx, player_id)
            .await
            .map_err(|e| player_lookup(e, player_id))?;

        self.store
            .insert_game_player(
                tx,
                &GamePlayer {
                    game_id,
                    player_id,
                    ordering: game_players.len() as u8,
                },
            )
            .await?;

        game.players = game_players
            .iter()
            .map(|seated| Player::with_id(seated.player_id))
            .collect();
        game.players.push(player);
        Ok(game)
    }

    /// Plays the board positions in `word` for `player_id` and returns the
    /// post-turn snapshot that was also published to the game's listeners.
    pub async fn take_turn(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        word: &[u8],
    ) -> ServiceResult<Game> {
        let mut tx = self.store.begin_transaction().await?;
        let result = self.play_word(&mut tx, game_id, player_id, word).await;
        let played = self.finish(tx, result).await?;

        info!(
            "Player {} played in game {}, next slot {}, state {}",
            player_id, game_id, played.current_player_order, played.state
        );

        let delivered = self.hub.publish(&played).await;
        debug!("Game {} snapshot delivered to {} listener(s)", game_id, delivered);

        Ok(played)
    }

    /// Resolves the turn and reads the resulting snapshot back through `tx`,
    /// so it reflects exactly what the commit makes visible.
    async fn play_word(
        &self,
        tx: &mut S::Transaction,
        game_id: GameId,
        player_id: PlayerId,
        word: &[u8],
    ) -> ServiceResult<Game> {
        let mut game = self
            .store
            .get_game_by_id(tx, game_id)
            .await
            .map_err(|e| game_lookup(e, game_id))?;

        if !game.is_playable() {
            return Err(ServiceError::GameUnplayable);
        }

        let game_players = self.store.get_game_players_by_game_id(tx, game_id).await?;
        let slot = acting_slot(&game, &game_players, player_id)?;

        let candidate = spell_word(&game.board_base, word)?;

        let dictionary = self
            .dictionaries
            .get(&self.rules.language)
            .ok_or_else(|| ServiceError::DictionaryUnavailable(self.rules.language.clone()))?;
        if !dictionary.lemma_is_valid(&candidate).await? {
            return Err(ServiceError::WordRejected(candidate));
        }

        let played_word = PlayedWord {
            game_id,
            player_id,
            word: candidate,
        };
        if let Err(e) = self.store.log_played_word(tx, &played_word).await {
            return Err(if e.is_unique_violation() {
                ServiceError::WordAlreadyPlayed(played_word.word)
            } else {
                e.into()
            });
        }

        apply_word(
            &mut game,
            word,
            slot,
            game_players.len(),
            self.rules.max_strength,
        );

        self.store.update_game(tx, &game).await?;

        game.players = self.store.get_players_by_game_id(tx, game_id).await?;
        game.played_words = self.store.get_played_words_by_game_id(tx, game_id).await?;
        Ok(game)
    }

    /// Game row with its seated players and played words.
    pub async fn get_game(&self, game_id: GameId) -> ServiceResult<Game> {
        let mut game = self
            .store
            .find_game(game_id)
            .await
            .map_err(|e| game_lookup(e, game_id))?;

        let (players, played_words) = tokio::join!(
            self.store.find_players_by_game(game_id),
            self.store.find_played_words_by_game(game_id),
        );
        game.players = players?;
        game.played_words = played_words?;
        Ok(game)
    }

    /// Every game `player_id` holds a seat in, with seated players.
    pub async fn get_games(&self, player_id: PlayerId) -> ServiceResult<Vec<Game>> {
        let games = self.store.find_games_by_player(player_id).await?;

        let players = try_join_all(
            games
                .iter()
                .map(|game| self.store.find_players_by_game(game.id)),
        )
        .await?;

        Ok(games
            .into_iter()
            .zip(players)
            .map(|(mut game, players)| {
                game.players = players;
                game
            })
            .collect())
    }

    pub async fn get_player(&self, player_id: PlayerId) -> ServiceResult<Player> {
        self.store
            .find_player(player_id)
            .await
            .map_err(|e| player_lookup(e, player_id))
    }

    /// Registers a live listener for an existing game.
    pub async fn subscribe(
        &self,
        game_id: GameId,
        listener_id: ListenerId,
    ) -> ServiceResult<mpsc::Receiver<Game>> {
        self.store
            .find_game(game_id)
            .await
            .map_err(|e| game_lookup(e, game_id))?;

        Ok(self.hub.subscribe(game_id, listener_id).await)
    }
}
