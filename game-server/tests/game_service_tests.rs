
use game_core::{ServiceError, decode, positioning_space};
use game_server::broadcast::ListenerId;
use game_types::{BOARD_CELLS, GameState};
use test_helpers::*;
use uuid::Uuid;

#[tokio::test]
async fn test_new_game_seats_creator() {
    let setup = TestGameServerSetup::new();
    let alice = setup.create_player("Alice").await;

    let game = setup.game_service.new_game(alice.id, 3).await.unwrap();

    assert_eq!(game.number_of_players, 3);
    assert_eq!(game.state, GameState::Ongoing);
    assert_eq!(game.current_player_order, 0);
    assert_eq!(game.players.len(), 1);
    assert_eq!(game.players[0].id, alice.id);
    assert_eq!(game.board_base.len(), BOARD_CELLS);
    assert!(game.board_base.iter().all(|&letter| letter < 26));
    assert!(game.board_positioning.iter().all(|&cell| cell == 0));
    assert_eq!(setup.store.commits(), 1);
}

#[tokio::test]
async fn test_new_game_player_count_bounds() {
    let setup = TestGameServerSetup::new();
    let alice = setup.create_player("Alice").await;

    for count in [0, 1, 6] {
        let result = setup.game_service.new_game(alice.id, count).await;
        assert!(matches!(result, Err(ServiceError::InvalidPlayerCount(c)) if c == count));
    }
    for count in 2..=5 {
        assert!(setup.game_service.new_game(alice.id, count).await.is_ok());
    }
}

#[tokio::test]
async fn test_new_game_unknown_creator() {
    let setup = TestGameServerSetup::new();
    let stranger = Uuid::new_v4();

    let result = setup.game_service.new_game(stranger, 2).await;
    assert!(matches!(result, Err(ServiceError::PlayerNotFound(id)) if id == stranger));
    assert_eq!(setup.store.commits(), 0);
}

#[tokio::test]
async fn test_join_game_in_order() {
    let setup = TestGameServerSetup::new();
    let alice = setup.create_player("Alice").await;
    let bob = setup.create_player("Bob").await;

    let game = setup.game_service.new_game(alice.id, 2).await.unwrap();
    let joined = setup.game_service.join_game(game.id, bob.id).await.unwrap();

    assert_eq!(joined.players.len(), 2);
    assert_eq!(joined.players[0].id, alice.id);
    assert_eq!(joined.players[1].id, bob.id);
    assert_eq!(joined.players[1].username, "Bob");

    let stored = setup.game_service.get_game(game.id).await.unwrap();
    assert_eq!(
        stored.players.iter().map(|p| p.id).collect::<Vec<_>>(),
        vec![alice.id, bob.id]
    );
}

#[tokio::test]
async fn test_join_full_table() {
    let setup = TestGameServerSetup::new();
    let (game, _) = setup.create_full_game(&["Alice", "Bob"]).await;
    let carol = setup.create_player("Carol").await;

    let result = setup.game_service.join_game(game.id, carol.id).await;
    assert!(matches!(result, Err(ServiceError::TableFull)));
    assert_eq!(setup.store.rollbacks(), 1);
}

#[tokio::test]
async fn test_join_twice() {
    let setup = TestGameServerSetup::new();
    let alice = setup.create_player("Alice").await;
    let game = setup.game_service.new_game(alice.id, 3).await.unwrap();

    let result = setup.game_service.join_game(game.id, alice.id).await;
    assert!(matches!(result, Err(ServiceError::AlreadyJoined)));

    let stored = setup.game_service.get_game(game.id).await.unwrap();
    assert_eq!(stored.players.len(), 1);
}

#[tokio::test]
async fn test_join_unknown_game_or_player() {
    let setup = TestGameServerSetup::new();
    let alice = setup.create_player("Alice").await;
    let game = setup.game_service.new_game(alice.id, 2).await.unwrap();

    let missing_game = Uuid::new_v4();
    let result = setup.game_service.join_game(missing_game, alice.id).await;
    assert!(matches!(result, Err(ServiceError::GameNotFound(id)) if id == missing_game));

    let missing_player = Uuid::new_v4();
    let result = setup.game_service.join_game(game.id, missing_player).await;
    assert!(matches!(result, Err(ServiceError::PlayerNotFound(id)) if id == missing_player));
}

#[tokio::test]
async fn test_first_turn_claims_cells() {
    let setup = TestGameServerSetup::new();
    let (game, players) = setup.create_full_game(&["Alice", "Bob"]).await;

    let after = setup.play(game.id, &players[0], "kata").await;

    assert_eq!(&after.board_positioning[..4], &[1, 1, 1, 1]);
    assert!(after.board_positioning[4..].iter().all(|&cell| cell == 0));
    assert_eq!(after.current_player_order, 1);
    assert_eq!(after.state, GameState::Ongoing);
    assert_eq!(after.played_words.len(), 1);
    assert_eq!(after.played_words[0].word, "kata");
    assert_eq!(after.played_words[0].player_id, players[0].id);
    assert_eq!(after.players.len(), 2);
}

#[tokio::test]
async fn test_contested_cell_flips_owner() {
    let setup = TestGameServerSetup::new();
    let (game, players) = setup.create_full_game(&["Alice", "Bob"]).await;
    let space = positioning_space(2);

    setup.play(game.id, &players[0], "kata").await;
    let after = setup.play(game.id, &players[1], "buku").await;

    // k sits at position 0 and was Alice's at strength 1
    let cell = decode(after.board_positioning[0], space).unwrap();
    assert_eq!(cell.owner, 1);
    assert_eq!(cell.strength, 1);
    assert_eq!(after.current_player_order, 0);

    let after = setup.play(game.id, &players[0], "meja").await;
    // Alice's a at position 1 is reinforced
    let cell = decode(after.board_positioning[1], space).unwrap();
    assert_eq!(cell.owner, 0);
    assert_eq!(cell.strength, 2);
}

#[tokio::test]
async fn test_turn_out_of_order() {
    let setup = TestGameServerSetup::new();
    let (game, players) = setup.create_full_game(&["Alice", "Bob"]).await;

    let result = setup
        .game_service
        .take_turn(game.id, players[1].id, &positions("kata"))
        .await;
    assert!(matches!(result, Err(ServiceError::NotYourTurn)));

    let outsider = setup.create_player("Carol").await;
    let result = setup
        .game_service
        .take_turn(game.id, outsider.id, &positions("kata"))
        .await;
    assert!(matches!(result, Err(ServiceError::NotYourTurn)));
}

#[tokio::test]
async fn test_turn_before_table_is_full() {
    let setup = TestGameServerSetup::new();
    let alice = setup.create_player("Alice").await;
    let game = setup.game_service.new_game(alice.id, 2).await.unwrap();
    setup.store.set_board(game.id, test_board()).await;

    let result = setup
        .game_service
        .take_turn(game.id, alice.id, &positions("kata"))
        .await;
    assert!(matches!(result, Err(ServiceError::NotYourTurn)));
}

#[tokio::test]
async fn test_invalid_positions() {
    let setup = TestGameServerSetup::new();
    let (game, players) = setup.create_full_game(&["Alice", "Bob"]).await;

    for word in [Vec::<u8>::new(), vec![0, 1, 0], vec![0, 25]] {
        let result = setup
            .game_service
            .take_turn(game.id, players[0].id, &word)
            .await;
        assert!(matches!(result, Err(ServiceError::InvalidWord)), "{:?}", word);
    }
}

#[tokio::test]
async fn test_word_not_in_dictionary() {
    let setup = TestGameServerSetup::new();
    let (game, players) = setup.create_full_game(&["Alice", "Bob"]).await;

    let result = setup
        .game_service
        .take_turn(game.id, players[0].id, &positions("tak"))
        .await;
    assert!(matches!(result, Err(ServiceError::WordRejected(word)) if word == "tak"));

    let stored = setup.store.stored_game(game.id).await.unwrap();
    assert!(stored.board_positioning.iter().all(|&cell| cell == 0));
    assert_eq!(stored.current_player_order, 0);
}

#[tokio::test]
async fn test_word_already_played() {
    let setup = TestGameServerSetup::new();
    let (game, players) = setup.create_full_game(&["Alice", "Bob"]).await;

    let before = setup.play(game.id, &players[0], "kata").await;
    let rollbacks = setup.store.rollbacks();

    let result = setup
        .game_service
        .take_turn(game.id, players[1].id, &positions("kata"))
        .await;
    assert!(matches!(result, Err(ServiceError::WordAlreadyPlayed(word)) if word == "kata"));
    assert_eq!(setup.store.rollbacks(), rollbacks + 1);

    let stored = setup.store.stored_game(game.id).await.unwrap();
    assert_eq!(stored.board_positioning, before.board_positioning);
    assert_eq!(stored.current_player_order, 1);
    assert_eq!(setup.store.played_word_count(game.id).await, 1);
}

#[tokio::test]
async fn test_failed_update_rolls_back_played_word() {
    let setup = TestGameServerSetup::new();
    let (game, players) = setup.create_full_game(&["Alice", "Bob"]).await;

    setup.store.fail_updates(true);
    let result = setup
        .game_service
        .take_turn(game.id, players[0].id, &positions("kata"))
        .await;
    assert!(matches!(result, Err(ServiceError::Store(_))));
    assert_eq!(setup.store.played_word_count(game.id).await, 0);

    setup.store.fail_updates(false);
    let after = setup.play(game.id, &players[0], "kata").await;
    assert_eq!(after.played_words.len(), 1);
}

#[tokio::test]
async fn test_filled_board_ends_game() {
    let setup = TestGameServerSetup::new();
    let (game, players) = setup.create_full_game(&["Alice", "Bob"]).await;

    let after = setup.play(game.id, &players[0], TEST_BOARD).await;
    assert_eq!(after.state, GameState::End);
    assert!(after.board_positioning.iter().all(|&cell| cell == 1));

    let result = setup
        .game_service
        .take_turn(game.id, players[1].id, &positions("buku"))
        .await;
    assert!(matches!(result, Err(ServiceError::GameUnplayable)));
}

#[tokio::test]
async fn test_turn_is_published_to_listeners() {
    let setup = TestGameServerSetup::new();
    let (game, players) = setup.create_full_game(&["Alice", "Bob"]).await;

    let mut updates = setup
        .game_service
        .subscribe(game.id, ListenerId::new())
        .await
        .unwrap();

    let after = setup.play(game.id, &players[0], "kata").await;

    let pushed = updates.recv().await.unwrap();
    assert_eq!(pushed, after);
    assert_eq!(pushed.played_words.len(), 1);
}

#[tokio::test]
async fn test_delayed_turn_does_not_overwrite_newer_snapshot() {
    let setup = TestGameServerSetup::new();
    let (game, players) = setup.create_full_game(&["Alice", "Bob"]).await;

    let mut updates = setup
        .game_service
        .subscribe(game.id, ListenerId::new())
        .await
        .unwrap();

    // Alice's turn commits, then stalls before it is published
    let (committed, release) = setup.store.hold_after_next_commit().await;
    let service = setup.game_service.clone();
    let (game_id, alice_id) = (game.id, players[0].id);
    let alice_turn =
        tokio::spawn(async move { service.take_turn(game_id, alice_id, &positions("kata")).await });
    committed.await.unwrap();

    let bob_turn = setup.play(game.id, &players[1], "meja").await;
    release.send(()).unwrap();
    let alice_turn = alice_turn.await.unwrap().unwrap();

    // Alice still gets her own turn's view back
    assert_eq!(alice_turn.current_player_order, 1);
    assert_eq!(alice_turn.played_words.len(), 1);
    assert_eq!(alice_turn.played_words[0].word, "kata");
    assert_eq!(alice_turn.players.len(), 2);

    let pushed = updates.recv().await.unwrap();
    assert_eq!(pushed, bob_turn);
    assert_eq!(pushed.current_player_order, 0);
    assert_eq!(pushed.played_words.len(), 2);
    assert!(updates.try_recv().is_err());

    let stored = setup.game_service.get_game(game.id).await.unwrap();
    assert_eq!(stored, bob_turn);
}

#[tokio::test]
async fn test_rejected_turn_is_not_published() {
    let setup = TestGameServerSetup::new();
    let (game, players) = setup.create_full_game(&["Alice", "Bob"]).await;

    let mut updates = setup
        .game_service
        .subscribe(game.id, ListenerId::new())
        .await
        .unwrap();

    let result = setup
        .game_service
        .take_turn(game.id, players[1].id, &positions("kata"))
        .await;
    assert!(result.is_err());
    assert!(updates.try_recv().is_err());
}

#[tokio::test]
async fn test_game_end_releases_listeners() {
    let setup = TestGameServerSetup::new();
    let (game, players) = setup.create_full_game(&["Alice", "Bob"]).await;

    let mut updates = setup
        .game_service
        .subscribe(game.id, ListenerId::new())
        .await
        .unwrap();
    assert_eq!(setup.hub.listener_count(game.id).await, 1);

    setup.play(game.id, &players[0], TEST_BOARD).await;

    let last = updates.recv().await.unwrap();
    assert_eq!(last.state, GameState::End);
    assert!(updates.recv().await.is_none());
    assert_eq!(setup.hub.listener_count(game.id).await, 0);
}

#[tokio::test]
async fn test_subscribe_unknown_game() {
    let setup = TestGameServerSetup::new();
    let missing = Uuid::new_v4();

    let result = setup
        .game_service
        .subscribe(missing, ListenerId::new())
        .await;
    assert!(matches!(result, Err(ServiceError::GameNotFound(id)) if id == missing));
    assert_eq!(setup.hub.game_count().await, 0);
}

#[tokio::test]
async fn test_get_games_for_player() {
    let setup = TestGameServerSetup::new();
    let (first, players) = setup.create_full_game(&["Alice", "Bob"]).await;
    let second = setup
        .game_service
        .new_game(players[0].id, 3)
        .await
        .unwrap();

    let mut alice_games: Vec<_> = setup
        .game_service
        .get_games(players[0].id)
        .await
        .unwrap()
        .into_iter()
        .map(|game| game.id)
        .collect();
    alice_games.sort();
    let mut expected = vec![first.id, second.id];
    expected.sort();
    assert_eq!(alice_games, expected);

    let bob_games = setup.game_service.get_games(players[1].id).await.unwrap();
    assert_eq!(bob_games.len(), 1);
    assert_eq!(bob_games[0].players.len(), 2);
}

#[tokio::test]
async fn test_get_player() {
    let setup = TestGameServerSetup::new();
    let alice = setup.create_player("Alice").await;

    let found = setup.game_service.get_player(alice.id).await.unwrap();
    assert_eq!(found.username, "Alice");

    let missing = Uuid::new_v4();
    let result = setup.game_service.get_player(missing).await;
    assert!(matches!(result, Err(ServiceError::PlayerNotFound(id)) if id == missing));
}
