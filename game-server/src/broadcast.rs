use game_types::{Game, GameId, GameState};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ListenerId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct Listener {
    sender: mpsc::Sender<Game>,
    /// Stops the listener's watcher task once the hub lets go of it.
    evicted: oneshot::Sender<()>,
}

impl Listener {
    fn evict(self) {
        let _ = self.evicted.send(());
    }
}

type ListenerMap = HashMap<GameId, HashMap<ListenerId, Listener>>;

#[derive(Default)]
struct HubState {
    listeners: ListenerMap,
    /// Played-word count of the newest snapshot published per game.
    versions: HashMap<GameId, usize>,
}

/// Live listeners per game. Every access goes through one mutex that is only
/// held while the map is read or changed; deliveries never wait on a receiver.
pub struct BroadcastHub {
    state: Arc<Mutex<HubState>>,
    buffer: usize,
}

impl BroadcastHub {
    /// `buffer` is the per-listener channel capacity, at least 1.
    pub fn new(buffer: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(HubState::default())),
            buffer: buffer.max(1),
        }
    }

    /// Registers a listener and returns its snapshot stream.
    ///
    /// Dropping the receiver unsubscribes. Subscribing again with the same
    /// `listener_id` replaces the earlier registration, whose stream ends.
    pub async fn subscribe(&self, game_id: GameId, listener_id: ListenerId) -> mpsc::Receiver<Game> {
        let (sender, receiver) = mpsc::channel(self.buffer);
        let (evicted, evicted_rx) = oneshot::channel();
        let watched = sender.clone();

        {
            let mut state = self.state.lock().await;
            let replaced = state
                .listeners
                .entry(game_id)
                .or_default()
                .insert(listener_id, Listener { sender, evicted });
            if let Some(previous) = replaced {
                debug!("Listener {} re-subscribed to game {}", listener_id, game_id);
                previous.evict();
            }
        }

        info!("Listener {} subscribed to game {}", listener_id, game_id);

        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            tokio::select! {
                _ = watched.closed() => {
                    let mut state = state.lock().await;
                    if remove_if_same(&mut state.listeners, game_id, listener_id, &watched) {
                        info!("Listener {} left game {}", listener_id, game_id);
                    }
                }
                _ = evicted_rx => {}
            }
        });

        receiver
    }

    pub async fn unsubscribe(&self, game_id: GameId, listener_id: ListenerId) -> bool {
        let removed = {
            let mut state = self.state.lock().await;
            let removed = state
                .listeners
                .get_mut(&game_id)
                .and_then(|game_listeners| game_listeners.remove(&listener_id));
            prune(&mut state.listeners, game_id);
            removed
        };

        match removed {
            Some(listener) => {
                listener.evict();
                info!("Listener {} unsubscribed from game {}", listener_id, game_id);
                true
            }
            None => false,
        }
    }

    /// Offers `game` to every listener of that game and returns how many
    /// accepted it. A listener whose buffer is full misses this snapshot.
    /// A terminal snapshot is the last one: the game's listeners are removed
    /// after delivery.
    ///
    /// Snapshots carrying fewer played words than one already published for
    /// the same game are stale and go nowhere.
    pub async fn publish(&self, game: &Game) -> usize {
        let mut state = self.state.lock().await;
        let HubState {
            listeners,
            versions,
        } = &mut *state;

        let version = game.played_words.len();
        if versions.get(&game.id).is_some_and(|&latest| version < latest) {
            debug!(
                "Stale snapshot of game {} (version {}) not delivered",
                game.id, version
            );
            return 0;
        }
        versions.insert(game.id, version);

        let mut delivered = 0;
        if let Some(game_listeners) = listeners.get_mut(&game.id) {
            game_listeners.retain(|listener_id, listener| {
                match listener.sender.try_send(game.clone()) {
                    Ok(()) => {
                        delivered += 1;
                        true
                    }
                    Err(TrySendError::Full(_)) => {
                        warn!(
                            "Listener {} of game {} is lagging, snapshot dropped",
                            listener_id, game.id
                        );
                        true
                    }
                    Err(TrySendError::Closed(_)) => {
                        debug!("Listener {} of game {} is gone", listener_id, game.id);
                        false
                    }
                }
            });
        }

        if game.state == GameState::End {
            if let Some(ended) = listeners.remove(&game.id) {
                info!(
                    "Game {} ended, releasing {} listener(s)",
                    game.id,
                    ended.len()
                );
                ended.into_values().for_each(Listener::evict);
            }
        } else {
            prune(listeners, game.id);
        }

        delivered
    }

    pub async fn listener_count(&self, game_id: GameId) -> usize {
        let state = self.state.lock().await;
        state.listeners.get(&game_id).map_or(0, HashMap::len)
    }

    pub async fn game_count(&self) -> usize {
        self.state.lock().await.listeners.len()
    }
}

/// Removes the entry only if it still belongs to `sender`'s channel, so a
/// stale watcher never drops a newer registration under the same id.
fn remove_if_same(
    listeners: &mut ListenerMap,
    game_id: GameId,
    listener_id: ListenerId,
    sender: &mpsc::Sender<Game>,
) -> bool {
    let Some(game_listeners) = listeners.get_mut(&game_id) else {
        return false;
    };
    let same = game_listeners
        .get(&listener_id)
        .is_some_and(|listener| listener.sender.same_channel(sender));
    if same {
        game_listeners.remove(&listener_id);
        prune(listeners, game_id);
    }
    same
}

fn prune(listeners: &mut ListenerMap, game_id: GameId) {
    if listeners.get(&game_id).is_some_and(HashMap::is_empty) {
        listeners.remove(&game_id);
    }
}
