//! Player identity, connection status, and the global player registry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parlor_game::Role;
use parlor_protocol::PlayerSummary;
use tokio::sync::{Mutex, mpsc};

use crate::RoomError;

/// Reserved ID of the built-in AI opponent. The AI player exists only
/// inside its room; it is never registered globally and never has a
/// connection.
pub const AI_PLAYER_ID: &str = "AI";

/// Sender half of a player's bounded outbound queue. The write pump owns
/// the receiving half and drains it to the socket in enqueue order.
pub type OutboundSender = mpsc::Sender<Vec<u8>>;

/// Where a player's connection currently stands.
///
/// ```text
/// Disconnected ──(bind)──→ Connected ──(socket gone)──→ Disconnected
///       │                                                    │
///       └←─────────────────(rebind)──────────────────────────┤
///                                                            ▼ (grace elapsed)
///                                                        Evicted
/// ```
///
/// The grace-period timer is an idempotent callback: it only evicts if
/// the status is still `Disconnected` when it fires, so a reconnection
/// in the meantime silently defuses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// A live transport is bound to this player.
    Connected,
    /// No transport; the grace period is running since this instant.
    Disconnected { since: Instant },
    /// Removed from their room after the grace period elapsed.
    Evicted,
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// Result of a non-blocking enqueue attempt onto a player's queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// The message is in the queue; the write pump will deliver it.
    Sent,
    /// The player has no live queue (disconnected or AI) — skipped.
    NoQueue,
    /// The queue was full or closed. The player is effectively
    /// unreachable and should be dropped from the room.
    Overflow,
}

/// Mutable per-player state, all behind one lock.
#[derive(Debug)]
struct PlayerState {
    role: Option<Role>,
    status: ConnectionStatus,
    last_active: Instant,
    sender: Option<OutboundSender>,
}

/// A known player. Shared between the global registry and at most one
/// room; both hold `Arc`s to the same instance.
pub struct Player {
    id: String,
    state: Mutex<PlayerState>,
}

impl Player {
    pub fn new(id: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            state: Mutex::new(PlayerState {
                role: None,
                status: ConnectionStatus::Disconnected {
                    since: Instant::now(),
                },
                last_active: Instant::now(),
                sender: None,
            }),
        })
    }

    /// The built-in AI opponent, pre-seated with the given role.
    pub fn ai(role: Role) -> Arc<Self> {
        let player = Self::new(AI_PLAYER_ID);
        // Can't be contended: the Arc has not been shared yet.
        player
            .state
            .try_lock()
            .expect("freshly created player")
            .role = Some(role);
        player
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_ai(&self) -> bool {
        self.id == AI_PLAYER_ID
    }

    pub async fn role(&self) -> Option<Role> {
        self.state.lock().await.role
    }

    pub async fn set_role(&self, role: Role) {
        self.state.lock().await.role = Some(role);
    }

    pub async fn status(&self) -> ConnectionStatus {
        self.state.lock().await.status
    }

    /// Refreshes the last-activity clock.
    pub async fn touch(&self) {
        self.state.lock().await.last_active = Instant::now();
    }

    pub async fn idle_for(&self) -> Duration {
        self.state.lock().await.last_active.elapsed()
    }

    /// Binds a fresh transport: stores the outbound queue sender and
    /// flips the status to `Connected`. Rebinding after a disconnect is
    /// how reconnection works — the old timer then finds the status
    /// `Connected` and backs off.
    pub async fn bind(&self, sender: OutboundSender) {
        let mut state = self.state.lock().await;
        state.sender = Some(sender);
        state.status = ConnectionStatus::Connected;
        state.last_active = Instant::now();
    }

    /// Clears the transport after the read loop ends. The player keeps
    /// their room membership until the grace period decides otherwise.
    pub async fn mark_disconnected(&self) {
        let mut state = self.state.lock().await;
        state.sender = None;
        state.status = ConnectionStatus::Disconnected {
            since: Instant::now(),
        };
    }

    /// Disconnects only if `sender` is still the bound queue. A handler
    /// whose connection was superseded by a reconnection sees `false`
    /// and must not run the disconnect side effects — the new connection
    /// owns the player now.
    pub async fn unbind(&self, sender: &OutboundSender) -> bool {
        let mut state = self.state.lock().await;
        match &state.sender {
            Some(current) if current.same_channel(sender) => {
                state.sender = None;
                state.status = ConnectionStatus::Disconnected {
                    since: Instant::now(),
                };
                true
            }
            _ => false,
        }
    }

    /// Marks the player evicted from their room.
    pub async fn mark_evicted(&self) {
        let mut state = self.state.lock().await;
        state.sender = None;
        state.status = ConnectionStatus::Evicted;
    }

    /// Attempts a non-blocking enqueue onto the outbound queue. On
    /// overflow the queue sender is dropped, which closes the queue and
    /// lets the write pump wind down.
    pub async fn try_enqueue(&self, bytes: Vec<u8>) -> EnqueueOutcome {
        let mut state = self.state.lock().await;
        let Some(sender) = &state.sender else {
            return EnqueueOutcome::NoQueue;
        };
        match sender.try_send(bytes) {
            Ok(()) => EnqueueOutcome::Sent,
            Err(_) => {
                state.sender = None;
                EnqueueOutcome::Overflow
            }
        }
    }

    /// The player as it appears in wire messages.
    pub async fn summary(&self) -> PlayerSummary {
        let state = self.state.lock().await;
        PlayerSummary {
            player_id: self.id.clone(),
            player_mark: state
                .role
                .map_or(String::new(), |r| r.as_str().to_string()),
        }
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player").field("id", &self.id).finish()
    }
}

/// The global registry of known players, independent of rooms.
///
/// The map lock is held only across lookups and edits — never while a
/// room or session lock is engaged.
pub struct PlayerRegistry {
    players: Mutex<HashMap<String, Arc<Player>>>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self {
            players: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a new player identity.
    ///
    /// # Errors
    /// [`RoomError::PlayerExists`] if the ID is taken.
    pub async fn add(&self, id: &str) -> Result<Arc<Player>, RoomError> {
        let mut players = self.players.lock().await;
        if players.contains_key(id) {
            return Err(RoomError::PlayerExists(id.to_string()));
        }
        let player = Player::new(id);
        players.insert(id.to_string(), Arc::clone(&player));
        tracing::info!(player = %id, "player registered");
        Ok(player)
    }

    /// # Errors
    /// [`RoomError::PlayerNotFound`] if no such player is registered.
    pub async fn get(&self, id: &str) -> Result<Arc<Player>, RoomError> {
        self.players
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| RoomError::PlayerNotFound(id.to_string()))
    }

    pub async fn remove(&self, id: &str) {
        self.players.lock().await.remove(id);
    }

    /// Refreshes a player's activity clock; unknown IDs are ignored.
    pub async fn touch(&self, id: &str) {
        let player = self.players.lock().await.get(id).cloned();
        if let Some(player) = player {
            player.touch().await;
        }
    }

    pub async fn len(&self) -> usize {
        self.players.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.players.lock().await.is_empty()
    }

    /// One sweep pass: unregisters every player idle longer than
    /// `idle_limit`. Returns the removed IDs. The caller runs this on a
    /// timer; the interval is configuration, not policy.
    pub async fn remove_inactive(&self, idle_limit: Duration) -> Vec<String> {
        let snapshot: Vec<Arc<Player>> =
            self.players.lock().await.values().cloned().collect();

        let mut stale = Vec::new();
        for player in snapshot {
            if player.idle_for().await > idle_limit {
                stale.push(player.id().to_string());
            }
        }

        let mut players = self.players.lock().await;
        for id in &stale {
            players.remove(id);
            tracing::info!(player = %id, "player removed for inactivity");
        }
        stale
    }
}

impl Default for PlayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_new_player_starts_disconnected() {
        let registry = PlayerRegistry::new();
        let player = registry.add("alice").await.unwrap();

        assert_eq!(player.id(), "alice");
        assert!(!player.status().await.is_connected());
        assert_eq!(player.role().await, None);
    }

    #[tokio::test]
    async fn test_add_duplicate_id_returns_player_exists() {
        let registry = PlayerRegistry::new();
        registry.add("alice").await.unwrap();

        let result = registry.add("alice").await;
        assert_eq!(
            result.unwrap_err(),
            RoomError::PlayerExists("alice".into())
        );
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_unknown_player_returns_not_found() {
        let registry = PlayerRegistry::new();
        assert_eq!(
            registry.get("ghost").await.unwrap_err(),
            RoomError::PlayerNotFound("ghost".into())
        );
    }

    #[tokio::test]
    async fn test_bind_connects_and_rebind_reconnects() {
        let player = Player::new("alice");
        let (tx, _rx) = mpsc::channel(4);
        player.bind(tx).await;
        assert!(player.status().await.is_connected());

        player.mark_disconnected().await;
        assert!(matches!(
            player.status().await,
            ConnectionStatus::Disconnected { .. }
        ));

        let (tx, _rx) = mpsc::channel(4);
        player.bind(tx).await;
        assert!(player.status().await.is_connected());
    }

    #[tokio::test]
    async fn test_unbind_ignores_superseded_connection() {
        let player = Player::new("alice");
        let (old_tx, _old_rx) = mpsc::channel(4);
        player.bind(old_tx.clone()).await;

        // A reconnection binds a fresh queue before the old handler's
        // read loop winds down.
        let (new_tx, _new_rx) = mpsc::channel(4);
        player.bind(new_tx.clone()).await;

        // The stale handler must not disconnect the new connection.
        assert!(!player.unbind(&old_tx).await);
        assert!(player.status().await.is_connected());

        // The owning handler still can.
        assert!(player.unbind(&new_tx).await);
        assert!(!player.status().await.is_connected());
    }

    #[tokio::test]
    async fn test_try_enqueue_without_queue_is_no_queue() {
        let player = Player::new("alice");
        assert_eq!(
            player.try_enqueue(b"hi".to_vec()).await,
            EnqueueOutcome::NoQueue
        );
    }

    #[tokio::test]
    async fn test_try_enqueue_full_queue_is_overflow_and_closes() {
        let player = Player::new("alice");
        let (tx, _rx) = mpsc::channel(1);
        player.bind(tx).await;

        assert_eq!(
            player.try_enqueue(b"1".to_vec()).await,
            EnqueueOutcome::Sent
        );
        // Queue capacity 1 and nobody draining: the second enqueue
        // overflows and drops the sender.
        assert_eq!(
            player.try_enqueue(b"2".to_vec()).await,
            EnqueueOutcome::Overflow
        );
        assert_eq!(
            player.try_enqueue(b"3".to_vec()).await,
            EnqueueOutcome::NoQueue
        );
    }

    #[tokio::test]
    async fn test_enqueue_order_preserved() {
        let player = Player::new("alice");
        let (tx, mut rx) = mpsc::channel(8);
        player.bind(tx).await;

        for i in 0..5u8 {
            player.try_enqueue(vec![i]).await;
        }
        for i in 0..5u8 {
            assert_eq!(rx.recv().await.unwrap(), vec![i]);
        }
    }

    #[tokio::test]
    async fn test_ai_player_is_flagged_and_seated() {
        let ai = Player::ai(Role::O);
        assert!(ai.is_ai());
        assert_eq!(ai.role().await, Some(Role::O));
        assert_eq!(
            ai.try_enqueue(b"x".to_vec()).await,
            EnqueueOutcome::NoQueue
        );
    }

    #[tokio::test]
    async fn test_summary_includes_role_token() {
        let player = Player::new("alice");
        player.set_role(Role::White).await;
        let summary = player.summary().await;
        assert_eq!(summary.player_id, "alice");
        assert_eq!(summary.player_mark, "white");
    }

    #[tokio::test]
    async fn test_remove_inactive_drops_only_idle_players() {
        let registry = PlayerRegistry::new();
        registry.add("idle").await.unwrap();
        registry.add("busy").await.unwrap();
        registry.touch("busy").await;

        // Zero idle limit: everyone whose clock has any age is stale.
        // "busy" was touched in the same instant; give it headroom by
        // sweeping with a huge limit first (nothing goes), then zero.
        assert!(
            registry
                .remove_inactive(Duration::from_secs(3600))
                .await
                .is_empty()
        );

        let removed = registry.remove_inactive(Duration::ZERO).await;
        assert_eq!(removed.len(), 2, "zero limit sweeps everyone");
        assert!(registry.is_empty().await);
    }
}
