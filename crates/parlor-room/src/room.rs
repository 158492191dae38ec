//! A room: up to two players plus one authoritative game session.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parlor_game::{GameKind, GameSession, Role};
use parlor_protocol::{MarkUpdate, RoomSummary};
use tokio::sync::Mutex;

use crate::{Player, RoomError};

/// Hard cap on human-or-AI members per room.
pub const MAX_PLAYERS: usize = 2;

/// Membership and activity, guarded by the room's own lock. Lock order is
/// always room → player; nothing takes a player lock first.
struct RoomInner {
    players: HashMap<String, Arc<Player>>,
    is_active: bool,
    ai_enabled: bool,
}

/// A session container pairing up to two players with one game instance.
///
/// The room exclusively owns its [`GameSession`] and its member map
/// entries; the `Player` values themselves are shared with the global
/// registry.
pub struct Room {
    code: String,
    session: GameSession,
    inner: Mutex<RoomInner>,
}

impl std::fmt::Debug for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Room").field("code", &self.code).finish_non_exhaustive()
    }
}

impl Room {
    pub(crate) fn new(code: impl Into<String>, kind: GameKind) -> Arc<Self> {
        Arc::new(Self {
            code: code.into(),
            session: GameSession::new(kind),
            inner: Mutex::new(RoomInner {
                players: HashMap::new(),
                is_active: false,
                ai_enabled: false,
            }),
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn kind(&self) -> GameKind {
        self.session.kind()
    }

    /// Adds a player, assigns their role, and activates the room when the
    /// second seat fills.
    ///
    /// Roles are deterministic: the joiner takes the first free seat in
    /// canonical order (first mover, then second mover). With an AI
    /// pre-seated as second mover, the joining human correctly becomes
    /// the first mover.
    ///
    /// # Errors
    /// [`RoomError::Full`] with two members present,
    /// [`RoomError::AlreadyJoined`] if this player is one of them.
    pub async fn join(&self, player: Arc<Player>) -> Result<Role, RoomError> {
        let mut inner = self.inner.lock().await;
        if inner.players.len() >= MAX_PLAYERS {
            return Err(RoomError::Full(self.code.clone()));
        }
        if inner.players.contains_key(player.id()) {
            return Err(RoomError::AlreadyJoined(
                player.id().to_string(),
                self.code.clone(),
            ));
        }

        let kind = self.kind();
        let mut first_taken = false;
        for member in inner.players.values() {
            if member.role().await == Some(Role::first(kind)) {
                first_taken = true;
            }
        }
        let role = if first_taken {
            Role::second(kind)
        } else {
            Role::first(kind)
        };
        player.set_role(role).await;

        inner.players.insert(player.id().to_string(), player.clone());
        tracing::info!(
            room = %self.code,
            player = %player.id(),
            %role,
            members = inner.players.len(),
            "player joined room"
        );

        if inner.players.len() == MAX_PLAYERS {
            inner.is_active = true;
            self.session.set_active(true).await;
        }

        Ok(role)
    }

    /// Seats the AI opponent in the second-mover role and flags the room.
    /// The room activates when the human joins, not before — one seat
    /// filled is still one seat filled.
    pub(crate) async fn seat_ai(&self) {
        let mut inner = self.inner.lock().await;
        let ai = Player::ai(Role::second(self.kind()));
        inner.players.insert(ai.id().to_string(), ai);
        inner.ai_enabled = true;
    }

    /// Looks up a member of this room.
    ///
    /// # Errors
    /// [`RoomError::PlayerNotFound`] if the player is not a member.
    pub async fn member(&self, id: &str) -> Result<Arc<Player>, RoomError> {
        self.inner
            .lock()
            .await
            .players
            .get(id)
            .cloned()
            .ok_or_else(|| RoomError::PlayerNotFound(id.to_string()))
    }

    /// Snapshot of the current members.
    pub async fn members(&self) -> Vec<Arc<Player>> {
        self.inner.lock().await.players.values().cloned().collect()
    }

    pub async fn member_count(&self) -> usize {
        self.inner.lock().await.players.len()
    }

    pub async fn is_active(&self) -> bool {
        self.inner.lock().await.is_active
    }

    pub async fn is_ai_enabled(&self) -> bool {
        self.inner.lock().await.ai_enabled
    }

    /// Removes a member; no-op for non-members. Returns how many members
    /// remain.
    pub async fn remove_member(&self, id: &str) -> usize {
        let mut inner = self.inner.lock().await;
        if inner.players.remove(id).is_some() {
            tracing::info!(
                room = %self.code,
                player = %id,
                members = inner.players.len(),
                "player removed from room"
            );
        }
        inner.players.len()
    }

    /// Re-derives room state after membership dropped below two: the room
    /// goes inactive, every remaining player is reset to the first-mover
    /// role, and the game session returns to its initial position,
    /// suspended. Returns the role snapshot for broadcasting.
    pub async fn demote_to_waiting(&self) -> MarkUpdate {
        let kind = self.kind();
        let mut inner = self.inner.lock().await;
        inner.is_active = false;

        let mut marks = HashMap::new();
        for member in inner.players.values() {
            member.set_role(Role::first(kind)).await;
            marks.insert(
                member.id().to_string(),
                Role::first(kind).as_str().to_string(),
            );
        }
        drop(inner);

        self.session.reset(false).await;

        MarkUpdate {
            marks,
            active: false,
        }
    }

    /// Drops members idle longer than `idle_limit`. Returns how many
    /// members remain.
    pub(crate) async fn remove_inactive_members(
        &self,
        idle_limit: Duration,
    ) -> usize {
        let members = self.members().await;
        let mut inner = self.inner.lock().await;
        for member in members {
            if member.idle_for().await > idle_limit {
                inner.players.remove(member.id());
                tracing::info!(
                    room = %self.code,
                    player = %member.id(),
                    "member removed for inactivity"
                );
            }
        }
        inner.players.len()
    }

    /// The room as reported to clients.
    pub async fn summary(&self) -> RoomSummary {
        let inner = self.inner.lock().await;
        let mut players = HashMap::new();
        for member in inner.players.values() {
            players.insert(member.id().to_string(), member.summary().await);
        }
        RoomSummary {
            room_id: self.code.clone(),
            players,
            game_type: self.kind().as_str().to_string(),
            is_active: inner.is_active,
            is_ai_enabled: inner.ai_enabled,
        }
    }
}
