//! Room registry: creates, looks up, and destroys rooms.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parlor_game::GameKind;
use rand::Rng;
use tokio::sync::Mutex;

use crate::{Room, RoomError};

/// Characters used in generated room codes.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of generated room codes.
const CODE_LEN: usize = 7;

/// Manages all live rooms.
///
/// The map lock is held only across a single lookup, insert, or delete —
/// never while a room's own lock or its game session is engaged, so
/// registry-level and room-level locking can never deadlock.
pub struct RoomManager {
    rooms: Mutex<HashMap<String, Arc<Room>>>,
}

impl RoomManager {
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a room with a freshly generated code.
    pub async fn create_room(
        &self,
        kind: GameKind,
    ) -> Result<Arc<Room>, RoomError> {
        self.create_room_with_code(&generate_code(), kind).await
    }

    /// Creates a room under a caller-chosen code.
    ///
    /// # Errors
    /// [`RoomError::AlreadyExists`] on a code collision — effectively
    /// unreachable for generated codes, but always checked.
    pub async fn create_room_with_code(
        &self,
        code: &str,
        kind: GameKind,
    ) -> Result<Arc<Room>, RoomError> {
        let mut rooms = self.rooms.lock().await;
        if rooms.contains_key(code) {
            return Err(RoomError::AlreadyExists(code.to_string()));
        }
        let room = Room::new(code, kind);
        rooms.insert(code.to_string(), Arc::clone(&room));
        tracing::info!(room = %code, game = %kind, "room created");
        Ok(room)
    }

    /// Creates a room with the AI pre-seated as the second mover. The
    /// joining human will take the first-mover seat and activate the room.
    ///
    /// # Errors
    /// [`RoomError::InvalidState`] for game kinds without an AI opponent;
    /// [`RoomError::AlreadyExists`] on a code collision.
    pub async fn create_room_with_ai(
        &self,
        code: &str,
        kind: GameKind,
    ) -> Result<Arc<Room>, RoomError> {
        if kind != GameKind::TicTacToe {
            return Err(RoomError::InvalidState(format!(
                "no AI opponent for {kind}"
            )));
        }
        let room = self.create_room_with_code(code, kind).await?;
        room.seat_ai().await;
        tracing::info!(room = %code, "AI opponent seated");
        Ok(room)
    }

    /// # Errors
    /// [`RoomError::NotFound`] if no room has this code.
    pub async fn get_room(&self, code: &str) -> Result<Arc<Room>, RoomError> {
        self.rooms
            .lock()
            .await
            .get(code)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(code.to_string()))
    }

    /// Deletes a room. Safe to call on a code that no longer exists.
    pub async fn remove_room(&self, code: &str) {
        if self.rooms.lock().await.remove(code).is_some() {
            tracing::info!(room = %code, "room removed");
        }
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.len()
    }

    /// One sweep pass: drops members idle beyond `idle_limit` from every
    /// room and deletes rooms that end up empty. The caller runs this on
    /// a timer.
    pub async fn sweep_inactive_members(&self, idle_limit: Duration) {
        // Snapshot the handles first; room locks are taken only after the
        // registry lock is released.
        let rooms: Vec<Arc<Room>> =
            self.rooms.lock().await.values().cloned().collect();

        let mut emptied = Vec::new();
        for room in rooms {
            if room.remove_inactive_members(idle_limit).await == 0 {
                emptied.push(room.code().to_string());
            }
        }
        for code in emptied {
            self.remove_room(&code).await;
        }
    }
}

impl Default for RoomManager {
    fn default() -> Self {
        Self::new()
    }
}

/// A random 7-character room code over `A–Z0–9`.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CODE_ALPHABET.len());
            CODE_ALPHABET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::Player;

    use super::*;

    #[tokio::test]
    async fn test_create_room_generates_code_and_registers() {
        let manager = RoomManager::new();
        let room = manager.create_room(GameKind::TicTacToe).await.unwrap();

        assert_eq!(room.code().len(), CODE_LEN);
        assert_eq!(manager.room_count().await, 1);
        assert!(manager.get_room(room.code()).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_room_with_code_collision_rejected() {
        let manager = RoomManager::new();
        manager
            .create_room_with_code("SAME123", GameKind::Chess)
            .await
            .unwrap();

        let result = manager
            .create_room_with_code("SAME123", GameKind::Chess)
            .await;
        assert_eq!(
            result.unwrap_err(),
            RoomError::AlreadyExists("SAME123".into())
        );
        assert_eq!(manager.room_count().await, 1);
    }

    #[tokio::test]
    async fn test_get_room_unknown_code_returns_not_found() {
        let manager = RoomManager::new();
        assert_eq!(
            manager.get_room("NOPE").await.unwrap_err(),
            RoomError::NotFound("NOPE".into())
        );
    }

    #[tokio::test]
    async fn test_remove_room_is_noop_on_unknown_code() {
        let manager = RoomManager::new();
        manager.remove_room("NOPE").await; // must not panic or error
        assert_eq!(manager.room_count().await, 0);
    }

    #[tokio::test]
    async fn test_create_room_with_ai_seats_second_mover() {
        let manager = RoomManager::new();
        let room = manager
            .create_room_with_ai("AIROOM1", GameKind::TicTacToe)
            .await
            .unwrap();

        assert!(room.is_ai_enabled().await);
        assert_eq!(room.member_count().await, 1);
        let ai = room.member("AI").await.unwrap();
        assert!(ai.is_ai());
    }

    #[tokio::test]
    async fn test_create_room_with_ai_rejects_chess() {
        let manager = RoomManager::new();
        let result = manager
            .create_room_with_ai("AIROOM1", GameKind::Chess)
            .await;
        assert!(matches!(result, Err(RoomError::InvalidState(_))));
        assert_eq!(manager.room_count().await, 0);
    }

    #[tokio::test]
    async fn test_generate_code_shape() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LEN);
            assert!(
                code.bytes().all(|b| CODE_ALPHABET.contains(&b)),
                "unexpected character in {code}"
            );
        }
    }

    #[tokio::test]
    async fn test_sweep_removes_idle_members_and_empty_rooms() {
        let manager = RoomManager::new();
        let room = manager
            .create_room_with_code("R1", GameKind::TicTacToe)
            .await
            .unwrap();
        room.join(Player::new("alice")).await.unwrap();

        // Everyone counts as idle with a zero limit; the room empties and
        // is deleted.
        manager.sweep_inactive_members(Duration::ZERO).await;
        assert_eq!(manager.room_count().await, 0);
    }

    #[tokio::test]
    async fn test_sweep_keeps_active_members() {
        let manager = RoomManager::new();
        let room = manager
            .create_room_with_code("R1", GameKind::TicTacToe)
            .await
            .unwrap();
        room.join(Player::new("alice")).await.unwrap();

        manager
            .sweep_inactive_members(Duration::from_secs(3600))
            .await;
        assert_eq!(manager.room_count().await, 1);
        assert_eq!(room.member_count().await, 1);
    }
}
