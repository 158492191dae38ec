//! Broadcast fanout: one message to every live member of a room.
//!
//! The broadcaster never blocks and never buffers unboundedly. Delivery
//! is a non-blocking enqueue onto each member's bounded outbound queue;
//! a member whose queue is full is unreachable in effect and gets dropped
//! from the room on the spot, exactly as if they had disconnected.

use chrono::Utc;
use parlor_protocol::{Codec, Envelope, JsonCodec};

use crate::{EnqueueOutcome, Room};

/// Stamps the envelope with the server time, serializes it once, and
/// enqueues it to every member with a live transport.
///
/// Members are delivered in enqueue order per their own queue (FIFO);
/// nothing is guaranteed across members or across rooms. Members whose
/// queue overflows are removed from the room before this returns.
pub async fn notify(room: &Room, mut envelope: Envelope) {
    envelope.timestamp = Some(Utc::now());

    let bytes = match JsonCodec.encode(&envelope) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "failed to encode broadcast");
            return;
        }
    };

    let mut dropped = Vec::new();
    for member in room.members().await {
        match member.try_enqueue(bytes.clone()).await {
            EnqueueOutcome::Sent | EnqueueOutcome::NoQueue => {}
            EnqueueOutcome::Overflow => {
                dropped.push(member.id().to_string());
            }
        }
    }

    for id in dropped {
        tracing::warn!(
            room = %room.code(),
            player = %id,
            "outbound queue overflow, dropping member"
        );
        room.remove_member(&id).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parlor_game::GameKind;
    use tokio::sync::mpsc;

    use crate::{Player, Room};

    use super::*;

    fn envelope(action: &str) -> Envelope {
        Envelope::new(action, "payload").unwrap()
    }

    /// Joins a player with a bound queue of the given capacity; returns
    /// the player and the queue's receiving half.
    async fn join_connected(
        room: &Room,
        id: &str,
        capacity: usize,
    ) -> (Arc<Player>, mpsc::Receiver<Vec<u8>>) {
        let player = Player::new(id);
        let (tx, rx) = mpsc::channel(capacity);
        player.bind(tx).await;
        room.join(Arc::clone(&player)).await.unwrap();
        (player, rx)
    }

    #[tokio::test]
    async fn test_notify_delivers_to_all_live_members() {
        let room = Room::new("R1", GameKind::TicTacToe);
        let (_a, mut rx_a) = join_connected(&room, "alice", 8).await;
        let (_b, mut rx_b) = join_connected(&room, "bob", 8).await;

        notify(&room, envelope("PING")).await;

        for rx in [&mut rx_a, &mut rx_b] {
            let bytes = rx.recv().await.unwrap();
            let received: Envelope = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(received.action, "PING");
            assert!(received.timestamp.is_some(), "stamped by fanout");
        }
    }

    #[tokio::test]
    async fn test_notify_preserves_order_per_member() {
        let room = Room::new("R1", GameKind::TicTacToe);
        let (_a, mut rx) = join_connected(&room, "alice", 16).await;

        for i in 0..5 {
            notify(&room, envelope(&format!("MSG{i}"))).await;
        }

        for i in 0..5 {
            let bytes = rx.recv().await.unwrap();
            let received: Envelope = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(received.action, format!("MSG{i}"));
        }
    }

    #[tokio::test]
    async fn test_notify_skips_disconnected_members_without_dropping() {
        let room = Room::new("R1", GameKind::TicTacToe);
        let (alice, _rx) = join_connected(&room, "alice", 8).await;
        alice.mark_disconnected().await;

        notify(&room, envelope("PING")).await;

        // Within the grace period a queueless member keeps their seat.
        assert_eq!(room.member_count().await, 1);
    }

    #[tokio::test]
    async fn test_notify_overflow_drops_member_from_room() {
        let room = Room::new("R1", GameKind::TicTacToe);
        // Stalled consumer: capacity 1, never drained.
        let (_stalled, _rx_stall) = join_connected(&room, "stalled", 1).await;
        let (_ok, mut rx_ok) = join_connected(&room, "healthy", 8).await;

        notify(&room, envelope("FIRST")).await; // fills the stalled queue
        notify(&room, envelope("SECOND")).await; // overflows it

        assert_eq!(room.member_count().await, 1, "stalled member dropped");
        assert!(room.member("healthy").await.is_ok());

        // The healthy member saw both messages, in order.
        for action in ["FIRST", "SECOND"] {
            let bytes = rx_ok.recv().await.unwrap();
            let received: Envelope = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(received.action, action);
        }
    }
}
