//! Server configuration.

use std::time::Duration;

/// Tunable timings and limits.
///
/// The original deployment history disagreed with itself on several of
/// these values, so none of them are treated as load-bearing policy —
/// they are plain configuration with the most recent defaults. Tests
/// shrink the timers instead of sleeping real durations.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the server listens on.
    pub bind_addr: String,

    /// How long a disconnected player keeps their room seat before the
    /// eviction timer may remove them.
    pub grace_period: Duration,

    /// Display delay between a finished tic-tac-toe game being broadcast
    /// and the board resetting for a rematch.
    pub reset_delay: Duration,

    /// Interval between liveness pings on each connection.
    pub heartbeat_interval: Duration,

    /// A connection with no frames (messages or keepalives) for this long
    /// is considered dead and torn down.
    pub read_deadline: Duration,

    /// Capacity of each player's outbound message queue. Overflow drops
    /// the player from the room rather than blocking the broadcaster.
    pub queue_capacity: usize,

    /// Interval between inactivity sweeps of the registries.
    pub sweep_interval: Duration,

    /// Players idle longer than this are unregistered by the sweep.
    pub idle_limit: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            grace_period: Duration::from_secs(30),
            reset_delay: Duration::from_secs(5),
            heartbeat_interval: Duration::from_secs(30),
            read_deadline: Duration::from_secs(60),
            queue_capacity: 256,
            sweep_interval: Duration::from_secs(30 * 60),
            idle_limit: Duration::from_secs(24 * 60 * 60),
        }
    }
}
