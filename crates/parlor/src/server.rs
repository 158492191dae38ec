//! Server assembly: shared state, router, and the serve loop.

use std::sync::Arc;

use axum::Router;
use axum::routing::{any, get, post};
use parlor_room::{PlayerRegistry, RoomManager};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::{ServerConfig, ServerError, http, lifecycle};

/// Everything a request handler needs: the two registries and the
/// configuration. One instance per server, shared by `Arc`.
pub struct AppState {
    pub rooms: RoomManager,
    pub players: PlayerRegistry,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig) -> SharedState {
        Arc::new(Self {
            rooms: RoomManager::new(),
            players: PlayerRegistry::new(),
            config,
        })
    }
}

pub type SharedState = Arc<AppState>;

/// Builds the full route table over the given state.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(http::index))
        .route("/create/user", post(http::register_player))
        .route("/room/create", post(http::create_room))
        .route("/room/join", post(http::join_room))
        .route("/ws", any(lifecycle::ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// A bound, not-yet-running server.
pub struct Server {
    listener: TcpListener,
    state: SharedState,
}

impl Server {
    /// Binds the listener from `config.bind_addr`.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(&config.bind_addr).await?;
        tracing::info!(addr = %config.bind_addr, "listening");
        Ok(Self {
            listener,
            state: AppState::new(config),
        })
    }

    /// The actual bound address (useful with a `:0` port).
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Handle to the shared state, e.g. for tests seeding players and
    /// rooms directly.
    pub fn state(&self) -> SharedState {
        Arc::clone(&self.state)
    }

    /// Runs the server: spawns the periodic inactivity sweep and serves
    /// requests until the process ends.
    pub async fn run(self) -> Result<(), ServerError> {
        let sweep_state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval(sweep_state.config.sweep_interval);
            ticker.tick().await; // the first tick is immediate; skip it
            loop {
                ticker.tick().await;
                let idle_limit = sweep_state.config.idle_limit;
                let removed =
                    sweep_state.players.remove_inactive(idle_limit).await;
                if !removed.is_empty() {
                    tracing::info!(
                        count = removed.len(),
                        "inactivity sweep unregistered players"
                    );
                }
                sweep_state.rooms.sweep_inactive_members(idle_limit).await;
            }
        });

        let app = router(Arc::clone(&self.state));
        axum::serve(self.listener, app).await?;
        Ok(())
    }
}
