//! Voting Router

use axum::middleware::from_fn_with_state;
use axum::{
    Router,
    routing::{get, post},
};

use crate::domain::repository::{GameCatalog, SessionStore};
use crate::presentation::handlers::{self, VotingAppState};
use crate::presentation::middleware::{SessionCookie, resolve_session};

/// Create the voting router for any catalog and session store
pub fn voting_router<C, S>(state: VotingAppState<C, S>, cookies: SessionCookie) -> Router
where
    C: GameCatalog + Sync + 'static,
    S: SessionStore + Sync + 'static,
{
    Router::new()
        .route(
            "/games",
            get(handlers::list_games::<C, S>).post(handlers::add_game::<C, S>),
        )
        .route("/games/clear", post(handlers::clear_games::<C, S>))
        .route("/games/{id}", get(handlers::get_game::<C, S>))
        .route("/games/{id}/votes", post(handlers::vote_for_game::<C, S>))
        .route("/games/{id}/owned", post(handlers::mark_game_owned::<C, S>))
        .route("/status", get(handlers::status::<C, S>))
        .layer(from_fn_with_state(cookies, resolve_session))
        .with_state(state)
}
