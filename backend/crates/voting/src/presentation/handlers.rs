//! HTTP Handlers
//!
//! Gated handlers hold the session's action permit from the throttle check
//! until the action is counted, and count it only once the catalog change
//! went through. Malformed ids and bodies are answered like the matching
//! business rejection, after the throttle had its say.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use crate::application::{ActionThrottle, VotingService};
use crate::domain::repository::{GameCatalog, SessionStore};
use crate::domain::value_objects::GameId;
use crate::error::{VotingError, VotingResult};
use crate::presentation::dto::{
    ActionResponse, AddGameRequest, AllowanceResponse, ClearGamesRequest, GameResponse,
    GamesResponse,
};
use crate::presentation::middleware::CurrentSession;

/// Shared state for voting handlers
pub struct VotingAppState<C, S>
where
    C: GameCatalog,
    S: SessionStore,
{
    pub voting: Arc<VotingService<C>>,
    pub throttle: Arc<ActionThrottle<S>>,
}

impl<C, S> VotingAppState<C, S>
where
    C: GameCatalog,
    S: SessionStore,
{
    pub fn new(voting: VotingService<C>, throttle: ActionThrottle<S>) -> Self {
        Self {
            voting: Arc::new(voting),
            throttle: Arc::new(throttle),
        }
    }
}

// Derived Clone would require C: Clone and S: Clone.
impl<C, S> Clone for VotingAppState<C, S>
where
    C: GameCatalog,
    S: SessionStore,
{
    fn clone(&self) -> Self {
        Self {
            voting: self.voting.clone(),
            throttle: self.throttle.clone(),
        }
    }
}

/// Game id from the path; anything unparseable names no game
fn game_id(path: Result<Path<u32>, PathRejection>) -> VotingResult<GameId> {
    match path {
        Ok(Path(id)) => Ok(GameId::new(id)),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unparseable game id");
            Err(VotingError::GameNotFound)
        }
    }
}

/// JSON body, or `otherwise` when it is missing or malformed
fn json_body<T>(body: Result<Json<T>, JsonRejection>, otherwise: VotingError) -> VotingResult<T> {
    match body {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable request body");
            Err(otherwise)
        }
    }
}

/// GET /api/games
pub async fn list_games<C, S>(
    State(state): State<VotingAppState<C, S>>,
    Extension(CurrentSession(session_id)): Extension<CurrentSession>,
) -> VotingResult<Json<GamesResponse>>
where
    C: GameCatalog + Sync + 'static,
    S: SessionStore + Sync + 'static,
{
    let games = state.voting.get_all_games().await?;
    let allowance = state.throttle.allowance(session_id).await?;

    Ok(Json(GamesResponse::from_games(games, allowance)))
}

/// GET /api/games/{id}
pub async fn get_game<C, S>(
    State(state): State<VotingAppState<C, S>>,
    path: Result<Path<u32>, PathRejection>,
) -> VotingResult<Json<GameResponse>>
where
    C: GameCatalog + Sync + 'static,
    S: SessionStore + Sync + 'static,
{
    let game = state
        .voting
        .get_game_by_id(game_id(path)?)
        .await?
        .ok_or(VotingError::GameNotFound)?;

    Ok(Json(game.into()))
}

/// POST /api/games
pub async fn add_game<C, S>(
    State(state): State<VotingAppState<C, S>>,
    Extension(CurrentSession(session_id)): Extension<CurrentSession>,
    body: Result<Json<AddGameRequest>, JsonRejection>,
) -> VotingResult<(StatusCode, Json<ActionResponse>)>
where
    C: GameCatalog + Sync + 'static,
    S: SessionStore + Sync + 'static,
{
    let permit = state.throttle.begin_action(session_id).await?;

    let req = json_body(body, VotingError::InvalidTitle)?;
    let title = req.normalized_title()?;
    state.voting.try_add_game(&title).await?;

    let allowance = state.throttle.complete_action(permit).await?;

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::new("Game added successfully.", allowance)),
    ))
}

/// POST /api/games/{id}/votes
pub async fn vote_for_game<C, S>(
    State(state): State<VotingAppState<C, S>>,
    Extension(CurrentSession(session_id)): Extension<CurrentSession>,
    path: Result<Path<u32>, PathRejection>,
) -> VotingResult<Json<ActionResponse>>
where
    C: GameCatalog + Sync + 'static,
    S: SessionStore + Sync + 'static,
{
    let permit = state.throttle.begin_action(session_id).await?;

    state.voting.try_vote_for_game(game_id(path)?).await?;

    let allowance = state.throttle.complete_action(permit).await?;

    Ok(Json(ActionResponse::new("Vote successfully cast.", allowance)))
}

/// POST /api/games/{id}/owned
pub async fn mark_game_owned<C, S>(
    State(state): State<VotingAppState<C, S>>,
    Extension(CurrentSession(session_id)): Extension<CurrentSession>,
    path: Result<Path<u32>, PathRejection>,
) -> VotingResult<Json<ActionResponse>>
where
    C: GameCatalog + Sync + 'static,
    S: SessionStore + Sync + 'static,
{
    let game = state.voting.try_mark_game_as_owned(game_id(path)?).await?;
    let allowance = state.throttle.allowance(session_id).await?;

    Ok(Json(ActionResponse::new(
        format!("{} marked as owned successfully.", game.title),
        allowance,
    )))
}

/// POST /api/games/clear
pub async fn clear_games<C, S>(
    State(state): State<VotingAppState<C, S>>,
    Extension(CurrentSession(session_id)): Extension<CurrentSession>,
    body: Result<Json<ClearGamesRequest>, JsonRejection>,
) -> VotingResult<Json<ActionResponse>>
where
    C: GameCatalog + Sync + 'static,
    S: SessionStore + Sync + 'static,
{
    let req = json_body(body, VotingError::ClearNotConfirmed)?;
    if !req.is_confirmed() {
        return Err(VotingError::ClearNotConfirmed);
    }

    state.voting.try_clear_all_games().await?;
    tracing::warn!(session_id = %session_id, "Game catalog cleared");

    let allowance = state.throttle.allowance(session_id).await?;

    Ok(Json(ActionResponse::new("Games successfully cleared.", allowance)))
}

/// GET /api/status
pub async fn status<C, S>(
    State(state): State<VotingAppState<C, S>>,
    Extension(CurrentSession(session_id)): Extension<CurrentSession>,
) -> VotingResult<Json<AllowanceResponse>>
where
    C: GameCatalog + Sync + 'static,
    S: SessionStore + Sync + 'static,
{
    let allowance = state.throttle.allowance(session_id).await?;
    Ok(Json(allowance.into()))
}
