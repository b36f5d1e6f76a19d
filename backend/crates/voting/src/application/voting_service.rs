//! Voting Service
//!
//! Business rules the catalog cannot guarantee on its own: unique titles,
//! no votes for owned games, ownership marked at most once.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::entities::GameRecord;
use crate::domain::repository::GameCatalog;
use crate::domain::value_objects::GameId;
use crate::error::{CatalogError, VotingError, VotingResult};

/// Invariant-enforcing layer over a [`GameCatalog`]
///
/// The catalog offers no transactions, so every check-then-act sequence runs
/// under one service-wide lock. Reads skip the lock.
pub struct VotingService<C>
where
    C: GameCatalog,
{
    catalog: Arc<C>,
    write_lock: Mutex<()>,
}

impl<C> VotingService<C>
where
    C: GameCatalog,
{
    pub fn new(catalog: Arc<C>) -> Self {
        Self {
            catalog,
            write_lock: Mutex::new(()),
        }
    }

    /// Add a game unless the title is empty or already taken (exact match)
    ///
    /// Every call scans the whole catalog: the remote service has no search.
    pub async fn try_add_game(&self, title: &str) -> VotingResult<()> {
        if title.is_empty() {
            return Err(VotingError::InvalidTitle);
        }

        let _guard = self.write_lock.lock().await;

        let games = self.catalog.get_all().await?;
        if games.iter().any(|game| game.title == title) {
            return Err(VotingError::DuplicateTitle);
        }

        self.catalog
            .add(title)
            .await
            .map_err(declined_as(VotingError::DuplicateTitle))?;
        tracing::info!(title = %title, "Game added");

        Ok(())
    }

    /// Mark a game as owned; returns the updated record
    pub async fn try_mark_game_as_owned(&self, id: GameId) -> VotingResult<GameRecord> {
        let _guard = self.write_lock.lock().await;

        let game = self.find(id).await?.ok_or(VotingError::GameNotFound)?;
        if game.owned {
            return Err(VotingError::AlreadyOwned);
        }

        self.catalog
            .mark_owned(id)
            .await
            .map_err(declined_as(VotingError::AlreadyOwned))?;
        tracing::info!(game_id = %id, title = %game.title, "Game marked as owned");

        Ok(GameRecord {
            owned: true,
            ..game
        })
    }

    /// Cast one vote for a game that is not owned yet
    pub async fn try_vote_for_game(&self, id: GameId) -> VotingResult<()> {
        let _guard = self.write_lock.lock().await;

        let game = self.find(id).await?.ok_or(VotingError::GameNotFound)?;
        if game.owned {
            return Err(VotingError::GameOwned);
        }

        self.catalog
            .add_vote(id)
            .await
            .map_err(declined_as(VotingError::GameOwned))?;
        tracing::info!(game_id = %id, votes = game.vote_count + 1, "Vote cast");

        Ok(())
    }

    pub async fn try_clear_all_games(&self) -> VotingResult<()> {
        self.catalog
            .clear_all()
            .await
            .map_err(VotingError::ClearFailed)?;
        tracing::info!("All games cleared");
        Ok(())
    }

    pub async fn add_game(&self, title: &str) -> bool {
        settle("add_game", self.try_add_game(title).await)
    }

    pub async fn mark_game_as_owned(&self, id: GameId) -> bool {
        settle("mark_game_as_owned", self.try_mark_game_as_owned(id).await)
    }

    pub async fn vote_for_game(&self, id: GameId) -> bool {
        settle("vote_for_game", self.try_vote_for_game(id).await)
    }

    pub async fn clear_all_games(&self) -> bool {
        settle("clear_all_games", self.try_clear_all_games().await)
    }

    /// Linear scan for a game; `None` when no record has this id
    pub async fn get_game_by_id(&self, id: GameId) -> VotingResult<Option<GameRecord>> {
        self.find(id).await
    }

    pub async fn get_all_games(&self) -> VotingResult<Vec<GameRecord>> {
        Ok(self.catalog.get_all().await?)
    }

    pub async fn get_games_by_ownership(&self, owned: bool) -> VotingResult<Vec<GameRecord>> {
        let mut games = self.get_all_games().await?;
        games.retain(|game| game.owned == owned);
        Ok(games)
    }

    async fn find(&self, id: GameId) -> VotingResult<Option<GameRecord>> {
        let games = self.catalog.get_all().await?;
        Ok(games.into_iter().find(|game| game.id == id))
    }
}

/// A backend declining the change reads as the matching business rejection
fn declined_as(rejection: VotingError) -> impl FnOnce(CatalogError) -> VotingError {
    move |e| match e {
        CatalogError::Rejected(_) => rejection,
        other => VotingError::Catalog(other),
    }
}

/// Collapse a typed outcome into the flat boolean contract
fn settle<T>(operation: &'static str, result: VotingResult<T>) -> bool {
    match result {
        Ok(_) => true,
        Err(e) if e.is_backend_failure() => {
            tracing::error!(operation, error = %e, "Voting operation failed on the backend");
            false
        }
        Err(e) => {
            tracing::debug!(operation, error = %e, "Voting operation rejected");
            false
        }
    }
}
