//! Repository Traits
//!
//! Interfaces for game and session storage. Implementations live in the
//! infrastructure layer.

use std::time::Duration;

use chrono::NaiveDate;

use crate::domain::entities::{ActionState, GameRecord};
use crate::domain::value_objects::{GameId, SessionId};
use crate::error::{CatalogResult, VotingResult};

/// Game catalog: a key-value store of game records
///
/// The catalog performs no uniqueness or ownership checks; those belong to
/// the voting service, because a remote backend cannot enforce them
/// atomically anyway.
#[trait_variant::make(GameCatalog: Send)]
pub trait LocalGameCatalog {
    /// Store a new record (fresh id, one vote, not owned)
    async fn add(&self, title: &str) -> CatalogResult<()>;

    /// Snapshot of every record; order is backend-defined
    async fn get_all(&self) -> CatalogResult<Vec<GameRecord>>;

    /// Increment the vote count of an existing record
    async fn add_vote(&self, id: GameId) -> CatalogResult<()>;

    /// Flag an existing record as owned
    async fn mark_owned(&self, id: GameId) -> CatalogResult<()>;

    /// Remove every record and restart the id sequence at 1
    async fn clear_all(&self) -> CatalogResult<()>;
}

/// Session-scoped action state
#[trait_variant::make(SessionStore: Send)]
pub trait LocalSessionStore {
    /// Current state of a session, creating an empty one on first access
    async fn get_or_create(&self, session_id: SessionId) -> VotingResult<ActionState>;

    /// Atomically apply [`ActionState::record`] and return the new state
    async fn record_action(
        &self,
        session_id: SessionId,
        today: NaiveDate,
    ) -> VotingResult<ActionState>;

    /// Drop sessions not seen for at least `idle_ttl`; returns how many
    async fn cleanup_idle(&self, idle_ttl: Duration) -> VotingResult<u64>;
}
