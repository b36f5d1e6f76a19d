//! In-Memory Game Catalog

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::domain::entities::GameRecord;
use crate::domain::repository::GameCatalog;
use crate::domain::value_objects::GameId;
use crate::error::{CatalogError, CatalogResult};

#[derive(Debug)]
struct CatalogState {
    games: BTreeMap<GameId, GameRecord>,
    /// `None` once every id has been handed out
    next_id: Option<GameId>,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self {
            games: BTreeMap::new(),
            next_id: Some(GameId::FIRST),
        }
    }
}

/// Process-local catalog; contents are lost on restart
///
/// Records and the id counter share one lock, so an add can never hand out
/// an id twice. Snapshots come back in ascending id order.
#[derive(Debug, Default)]
pub struct MemoryGameCatalog {
    state: RwLock<CatalogState>,
}

impl MemoryGameCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog pre-filled with existing records
    ///
    /// The id sequence continues after the highest seeded id.
    pub fn with_games(games: impl IntoIterator<Item = GameRecord>) -> Self {
        let games: BTreeMap<GameId, GameRecord> =
            games.into_iter().map(|game| (game.id, game)).collect();
        let next_id = games
            .keys()
            .next_back()
            .map_or(Some(GameId::FIRST), |id| id.next());

        Self {
            state: RwLock::new(CatalogState { games, next_id }),
        }
    }

    pub fn len(&self) -> usize {
        self.state.read().games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl GameCatalog for MemoryGameCatalog {
    async fn add(&self, title: &str) -> CatalogResult<()> {
        let mut state = self.state.write();
        let id = state.next_id.ok_or(CatalogError::IdsExhausted)?;
        state.games.insert(id, GameRecord::new(id, title));
        state.next_id = id.next();
        Ok(())
    }

    async fn get_all(&self) -> CatalogResult<Vec<GameRecord>> {
        Ok(self.state.read().games.values().cloned().collect())
    }

    async fn add_vote(&self, id: GameId) -> CatalogResult<()> {
        let mut state = self.state.write();
        let game = state
            .games
            .get_mut(&id)
            .ok_or(CatalogError::UnknownGame(id))?;
        game.vote_count = game.vote_count.saturating_add(1);
        Ok(())
    }

    async fn mark_owned(&self, id: GameId) -> CatalogResult<()> {
        let mut state = self.state.write();
        let game = state
            .games
            .get_mut(&id)
            .ok_or(CatalogError::UnknownGame(id))?;
        game.owned = true;
        Ok(())
    }

    async fn clear_all(&self) -> CatalogResult<()> {
        *self.state.write() = CatalogState::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_add_assigns_sequential_ids() {
        let catalog = MemoryGameCatalog::new();
        catalog.add("Halo").await.unwrap();
        catalog.add("Fable").await.unwrap();

        let games = catalog.get_all().await.unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0], GameRecord::new(GameId::new(1), "Halo"));
        assert_eq!(games[1], GameRecord::new(GameId::new(2), "Fable"));
    }

    #[tokio::test]
    async fn test_add_does_not_check_uniqueness() {
        let catalog = MemoryGameCatalog::new();
        catalog.add("Halo").await.unwrap();
        catalog.add("Halo").await.unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[tokio::test]
    async fn test_vote_and_mark_owned() {
        let catalog = MemoryGameCatalog::new();
        catalog.add("Halo").await.unwrap();

        catalog.add_vote(GameId::new(1)).await.unwrap();
        catalog.add_vote(GameId::new(1)).await.unwrap();
        catalog.mark_owned(GameId::new(1)).await.unwrap();

        let game = &catalog.get_all().await.unwrap()[0];
        assert_eq!(game.vote_count, 3);
        assert!(game.owned);
    }

    #[tokio::test]
    async fn test_unknown_id_is_an_error() {
        let catalog = MemoryGameCatalog::new();
        assert!(matches!(
            catalog.add_vote(GameId::new(7)).await,
            Err(CatalogError::UnknownGame(id)) if id == GameId::new(7)
        ));
        assert!(matches!(
            catalog.mark_owned(GameId::new(7)).await,
            Err(CatalogError::UnknownGame(_))
        ));
    }

    #[tokio::test]
    async fn test_clear_resets_id_sequence() {
        let catalog = MemoryGameCatalog::new();
        catalog.add("Halo").await.unwrap();
        catalog.add("Fable").await.unwrap();

        catalog.clear_all().await.unwrap();
        assert!(catalog.is_empty());

        catalog.add("Gears").await.unwrap();
        let games = catalog.get_all().await.unwrap();
        assert_eq!(games[0].id, GameId::FIRST);
    }

    #[tokio::test]
    async fn test_seeded_catalog_continues_after_highest_id() {
        let catalog = MemoryGameCatalog::with_games([
            GameRecord::new(GameId::new(3), "Halo"),
            GameRecord::new(GameId::new(8), "Fable"),
        ]);
        catalog.add("Gears").await.unwrap();

        let ids: Vec<u32> = catalog
            .get_all()
            .await
            .unwrap()
            .iter()
            .map(|g| g.id.value())
            .collect();
        assert_eq!(ids, vec![3, 8, 9]);
    }

    #[tokio::test]
    async fn test_exhausted_id_sequence_refuses_adds() {
        let catalog = MemoryGameCatalog::with_games([GameRecord::new(GameId::new(u32::MAX), "Halo")]);

        assert!(matches!(
            catalog.add("Fable").await,
            Err(CatalogError::IdsExhausted)
        ));
        assert_eq!(catalog.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_get_distinct_ids() {
        let catalog = Arc::new(MemoryGameCatalog::new());

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let catalog = catalog.clone();
                tokio::spawn(async move { catalog.add(&format!("Game {i}")).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let games = catalog.get_all().await.unwrap();
        assert_eq!(games.len(), 50);
        let ids: Vec<u32> = games.iter().map(|g| g.id.value()).collect();
        assert_eq!(ids, (1..=50).collect::<Vec<_>>());
    }
}
