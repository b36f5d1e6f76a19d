//! Remote Game Catalog
//!
//! Adapter from the [`GameCatalog`] contract to the hosted voting service.
//! The service authenticates every call with a static API key and reports
//! most outcomes as a bare boolean.

use crate::domain::entities::GameRecord;
use crate::domain::repository::GameCatalog;
use crate::domain::value_objects::GameId;
use crate::error::{CatalogError, CatalogResult};

/// Status string the service uses for games that have been bought
pub const OWNED_STATUS: &str = "gotit";

/// Game as published by the remote service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteGame {
    pub id: i64,
    pub title: String,
    pub votes: i64,
    pub status: String,
}

impl RemoteGame {
    fn into_record(self) -> CatalogResult<GameRecord> {
        let id = u32::try_from(self.id)
            .map_err(|_| CatalogError::Protocol(format!("game id {} out of range", self.id)))?;
        let vote_count = u32::try_from(self.votes).map_err(|_| {
            CatalogError::Protocol(format!("vote count {} out of range", self.votes))
        })?;

        Ok(GameRecord {
            id: GameId::new(id),
            title: self.title,
            vote_count,
            owned: self.status == OWNED_STATUS,
        })
    }
}

/// Operations published by the remote voting service
#[trait_variant::make(CatalogServiceClient: Send)]
pub trait LocalCatalogServiceClient {
    async fn add_game(&self, title: &str, api_key: &str) -> CatalogResult<bool>;

    async fn get_games(&self, api_key: &str) -> CatalogResult<Vec<RemoteGame>>;

    async fn add_vote(&self, id: GameId, api_key: &str) -> CatalogResult<bool>;

    async fn clear_games(&self, api_key: &str) -> CatalogResult<bool>;

    async fn set_got_it(&self, id: GameId, api_key: &str) -> CatalogResult<bool>;

    async fn check_key(&self, api_key: &str) -> CatalogResult<bool>;
}

/// Catalog backed by the remote service
///
/// No local locking: the service is the source of truth and its semantics
/// are best effort.
pub struct RemoteGameCatalog<T>
where
    T: CatalogServiceClient,
{
    client: T,
    api_key: String,
}

impl<T> RemoteGameCatalog<T>
where
    T: CatalogServiceClient + Sync,
{
    pub fn new(client: T, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }

    /// Ask the service whether the configured key is accepted
    pub async fn verify_key(&self) -> CatalogResult<()> {
        if self.client.check_key(&self.api_key).await? {
            Ok(())
        } else {
            Err(CatalogError::Rejected("CheckKey"))
        }
    }

    pub fn client(&self) -> &T {
        &self.client
    }
}

fn accepted(operation: &'static str, accepted: bool) -> CatalogResult<()> {
    if accepted {
        Ok(())
    } else {
        tracing::warn!(operation, "Remote catalog declined the operation");
        Err(CatalogError::Rejected(operation))
    }
}

impl<T> GameCatalog for RemoteGameCatalog<T>
where
    T: CatalogServiceClient + Sync,
{
    async fn add(&self, title: &str) -> CatalogResult<()> {
        accepted("AddGame", self.client.add_game(title, &self.api_key).await?)
    }

    async fn get_all(&self) -> CatalogResult<Vec<GameRecord>> {
        self.client
            .get_games(&self.api_key)
            .await?
            .into_iter()
            .map(RemoteGame::into_record)
            .collect()
    }

    async fn add_vote(&self, id: GameId) -> CatalogResult<()> {
        accepted("AddVote", self.client.add_vote(id, &self.api_key).await?)
    }

    async fn mark_owned(&self, id: GameId) -> CatalogResult<()> {
        accepted("SetGotIt", self.client.set_got_it(id, &self.api_key).await?)
    }

    async fn clear_all(&self) -> CatalogResult<()> {
        accepted("ClearGames", self.client.clear_games(&self.api_key).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Scripted service that records every call
    #[derive(Default)]
    struct RecordingClient {
        calls: Mutex<Vec<String>>,
        games: Vec<RemoteGame>,
        answer: bool,
        fail: bool,
    }

    impl RecordingClient {
        fn answering(answer: bool) -> Self {
            Self {
                answer,
                ..Default::default()
            }
        }

        fn reply(&self, call: String) -> CatalogResult<bool> {
            self.calls.lock().push(call);
            if self.fail {
                Err(CatalogError::Status(500))
            } else {
                Ok(self.answer)
            }
        }
    }

    impl CatalogServiceClient for RecordingClient {
        async fn add_game(&self, title: &str, api_key: &str) -> CatalogResult<bool> {
            self.reply(format!("AddGame({title},{api_key})"))
        }

        async fn get_games(&self, api_key: &str) -> CatalogResult<Vec<RemoteGame>> {
            self.reply(format!("GetGames({api_key})"))?;
            Ok(self.games.clone())
        }

        async fn add_vote(&self, id: GameId, api_key: &str) -> CatalogResult<bool> {
            self.reply(format!("AddVote({id},{api_key})"))
        }

        async fn clear_games(&self, api_key: &str) -> CatalogResult<bool> {
            self.reply(format!("ClearGames({api_key})"))
        }

        async fn set_got_it(&self, id: GameId, api_key: &str) -> CatalogResult<bool> {
            self.reply(format!("SetGotIt({id},{api_key})"))
        }

        async fn check_key(&self, api_key: &str) -> CatalogResult<bool> {
            self.reply(format!("CheckKey({api_key})"))
        }
    }

    fn remote_game(id: i64, title: &str, votes: i64, status: &str) -> RemoteGame {
        RemoteGame {
            id,
            title: title.to_string(),
            votes,
            status: status.to_string(),
        }
    }

    #[tokio::test]
    async fn test_calls_forward_api_key() {
        let catalog = RemoteGameCatalog::new(RecordingClient::answering(true), "k3y");

        catalog.add("Halo").await.unwrap();
        catalog.add_vote(GameId::new(2)).await.unwrap();
        catalog.mark_owned(GameId::new(3)).await.unwrap();
        catalog.clear_all().await.unwrap();

        assert_eq!(
            *catalog.client().calls.lock(),
            vec![
                "AddGame(Halo,k3y)",
                "AddVote(2,k3y)",
                "SetGotIt(3,k3y)",
                "ClearGames(k3y)",
            ]
        );
    }

    #[tokio::test]
    async fn test_false_answer_is_rejection() {
        let catalog = RemoteGameCatalog::new(RecordingClient::answering(false), "k3y");

        let err = catalog.add_vote(GameId::new(1)).await.unwrap_err();
        assert!(matches!(err, CatalogError::Rejected("AddVote")));
        assert!(!err.is_backend_failure());
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let client = RecordingClient {
            fail: true,
            ..Default::default()
        };
        let catalog = RemoteGameCatalog::new(client, "k3y");

        let err = catalog.clear_all().await.unwrap_err();
        assert!(matches!(err, CatalogError::Status(500)));
        assert!(err.is_backend_failure());
    }

    #[tokio::test]
    async fn test_get_all_maps_status_to_owned() {
        let client = RecordingClient {
            games: vec![
                remote_game(1, "Halo", 4, "gotit"),
                remote_game(2, "Fable", 1, "wantit"),
                remote_game(3, "Gears", 2, "GOTIT"),
            ],
            ..Default::default()
        };
        let catalog = RemoteGameCatalog::new(client, "k3y");

        let games = catalog.get_all().await.unwrap();
        assert_eq!(games.len(), 3);
        assert!(games[0].owned);
        assert_eq!(games[0].vote_count, 4);
        assert!(!games[1].owned);
        assert!(!games[2].owned, "status comparison is exact");
    }

    #[tokio::test]
    async fn test_negative_id_is_protocol_error() {
        let client = RecordingClient {
            games: vec![remote_game(-1, "Broken", 1, "wantit")],
            ..Default::default()
        };
        let catalog = RemoteGameCatalog::new(client, "k3y");

        assert!(matches!(
            catalog.get_all().await,
            Err(CatalogError::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn test_verify_key() {
        let valid = RemoteGameCatalog::new(RecordingClient::answering(true), "good");
        assert!(valid.verify_key().await.is_ok());

        let invalid = RemoteGameCatalog::new(RecordingClient::answering(false), "bad");
        assert!(matches!(
            invalid.verify_key().await,
            Err(CatalogError::Rejected("CheckKey"))
        ));
    }
}
