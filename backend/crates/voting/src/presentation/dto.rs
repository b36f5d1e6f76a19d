//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::domain::entities::GameRecord;
use crate::domain::value_objects::ActionAllowance;
use crate::error::VotingError;

pub const MAX_TITLE_CHARS: usize = 255;

/// Word a visitor must type to clear the catalog
pub const CLEAR_CONFIRMATION: &str = "confirm";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    pub id: u32,
    pub title: String,
    pub votes: u32,
    pub owned: bool,
}

impl From<GameRecord> for GameResponse {
    fn from(game: GameRecord) -> Self {
        Self {
            id: game.id.value(),
            title: game.title,
            votes: game.vote_count,
            owned: game.owned,
        }
    }
}

/// Response for GET /api/games
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GamesResponse {
    pub owned: Vec<GameResponse>,
    pub wanted: Vec<GameResponse>,
    pub allowance: AllowanceResponse,
}

impl GamesResponse {
    /// Split into owned and wanted games, each most-voted first
    pub fn from_games(games: Vec<GameRecord>, allowance: ActionAllowance) -> Self {
        let (mut owned, mut wanted): (Vec<_>, Vec<_>) =
            games.into_iter().partition(|game| game.owned);
        owned.sort_by(|a, b| b.vote_count.cmp(&a.vote_count));
        wanted.sort_by(|a, b| b.vote_count.cmp(&a.vote_count));

        Self {
            owned: owned.into_iter().map(GameResponse::from).collect(),
            wanted: wanted.into_iter().map(GameResponse::from).collect(),
            allowance: allowance.into(),
        }
    }
}

/// Response for GET /api/status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowanceResponse {
    pub actions_left: u32,
    pub read_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<ActionAllowance> for AllowanceResponse {
    fn from(allowance: ActionAllowance) -> Self {
        Self {
            actions_left: allowance.remaining,
            read_only: !allowance.is_permitted(),
            reason: allowance.denial.map(|denial| denial.message().to_string()),
        }
    }
}

/// Flash message for a completed action, plus what is left for today
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub message: String,
    pub allowance: AllowanceResponse,
}

impl ActionResponse {
    pub fn new(message: impl Into<String>, allowance: ActionAllowance) -> Self {
        Self {
            message: message.into(),
            allowance: allowance.into(),
        }
    }
}

/// Request for POST /api/games
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddGameRequest {
    #[serde(default)]
    pub title: Option<String>,
}

impl AddGameRequest {
    /// Trimmed title, 1 to 255 characters
    pub fn normalized_title(&self) -> Result<String, VotingError> {
        let title = self.title.as_deref().map(str::trim).unwrap_or_default();
        let chars = title.chars().count();
        if chars == 0 || chars > MAX_TITLE_CHARS {
            return Err(VotingError::InvalidTitle);
        }
        Ok(title.to_string())
    }
}

/// Request for POST /api/games/clear
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearGamesRequest {
    #[serde(default)]
    pub confirm: Option<String>,
}

impl ClearGamesRequest {
    pub fn is_confirmed(&self) -> bool {
        self.confirm.as_deref().map(str::trim) == Some(CLEAR_CONFIRMATION)
    }
}
