//! Voting Error Types
//!
//! [`CatalogError`] describes what went wrong inside a catalog backend;
//! [`VotingError`] is what the service and the HTTP layer deal in. Both
//! integrate with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::value_objects::GameId;

pub type CatalogResult<T> = Result<T, CatalogError>;

pub type VotingResult<T> = Result<T, VotingError>;

/// Failures reported by a catalog backend
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The backend answered but declined the operation
    #[error("Catalog declined the {0} operation")]
    Rejected(&'static str),

    /// No record with this id
    #[error("Game {0} does not exist")]
    UnknownGame(GameId),

    /// Every game id has been handed out
    #[error("Catalog has run out of game ids")]
    IdsExhausted,

    /// Connection, TLS or timeout failure talking to the remote service
    #[error("Catalog transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// SOAP fault returned by the remote service
    #[error("Catalog service fault: {0}")]
    Fault(String),

    /// Non-success HTTP status without a SOAP fault
    #[error("Catalog service answered HTTP {0}")]
    Status(u16),

    /// Response could not be understood
    #[error("Malformed catalog response: {0}")]
    Protocol(String),
}

impl CatalogError {
    /// True when the backend could not be used at all, as opposed to a
    /// well-formed "no" for this particular request
    pub fn is_backend_failure(&self) -> bool {
        !matches!(self, CatalogError::Rejected(_) | CatalogError::UnknownGame(_))
    }
}

/// Voting and throttling failures
///
/// Display strings double as the visitor-facing messages, except for
/// catalog failures whose details stay in the logs.
#[derive(Debug, Error)]
pub enum VotingError {
    /// Empty or badly formatted title
    #[error("Title improperly formatted.")]
    InvalidTitle,

    /// A game with exactly this title already exists
    #[error("Title already exists.")]
    DuplicateTitle,

    #[error("Game not found.")]
    GameNotFound,

    /// Votes are only taken for games not owned yet
    #[error("Cannot vote for a game that's already owned.")]
    GameOwned,

    #[error("Cannot mark a game as owned more than once.")]
    AlreadyOwned,

    /// Clearing requires the literal confirmation word
    #[error("Type 'confirm' to clear all games.")]
    ClearNotConfirmed,

    #[error("Clearing games failed. Please try again later.")]
    ClearFailed(#[source] CatalogError),

    /// Today is a blackout weekday
    #[error("Site is in read-only mode today.")]
    BlackoutDay,

    /// The session used up today's actions
    #[error("Cannot access requested action while in read-only mode.")]
    DailyLimitReached,

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

impl VotingError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            VotingError::InvalidTitle | VotingError::ClearNotConfirmed => ErrorKind::BadRequest,
            VotingError::GameNotFound | VotingError::Catalog(CatalogError::UnknownGame(_)) => {
                ErrorKind::NotFound
            }
            VotingError::DuplicateTitle
            | VotingError::GameOwned
            | VotingError::AlreadyOwned
            | VotingError::Catalog(CatalogError::Rejected(_)) => ErrorKind::Conflict,
            VotingError::BlackoutDay => ErrorKind::Forbidden,
            VotingError::DailyLimitReached => ErrorKind::TooManyRequests,
            VotingError::ClearFailed(_) | VotingError::Catalog(_) => ErrorKind::ServiceUnavailable,
        }
    }

    /// Distinguishes "the backend is unusable" from business-rule rejections
    pub fn is_backend_failure(&self) -> bool {
        match self {
            VotingError::Catalog(e) | VotingError::ClearFailed(e) => e.is_backend_failure(),
            _ => false,
        }
    }

    pub fn to_app_error(&self) -> AppError {
        match self {
            VotingError::Catalog(CatalogError::UnknownGame(_)) => {
                AppError::not_found(VotingError::GameNotFound.to_string())
            }
            VotingError::Catalog(CatalogError::Rejected(_)) => {
                AppError::conflict("The game catalog declined the request.")
            }
            VotingError::Catalog(_) => AppError::new(
                self.kind(),
                "The game catalog is unavailable. Please try again later.",
            ),
            VotingError::DailyLimitReached => AppError::new(self.kind(), self.to_string())
                .with_action("Come back tomorrow to vote or add more games."),
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    fn log(&self) {
        match self {
            VotingError::Catalog(e) | VotingError::ClearFailed(e) if e.is_backend_failure() => {
                tracing::error!(error = %e, "Catalog backend failure");
            }
            VotingError::BlackoutDay | VotingError::DailyLimitReached => {
                tracing::warn!(error = %self, "Action denied by throttle");
            }
            _ => {
                tracing::debug!(error = %self, "Voting request rejected");
            }
        }
    }
}

impl From<VotingError> for AppError {
    fn from(err: VotingError) -> Self {
        let app_error = err.to_app_error();
        match err {
            VotingError::Catalog(e) | VotingError::ClearFailed(e) => app_error.with_source(e),
            _ => app_error,
        }
    }
}

impl IntoResponse for VotingError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}
