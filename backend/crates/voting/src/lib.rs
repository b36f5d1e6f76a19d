//! Game Voting Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, throttle evaluation, repository traits
//! - `application/` - Voting service, action throttle, configuration
//! - `infra/` - In-memory and remote catalogs, session store
//! - `presentation/` - HTTP handlers
//!
//! ## Rules
//! - Titles are unique (exact, case-sensitive match)
//! - Owned games take no more votes and are marked owned only once
//! - Adding and voting count against a per-session daily allowance;
//!   blackout weekdays make the whole site read-only

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::{CatalogBackend, ConfigError, VotingConfig};
pub use application::{ActionThrottle, VotingService};
pub use domain::services::{Clock, FixedClock, SystemClock};
pub use error::{CatalogError, VotingError, VotingResult};
pub use infra::{MemoryGameCatalog, MemorySessionStore, RemoteGameCatalog, SoapCatalogClient};
pub use presentation::handlers::VotingAppState;
pub use presentation::middleware::SessionCookie;
pub use presentation::router::voting_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{app_error::AppError, kind::ErrorKind};
