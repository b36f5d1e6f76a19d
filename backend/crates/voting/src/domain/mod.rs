//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (GameRecord, ActionState)
//! - Domain value objects (GameId, ThrottleConfig, ActionAllowance)
//! - Domain services (allowance evaluation, clocks)
//! - Repository traits (GameCatalog, SessionStore)

pub mod entities;
pub mod repository;
pub mod services;
pub mod value_objects;
