//! Application Layer - Use Cases
//!
//! Orchestrates domain rules over the repositories.

pub mod action_throttle;
pub mod config;
pub mod voting_service;

pub use action_throttle::{ActionPermit, ActionThrottle};
pub use voting_service::VotingService;
