//! Presentation Layer - HTTP handlers and routing

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;
