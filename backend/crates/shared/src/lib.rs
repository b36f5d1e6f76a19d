//! Shared Kernel
//!
//! Vocabulary every crate of the voting backend agrees on:
//! - The unified [`error::app_error::AppError`] and its [`error::kind::ErrorKind`]
//! - Typed identifier wrappers ([`id::Id`])
//!
//! Nothing here knows about games, votes or sessions beyond their marker types.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
