//! Platform Crate - Technical Infrastructure
//!
//! Helpers with no knowledge of the voting domain:
//! - Random bytes, HMAC-SHA256 and base64 ([`crypto`])
//! - Signed, opaque session tokens ([`session_token`])
//! - Cookie building and extraction ([`cookie`])

pub mod cookie;
pub mod crypto;
pub mod session_token;
