//! Signed Session Tokens
//!
//! A token is `base64url(id || HMAC-SHA256(secret, id))`. The server keeps
//! no token table: any token whose tag verifies names a valid session id.

use crate::crypto::{from_base64_url, hmac_sha256, to_base64_url, verify_hmac_sha256};

const ID_LEN: usize = 16;
const TAG_LEN: usize = 32;

/// Sign a 16-byte session id
pub fn sign_session_token(id: &[u8; ID_LEN], secret: &[u8; 32]) -> String {
    let tag = hmac_sha256(secret, id);
    let mut token = Vec::with_capacity(ID_LEN + TAG_LEN);
    token.extend_from_slice(id);
    token.extend_from_slice(&tag);
    to_base64_url(&token)
}

/// Recover the session id from a token, or `None` if it was forged or mangled
pub fn verify_session_token(token: &str, secret: &[u8; 32]) -> Option<[u8; ID_LEN]> {
    let raw = from_base64_url(token).ok()?;
    if raw.len() != ID_LEN + TAG_LEN {
        return None;
    }

    let (id, tag) = raw.split_at(ID_LEN);
    if !verify_hmac_sha256(secret, id, tag) {
        return None;
    }

    id.try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: [u8; 32] = [3u8; 32];

    #[test]
    fn test_sign_then_verify() {
        let id = [9u8; 16];
        let token = sign_session_token(&id, &SECRET);
        assert_eq!(verify_session_token(&token, &SECRET), Some(id));
    }

    #[test]
    fn test_rejects_other_secret() {
        let token = sign_session_token(&[1u8; 16], &SECRET);
        assert_eq!(verify_session_token(&token, &[4u8; 32]), None);
    }

    #[test]
    fn test_rejects_tampered_id() {
        let token = sign_session_token(&[1u8; 16], &SECRET);
        let mut raw = from_base64_url(&token).unwrap();
        raw[0] ^= 0xff;
        assert_eq!(verify_session_token(&to_base64_url(&raw), &SECRET), None);
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(verify_session_token("", &SECRET), None);
        assert_eq!(verify_session_token("not base64!", &SECRET), None);
        assert_eq!(verify_session_token(&to_base64_url(&[0u8; 20]), &SECRET), None);
    }
}
