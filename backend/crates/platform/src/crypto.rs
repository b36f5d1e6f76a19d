//! Cryptographic Utilities

use base64::{Engine, engine::general_purpose};
use hmac::{Hmac, Mac};
use rand::{RngCore, rngs::OsRng};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Random 32-byte key, e.g. a development session secret
pub fn random_key() -> [u8; 32] {
    let mut key = [0u8; 32];
    OsRng.fill_bytes(&mut key);
    key
}

/// Encode bytes as standard base64 (used for configured secrets)
pub fn to_base64(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

pub fn from_base64(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(s)
}

/// Encode bytes as URL-safe base64 without padding (safe inside cookies)
pub fn to_base64_url(bytes: &[u8]) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

pub fn from_base64_url(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::URL_SAFE_NO_PAD.decode(s)
}

fn keyed_mac(key: &[u8]) -> HmacSha256 {
    HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length")
}

/// Compute HMAC-SHA256
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    let mut mac = keyed_mac(key);
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Check an HMAC-SHA256 tag in constant time
pub fn verify_hmac_sha256(key: &[u8], data: &[u8], tag: &[u8]) -> bool {
    let mut mac = keyed_mac(key);
    mac.update(data);
    mac.verify_slice(tag).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hmac_rfc4231_case_2() {
        let mac = hmac_sha256(b"Jefe", b"what do ya want for nothing?");
        let expected =
            hex::decode("5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843")
                .unwrap();
        assert_eq!(mac.to_vec(), expected);
    }

    #[test]
    fn test_verify_hmac() {
        let key = [7u8; 32];
        let tag = hmac_sha256(&key, b"session");
        assert!(verify_hmac_sha256(&key, b"session", &tag));
        assert!(!verify_hmac_sha256(&key, b"sessions", &tag));
        assert!(!verify_hmac_sha256(&[8u8; 32], b"session", &tag));
        assert!(!verify_hmac_sha256(&key, b"session", &tag[..31]));
    }

    #[test]
    fn test_random_key() {
        let key = random_key();
        assert!(key.iter().any(|&b| b != 0));
        assert_ne!(key, random_key());
    }

    #[test]
    fn test_base64_variants() {
        let data = [0xfbu8, 0xff, 0xfe];
        assert_eq!(from_base64(&to_base64(&data)).unwrap(), data);

        let url = to_base64_url(&data);
        assert!(!url.contains('+') && !url.contains('/') && !url.contains('='));
        assert_eq!(from_base64_url(&url).unwrap(), data);
    }
}
