use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Number of random bytes in an issued token (64 hex characters).
pub const TOKEN_BYTES: usize = 32;

/// The operating system's secure random source could not be read.
#[derive(Debug, Error)]
#[error("secure random source unavailable: {0}")]
pub struct EntropyError(#[from] rand::Error);

/// SHA-256 of `input`, lowercase hex encoded.
pub fn digest(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Generates a fresh bearer token from the OS random source.
pub fn new_token() -> Result<String, EntropyError> {
    let mut bytes = [0_u8; TOKEN_BYTES];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_known_value() {
        assert_eq!(
            digest("randomforest"),
            "ea424017c57b0d0b2f262edd821dca2dc3cfcbb47e296a9007415af86bbc6ac1"
        );
        assert_eq!(
            digest(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_digest_is_deterministic() {
        let first = digest("testpassword");
        assert_eq!(first, digest("testpassword"));
        assert_eq!(first.len(), 64);
        assert_ne!(first, digest("testpassword "));
    }

    #[test]
    fn test_new_token_format() {
        let token = new_token().unwrap();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, new_token().unwrap());
    }
}
