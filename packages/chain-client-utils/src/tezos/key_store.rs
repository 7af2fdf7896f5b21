use std::fmt;

use ed25519_dalek::SigningKey;

use crate::common::error::ChainClientError;

use super::encoding::{b58check_decode, b58check_encode, blake2b_160, EDPK, EDSK, EDSK_SEED, TZ1};

const SEED_KEY_LENGTH: usize = 54;
const EXPANDED_KEY_LENGTH: usize = 98;

/// public/secret key material of an ed25519 (`tz1`) account
#[derive(Clone, PartialEq, Eq)]
pub struct KeyStore {
    pub public_key: String,
    pub secret_key: String,
    pub public_key_hash: String,
}

impl fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyStore")
            .field("public_key", &self.public_key)
            .field("public_key_hash", &self.public_key_hash)
            .finish_non_exhaustive()
    }
}

/// Restores the key store of an account from an `edsk` secret key, either
/// the 32 byte seed form or the 64 byte expanded form.
pub fn restore_identity_from_secret_key(secret_key: &str) -> Result<KeyStore, ChainClientError> {
    let signing_key = decode_secret_key(secret_key)?;
    let public_key = signing_key.verifying_key().to_bytes();

    Ok(KeyStore {
        public_key: b58check_encode(EDPK, &public_key),
        secret_key: b58check_encode(EDSK, &signing_key.to_keypair_bytes()),
        public_key_hash: public_key_hash(&public_key),
    })
}

/// `tz1` address of a raw ed25519 public key
pub fn public_key_hash(public_key: &[u8]) -> String {
    b58check_encode(TZ1, &blake2b_160(public_key))
}

pub(crate) fn decode_secret_key(secret_key: &str) -> Result<SigningKey, ChainClientError> {
    let secret_key = secret_key.trim();

    if !secret_key.starts_with("edsk") {
        return Err(ChainClientError::KeyError(
            "only edsk secret keys are supported".to_string(),
        ));
    }

    match secret_key.len() {
        SEED_KEY_LENGTH => {
            let seed: [u8; 32] = b58check_decode(EDSK_SEED, secret_key)?
                .try_into()
                .map_err(|_| ChainClientError::KeyError("invalid seed length".to_string()))?;

            Ok(SigningKey::from_bytes(&seed))
        }
        EXPANDED_KEY_LENGTH => {
            let keypair: [u8; 64] = b58check_decode(EDSK, secret_key)?
                .try_into()
                .map_err(|_| ChainClientError::KeyError("invalid secret key length".to_string()))?;

            // also checks that the embedded public key belongs to the seed
            Ok(SigningKey::from_keypair_bytes(&keypair)?)
        }
        length => Err(ChainClientError::KeyError(format!(
            "unexpected secret key length {length}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // flextesa's "alice" sandbox account
    const ALICE_SECRET_KEY: &str = "edsk3QoqBuvdamxouPhin7swCvkQNgq4jP5KZPbwWNnwdZpSpJiEbq";
    const ALICE_PUBLIC_KEY: &str = "edpkvGfYw3LyB1UcCahKQk4rF2tvbMUk8GFiTuMjL75uGXrpvKXhjn";
    const ALICE_ADDRESS: &str = "tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb";

    #[test]
    fn test_restore_from_seed() {
        let key_store = restore_identity_from_secret_key(ALICE_SECRET_KEY).unwrap();

        assert_eq!(key_store.public_key, ALICE_PUBLIC_KEY);
        assert_eq!(key_store.public_key_hash, ALICE_ADDRESS);
        assert!(key_store.secret_key.starts_with("edsk"));
        assert_eq!(key_store.secret_key.len(), EXPANDED_KEY_LENGTH);
    }

    #[test]
    fn test_restore_from_expanded_key() {
        let from_seed = restore_identity_from_secret_key(ALICE_SECRET_KEY).unwrap();
        let from_expanded = restore_identity_from_secret_key(&from_seed.secret_key).unwrap();

        assert_eq!(from_seed, from_expanded);
    }

    #[test]
    fn test_rejects_foreign_keys() {
        assert!(matches!(
            restore_identity_from_secret_key("spsk1abc"),
            Err(ChainClientError::KeyError(_))
        ));
        assert!(matches!(
            restore_identity_from_secret_key("edsk123"),
            Err(ChainClientError::KeyError(_))
        ));
    }

    #[test]
    fn test_debug_hides_secret() {
        let key_store = restore_identity_from_secret_key(ALICE_SECRET_KEY).unwrap();
        let debug = format!("{key_store:?}");

        assert!(debug.contains(ALICE_ADDRESS));
        assert!(!debug.contains(&key_store.secret_key));
    }
}
