use std::fmt;

use ed25519_dalek::{Signer, SigningKey};

use crate::common::error::ChainClientError;

use super::{
    encoding::{b58check_encode, blake2b_256, operation_hash, EDSIG},
    key_store::decode_secret_key,
};

/// watermark prepended to forged manager operations before hashing
pub const GENERIC_OPERATION_WATERMARK: u8 = 0x03;

/// operation bytes together with their signature
#[derive(Debug, Clone)]
pub struct SignedOperation {
    pub signature: String,
    pub signed_bytes: String,
    pub operation_hash: String,
}

/// signer holding the secret key in memory
pub struct SoftSigner {
    signing_key: SigningKey,
}

impl fmt::Debug for SoftSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoftSigner").finish_non_exhaustive()
    }
}

impl SoftSigner {
    pub fn create_signer(secret_key: &str) -> Result<Self, ChainClientError> {
        Ok(Self {
            signing_key: decode_secret_key(secret_key)?,
        })
    }

    /// signs forged operation bytes with the generic operation watermark
    pub fn sign_operation(&self, forged_bytes: &[u8]) -> SignedOperation {
        let signature = self.sign_raw(GENERIC_OPERATION_WATERMARK, forged_bytes);

        let mut signed = forged_bytes.to_vec();
        signed.extend_from_slice(&signature);

        SignedOperation {
            signature: b58check_encode(EDSIG, &signature),
            signed_bytes: hex::encode(&signed),
            operation_hash: operation_hash(&signed),
        }
    }

    fn sign_raw(&self, watermark: u8, bytes: &[u8]) -> [u8; 64] {
        let mut payload = Vec::with_capacity(bytes.len() + 1);
        payload.push(watermark);
        payload.extend_from_slice(bytes);

        self.signing_key.sign(&blake2b_256(&payload)).to_bytes()
    }
}

/// placeholder signature accepted by simulation endpoints, which do not check it
pub fn dummy_signature() -> String {
    b58check_encode(EDSIG, &[0u8; 64])
}

#[cfg(test)]
mod tests {
    use ed25519_dalek::{Signature, Verifier};

    use super::*;
    use crate::tezos::encoding::{b58check_decode, blake2b_256};

    const SECRET_KEY: &str = "edsk3QoqBuvdamxouPhin7swCvkQNgq4jP5KZPbwWNnwdZpSpJiEbq";

    #[test]
    fn test_signature_verifies_against_watermarked_digest() {
        let signer = SoftSigner::create_signer(SECRET_KEY).unwrap();
        let forged = hex::decode("a1b2c3d4").unwrap();

        let signed = signer.sign_operation(&forged);

        let raw_signature: [u8; 64] = b58check_decode(EDSIG, &signed.signature)
            .unwrap()
            .try_into()
            .unwrap();

        let mut payload = vec![GENERIC_OPERATION_WATERMARK];
        payload.extend_from_slice(&forged);

        signer
            .signing_key
            .verifying_key()
            .verify(&blake2b_256(&payload), &Signature::from_bytes(&raw_signature))
            .unwrap();
    }

    #[test]
    fn test_signed_bytes_append_signature() {
        let signer = SoftSigner::create_signer(SECRET_KEY).unwrap();
        let signed = signer.sign_operation(&[0xab; 10]);

        assert_eq!(signed.signed_bytes.len(), (10 + 64) * 2);
        assert!(signed.signed_bytes.starts_with(&"ab".repeat(10)));
        assert!(signed.operation_hash.starts_with('o'));
    }

    #[test]
    fn test_signing_is_deterministic() {
        let signer = SoftSigner::create_signer(SECRET_KEY).unwrap();
        assert_eq!(
            signer.sign_operation(b"op").signature,
            signer.sign_operation(b"op").signature
        );
    }

    #[test]
    fn test_dummy_signature_is_edsig() {
        assert!(dummy_signature().starts_with("edsig"));
    }
}
