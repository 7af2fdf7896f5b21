use blake2::{
    digest::consts::{U20, U32},
    Blake2b, Digest,
};

use crate::common::error::ChainClientError;

// base58check prefixes
pub const TZ1: &[u8] = &[6, 161, 159];
pub const KT1: &[u8] = &[2, 90, 121];
pub const EDPK: &[u8] = &[13, 15, 37, 217];
pub const EDSK_SEED: &[u8] = &[13, 15, 58, 7];
pub const EDSK: &[u8] = &[43, 246, 78, 7];
pub const EDSIG: &[u8] = &[9, 245, 205, 134, 18];
pub const BLOCK_HASH: &[u8] = &[1, 52];
pub const OPERATION_HASH: &[u8] = &[5, 116];

pub fn b58check_encode(prefix: &[u8], payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(prefix.len() + payload.len());
    data.extend_from_slice(prefix);
    data.extend_from_slice(payload);

    bs58::encode(data).with_check().into_string()
}

/// decodes a base58check string and strips the expected prefix.
pub fn b58check_decode(prefix: &[u8], value: &str) -> Result<Vec<u8>, ChainClientError> {
    let data = bs58::decode(value).with_check(None).into_vec()?;

    data.strip_prefix(prefix)
        .map(<[u8]>::to_vec)
        .ok_or_else(|| {
            ChainClientError::ParseError(format!("{value} does not carry the expected prefix"))
        })
}

pub fn blake2b_160(data: &[u8]) -> [u8; 20] {
    let mut out = [0u8; 20];
    out.copy_from_slice(&Blake2b::<U20>::digest(data));
    out
}

pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Blake2b::<U32>::digest(data));
    out
}

/// operation hash (`o..`) of signed operation bytes
pub fn operation_hash(signed_bytes: &[u8]) -> String {
    b58check_encode(OPERATION_HASH, &blake2b_256(signed_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes_produce_expected_leading_characters() {
        assert!(b58check_encode(TZ1, &[0u8; 20]).starts_with("tz1"));
        assert!(b58check_encode(KT1, &[0u8; 20]).starts_with("KT1"));
        assert!(b58check_encode(EDPK, &[0u8; 32]).starts_with("edpk"));
        assert!(b58check_encode(EDSK_SEED, &[0u8; 32]).starts_with("edsk"));
        assert!(b58check_encode(EDSK, &[0u8; 64]).starts_with("edsk"));
        assert!(b58check_encode(EDSIG, &[0u8; 64]).starts_with("edsig"));
        assert!(b58check_encode(OPERATION_HASH, &[0u8; 32]).starts_with('o'));
    }

    #[test]
    fn test_decode_checks_prefix() {
        let encoded = b58check_encode(TZ1, &[7u8; 20]);
        assert_eq!(b58check_decode(TZ1, &encoded).unwrap(), vec![7u8; 20]);

        assert!(matches!(
            b58check_decode(KT1, &encoded),
            Err(ChainClientError::ParseError(_))
        ));
    }

    #[test]
    fn test_decode_rejects_bad_checksum() {
        let mut encoded = b58check_encode(TZ1, &[7u8; 20]);
        let last = encoded.pop().unwrap();
        encoded.push(if last == '1' { '2' } else { '1' });

        assert!(matches!(
            b58check_decode(TZ1, &encoded),
            Err(ChainClientError::KeyError(_))
        ));
    }

    #[test]
    fn test_digest_lengths() {
        assert_eq!(blake2b_160(b"tezos").len(), 20);
        assert_ne!(blake2b_256(b"a"), blake2b_256(b"b"));
    }
}
