use std::num::ParseIntError;

use fa2_micheline_utils::MichelineError;

use crate::common::error::ChainClientError;

impl From<reqwest::Error> for ChainClientError {
    fn from(value: reqwest::Error) -> Self {
        ChainClientError::ClientError(value.to_string())
    }
}

impl From<serde_json::error::Error> for ChainClientError {
    fn from(value: serde_json::error::Error) -> Self {
        ChainClientError::ParseError(value.to_string())
    }
}

impl From<ParseIntError> for ChainClientError {
    fn from(value: ParseIntError) -> Self {
        ChainClientError::ParseError(value.to_string())
    }
}

impl From<hex::FromHexError> for ChainClientError {
    fn from(value: hex::FromHexError) -> Self {
        ChainClientError::ParseError(value.to_string())
    }
}

impl From<bs58::decode::Error> for ChainClientError {
    fn from(value: bs58::decode::Error) -> Self {
        ChainClientError::KeyError(value.to_string())
    }
}

impl From<ed25519_dalek::SignatureError> for ChainClientError {
    fn from(value: ed25519_dalek::SignatureError) -> Self {
        ChainClientError::KeyError(value.to_string())
    }
}

impl From<MichelineError> for ChainClientError {
    fn from(value: MichelineError) -> Self {
        ChainClientError::ParseError(value.to_string())
    }
}
