use thiserror::Error;

#[derive(Error, Debug)]
pub enum MichelineError {
    #[error("invalid micheline json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid bytes literal: {0}")]
    InvalidBytes(#[from] hex::FromHexError),

    #[error("unexpected character '{character}' at offset {offset}")]
    UnexpectedCharacter { character: char, offset: usize },

    #[error("unterminated string literal starting at offset {0}")]
    UnterminatedString(usize),

    #[error("invalid escape sequence '\\{character}' at offset {offset}")]
    InvalidEscape { character: char, offset: usize },

    #[error("unexpected token at offset {offset}: {found}")]
    UnexpectedToken { offset: usize, found: String },

    #[error("unexpected end of input")]
    UnexpectedEnd,
}
