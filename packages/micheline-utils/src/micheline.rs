use serde::{Deserialize, Serialize};

use crate::error::MichelineError;

/// structured-term representation of a Michelson value or program, laid out
/// exactly as the node RPC expects it (`{"prim": ..}`, `{"int": ..}`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Micheline {
    Int {
        int: String,
    },
    String {
        string: String,
    },
    Bytes {
        bytes: String,
    },
    Prim {
        prim: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<Micheline>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        annots: Vec<String>,
    },
    Seq(Vec<Micheline>),
}

impl Micheline {
    pub fn int(value: impl ToString) -> Self {
        Micheline::Int {
            int: value.to_string(),
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Micheline::String {
            string: value.into(),
        }
    }

    /// bytes literal from raw bytes, stored hex encoded without the `0x` prefix
    pub fn bytes(value: impl AsRef<[u8]>) -> Self {
        Micheline::Bytes {
            bytes: hex::encode(value),
        }
    }

    pub fn prim(name: impl Into<String>, args: Vec<Micheline>) -> Self {
        Micheline::Prim {
            prim: name.into(),
            args,
            annots: vec![],
        }
    }

    pub fn pair(left: Micheline, right: Micheline) -> Self {
        Self::prim("Pair", vec![left, right])
    }

    pub fn left(value: Micheline) -> Self {
        Self::prim("Left", vec![value])
    }

    pub fn right(value: Micheline) -> Self {
        Self::prim("Right", vec![value])
    }

    pub fn unit() -> Self {
        Self::prim("Unit", vec![])
    }

    pub fn bool(value: bool) -> Self {
        Self::prim(if value { "True" } else { "False" }, vec![])
    }

    pub fn seq(items: Vec<Micheline>) -> Self {
        Micheline::Seq(items)
    }

    pub fn empty_seq() -> Self {
        Micheline::Seq(vec![])
    }

    pub fn as_int(&self) -> Option<&str> {
        match self {
            Micheline::Int { int } => Some(int),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Micheline::String { string } => Some(string),
            _ => None,
        }
    }

    pub fn as_prim(&self) -> Option<(&str, &[Micheline])> {
        match self {
            Micheline::Prim { prim, args, .. } => Some((prim, args)),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Micheline]> {
        match self {
            Micheline::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Parses Micheline JSON, e.g. the content of a compiled `.micheline` file.
    pub fn from_json_str(input: &str) -> Result<Self, MichelineError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn to_json_string(&self) -> Result<String, MichelineError> {
        Ok(serde_json::to_string(self)?)
    }
}
