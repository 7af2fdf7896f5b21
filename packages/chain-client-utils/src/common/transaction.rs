use serde::{Deserialize, Serialize};

/// response of an operation injection. the group id is kept exactly as the
/// node returned it, which includes json quoting and a trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationResponse {
    pub operation_group_id: String,
}

/// on-chain confirmation of an operation group as reported by the indexer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub operation_group_hash: String,
    pub status: String,
    pub block_hash: String,
    pub block_level: u64,
    pub originated_contracts: Vec<String>,
}

impl Confirmation {
    pub fn is_applied(&self) -> bool {
        self.status == "applied"
    }
}
