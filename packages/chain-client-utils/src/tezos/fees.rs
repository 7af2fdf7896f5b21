use serde::Deserialize;

use crate::common::error::ChainClientError;

use super::operations::HARD_GAS_LIMIT_PER_OPERATION;

pub const MINIMAL_FEE_MUTEZ: u64 = 100;
pub const MINIMAL_FEE_PER_BYTE_MUTEZ: u64 = 1;
pub const MINIMAL_FEE_PER_GAS_NANOTEZ: u64 = 100;
pub const GAS_LIMIT_PADDING: u64 = 100;
pub const STORAGE_LIMIT_PADDING: u64 = 20;
/// bytes burnt when a contract is originated or a fresh account allocated
pub const ORIGINATION_SIZE: u64 = 257;
/// covers the growth of the forged bytes once real fees and limits are set
pub const FEE_SIZE_PADDING_BYTES: u64 = 10;
pub const SIGNATURE_SIZE: u64 = 64;

#[derive(Debug, Clone, Deserialize)]
pub struct RunOperationResponse {
    pub contents: Vec<ContentResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentResult {
    pub kind: String,
    #[serde(default)]
    pub metadata: Option<ContentMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentMetadata {
    pub operation_result: OperationResult,
    #[serde(default)]
    pub internal_operation_results: Vec<InternalOperationResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InternalOperationResult {
    pub result: OperationResult,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OperationResult {
    pub status: String,
    #[serde(default)]
    pub consumed_milligas: Option<String>,
    #[serde(default)]
    pub consumed_gas: Option<String>,
    #[serde(default)]
    pub paid_storage_size_diff: Option<String>,
    #[serde(default)]
    pub originated_contracts: Vec<String>,
    #[serde(default)]
    pub allocated_destination_contract: bool,
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}

impl OperationResult {
    fn consumed_milligas(&self) -> Result<u64, ChainClientError> {
        match (&self.consumed_milligas, &self.consumed_gas) {
            (Some(milligas), _) => Ok(milligas.parse()?),
            (None, Some(gas)) => Ok(gas.parse::<u64>()? * 1000),
            (None, None) => Ok(0),
        }
    }

    fn burnt_storage(&self) -> Result<u64, ChainClientError> {
        let paid = match &self.paid_storage_size_diff {
            Some(diff) => diff.parse::<u64>()?,
            None => 0,
        };

        let allocations = self.originated_contracts.len() as u64
            + u64::from(self.allocated_destination_contract);

        Ok(paid + allocations * ORIGINATION_SIZE)
    }

    fn error_ids(&self) -> Vec<String> {
        self.errors
            .iter()
            .filter_map(|e| e.get("id").and_then(|id| id.as_str()))
            .map(str::to_string)
            .collect()
    }
}

impl ContentResult {
    fn results(&self) -> Result<Vec<&OperationResult>, ChainClientError> {
        let metadata = self.metadata.as_ref().ok_or_else(|| {
            ChainClientError::QueryError(format!("no metadata in {} result", self.kind))
        })?;

        Ok(std::iter::once(&metadata.operation_result)
            .chain(metadata.internal_operation_results.iter().map(|i| &i.result))
            .collect())
    }

    /// fails unless the operation and all its internal operations were applied
    pub fn ensure_applied(&self) -> Result<(), ChainClientError> {
        for result in self.results()? {
            if result.status != "applied" {
                return Err(ChainClientError::TransactionError(format!(
                    "{} {}: {}",
                    self.kind,
                    result.status,
                    result.error_ids().join(", ")
                )));
            }
        }
        Ok(())
    }
}

/// gas and storage limits derived from a simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Estimate {
    pub gas_limit: u64,
    pub storage_limit: u64,
}

pub fn estimate_limits(result: &ContentResult) -> Result<Estimate, ChainClientError> {
    result.ensure_applied()?;

    let mut milligas = 0;
    let mut storage = 0;
    for r in result.results()? {
        milligas += r.consumed_milligas()?;
        storage += r.burnt_storage()?;
    }

    let gas_limit = (milligas.div_ceil(1000) + GAS_LIMIT_PADDING).min(HARD_GAS_LIMIT_PER_OPERATION);

    Ok(Estimate {
        gas_limit,
        storage_limit: storage + STORAGE_LIMIT_PADDING,
    })
}

/// minimal baker fee in mutez for an operation of `size` bytes and `gas_limit`
pub fn compute_fee(gas_limit: u64, size: u64) -> u64 {
    MINIMAL_FEE_MUTEZ
        + size * MINIMAL_FEE_PER_BYTE_MUTEZ
        + (gas_limit * MINIMAL_FEE_PER_GAS_NANOTEZ).div_ceil(1000)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn content(value: serde_json::Value) -> ContentResult {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_estimate_origination() {
        let result = content(json!({
            "kind": "origination",
            "metadata": {
                "operation_result": {
                    "status": "applied",
                    "consumed_milligas": "1437512",
                    "paid_storage_size_diff": "4000",
                    "originated_contracts": ["KT1Xx"]
                }
            }
        }));

        let estimate = estimate_limits(&result).unwrap();
        assert_eq!(estimate.gas_limit, 1438 + GAS_LIMIT_PADDING);
        assert_eq!(estimate.storage_limit, 4000 + ORIGINATION_SIZE + STORAGE_LIMIT_PADDING);
    }

    #[test]
    fn test_estimate_includes_internal_operations() {
        let result = content(json!({
            "kind": "transaction",
            "metadata": {
                "operation_result": { "status": "applied", "consumed_gas": "2000" },
                "internal_operation_results": [
                    { "result": { "status": "applied", "consumed_milligas": "500", "allocated_destination_contract": true } }
                ]
            }
        }));

        let estimate = estimate_limits(&result).unwrap();
        assert_eq!(estimate.gas_limit, 2001 + GAS_LIMIT_PADDING);
        assert_eq!(estimate.storage_limit, ORIGINATION_SIZE + STORAGE_LIMIT_PADDING);
    }

    #[test]
    fn test_failed_simulation_reports_error_ids() {
        let result = content(json!({
            "kind": "transaction",
            "metadata": {
                "operation_result": {
                    "status": "failed",
                    "errors": [ { "kind": "temporary", "id": "proto.alpha.michelson_v1.script_rejected" } ]
                }
            }
        }));

        match estimate_limits(&result) {
            Err(ChainClientError::TransactionError(msg)) => {
                assert!(msg.contains("failed"));
                assert!(msg.contains("script_rejected"));
            }
            other => panic!("expected transaction error, got {other:?}"),
        }
    }

    #[test]
    fn test_backtracked_internal_operation_fails() {
        let result = content(json!({
            "kind": "transaction",
            "metadata": {
                "operation_result": { "status": "applied" },
                "internal_operation_results": [ { "result": { "status": "backtracked" } } ]
            }
        }));

        assert!(result.ensure_applied().is_err());
    }

    #[test]
    fn test_gas_limit_is_capped() {
        let result = content(json!({
            "kind": "transaction",
            "metadata": { "operation_result": { "status": "applied", "consumed_milligas": "2000000000" } }
        }));

        assert_eq!(
            estimate_limits(&result).unwrap().gas_limit,
            HARD_GAS_LIMIT_PER_OPERATION
        );
    }

    #[test]
    fn test_compute_fee() {
        // 100 base + 200 bytes + ceil(1500 * 0.1)
        assert_eq!(compute_fee(1500, 200), 450);
        assert_eq!(compute_fee(1, 0), 101);
    }
}
