use fa2_micheline_utils::{parse_michelson, Micheline};
use serde::{Deserialize, Serialize};

use crate::common::error::ChainClientError;

/// hard limits used while simulating an operation, before real limits are known
pub const HARD_GAS_LIMIT_PER_OPERATION: u64 = 1_040_000;
pub const HARD_STORAGE_LIMIT_PER_OPERATION: u64 = 60_000;

/// the node encodes every amount and limit as a decimal string
pub(crate) mod quoted {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(D::Error::custom)
    }
}

/// gas and storage limits of the running protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ProtocolConstants {
    #[serde(with = "quoted")]
    pub hard_gas_limit_per_operation: u64,
    #[serde(with = "quoted")]
    pub hard_gas_limit_per_block: u64,
    #[serde(with = "quoted")]
    pub hard_storage_limit_per_operation: u64,
}

impl ProtocolConstants {
    /// gas limit of each of `contents` simulated together, so that the
    /// group stays within both the operation and the block limit
    pub fn simulation_gas_limit(&self, contents: usize) -> u64 {
        let block_share = self.hard_gas_limit_per_block / contents.max(1) as u64;
        block_share.min(self.hard_gas_limit_per_operation)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerFields {
    pub source: String,
    #[serde(with = "quoted")]
    pub fee: u64,
    #[serde(with = "quoted")]
    pub counter: u64,
    #[serde(with = "quoted")]
    pub gas_limit: u64,
    #[serde(with = "quoted")]
    pub storage_limit: u64,
}

impl ManagerFields {
    /// fields with zero fee and hard limits, ready for simulation
    pub fn for_simulation(source: &str, counter: u64) -> Self {
        Self {
            source: source.to_string(),
            fee: 0,
            counter,
            gas_limit: HARD_GAS_LIMIT_PER_OPERATION,
            storage_limit: HARD_STORAGE_LIMIT_PER_OPERATION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reveal {
    #[serde(flatten)]
    pub manager: ManagerFields,
    pub public_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub code: Micheline,
    pub storage: Micheline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Origination {
    #[serde(flatten)]
    pub manager: ManagerFields,
    #[serde(with = "quoted")]
    pub balance: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegate: Option<String>,
    pub script: Script,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub entrypoint: String,
    pub value: Micheline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(flatten)]
    pub manager: ManagerFields,
    #[serde(with = "quoted")]
    pub amount: u64,
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Parameters>,
}

/// manager operation contents in the node's json layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperationContent {
    Reveal(Reveal),
    Origination(Origination),
    Transaction(Transaction),
}

impl OperationContent {
    /// publishes the public key of an account that has not been revealed yet
    pub fn reveal(source: &str, public_key: &str, counter: u64) -> Self {
        OperationContent::Reveal(Reveal {
            manager: ManagerFields::for_simulation(source, counter),
            public_key: public_key.to_string(),
        })
    }

    pub fn origination(source: &str, counter: u64, balance: u64, script: Script) -> Self {
        OperationContent::Origination(Origination {
            manager: ManagerFields::for_simulation(source, counter),
            balance,
            delegate: None,
            script,
        })
    }

    pub fn transaction(
        source: &str,
        counter: u64,
        amount: u64,
        destination: &str,
        parameters: Option<Parameters>,
    ) -> Self {
        OperationContent::Transaction(Transaction {
            manager: ManagerFields::for_simulation(source, counter),
            amount,
            destination: destination.to_string(),
            parameters,
        })
    }

    pub fn manager(&self) -> &ManagerFields {
        match self {
            OperationContent::Reveal(op) => &op.manager,
            OperationContent::Origination(op) => &op.manager,
            OperationContent::Transaction(op) => &op.manager,
        }
    }

    pub fn manager_mut(&mut self) -> &mut ManagerFields {
        match self {
            OperationContent::Reveal(op) => &mut op.manager,
            OperationContent::Origination(op) => &mut op.manager,
            OperationContent::Transaction(op) => &mut op.manager,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            OperationContent::Reveal(_) => "reveal",
            OperationContent::Origination(_) => "origination",
            OperationContent::Transaction(_) => "transaction",
        }
    }
}

/// operation group before signing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsignedOperation {
    pub branch: String,
    pub contents: Vec<OperationContent>,
}

/// contract invocation parameters in either notation
#[derive(Debug, Clone, PartialEq)]
pub enum ContractParameters {
    Micheline(Micheline),
    Michelson(String),
}

impl ContractParameters {
    /// converts the parameters to the structured form the node accepts
    pub fn into_micheline(self) -> Result<Micheline, ChainClientError> {
        match self {
            ContractParameters::Micheline(value) => Ok(value),
            ContractParameters::Michelson(text) => Ok(parse_michelson(&text)?),
        }
    }
}
