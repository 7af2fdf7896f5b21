use std::{fmt, path::PathBuf, time::Duration};

use config::{Config as ConfigHelper, Environment, File};
use fa2_chain_client_utils::tezos::{indexer_client::ConfirmationSettings, HEAD_BRANCH_OFFSET};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

/// prefix of environment overrides, `TOKEN_DEPLOY__ACCOUNT__SECRET_KEY` sets
/// `account.secret_key`
pub const ENV_PREFIX: &str = "TOKEN_DEPLOY";
pub const ENV_SEPARATOR: &str = "__";

pub const DEFAULT_CODE_PATH: &str = "contracts/btctz.micheline";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub node: NodeConfig,
    pub indexer: IndexerConfig,
    pub account: AccountConfig,
    pub contract: ContractConfig,
    pub admin: AdminConfig,
    pub confirmation: ConfirmationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub rpc_url: String,
    /// depth below the head of the block used as operation branch
    pub branch_offset: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            rpc_url: String::new(),
            branch_offset: HEAD_BRANCH_OFFSET,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    pub url: String,
    pub api_key: String,
    pub network: String,
}

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    pub secret_key: String,
}

impl fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountConfig").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// micheline json file with the contract code
    pub code_path: PathBuf,
    /// already deployed contract, skips origination when set
    pub address: Option<String>,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            code_path: PathBuf::from(DEFAULT_CODE_PATH),
            address: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// receives the minted balance and the administrator role
    pub target: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    pub blocks: u64,
    pub block_time_secs: u64,
    pub timeout_secs: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        let settings = ConfirmationSettings::default();

        Self {
            blocks: settings.blocks,
            block_time_secs: settings.block_time.as_secs(),
            timeout_secs: settings.timeout.as_secs(),
        }
    }
}

impl From<&ConfirmationConfig> for ConfirmationSettings {
    fn from(config: &ConfirmationConfig) -> Self {
        ConfirmationSettings {
            blocks: config.blocks,
            block_time: Duration::from_secs(config.block_time_secs),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

impl DeployConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        let required = [
            ("node.rpc_url", &self.node.rpc_url),
            ("indexer.url", &self.indexer.url),
            ("indexer.network", &self.indexer.network),
            ("account.secret_key", &self.account.secret_key),
            ("admin.target", &self.admin.target),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField(field.to_string()));
            }
        }

        Ok(())
    }

    /// configured contract address, ignoring empty values
    pub fn contract_address(&self) -> Option<&str> {
        self.contract
            .address
            .as_deref()
            .filter(|address| !address.trim().is_empty())
    }
}

pub fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}

/// merges the given files in order, then environment overrides, and
/// validates the result
pub fn load_config(files: &[PathBuf]) -> ConfigResult<DeployConfig> {
    load_config_with_env(files, environment())
}

pub fn load_config_with_env(files: &[PathBuf], env: Environment) -> ConfigResult<DeployConfig> {
    let config: DeployConfig = ConfigHelper::builder()
        .add_source(
            files
                .iter()
                .map(|path| File::from(path.as_path()))
                .collect::<Vec<_>>(),
        )
        .add_source(env)
        .build()?
        .try_deserialize()?;

    config.validate()?;

    Ok(config)
}
