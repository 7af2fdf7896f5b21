use fa2_micheline_utils::MichelineError;
use thiserror::Error;

use crate::{config::ConfigError, connector::ConnectorError};

pub type ManagerResult<T> = Result<T, ManagerError>;

#[derive(Error, Debug)]
pub enum ManagerError {
    #[error(transparent)]
    Error(#[from] anyhow::Error),

    #[error("Connector Error: {0}")]
    ConnectorError(#[from] ConnectorError),

    #[error("Config Error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Invalid contract code: {0}")]
    ContractCode(#[from] MichelineError),

    #[error("Operation {0} did not originate any contract")]
    NoOriginatedContract(String),
}
