use std::fmt;

use async_trait::async_trait;
use fa2_chain_client_utils::{
    common::{
        error::ChainClientError,
        transaction::{Confirmation, OperationResponse},
    },
    tezos::{
        account::Account,
        base_client::TezosBaseClient,
        indexer_client::{ConfirmationSettings, ConseilClient, IndexerClient},
        operations::ContractParameters,
    },
    tezos_client::TezosClient,
};
use fa2_micheline_utils::Micheline;
use log::info;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::DeployConfig;

pub type ConnectorResult<T> = Result<T, ConnectorError>;

#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error(transparent)]
    ChainClient(#[from] ChainClientError),

    #[error("Account is not initialized")]
    AccountNotInitialized,
}

/// chain access needed by the deployment pipeline.
/// the connector owns the signing account once `init_account` has run.
#[async_trait]
pub trait Connector: fmt::Debug + Send + Sync {
    /// restores the account from its secret key and returns its address
    async fn init_account(&mut self, secret_key: &str) -> ConnectorResult<String>;

    /// originates a contract with zero balance
    async fn originate(
        &mut self,
        code: Micheline,
        storage: Micheline,
    ) -> ConnectorResult<OperationResponse>;

    /// calls `entrypoint` of `contract` with zero amount
    async fn invoke(
        &mut self,
        contract: &str,
        entrypoint: &str,
        parameters: ContractParameters,
    ) -> ConnectorResult<OperationResponse>;

    /// waits for the operation group to be included and applied
    async fn await_confirmation(&self, operation_group_hash: &str)
        -> ConnectorResult<Confirmation>;
}

pub struct TezosConnector {
    client: TezosClient,
    indexer: ConseilClient,
    settings: ConfirmationSettings,
    cancel: CancellationToken,
    account: Option<Account>,
}

impl fmt::Debug for TezosConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TezosConnector")
            .field("settings", &self.settings)
            .field("account", &self.account.as_ref().map(|a| a.address()))
            .finish_non_exhaustive()
    }
}

impl TezosConnector {
    pub fn new(config: &DeployConfig, cancel: CancellationToken) -> ConnectorResult<Self> {
        let client = TezosClient::new(&config.node.rpc_url, Some(config.node.branch_offset))?;
        let indexer = ConseilClient::new(
            &config.indexer.url,
            &config.indexer.api_key,
            &config.indexer.network,
        );

        Ok(Self {
            client,
            indexer,
            settings: ConfirmationSettings::from(&config.confirmation),
            cancel,
            account: None,
        })
    }
}

#[async_trait]
impl Connector for TezosConnector {
    async fn init_account(&mut self, secret_key: &str) -> ConnectorResult<String> {
        let account = self.client.init_account(secret_key).await?;
        let address = account.address().to_string();

        info!(
            "Initialized account {address} (counter {}, revealed: {})",
            account.counter, account.revealed
        );

        self.account = Some(account);
        Ok(address)
    }

    async fn originate(
        &mut self,
        code: Micheline,
        storage: Micheline,
    ) -> ConnectorResult<OperationResponse> {
        let client = &self.client;
        let account = self
            .account
            .as_mut()
            .ok_or(ConnectorError::AccountNotInitialized)?;

        Ok(client
            .send_contract_origination_operation(account, 0, code, storage)
            .await?)
    }

    async fn invoke(
        &mut self,
        contract: &str,
        entrypoint: &str,
        parameters: ContractParameters,
    ) -> ConnectorResult<OperationResponse> {
        let client = &self.client;
        let account = self
            .account
            .as_mut()
            .ok_or(ConnectorError::AccountNotInitialized)?;

        Ok(client
            .send_contract_invocation_operation(account, contract, 0, entrypoint, parameters)
            .await?)
    }

    async fn await_confirmation(
        &self,
        operation_group_hash: &str,
    ) -> ConnectorResult<Confirmation> {
        Ok(self
            .indexer
            .await_operation_confirmation(operation_group_hash, self.settings, &self.cancel)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DeployConfig {
        let mut config = DeployConfig::default();
        config.node.rpc_url = "http://localhost:8732".to_string();
        config.indexer.url = "http://localhost:1337".to_string();
        config.indexer.network = "sandboxnet".to_string();
        config.confirmation.blocks = 2;
        config
    }

    #[tokio::test]
    async fn test_operations_require_an_account() {
        let mut connector = TezosConnector::new(&config(), CancellationToken::new()).unwrap();

        let result = connector
            .originate(Micheline::empty_seq(), Micheline::unit())
            .await;
        assert!(matches!(result, Err(ConnectorError::AccountNotInitialized)));

        let result = connector
            .invoke(
                "KT1RJ6PbjHpwc3M5rw5s2Nbmefwbuwbdxton",
                "default",
                ContractParameters::Michelson("Unit".to_string()),
            )
            .await;
        assert!(matches!(result, Err(ConnectorError::AccountNotInitialized)));
    }

    #[test]
    fn test_connector_takes_confirmation_settings_from_config() {
        let connector = TezosConnector::new(&config(), CancellationToken::new()).unwrap();

        assert_eq!(connector.settings.blocks, 2);
        assert_eq!(connector.settings.block_time.as_secs(), 61);
        assert!(format!("{connector:?}").contains("account: None"));
    }
}
