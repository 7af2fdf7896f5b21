use async_trait::async_trait;
use fa2_micheline_utils::Micheline;
use log::debug;

use crate::common::{error::ChainClientError, transaction::OperationResponse};

use super::{
    account::Account,
    fees::{compute_fee, estimate_limits, FEE_SIZE_PADDING_BYTES, SIGNATURE_SIZE},
    key_store::restore_identity_from_secret_key,
    operations::{
        ContractParameters, OperationContent, Parameters, ProtocolConstants, Script,
        UnsignedOperation,
    },
    rpc_client::NodeRpcClient,
    signing_client::SoftSigner,
    HEAD_BRANCH_OFFSET,
};

/// base client trait with default implementations for tezos manager operations.
///
/// every submission goes through the same steps: reveal if needed, simulate to
/// estimate limits, compute fees, forge, sign, preapply and inject.
#[async_trait]
pub trait TezosBaseClient: NodeRpcClient {
    fn branch_offset(&self) -> u32 {
        HEAD_BRANCH_OFFSET
    }

    /// restores the key pair and fetches the next usable counter
    async fn init_account(&self, secret_key: &str) -> Result<Account, ChainClientError> {
        let key_store = restore_identity_from_secret_key(secret_key)?;
        let signer = SoftSigner::create_signer(&key_store.secret_key)?;

        let address = key_store.public_key_hash.clone();
        let counter = self.get_counter_for_account(&address).await? + 1;
        let revealed = self.is_manager_key_revealed(&address).await?;

        debug!("account {address}: next counter {counter}, revealed {revealed}");

        Ok(Account::new(key_store, signer, counter, revealed))
    }

    async fn send_contract_origination_operation(
        &self,
        account: &mut Account,
        amount: u64,
        code: Micheline,
        storage: Micheline,
    ) -> Result<OperationResponse, ChainClientError> {
        let content = OperationContent::origination(
            account.address(),
            account.counter,
            amount,
            Script { code, storage },
        );

        self.send_operation(account, content).await
    }

    async fn send_contract_invocation_operation(
        &self,
        account: &mut Account,
        contract: &str,
        amount: u64,
        entrypoint: &str,
        parameters: ContractParameters,
    ) -> Result<OperationResponse, ChainClientError> {
        let parameters = Parameters {
            entrypoint: entrypoint.to_string(),
            value: parameters.into_micheline()?,
        };

        let content = OperationContent::transaction(
            account.address(),
            account.counter,
            amount,
            contract,
            Some(parameters),
        );

        self.send_operation(account, content).await
    }

    async fn send_operation(
        &self,
        account: &mut Account,
        content: OperationContent,
    ) -> Result<OperationResponse, ChainClientError> {
        let branch = self.get_branch(self.branch_offset()).await?;

        let mut operation = UnsignedOperation {
            branch,
            contents: group_contents(account, content),
        };

        let forged = self.prepare_operation(&mut operation).await?;
        let signed = account.signer.sign_operation(&hex::decode(&forged)?);

        let protocol = self.get_next_protocol().await?;
        let preapplied = self
            .preapply_operation(&protocol, &operation, &signed.signature)
            .await?;

        for result in preapplied.iter().flat_map(|r| &r.contents) {
            result.ensure_applied()?;
        }

        let operation_group_id = self.inject_operation(&signed.signed_bytes).await?;
        debug!("expected operation hash {}", signed.operation_hash);

        account.advance(operation.contents.len() as u64);

        Ok(OperationResponse { operation_group_id })
    }

    /// simulates the operation, replaces hard limits and zero fees with
    /// estimated values, and returns the forged bytes of the final operation
    async fn prepare_operation(
        &self,
        operation: &mut UnsignedOperation,
    ) -> Result<String, ChainClientError> {
        let constants = self.get_constants().await?;
        apply_simulation_limits(&mut operation.contents, &constants);

        let chain_id = self.get_chain_id().await?;
        let simulation = self.run_operation(operation, &chain_id).await?;

        if simulation.contents.len() != operation.contents.len() {
            return Err(ChainClientError::QueryError(format!(
                "simulation returned {} results for {} contents",
                simulation.contents.len(),
                operation.contents.len()
            )));
        }

        for (content, result) in operation.contents.iter_mut().zip(&simulation.contents) {
            let estimate = estimate_limits(result)?;
            let manager = content.manager_mut();
            manager.gas_limit = estimate.gas_limit;
            manager.storage_limit = estimate.storage_limit;
        }

        let unpriced = self.forge_operation(operation).await?;
        let size = (unpriced.len() / 2) as u64 + SIGNATURE_SIZE;
        let size_share = size.div_ceil(operation.contents.len() as u64) + FEE_SIZE_PADDING_BYTES;

        for content in operation.contents.iter_mut() {
            let kind = content.kind();
            let manager = content.manager_mut();
            manager.fee = compute_fee(manager.gas_limit, size_share);

            debug!(
                "{kind}: fee {} mutez, gas limit {}, storage limit {}",
                manager.fee, manager.gas_limit, manager.storage_limit
            );
        }

        self.forge_operation(operation).await
    }
}

/// contents of the operation group for `content`, preceded by a reveal when
/// the account has not published its key, numbered from the account counter
pub fn group_contents(account: &Account, content: OperationContent) -> Vec<OperationContent> {
    let mut contents = vec![];

    if !account.revealed {
        contents.push(OperationContent::reveal(
            account.address(),
            &account.key_store.public_key,
            account.counter,
        ));
    }
    contents.push(content);

    for (i, content) in contents.iter_mut().enumerate() {
        content.manager_mut().counter = account.counter + i as u64;
    }

    contents
}

/// sets the limits every content is simulated with, splitting the block gas
/// limit between the contents of the group
pub fn apply_simulation_limits(
    contents: &mut [OperationContent],
    constants: &ProtocolConstants,
) {
    let gas_limit = constants.simulation_gas_limit(contents.len());

    for content in contents.iter_mut() {
        let manager = content.manager_mut();
        manager.gas_limit = gas_limit;
        manager.storage_limit = constants.hard_storage_limit_per_operation;
    }
}
