use std::{fs, path::Path};

use anyhow::Context;
use fa2_chain_client_utils::{
    common::transaction::{Confirmation, OperationResponse},
    tezos::operations::ContractParameters,
};
use fa2_micheline_utils::Micheline;
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    config::DeployConfig,
    connector::Connector,
    error::{ManagerError, ManagerResult},
    helpers::clear_rpc_operation_group_hash,
    templates::{
        initial_storage, mint_parameters, set_administrator_parameter, MINT_ENTRYPOINT,
        SET_ADMINISTRATOR_ENTRYPOINT,
    },
};

pub const DEPLOY_STEP: &str = "deploy";
pub const MINT_STEP: &str = "mint";
pub const TRANSFER_ADMIN_STEP: &str = "transfer_admin";

/// one confirmed operation of the deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    pub step: String,
    pub operation_group_hash: String,
    pub block_hash: String,
    pub block_level: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentReport {
    pub owner: String,
    pub contract_address: String,
    pub admin: String,
    pub steps: Vec<StepReport>,
}

/// cleans the injected operation id and waits for its confirmation
async fn confirm_step<C: Connector + ?Sized>(
    connector: &C,
    step: &str,
    response: OperationResponse,
) -> ManagerResult<(StepReport, Confirmation)> {
    let operation_group_hash = clear_rpc_operation_group_hash(&response.operation_group_id);
    info!("Injected {step} operation: {operation_group_hash}");

    let confirmation = connector.await_confirmation(&operation_group_hash).await?;
    info!(
        "{step} operation confirmed in block {} (level {})",
        confirmation.block_hash, confirmation.block_level
    );

    let report = StepReport {
        step: step.to_string(),
        operation_group_hash,
        block_hash: confirmation.block_hash.clone(),
        block_level: confirmation.block_level,
    };

    Ok((report, confirmation))
}

pub async fn initialize_account<C: Connector + ?Sized>(
    connector: &mut C,
    secret_key: &str,
) -> ManagerResult<String> {
    Ok(connector.init_account(secret_key).await?)
}

pub fn read_contract_code(code_path: &Path) -> ManagerResult<Micheline> {
    let content = fs::read_to_string(code_path)
        .with_context(|| format!("Failed to read contract code at {}", code_path.display()))?;

    Ok(Micheline::from_json_str(&content)?)
}

/// originates the token contract owned by `owner`, returns its address
pub async fn deploy_token_contract<C: Connector + ?Sized>(
    connector: &mut C,
    owner: &str,
    code_path: &Path,
) -> ManagerResult<(String, StepReport)> {
    info!("Deploying token contract from {}", code_path.display());

    let code = read_contract_code(code_path)?;
    let response = connector.originate(code, initial_storage(owner)).await?;

    let (report, confirmation) = confirm_step(connector, DEPLOY_STEP, response).await?;

    let contract_address = confirmation
        .originated_contracts
        .first()
        .cloned()
        .ok_or_else(|| ManagerError::NoOriginatedContract(report.operation_group_hash.clone()))?;

    info!("{}", deployed_message(&contract_address, &report));

    Ok((contract_address, report))
}

pub(crate) fn deployed_message(contract_address: &str, report: &StepReport) -> String {
    format!(
        "Deployed token contract {contract_address} in block {}",
        report.block_hash
    )
}

pub async fn mint_minimum_balance<C: Connector + ?Sized>(
    connector: &mut C,
    contract_address: &str,
    target: &str,
) -> ManagerResult<StepReport> {
    info!("Minting minimum balance to {target}");

    let response = connector
        .invoke(
            contract_address,
            MINT_ENTRYPOINT,
            ContractParameters::Micheline(mint_parameters(target)),
        )
        .await?;

    let (report, _) = confirm_step(connector, MINT_STEP, response).await?;
    Ok(report)
}

pub async fn transfer_admin_rights<C: Connector + ?Sized>(
    connector: &mut C,
    contract_address: &str,
    target: &str,
) -> ManagerResult<StepReport> {
    info!("Transferring admin rights of {contract_address} to {target}");

    let response = connector
        .invoke(
            contract_address,
            SET_ADMINISTRATOR_ENTRYPOINT,
            ContractParameters::Michelson(set_administrator_parameter(target)),
        )
        .await?;

    let (report, _) = confirm_step(connector, TRANSFER_ADMIN_STEP, response).await?;
    Ok(report)
}

/// runs every step in order, stopping at the first failure
pub async fn run<C: Connector + ?Sized>(
    connector: &mut C,
    config: &DeployConfig,
) -> ManagerResult<DeploymentReport> {
    let owner = initialize_account(connector, &config.account.secret_key).await?;
    let target = config.admin.target.as_str();

    let mut steps = vec![];

    let contract_address = match config.contract_address() {
        Some(address) => {
            info!("Using existing token contract {address}");
            address.to_string()
        }
        None => {
            let (address, report) =
                deploy_token_contract(connector, &owner, &config.contract.code_path).await?;
            steps.push(report);
            address
        }
    };

    steps.push(mint_minimum_balance(connector, &contract_address, target).await?);
    steps.push(transfer_admin_rights(connector, &contract_address, target).await?);

    Ok(DeploymentReport {
        owner,
        contract_address,
        admin: target.to_string(),
        steps,
    })
}
