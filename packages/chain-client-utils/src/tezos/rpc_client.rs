use async_trait::async_trait;
use log::debug;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;

use crate::common::error::ChainClientError;

use super::{
    fees::RunOperationResponse,
    operations::{ProtocolConstants, UnsignedOperation}, signing_client::dummy_signature,
    MAIN_CHAIN,
};

#[derive(Debug, Deserialize)]
struct Protocols {
    next_protocol: String,
}

/// node rpc trait giving access to the tezos node endpoints needed to build,
/// simulate, forge and inject manager operations.
/// implementors only provide the node url and an http client.
#[async_trait]
pub trait NodeRpcClient: Send + Sync {
    fn node_url(&self) -> String;
    fn http_client(&self) -> &reqwest::Client;

    async fn get_json<T: DeserializeOwned + Send>(&self, path: &str) -> Result<T, ChainClientError> {
        let url = format!("{}{}", self.node_url().trim_end_matches('/'), path);
        let response = self.http_client().get(&url).send().await?;

        parse_response(path, response).await
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned + Send>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ChainClientError> {
        let url = format!("{}{}", self.node_url().trim_end_matches('/'), path);
        let response = self.http_client().post(&url).json(body).send().await?;

        parse_response(path, response).await
    }

    /// current counter of the account, the next operation must use counter + 1
    async fn get_counter_for_account(&self, address: &str) -> Result<u64, ChainClientError> {
        let counter: String = self
            .get_json(&format!(
                "/chains/{MAIN_CHAIN}/blocks/head/context/contracts/{address}/counter"
            ))
            .await?;

        Ok(counter.parse()?)
    }

    async fn is_manager_key_revealed(&self, address: &str) -> Result<bool, ChainClientError> {
        let manager_key: Option<String> = self
            .get_json(&format!(
                "/chains/{MAIN_CHAIN}/blocks/head/context/contracts/{address}/manager_key"
            ))
            .await?;

        Ok(manager_key.is_some())
    }

    /// hash of the block `offset` levels below the head
    async fn get_branch(&self, offset: u32) -> Result<String, ChainClientError> {
        self.get_json(&format!("/chains/{MAIN_CHAIN}/blocks/head~{offset}/hash"))
            .await
    }

    async fn get_chain_id(&self) -> Result<String, ChainClientError> {
        self.get_json(&format!("/chains/{MAIN_CHAIN}/chain_id")).await
    }

    async fn get_next_protocol(&self) -> Result<String, ChainClientError> {
        let protocols: Protocols = self
            .get_json(&format!("/chains/{MAIN_CHAIN}/blocks/head/protocols"))
            .await?;

        Ok(protocols.next_protocol)
    }

    async fn get_constants(&self) -> Result<ProtocolConstants, ChainClientError> {
        self.get_json(&format!("/chains/{MAIN_CHAIN}/blocks/head/context/constants"))
            .await
    }

    /// simulates the operation without checking its signature
    async fn run_operation(
        &self,
        operation: &UnsignedOperation,
        chain_id: &str,
    ) -> Result<RunOperationResponse, ChainClientError> {
        let body = json!({
            "operation": {
                "branch": operation.branch,
                "contents": operation.contents,
                "signature": dummy_signature(),
            },
            "chain_id": chain_id,
        });

        self.post_json(
            &format!("/chains/{MAIN_CHAIN}/blocks/head/helpers/scripts/run_operation"),
            &body,
        )
        .await
    }

    /// binary encoding of the operation, hex encoded
    async fn forge_operation(
        &self,
        operation: &UnsignedOperation,
    ) -> Result<String, ChainClientError> {
        let forged: String = self
            .post_json(
                &format!("/chains/{MAIN_CHAIN}/blocks/head/helpers/forge/operations"),
                operation,
            )
            .await?;

        debug!("forged {} bytes", forged.len() / 2);

        Ok(forged)
    }

    async fn preapply_operation(
        &self,
        protocol: &str,
        operation: &UnsignedOperation,
        signature: &str,
    ) -> Result<Vec<RunOperationResponse>, ChainClientError> {
        let body = json!([{
            "protocol": protocol,
            "branch": operation.branch,
            "contents": operation.contents,
            "signature": signature,
        }]);

        self.post_json(
            &format!("/chains/{MAIN_CHAIN}/blocks/head/helpers/preapply/operations"),
            &body,
        )
        .await
    }

    /// injects signed bytes and returns the node's response body untouched
    async fn inject_operation(&self, signed_bytes: &str) -> Result<String, ChainClientError> {
        let path = format!("/injection/operation?chain={MAIN_CHAIN}");
        let url = format!("{}{}", self.node_url().trim_end_matches('/'), path);

        let response = self
            .http_client()
            .post(&url)
            .json(&signed_bytes)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ChainClientError::TransactionError(format!(
                "injection failed with {status}: {body}"
            )));
        }

        Ok(body)
    }
}

async fn parse_response<T: DeserializeOwned>(
    path: &str,
    response: reqwest::Response,
) -> Result<T, ChainClientError> {
    let status = response.status();

    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());

        return Err(ChainClientError::QueryError(format!(
            "{path} returned {status}: {body}"
        )));
    }

    Ok(response.json().await?)
}

