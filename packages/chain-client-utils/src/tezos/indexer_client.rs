use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::common::{error::ChainClientError, transaction::Confirmation};

/// rows fetched per operation group, enough to cover a reveal plus the
/// operation it was batched with
const OPERATION_GROUP_LIMIT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Predicate {
    pub field: String,
    pub operation: String,
    pub set: Vec<Value>,
    pub inverse: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderBy {
    pub field: String,
    pub direction: String,
}

/// conseil data query body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConseilQuery {
    pub fields: Vec<String>,
    pub predicates: Vec<Predicate>,
    pub order_by: Vec<OrderBy>,
    pub aggregation: Vec<Value>,
    pub limit: u32,
}

impl ConseilQuery {
    pub fn new(limit: u32) -> Self {
        Self {
            fields: vec![],
            predicates: vec![],
            order_by: vec![],
            aggregation: vec![],
            limit,
        }
    }

    pub fn add_predicate(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate {
            field: field.to_string(),
            operation: "eq".to_string(),
            set: vec![value.into()],
            inverse: false,
        });
        self
    }

    pub fn order_desc(mut self, field: &str) -> Self {
        self.order_by.push(OrderBy {
            field: field.to_string(),
            direction: "desc".to_string(),
        });
        self
    }
}

pub fn block_head_query() -> ConseilQuery {
    ConseilQuery::new(1).order_desc("level")
}

pub fn operation_group_query(operation_group_hash: &str) -> ConseilQuery {
    ConseilQuery::new(OPERATION_GROUP_LIMIT)
        .add_predicate("operation_group_hash", operation_group_hash)
        .order_desc("block_level")
}

#[derive(Debug, Clone, Deserialize)]
struct BlockRow {
    level: u64,
}

/// single operation of a group as stored by the indexer
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OperationRow {
    pub operation_group_hash: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    pub block_hash: String,
    pub block_level: u64,
    #[serde(default)]
    pub originated_contracts: Option<String>,
}

/// folds the rows of one operation group into a single confirmation.
/// the group is applied only if every row is.
pub fn merge_operation_rows(
    operation_group_hash: &str,
    rows: Vec<OperationRow>,
) -> Option<Confirmation> {
    let first = rows.first()?;

    let mut confirmation = Confirmation {
        operation_group_hash: operation_group_hash.to_string(),
        status: "applied".to_string(),
        block_hash: first.block_hash.clone(),
        block_level: first.block_level,
        originated_contracts: vec![],
    };

    for row in rows {
        let status = row.status.unwrap_or_else(|| "unknown".to_string());
        if status != "applied" && confirmation.is_applied() {
            confirmation.status = status;
        }

        if let Some(contract) = row.originated_contracts.filter(|c| !c.is_empty()) {
            confirmation.originated_contracts.push(contract);
        }
    }

    Some(confirmation)
}

/// bounds on how long to wait for an operation group to be included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationSettings {
    pub blocks: u64,
    pub block_time: Duration,
    pub timeout: Duration,
}

impl Default for ConfirmationSettings {
    fn default() -> Self {
        Self {
            blocks: 7,
            block_time: Duration::from_secs(61),
            timeout: Duration::from_secs(900),
        }
    }
}

/// indexer trait used to follow operations after injection.
/// implementors provide the two queries, polling comes for free.
#[async_trait]
pub trait IndexerClient: Send + Sync {
    async fn get_block_head_level(&self) -> Result<u64, ChainClientError>;

    async fn get_operation_group(
        &self,
        operation_group_hash: &str,
    ) -> Result<Vec<OperationRow>, ChainClientError>;

    /// waits until the operation group shows up in a block.
    ///
    /// stops with `ConfirmationTimeout` once more than `settings.blocks` blocks
    /// were baked or `settings.timeout` elapsed, and with `Cancelled` when the
    /// token fires. an included group that was not applied is a
    /// `TransactionError`.
    async fn await_operation_confirmation(
        &self,
        operation_group_hash: &str,
        settings: ConfirmationSettings,
        cancel: &CancellationToken,
    ) -> Result<Confirmation, ChainClientError> {
        let confirmation = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(ChainClientError::Cancelled(format!(
                    "stopped waiting for {operation_group_hash}"
                )));
            }
            polled = tokio::time::timeout(
                settings.timeout,
                self.poll_operation_group(operation_group_hash, settings),
            ) => match polled {
                Ok(result) => result?,
                Err(_) => {
                    return Err(ChainClientError::ConfirmationTimeout(format!(
                        "{operation_group_hash} not confirmed within {}s",
                        settings.timeout.as_secs()
                    )));
                }
            },
        };

        if !confirmation.is_applied() {
            return Err(ChainClientError::TransactionError(format!(
                "{operation_group_hash} included in block {} with status {}",
                confirmation.block_hash, confirmation.status
            )));
        }

        Ok(confirmation)
    }

    async fn poll_operation_group(
        &self,
        operation_group_hash: &str,
        settings: ConfirmationSettings,
    ) -> Result<Confirmation, ChainClientError> {
        let initial_level = self.get_block_head_level().await?;
        info!("waiting for {operation_group_hash} from level {initial_level}");

        loop {
            let rows = self.get_operation_group(operation_group_hash).await?;
            if let Some(confirmation) = merge_operation_rows(operation_group_hash, rows) {
                return Ok(confirmation);
            }

            tokio::time::sleep(settings.block_time).await;

            let current_level = self.get_block_head_level().await?;
            debug!("{operation_group_hash} not found, head at level {current_level}");

            if current_level > initial_level + settings.blocks {
                return Err(ChainClientError::ConfirmationTimeout(format!(
                    "{operation_group_hash} not found after {} blocks",
                    current_level - initial_level
                )));
            }
        }
    }
}

pub struct ConseilClient {
    url: String,
    api_key: String,
    network: String,
    http: reqwest::Client,
}

impl ConseilClient {
    pub fn new(url: &str, api_key: &str, network: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            network: network.to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn entity_url(&self, entity: &str) -> String {
        format!("{}/v2/data/tezos/{}/{entity}", self.url, self.network)
    }

    async fn query<T: serde::de::DeserializeOwned>(
        &self,
        entity: &str,
        query: &ConseilQuery,
    ) -> Result<Vec<T>, ChainClientError> {
        let response = self
            .http
            .post(self.entity_url(entity))
            .header("apiKey", &self.api_key)
            .json(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChainClientError::QueryError(format!(
                "conseil {entity} query returned {status}: {body}"
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl IndexerClient for ConseilClient {
    async fn get_block_head_level(&self) -> Result<u64, ChainClientError> {
        let blocks: Vec<BlockRow> = self.query("blocks", &block_head_query()).await?;

        blocks
            .first()
            .map(|b| b.level)
            .ok_or_else(|| ChainClientError::QueryError("no block head in indexer".to_string()))
    }

    async fn get_operation_group(
        &self,
        operation_group_hash: &str,
    ) -> Result<Vec<OperationRow>, ChainClientError> {
        self.query("operations", &operation_group_query(operation_group_hash))
            .await
    }
}
