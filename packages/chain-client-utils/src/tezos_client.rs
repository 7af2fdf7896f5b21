use std::time::Duration;

use crate::{
    common::error::ChainClientError,
    tezos::{base_client::TezosBaseClient, rpc_client::NodeRpcClient, HEAD_BRANCH_OFFSET},
};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct TezosClient {
    node_url: String,
    branch_offset: u32,
    http: reqwest::Client,
}

impl TezosClient {
    pub fn new(node_url: &str, branch_offset: Option<u32>) -> Result<Self, ChainClientError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            node_url: node_url.trim_end_matches('/').to_string(),
            branch_offset: branch_offset.unwrap_or(HEAD_BRANCH_OFFSET),
            http,
        })
    }
}

impl NodeRpcClient for TezosClient {
    fn node_url(&self) -> String {
        self.node_url.clone()
    }

    fn http_client(&self) -> &reqwest::Client {
        &self.http
    }
}

impl TezosBaseClient for TezosClient {
    fn branch_offset(&self) -> u32 {
        self.branch_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_defaults() {
        let client = TezosClient::new("http://localhost:8732/", None).unwrap();

        assert_eq!(client.node_url(), "http://localhost:8732");
        assert_eq!(client.branch_offset(), HEAD_BRANCH_OFFSET);

        let client = TezosClient::new("http://localhost:8732", Some(2)).unwrap();
        assert_eq!(client.branch_offset(), 2);
    }
}
