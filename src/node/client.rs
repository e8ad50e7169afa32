use std::sync::atomic::{AtomicU64, Ordering};

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::types::*;
use super::{NodeClient, NodeError, STATE_BLOCK};
use crate::params::Quantity;

/// JSON-RPC over HTTP client for an Ethereum node.
///
/// Cheap to share: the underlying `reqwest::Client` pools connections and
/// request ids come from an atomic counter.
pub struct EthClient {
    http_client: Client,
    rpc_url: String,
    next_id: AtomicU64,
}

impl EthClient {
    /// Create a new client targeting `rpc_url`.
    pub fn new(rpc_url: &str) -> Self {
        Self::with_client(Client::new(), rpc_url)
    }

    /// Create a client reusing an existing `reqwest::Client`.
    pub fn with_client(http_client: Client, rpc_url: &str) -> Self {
        Self {
            http_client,
            rpc_url: rpc_url.to_string(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Send a JSON-RPC request and return its `result`, `None` if it was null.
    async fn send_request(
        &self,
        method: &'static str,
        params: Value,
    ) -> Result<Option<Value>, NodeError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::new(id, method, params);
        debug!(method, id, "Sending node RPC request");

        let response = self
            .http_client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(method, status = status.as_u16(), "Node returned HTTP error");
            return Err(NodeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        let rpc_response: JsonRpcResponse = serde_json::from_slice(&body)
            .map_err(|source| NodeError::Decode { method, source })?;

        if let Some(err) = rpc_response.error {
            warn!(
                method,
                code = err.code,
                message = %err.message,
                data = ?err.data,
                "Node returned RPC error"
            );
            return Err(NodeError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        if rpc_response.id != Some(id) {
            return Err(NodeError::IdMismatch {
                expected: id,
                got: rpc_response.id,
            });
        }

        Ok(rpc_response.result.filter(|v| !v.is_null()))
    }

    /// Request a result that may legitimately be null.
    async fn request_optional<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: Value,
    ) -> Result<Option<T>, NodeError> {
        match self.send_request(method, params).await? {
            Some(result) => serde_json::from_value(result)
                .map(Some)
                .map_err(|source| NodeError::Decode { method, source }),
            None => Ok(None),
        }
    }

    /// Request a result that must be present.
    async fn request<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: Value,
    ) -> Result<T, NodeError> {
        self.request_optional(method, params)
            .await?
            .ok_or(NodeError::MissingResult(method))
    }
}

#[async_trait]
impl NodeClient for EthClient {
    async fn block_number(&self) -> Result<Quantity, NodeError> {
        self.request("eth_blockNumber", json!([])).await
    }

    async fn block_by_number(
        &self,
        number: Quantity,
        full: bool,
    ) -> Result<Option<Block>, NodeError> {
        self.request_optional("eth_getBlockByNumber", json!([number, full]))
            .await
    }

    async fn block_by_hash(&self, hash: B256, full: bool) -> Result<Option<Block>, NodeError> {
        self.request_optional("eth_getBlockByHash", json!([hash, full]))
            .await
    }

    async fn transaction_by_hash(&self, hash: B256) -> Result<Option<Transaction>, NodeError> {
        self.request_optional("eth_getTransactionByHash", json!([hash]))
            .await
    }

    async fn transaction_by_block_number_and_index(
        &self,
        number: Quantity,
        index: Quantity,
    ) -> Result<Option<Transaction>, NodeError> {
        self.request_optional(
            "eth_getTransactionByBlockNumberAndIndex",
            json!([number, index]),
        )
        .await
    }

    async fn logs(&self, filter: &LogFilter) -> Result<Vec<Log>, NodeError> {
        self.request("eth_getLogs", json!([filter])).await
    }

    async fn get_balance(&self, address: Address) -> Result<U256, NodeError> {
        self.request("eth_getBalance", json!([address, STATE_BLOCK]))
            .await
    }

    async fn gas_price(&self) -> Result<Quantity, NodeError> {
        self.request("eth_gasPrice", json!([])).await
    }

    async fn call(&self, params: &CallParams) -> Result<Bytes, NodeError> {
        self.request("eth_call", json!([params, STATE_BLOCK])).await
    }
}
