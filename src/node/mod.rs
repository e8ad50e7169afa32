//! Ethereum node access.
//!
//! [`NodeClient`] is the capability set the HTTP handlers depend on;
//! [`EthClient`] implements it over JSON-RPC/HTTP. Handlers only ever see
//! `Arc<dyn NodeClient>`, so tests can substitute their own implementation.

pub mod client;
pub mod types;

pub use client::EthClient;
pub use types::{Block, BlockTransactions, CallParams, Log, LogFilter, Transaction};

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use thiserror::Error;

use crate::params::{BlockNumberOrTag, Quantity};

/// Failures talking to the upstream node.
///
/// An absent entity is not an error: lookups return `Ok(None)` for a null
/// result.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("request to node failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("node returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("node returned RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("malformed {method} response: {source}")]
    Decode {
        method: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{method} result {value} is out of range")]
    OutOfRange { method: &'static str, value: String },

    #[error("no result in {0} response")]
    MissingResult(&'static str),

    #[error("response id {got:?} does not match request id {expected}")]
    IdMismatch { expected: u64, got: Option<u64> },
}

/// Operations the HTTP layer needs from an Ethereum node.
///
/// Implementations must be safe to share between concurrent requests.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// `eth_blockNumber`
    async fn block_number(&self) -> Result<Quantity, NodeError>;

    /// `eth_getBlockByNumber`
    async fn block_by_number(
        &self,
        number: Quantity,
        full: bool,
    ) -> Result<Option<Block>, NodeError>;

    /// `eth_getBlockByHash`
    async fn block_by_hash(&self, hash: B256, full: bool) -> Result<Option<Block>, NodeError>;

    /// `eth_getTransactionByHash`
    async fn transaction_by_hash(&self, hash: B256) -> Result<Option<Transaction>, NodeError>;

    /// `eth_getTransactionByBlockNumberAndIndex`
    async fn transaction_by_block_number_and_index(
        &self,
        number: Quantity,
        index: Quantity,
    ) -> Result<Option<Transaction>, NodeError>;

    /// `eth_getLogs`
    async fn logs(&self, filter: &LogFilter) -> Result<Vec<Log>, NodeError>;

    /// `eth_getBalance` at the latest block, in wei
    async fn get_balance(&self, address: Address) -> Result<U256, NodeError>;

    /// `eth_gasPrice`, in wei
    async fn gas_price(&self) -> Result<Quantity, NodeError>;

    /// `eth_call` against the latest block
    async fn call(&self, params: &CallParams) -> Result<Bytes, NodeError>;
}

/// The block selector `eth_getBalance` and `eth_call` are evaluated at.
pub const STATE_BLOCK: BlockNumberOrTag = BlockNumberOrTag::Latest;
