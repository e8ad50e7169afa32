use std::collections::BTreeMap;

use alloy_primitives::{Address, Bloom, Bytes, B256, U256, U64};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::params::{BlockNumberOrTag, Quantity};

/// JSON-RPC request sent to the Ethereum node
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'static str,
    pub params: Value,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: &'static str, params: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

/// JSON-RPC response from the Ethereum node
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse {
    /// May be null when the node could not parse the request at all
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error object
#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    /// Revert payload or node-specific detail, logged only
    #[serde(default)]
    pub data: Option<Value>,
}

/// Parameters for `eth_call`. `gas_price` is looked up from the node,
/// never taken from the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallParams {
    pub from: Address,
    pub to: Address,
    pub gas: Quantity,
    pub gas_price: Quantity,
    pub value: Quantity,
    pub data: Bytes,
}

/// Filter object for `eth_getLogs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    pub from_block: BlockNumberOrTag,
    pub to_block: BlockNumberOrTag,
    /// One entry per topic position; each position is an OR-list of topics.
    pub topics: Vec<Vec<B256>>,
}

impl LogFilter {
    /// Filter matching a single topic in the first position.
    ///
    /// This is the only shape the REST surface can express: one topic
    /// segment in the path, wrapped as `[[topic]]`.
    pub fn single_topic(from_block: BlockNumberOrTag, to_block: BlockNumberOrTag, topic: B256) -> Self {
        Self {
            from_block,
            to_block,
            topics: vec![vec![topic]],
        }
    }
}

/// Block object as returned by `eth_getBlockBy*`.
///
/// Fork-specific fields this type does not name are kept in `other` and
/// written back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Null for pending blocks
    pub number: Option<U64>,
    pub hash: Option<B256>,
    pub parent_hash: B256,
    #[serde(default)]
    pub nonce: Option<Bytes>,
    pub sha3_uncles: B256,
    #[serde(default)]
    pub logs_bloom: Option<Bloom>,
    pub transactions_root: B256,
    pub state_root: B256,
    pub receipts_root: B256,
    #[serde(default)]
    pub miner: Option<Address>,
    #[serde(default)]
    pub difficulty: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_difficulty: Option<U256>,
    pub extra_data: Bytes,
    #[serde(default)]
    pub size: Option<U64>,
    pub gas_limit: U64,
    pub gas_used: U64,
    pub timestamp: U64,
    pub transactions: BlockTransactions,
    #[serde(default)]
    pub uncles: Vec<B256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_fee_per_gas: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mix_hash: Option<B256>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// Transactions of a block: hashes only, or full objects when requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockTransactions {
    Hashes(Vec<B256>),
    Full(Vec<Transaction>),
}

impl BlockTransactions {
    pub fn len(&self) -> usize {
        match self {
            BlockTransactions::Hashes(hashes) => hashes.len(),
            BlockTransactions::Full(txs) => txs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Transaction object as returned by `eth_getTransactionBy*`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub hash: B256,
    pub nonce: U64,
    /// Null while pending
    pub block_hash: Option<B256>,
    pub block_number: Option<U64>,
    pub transaction_index: Option<U64>,
    pub from: Address,
    /// Null for contract creation
    pub to: Option<Address>,
    pub value: U256,
    pub gas: U64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    pub input: Bytes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<U256>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub tx_type: Option<U64>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// Log entry as returned by `eth_getLogs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    pub block_number: Option<U64>,
    pub block_hash: Option<B256>,
    pub transaction_hash: Option<B256>,
    pub transaction_index: Option<U64>,
    pub log_index: Option<U64>,
    #[serde(default)]
    pub removed: bool,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}
