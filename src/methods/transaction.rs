use axum::Json;
use tracing::{info, warn};

use super::node_failure;
use crate::error::ApiError;
use crate::node::{NodeClient, Transaction};
use crate::params::{parse_hash, parse_quantity};

/// Handler for `GET /transaction/{hash}`
pub async fn transaction_by_hash(
    client: &dyn NodeClient,
    hash: &str,
) -> Result<Json<Transaction>, ApiError> {
    let hash = parse_hash(hash)?;
    info!(%hash, "Request received to get a transaction by hash");

    client
        .transaction_by_hash(hash)
        .await
        .map_err(node_failure("eth_getTransactionByHash"))?
        .map(Json)
        .ok_or_else(|| {
            warn!(%hash, "Transaction hash does not exist");
            ApiError::NotFound(format!("transaction {}", hash))
        })
}

/// Handler for `GET /block/{height}/transaction/{id}`
///
/// Both segments are validated before the node is asked anything.
pub async fn transaction_in_block(
    client: &dyn NodeClient,
    height: &str,
    index: &str,
) -> Result<Json<Transaction>, ApiError> {
    let height = parse_quantity(height)?;
    let index = parse_quantity(index)?;
    info!(
        height = height.as_u64(),
        index = index.as_u64(),
        "Request received to get a transaction by block height and index"
    );

    client
        .transaction_by_block_number_and_index(height, index)
        .await
        .map_err(node_failure("eth_getTransactionByBlockNumberAndIndex"))?
        .map(Json)
        .ok_or_else(|| {
            warn!(height = height.as_u64(), index = index.as_u64(), "Transaction not found");
            ApiError::NotFound(format!("transaction {} in block {}", index, height))
        })
}
