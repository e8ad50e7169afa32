use axum::Json;
use serde::Serialize;
use tracing::{info, warn};

use super::node_failure;
use crate::error::ApiError;
use crate::node::{Block, NodeClient};
use crate::params::{parse_hash, parse_quantity, Quantity};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastBlockHeight {
    pub last_block_height: u64,
}

async fn fetch_by_number(
    client: &dyn NodeClient,
    number: Quantity,
    full: bool,
) -> Result<Json<Block>, ApiError> {
    match client
        .block_by_number(number, full)
        .await
        .map_err(node_failure("eth_getBlockByNumber"))?
    {
        Some(block) => Ok(Json(block)),
        None => {
            warn!(height = number.as_u64(), full, "Block not found");
            Err(ApiError::NotFound(format!("block {}", number)))
        }
    }
}

/// Handler for `GET /block/last[/full]`: head number first, then the block.
pub async fn last_block(client: &dyn NodeClient, full: bool) -> Result<Json<Block>, ApiError> {
    info!(full, "Request received to get the last block");

    let head = client
        .block_number()
        .await
        .map_err(node_failure("eth_blockNumber"))?;
    fetch_by_number(client, head, full).await
}

/// Handler for `GET /block/last/height`
pub async fn last_block_height(client: &dyn NodeClient) -> Result<Json<LastBlockHeight>, ApiError> {
    info!("Request received to get the last block height");

    let head = client
        .block_number()
        .await
        .map_err(node_failure("eth_blockNumber"))?;
    Ok(Json(LastBlockHeight {
        last_block_height: head.as_u64(),
    }))
}

/// Handler for `GET /block/{hash}[/full]`
pub async fn block_by_hash(
    client: &dyn NodeClient,
    hash: &str,
    full: bool,
) -> Result<Json<Block>, ApiError> {
    let hash = parse_hash(hash)?;
    info!(%hash, full, "Request received to get a block by hash");

    match client
        .block_by_hash(hash, full)
        .await
        .map_err(node_failure("eth_getBlockByHash"))?
    {
        Some(block) => Ok(Json(block)),
        None => {
            warn!(%hash, "Block not found");
            Err(ApiError::NotFound(format!("block {}", hash)))
        }
    }
}

/// Handler for `GET /block/{height}[/full]`
pub async fn block_by_height(
    client: &dyn NodeClient,
    height: &str,
    full: bool,
) -> Result<Json<Block>, ApiError> {
    let height = parse_quantity(height)?;
    info!(height = height.as_u64(), full, "Request received to get a block by height");

    fetch_by_number(client, height, full).await
}
