use axum::Json;
use tracing::info;

use super::node_failure;
use crate::error::ApiError;
use crate::node::{Log, LogFilter, NodeClient};
use crate::params::{parse_block_number_or_tag, parse_hash};

/// Handler for `GET /log/{from}/{to}/{topic}`
///
/// The path carries exactly one topic, which is matched in the first topic
/// position. An empty result is a successful, empty list.
pub async fn logs(
    client: &dyn NodeClient,
    from: &str,
    to: &str,
    topic: &str,
) -> Result<Json<Vec<Log>>, ApiError> {
    let from = parse_block_number_or_tag(from)?;
    let to = parse_block_number_or_tag(to)?;
    let topic = parse_hash(topic)?;
    info!(%from, %to, %topic, "Request received to get logs");

    let filter = LogFilter::single_topic(from, to, topic);
    let logs = client
        .logs(&filter)
        .await
        .map_err(node_failure("eth_getLogs"))?;

    info!(count = logs.len(), "Logs fetched");
    Ok(Json(logs))
}
