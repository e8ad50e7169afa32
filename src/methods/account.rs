use alloy_primitives::{Bytes, U256};
use axum::Json;
use serde::Serialize;
use tracing::info;

use super::node_failure;
use crate::error::ApiError;
use crate::node::{CallParams, NodeClient, NodeError};
use crate::params::{parse_address, parse_data, parse_quantity};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GasPrice {
    pub gas_price: u64,
}

/// Balance in wei. Rendered as a plain JSON integer even past `u64::MAX`.
#[derive(Debug, Serialize)]
pub struct Balance {
    pub balance: u128,
}

/// Raw path segments of a `/call` request.
#[derive(Debug, Clone, Copy)]
pub struct CallArgs<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub gas: &'a str,
    pub value: &'a str,
    pub data: &'a str,
}

/// Handler for `GET /gasprice`
pub async fn gas_price(client: &dyn NodeClient) -> Result<Json<GasPrice>, ApiError> {
    info!("Request received to get the current gas price");

    let price = client
        .gas_price()
        .await
        .map_err(node_failure("eth_gasPrice"))?;
    Ok(Json(GasPrice {
        gas_price: price.as_u64(),
    }))
}

/// Handler for `GET /balance/{address}`
pub async fn balance(client: &dyn NodeClient, address: &str) -> Result<Json<Balance>, ApiError> {
    let address = parse_address(address)?;
    info!(%address, "Request received to get a balance");

    let wei = client
        .get_balance(address)
        .await
        .map_err(node_failure("eth_getBalance"))?;
    if wei > U256::from(u128::MAX) {
        return Err(node_failure("eth_getBalance")(NodeError::OutOfRange {
            method: "eth_getBalance",
            value: wei.to_string(),
        }));
    }

    Ok(Json(Balance {
        balance: wei.to::<u128>(),
    }))
}

/// Handler for `GET /call/{from}/{to}/{gas}/{value}/{data}`
///
/// Every segment is validated first. The gas price is then fetched from the
/// node and attached to the call; if that lookup fails the call is not made.
pub async fn call(client: &dyn NodeClient, args: CallArgs<'_>) -> Result<Json<Bytes>, ApiError> {
    let gas = parse_quantity(args.gas)?;
    let value = parse_quantity(args.value)?;
    let from = parse_address(args.from)?;
    let to = parse_address(args.to)?;
    let data = parse_data(args.data)?;
    info!(%from, %to, gas = gas.as_u64(), value = value.as_u64(), "Calling contract");

    let gas_price = client
        .gas_price()
        .await
        .map_err(node_failure("eth_gasPrice"))?;

    let params = CallParams {
        from,
        to,
        gas,
        gas_price,
        value,
        data,
    };
    let result = client
        .call(&params)
        .await
        .map_err(node_failure("eth_call"))?;

    info!(%from, %to, result_len = result.len(), "Contract call succeeded");
    Ok(Json(result))
}
