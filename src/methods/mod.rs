//! REST endpoint handlers.
//!
//! Each handler validates its path parameters, makes its node round trip(s)
//! and returns either a JSON body or an [`ApiError`](crate::error::ApiError).

pub mod account;
pub mod block;
pub mod logs;
pub mod meta;
pub mod transaction;

use tracing::warn;

use crate::error::ApiError;
use crate::node::NodeError;

/// Log an upstream failure at warn level and turn it into a 424.
pub(crate) fn node_failure(call: &'static str) -> impl Fn(NodeError) -> ApiError {
    move |err| {
        warn!(call, error = %err, "Node request failed");
        ApiError::Dependency(err)
    }
}
