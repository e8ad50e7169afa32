use axum::Json;
use serde::Serialize;
use tracing::debug;

use crate::routes::{RouteDescription, RouteTable};

#[derive(Debug, Serialize)]
pub struct Health {
    pub ok: bool,
}

/// Handler for `GET /`. Never touches the node.
pub fn health() -> Json<Health> {
    Json(Health { ok: true })
}

/// Handler for `GET /describe`
pub fn describe(routes: &RouteTable) -> Json<Vec<RouteDescription>> {
    let described = routes.describe();
    debug!("describe -> {} routes", described.len());
    Json(described)
}
