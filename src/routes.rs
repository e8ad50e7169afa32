//! Route manifest and dispatch.
//!
//! Routes are declared once, in order, as path templates whose `{name}`
//! segments carry a regex. The manifest is compiled at startup into full-path
//! regexes; the first template that matches wins. `/describe` renders the
//! same manifest, so what it reports is exactly what is dispatched.
//!
//! ```text
//! GET /                                     health
//! GET /block/last[/full]                    head block
//! GET /block/last/height                    head block number
//! GET /block/{hash}[/full]                  block by hash
//! GET /block/{height}[/full]                block by number
//! GET /block/{height}/transaction/{id}      transaction by block and index
//! GET /transaction/{hash}                   transaction by hash
//! GET /gasprice                             gas price
//! GET /balance/{address}                    balance
//! GET /log/{from}/{to}/{topic}              logs for one topic
//! GET /call/{from}/{to}/{gas}/{value}/{data} eth_call
//! GET /describe                             this table
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{Method, Uri};
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::methods::{account, block, logs, meta, transaction};
use crate::server::AppState;

/// `0x` prefix only; length and alphabet are checked by the parameter
/// validator so malformed values get a 400 rather than a 404.
const HEX_PREFIXED: &str = "0x[^/]*";
const DECIMAL: &str = "[0-9]+";
const BLOCK_TAG: &str = "0x[0-9A-Fa-f]+|latest|earliest|pending";
const ANY_SEGMENT: &str = "[^/]+";

/// What a matched route does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Root,
    LastBlock { full: bool },
    LastBlockHeight,
    BlockByHash { full: bool },
    BlockByHeight { full: bool },
    TransactionInBlock,
    TransactionByHash,
    GasPrice,
    Balance,
    Logs,
    Call,
    Describe,
}

/// One entry of the route manifest.
#[derive(Debug, Clone)]
pub struct RouteDef {
    pub template: &'static str,
    pub method: Method,
    pub endpoint: Endpoint,
    /// Regex per `{name}` segment of the template
    pub segments: &'static [(&'static str, &'static str)],
}

impl RouteDef {
    fn get(
        template: &'static str,
        endpoint: Endpoint,
        segments: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self {
            template,
            method: Method::GET,
            endpoint,
            segments,
        }
    }
}

/// The full manifest, in match order.
///
/// Address and hash segments are routed on their `0x` prefix alone, and
/// call data and topics on any segment, so `/describe` reports `0x[^/]*`
/// and `[^/]+` for them. Length and hex alphabet are enforced by
/// [`crate::params`] once the route is chosen.
pub fn route_definitions() -> Vec<RouteDef> {
    use Endpoint::*;

    vec![
        RouteDef::get("/", Root, &[]),
        RouteDef::get("/block/last", LastBlock { full: false }, &[]),
        RouteDef::get("/block/last/full", LastBlock { full: true }, &[]),
        RouteDef::get("/block/last/height", LastBlockHeight, &[]),
        RouteDef::get(
            "/block/{hash}",
            BlockByHash { full: false },
            &[("hash", HEX_PREFIXED)],
        ),
        RouteDef::get(
            "/block/{hash}/full",
            BlockByHash { full: true },
            &[("hash", HEX_PREFIXED)],
        ),
        RouteDef::get(
            "/block/{height}",
            BlockByHeight { full: false },
            &[("height", DECIMAL)],
        ),
        RouteDef::get(
            "/block/{height}/full",
            BlockByHeight { full: true },
            &[("height", DECIMAL)],
        ),
        RouteDef::get(
            "/block/{height}/transaction/{id}",
            TransactionInBlock,
            &[("height", DECIMAL), ("id", DECIMAL)],
        ),
        RouteDef::get(
            "/transaction/{hash}",
            TransactionByHash,
            &[("hash", HEX_PREFIXED)],
        ),
        RouteDef::get("/gasprice", GasPrice, &[]),
        RouteDef::get(
            "/balance/{address}",
            Balance,
            &[("address", HEX_PREFIXED)],
        ),
        RouteDef::get(
            "/log/{from}/{to}/{topic}",
            Logs,
            &[("from", BLOCK_TAG), ("to", BLOCK_TAG), ("topic", ANY_SEGMENT)],
        ),
        RouteDef::get(
            "/call/{from}/{to}/{gas}/{value}/{data}",
            Call,
            &[
                ("from", HEX_PREFIXED),
                ("to", HEX_PREFIXED),
                ("gas", DECIMAL),
                ("value", DECIMAL),
                ("data", ANY_SEGMENT),
            ],
        ),
        RouteDef::get("/describe", Describe, &[]),
    ]
}

/// Build the anchored full-path regex for a template.
fn compile_template(def: &RouteDef) -> Result<Regex, regex::Error> {
    let mut pattern = String::from("^");
    let mut rest = def.template;

    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let end = start + len;
        let name = &rest[start + 1..end];
        let segment = def
            .segments
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, p)| *p)
            .unwrap_or(ANY_SEGMENT);

        pattern.push_str(&regex::escape(&rest[..start]));
        pattern.push_str(&format!("(?P<{}>{})", name, segment));
        rest = &rest[end + 1..];
    }

    pattern.push_str(&regex::escape(rest));
    pattern.push('$');
    Regex::new(&pattern)
}

/// Captured segments are matched on the raw path and percent-decoded
/// afterwards. Bytes that are not UTF-8 become U+FFFD and fail validation.
fn decode_segment(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// A compiled manifest entry.
#[derive(Debug)]
pub struct Route {
    pub def: RouteDef,
    pub regex: Regex,
}

/// Named path segments captured for a matched route.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PathParams(HashMap<String, String>);

impl PathParams {
    /// Value of a named segment. Every named group of a matched route is
    /// non-optional, so absent names only come from a manifest typo and are
    /// reported as an empty value, which fails validation.
    pub fn get(&self, name: &str) -> &str {
        self.0.get(name).map(String::as_str).unwrap_or_default()
    }
}

/// Outcome of looking a request up in the manifest.
#[derive(Debug)]
pub enum RouteMatch<'a> {
    Found { route: &'a Route, params: PathParams },
    MethodNotAllowed,
    NotFound,
}

/// Route as reported by `/describe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDescription {
    pub route: String,
    pub methods: Vec<String>,
    pub path_regexp: String,
}

/// The compiled, ordered route manifest.
#[derive(Debug)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Compile the default manifest.
    pub fn new() -> Result<Self, regex::Error> {
        Self::from_definitions(route_definitions())
    }

    pub fn from_definitions(defs: Vec<RouteDef>) -> Result<Self, regex::Error> {
        let routes = defs
            .into_iter()
            .map(|def| compile_template(&def).map(|regex| Route { def, regex }))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { routes })
    }

    /// First route whose template matches `path`.
    pub fn find(&self, method: &Method, path: &str) -> RouteMatch<'_> {
        let mut path_matched = false;

        for route in &self.routes {
            let Some(captures) = route.regex.captures(path) else {
                continue;
            };
            if route.def.method != *method {
                path_matched = true;
                continue;
            }

            let params = route
                .regex
                .capture_names()
                .flatten()
                .filter_map(|name| {
                    captures
                        .name(name)
                        .map(|m| (name.to_string(), decode_segment(m.as_str())))
                })
                .collect();
            return RouteMatch::Found {
                route,
                params: PathParams(params),
            };
        }

        if path_matched {
            RouteMatch::MethodNotAllowed
        } else {
            RouteMatch::NotFound
        }
    }

    pub fn describe(&self) -> Vec<RouteDescription> {
        self.routes
            .iter()
            .map(|route| RouteDescription {
                route: route.def.template.to_string(),
                methods: vec![route.def.method.to_string()],
                path_regexp: route.regex.as_str().to_string(),
            })
            .collect()
    }
}

/// Axum entry point: every request goes through the manifest.
pub async fn dispatch(State(state): State<Arc<AppState>>, method: Method, uri: Uri) -> Response {
    let path = uri.path();

    match state.routes.find(&method, path) {
        RouteMatch::Found { route, params } => {
            debug!(route = route.def.template, "Dispatching request");
            handle(route.def.endpoint, &params, &state).await
        }
        RouteMatch::MethodNotAllowed => ApiError::MethodNotAllowed {
            method: method.to_string(),
            path: path.to_string(),
        }
        .into_response(),
        RouteMatch::NotFound => {
            debug!(path, "No route matched");
            ApiError::RouteNotFound(path.to_string()).into_response()
        }
    }
}

async fn handle(endpoint: Endpoint, params: &PathParams, app: &AppState) -> Response {
    let client = app.client.as_ref();

    match endpoint {
        Endpoint::Root => meta::health().into_response(),
        Endpoint::Describe => meta::describe(&app.routes).into_response(),
        Endpoint::LastBlock { full } => block::last_block(client, full).await.into_response(),
        Endpoint::LastBlockHeight => block::last_block_height(client).await.into_response(),
        Endpoint::BlockByHash { full } => block::block_by_hash(client, params.get("hash"), full)
            .await
            .into_response(),
        Endpoint::BlockByHeight { full } => {
            block::block_by_height(client, params.get("height"), full)
                .await
                .into_response()
        }
        Endpoint::TransactionInBlock => transaction::transaction_in_block(
            client,
            params.get("height"),
            params.get("id"),
        )
        .await
        .into_response(),
        Endpoint::TransactionByHash => {
            transaction::transaction_by_hash(client, params.get("hash"))
                .await
                .into_response()
        }
        Endpoint::GasPrice => account::gas_price(client).await.into_response(),
        Endpoint::Balance => account::balance(client, params.get("address"))
            .await
            .into_response(),
        Endpoint::Logs => logs::logs(
            client,
            params.get("from"),
            params.get("to"),
            params.get("topic"),
        )
        .await
        .into_response(),
        Endpoint::Call => account::call(
            client,
            account::CallArgs {
                from: params.get("from"),
                to: params.get("to"),
                gas: params.get("gas"),
                value: params.get("value"),
                data: params.get("data"),
            },
        )
        .await
        .into_response(),
    }
}
