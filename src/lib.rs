//! Ethereum REST Gateway
//!
//! This crate serves a small REST API over an Ethereum node. Each request
//! names what it wants in its path (a block height, a transaction hash, an
//! address); the gateway validates those segments, forwards the equivalent
//! JSON-RPC call to the node and returns the result as JSON.
//!
//! # Architecture
//!
//! ```text
//! HTTP client (curl, browser, service)
//!     |
//!     | GET /block/{height}, /balance/{address}, ...
//!     v
//! REST gateway (this crate)
//!     |
//!     | eth_* JSON-RPC calls
//!     v
//! Ethereum node
//! ```
//!
//! # Modules
//!
//! - `config` - Environment and configuration management
//! - `server` - HTTP server setup, middleware and shared state
//! - `routes` - Route manifest, dispatch and `/describe`
//! - `methods` - Endpoint handlers (blocks, transactions, accounts, logs)
//! - `params` - Path parameter validation
//! - `node` - Ethereum node client (JSON-RPC over HTTP)
//! - `error` - Error to HTTP status mapping

pub mod config;
pub mod error;
pub mod methods;
pub mod node;
pub mod params;
pub mod routes;
pub mod server;
