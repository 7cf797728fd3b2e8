//! HTTP inbound adapter exposing the REST API.
//!
//! Handlers parse JSON into domain requests, resolve the operator session,
//! and delegate to the driving ports held in [`state::HttpState`].

pub mod access;
pub mod auth;
pub mod error;
pub mod health;
pub mod phases;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod tracking;
pub mod transports;
pub(crate) mod validation;

pub use error::ApiResult;
