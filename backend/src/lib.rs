//! Authgate Backend Library
//!
//! Credential-to-token lifecycle and request authorization, exposed as a
//! library so integration tests can build the router directly.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
