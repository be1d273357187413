//! Kunai CalDAV/CardDAV server: salvo HTTP surface over the query engine.
//!
//! ## Module Organization
//!
//! - `app`: routes and method handlers
//! - `bootstrap`: default principal and collections for single-user mode
//! - `config`: settings injection
//! - `error`: HTTP-layer errors
//! - `middleware`: authentication
//! - `store_handler`: store injection

pub mod app;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod middleware;
pub mod store_handler;
