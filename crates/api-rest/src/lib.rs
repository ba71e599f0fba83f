//! # API REST
//!
//! REST API implementation for Solace.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - SSE streaming of live conversation updates
//! - The safety-classifier collaborator
//! - OpenAPI/Swagger documentation
//!
//! Uses `api-shared` for common types and utilities.

#![warn(rust_2018_idioms)]

pub mod events;
pub mod safety;
pub mod server;

pub use server::{build_router, resolve_core_config, AppState};
