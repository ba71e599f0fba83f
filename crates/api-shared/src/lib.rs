//! # API Shared
//!
//! Shared utilities and definitions for the Solace REST API.
//!
//! Contains:
//! - Wire DTOs (`dto` module) with serde and OpenAPI schemas
//! - Shared services like `HealthService`
//! - Authentication utilities for admin endpoints
//!
//! Used by `api-rest` and the `solace-run` boot binary.

pub mod auth;
pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
