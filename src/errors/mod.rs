//! Centralized error handling for the lineup service
//!
//! Errors are split in two layers:
//!
//! - **Source Errors**: transport-level failures talking to an upstream
//!   catalog (timeouts, status codes, redirect loops, decompression, parsing)
//! - **Application Errors**: what a request can fail with, and what the web
//!   layer maps onto HTTP status codes
//!
//! # Usage
//!
//! ```rust
//! use m3u_lineup::errors::{AppError, AppResult};
//!
//! fn require_service(service: Option<&str>) -> AppResult<&str> {
//!     service.ok_or(AppError::MissingService)
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Source Results
pub type SourceResult<T> = Result<T, SourceError>;
