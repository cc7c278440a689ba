//! Core types and trait definitions for the vigil incident service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod error;
pub mod history;
pub mod incident;
pub mod notify;
pub mod seen;
pub mod service;
pub mod status;
pub mod store;
pub mod view;

pub use error::{Error, Result};
