//! Common utilities shared by the tracker service and the CLI.
//!
//! This crate provides:
//! - Unified error handling over domain, file and CSV failures
//! - Configuration structures

pub mod config;
pub mod error;

pub use config::*;
pub use error::{AppError, AppResult, OptionExt};
