//! Shared types and utilities for the Tekton pipeline explorer

pub mod config;
pub mod error;
pub mod types;

pub use config::{CacheConfig, CliConfig, ExplorerConfig, LoggingConfig, WatchConfig};
pub use error::{Result, TektonError};
pub use types::*;
