//! FindMyStage Core: error taxonomy and application configuration.

pub mod config;
pub mod error;

pub use config::{AppConfig, DataPaths};
pub use error::{Error, Result};
