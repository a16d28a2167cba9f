//! kgflow core - DTOs, configuration and error handling

pub mod config;
pub mod error;
pub mod types;

pub use config::{ConnectivityProbe, KgflowConfig};
pub use error::{Error, Result};
pub use types::*;
