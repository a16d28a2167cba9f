//! Error types for kgflow

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("request failed with status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("{0}")]
    Network(String),

    #[error("invalid base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("missing required parameter: {0}")]
    MissingParameter(String),

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("unknown operation '{operation}' for node {node}")]
    UnknownOperation { node: String, operation: String },

    #[error("node not found: {0}")]
    UnknownNode(String),

    #[error("invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("credentials not found: {0}")]
    CredentialsNotFound(String),

    #[error("{node}: {message}")]
    Node { node: String, message: String },

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn invalid_base_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidBaseUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn missing(name: impl Into<String>) -> Self {
        Self::MissingParameter(name.into())
    }

    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown_operation(node: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::UnknownOperation {
            node: node.into(),
            operation: operation.into(),
        }
    }

    /// Wrap an item failure so it aborts the run, keeping the original message.
    pub fn node(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Node {
            node: node.into(),
            message: message.into(),
        }
    }
}
