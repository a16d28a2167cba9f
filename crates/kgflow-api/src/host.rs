//! Host capability trait.
//!
//! The workflow engine that runs a node supplies input items, resolves
//! parameters, stores credentials and owns the HTTP primitive. Nodes only
//! see this trait, so any runtime (the bundled CLI, a test double, an
//! embedding application) can drive them.

use kgflow_core::{Credentials, Result};
use serde_json::Value;

use crate::request::HttpRequest;

#[async_trait::async_trait]
pub trait Host: Send + Sync {
    /// Items the node is invoked with. One output record is produced per item.
    fn input_items(&self) -> &[Value];

    /// Resolve a node parameter for the given item. Returns `default` when
    /// the parameter is not configured, and `MissingParameter` when there is
    /// no default either.
    fn get_parameter(&self, name: &str, item_index: usize, default: Option<Value>)
        -> Result<Value>;

    /// Fetch a named credential set.
    async fn get_credentials(&self, name: &str) -> Result<Credentials>;

    /// Issue one HTTP call and return the decoded JSON response.
    /// Non-2xx responses and transport failures are errors.
    async fn http_request(&self, request: HttpRequest) -> Result<Value>;

    /// Whether a failing item becomes an error record instead of aborting.
    fn continue_on_fail(&self) -> bool {
        false
    }

    /// Identifier of the running workflow, used to synthesize session ids.
    fn workflow_id(&self) -> &str;

    /// Identifier of the current execution of that workflow.
    fn execution_id(&self) -> &str;
}
