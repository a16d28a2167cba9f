//! Node trait and the shared per-item execution loop.

use kgflow_api::Host;
use kgflow_core::{Error, Result};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::params::ItemContext;
use crate::schema::NodeDescription;

/// One adapter: a manifest plus the per-item operation logic.
///
/// Implementations only map parameters to one `GraphApi` call and shape the
/// response; iteration and failure policy live in [`execute`].
#[async_trait::async_trait]
pub trait Node: Send + Sync {
    fn description(&self) -> &NodeDescription;

    fn name(&self) -> &str {
        self.description().name
    }

    /// Run `operation` for one item and return its output record.
    async fn execute_item(&self, ctx: &ItemContext<'_>, operation: &str) -> Result<Value>;

    /// Record emitted for a failed item when continue-on-failure is set.
    fn error_record(&self, operation: &str, message: &str) -> Value {
        json!({ "error": message, "operation": operation })
    }
}

/// Run a node over every input item, sequentially.
///
/// The operation is read once, from item 0. A failing item either becomes an
/// error record (host continues on failure) or aborts the remaining items.
pub async fn execute(node: &dyn Node, host: &dyn Host) -> Result<Vec<Value>> {
    let desc = node.description();
    let default_op = desc.default_operation().map(|op| json!(op));
    let operation = host.get_parameter("operation", 0, default_op)?;
    let operation = operation
        .as_str()
        .ok_or_else(|| Error::invalid_parameter("operation", "expected a string"))?
        .to_string();
    if !desc.has_operation(&operation) {
        return Err(Error::unknown_operation(desc.name, operation));
    }

    let count = host.input_items().len();
    info!(node = desc.name, operation = %operation, items = count, "executing node");

    let mut records = Vec::with_capacity(count);
    for index in 0..count {
        let ctx = ItemContext::new(host, index);
        match node.execute_item(&ctx, &operation).await {
            Ok(record) => records.push(record),
            Err(e) if host.continue_on_fail() => {
                warn!(node = desc.name, index, error = %e, "item failed, continuing");
                records.push(node.error_record(&operation, &e.to_string()));
            }
            Err(e) => return Err(Error::node(desc.name, e.to_string())),
        }
    }
    Ok(records)
}

fn spread_into(target: &mut Map<String, Value>, response: Value) {
    match response {
        Value::Object(map) => target.extend(map),
        Value::Null => {}
        other => {
            target.insert("data".into(), other);
        }
    }
}

/// `{...response, ...fields}`: the listed fields win over the response.
pub fn response_then(response: Value, fields: Value) -> Value {
    let mut out = Map::new();
    spread_into(&mut out, response);
    spread_into(&mut out, fields);
    Value::Object(out)
}

/// `{...fields, ...response}`: the response wins over the listed fields.
pub fn fields_then(fields: Value, response: Value) -> Value {
    let mut out = Map::new();
    spread_into(&mut out, fields);
    spread_into(&mut out, response);
    Value::Object(out)
}

/// `response[key]` if it is present, else an empty array.
pub fn list_or_empty(response: &Value, key: &str) -> Value {
    match response.get(key) {
        Some(v) if !v.is_null() => v.clone(),
        _ => json!([]),
    }
}

/// Length of `response[key]` when it is an array, else 0.
pub fn count_of(response: &Value, key: &str) -> usize {
    response
        .get(key)
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}
