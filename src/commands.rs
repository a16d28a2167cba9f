//! Command implementations behind the `kgflow` binary.
//!
//! Each returns the JSON the binary prints, so the same paths are driven
//! from integration tests without spawning a process.

use anyhow::{anyhow, bail, Context};
use kgflow_api::{CredentialDescriptor, ReqwestTransport, Transport};
use kgflow_core::{ConnectivityProbe, KgflowConfig, CREDENTIALS_NAME};
use kgflow_nodes::{LocalHost, NodeRegistry, ToolDefinition, ToolRunner};
use serde_json::{json, Map, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Load config from `path` (or the default location) and apply env overrides.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<KgflowConfig> {
    match path {
        Some(p) => {
            let mut config = KgflowConfig::load(p)?;
            config.apply_env();
            Ok(config)
        }
        None => Ok(KgflowConfig::discover()?),
    }
}

/// reqwest transport honoring the configured timeout.
pub fn transport_for(config: &KgflowConfig) -> anyhow::Result<Arc<dyn Transport>> {
    let transport = match config.timeout_secs {
        Some(secs) => ReqwestTransport::with_timeout(Duration::from_secs(secs))?,
        None => ReqwestTransport::new(),
    };
    Ok(Arc::new(transport))
}

/// `key=value`. The value is taken as JSON when it parses, else as a string.
pub fn parse_param(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    if key.is_empty() {
        return Err(format!("empty parameter name in '{}'", raw));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// A JSON array of items, or one JSON value per line.
pub fn parse_items(text: &str) -> anyhow::Result<Vec<Value>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).context("items file is not a JSON array");
    }
    trimmed
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str(line).with_context(|| format!("items line {}", n + 1))
        })
        .collect()
}

pub fn list_nodes(registry: &NodeRegistry) -> Value {
    let nodes: Vec<Value> = registry
        .list()
        .into_iter()
        .filter_map(|name| registry.get(name))
        .map(|node| {
            let d = node.description();
            json!({
                "name": d.name,
                "displayName": d.display_name,
                "usableAsTool": d.usable_as_tool,
                "operations": d.operations(),
            })
        })
        .collect();
    Value::Array(nodes)
}

pub fn describe(registry: &NodeRegistry, name: &str) -> anyhow::Result<Value> {
    let node = registry.require(name)?;
    let mut out = json!({ "node": node.description() });
    if node.description().usable_as_tool {
        out["tool"] = serde_json::to_value(ToolDefinition::of(node.as_ref()))?;
    }
    if !node.description().credentials.is_empty() {
        out["credential"] = serde_json::to_value(CredentialDescriptor::default())?;
    }
    Ok(out)
}

pub struct RunOptions {
    pub node: String,
    pub operation: String,
    pub params: Vec<(String, Value)>,
    pub items: Option<Vec<Value>>,
    pub continue_on_fail: bool,
}

pub async fn run(
    registry: &NodeRegistry,
    config: &KgflowConfig,
    transport: Arc<dyn Transport>,
    opts: RunOptions,
) -> anyhow::Result<Value> {
    let mut parameters: Map<String, Value> = opts.params.into_iter().collect();
    parameters.insert("operation".into(), Value::String(opts.operation));
    let host = LocalHost::from_config(config, transport)
        .items(opts.items.unwrap_or_else(|| vec![json!({})]))
        .parameters(parameters)
        .continue_on_fail(opts.continue_on_fail);
    let records = registry.execute(&opts.node, &host).await?;
    info!(node = %opts.node, records = records.len(), "run complete");
    Ok(Value::Array(records))
}

pub async fn tool(
    registry: &NodeRegistry,
    config: &KgflowConfig,
    transport: Arc<dyn Transport>,
    name: &str,
    args: &str,
) -> anyhow::Result<Value> {
    let node = registry.require(name)?;
    let args: Value = serde_json::from_str(args).context("--args is not valid JSON")?;
    let runner = ToolRunner::from_config(config, transport);
    match runner.invoke(node.as_ref(), args).await {
        kgflow_nodes::ToolResult::Json(v) => Ok(v),
        kgflow_nodes::ToolResult::Error(e) => bail!(e),
    }
}

pub async fn check(
    config: &KgflowConfig,
    transport: Arc<dyn Transport>,
    probe: Option<ConnectivityProbe>,
) -> anyhow::Result<Value> {
    let credentials = config
        .credentials(CREDENTIALS_NAME)
        .ok_or_else(|| anyhow!("no {} credentials configured", CREDENTIALS_NAME))?;
    let descriptor = CredentialDescriptor::new(probe.unwrap_or(config.probe));
    descriptor
        .test(transport.as_ref(), credentials)
        .await
        .with_context(|| format!("{} is not reachable", credentials.base_url))?;
    Ok(json!({
        "ok": true,
        "baseUrl": credentials.base_url,
        "probe": descriptor.probe.path(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_parse_json_or_string() {
        assert_eq!(parse_param("limit=5").unwrap(), ("limit".into(), json!(5)));
        assert_eq!(parse_param("query=who is bob").unwrap().1, json!("who is bob"));
        assert_eq!(parse_param("flag=true").unwrap().1, json!(true));
        assert_eq!(parse_param("empty=").unwrap().1, json!(""));
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=x").is_err());
    }

    #[test]
    fn items_array_or_lines() {
        assert_eq!(parse_items("[{\"a\":1},{}]").unwrap().len(), 2);
        let lines = "{\"a\":1}\n\n{\"b\":2}\n";
        assert_eq!(parse_items(lines).unwrap(), vec![json!({"a": 1}), json!({"b": 2})]);
        assert!(parse_items("").unwrap().is_empty());
        assert!(parse_items("{\"a\":1}\nnope").is_err());
    }

    #[test]
    fn default_config_comes_from_discovery() {
        let discovered = KgflowConfig::discover().unwrap();
        let loaded = load_config(None).unwrap();
        assert_eq!(loaded.workflow_id, discovered.workflow_id);
        assert_eq!(loaded.timeout_secs, discovered.timeout_secs);
        assert_eq!(loaded.probe, discovered.probe);
    }

    #[test]
    fn describe_includes_tool_schema_for_tools() {
        let registry = kgflow_nodes::default_registry();
        let knowledge = describe(&registry, "graphitiKnowledgeTool").unwrap();
        assert_eq!(knowledge["tool"]["name"], "graphitiKnowledgeTool");
        assert_eq!(knowledge["credential"]["name"], "graphitiApi");
        let direct = describe(&registry, "graphiti").unwrap();
        assert!(direct.get("tool").is_none());
        assert!(describe(&registry, "nope").is_err());
    }

    #[test]
    fn nodes_listing() {
        let registry = kgflow_nodes::default_registry();
        let listed = list_nodes(&registry);
        assert_eq!(listed.as_array().unwrap().len(), 4);
        assert_eq!(listed[0]["name"], "graphiti");
        assert_eq!(listed[0]["operations"].as_array().unwrap().len(), 12);
    }
}
