//! Node manifests: the declarative form schema a host renders.
//!
//! Properties carry show-rules keyed on other parameters (usually
//! `operation`, sometimes `searchType`). Tool-capable nodes also derive a
//! JSON Schema for automated callers from the same declarations.

use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use kgflow_core::CREDENTIALS_NAME;

use crate::params::Detect;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyKind {
    String,
    Number,
    Options,
    DateTime,
    Json,
    FixedCollection,
}

#[derive(Clone, Debug, Serialize)]
pub struct OptionValue {
    pub name: &'static str,
    pub value: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<&'static str>,
}

impl OptionValue {
    pub fn new(name: &'static str, value: &'static str) -> Self {
        Self {
            name,
            value,
            description: None,
            action: None,
        }
    }

    /// An operation entry with its action label.
    pub fn operation(
        name: &'static str,
        value: &'static str,
        description: &'static str,
        action: &'static str,
    ) -> Self {
        Self {
            name,
            value,
            description: Some(description),
            action: Some(action),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<u64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub multiple_values: bool,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct DisplayOptions {
    pub show: BTreeMap<&'static str, Vec<&'static str>>,
}

impl DisplayOptions {
    /// Visible when every keyed parameter currently holds one of the listed values.
    pub fn is_visible(&self, values: &Map<String, Value>) -> bool {
        self.show.iter().all(|(key, allowed)| {
            values
                .get(*key)
                .and_then(Value::as_str)
                .is_some_and(|v| allowed.contains(&v))
        })
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeProperty {
    pub display_name: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    pub default: Value,
    pub description: &'static str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub no_data_expression: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_options: Option<TypeOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_options: Option<DisplayOptions>,
    /// Input-item fields consulted, in order, when the parameter is not set.
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    pub auto_detect: &'static [&'static str],
}

impl NodeProperty {
    fn new(
        kind: PropertyKind,
        name: &'static str,
        display_name: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            display_name,
            name,
            kind,
            default: json!(""),
            description,
            required: false,
            no_data_expression: false,
            options: Vec::new(),
            type_options: None,
            display_options: None,
            auto_detect: &[],
        }
    }

    pub fn string(name: &'static str, display_name: &'static str, description: &'static str) -> Self {
        Self::new(PropertyKind::String, name, display_name, description)
    }

    pub fn date_time(name: &'static str, display_name: &'static str, description: &'static str) -> Self {
        Self::new(PropertyKind::DateTime, name, display_name, description)
    }

    pub fn number(
        name: &'static str,
        display_name: &'static str,
        default: u64,
        description: &'static str,
    ) -> Self {
        let mut p = Self::new(PropertyKind::Number, name, display_name, description);
        p.default = json!(default);
        p
    }

    pub fn options(
        name: &'static str,
        display_name: &'static str,
        options: Vec<OptionValue>,
        default: &'static str,
        description: &'static str,
    ) -> Self {
        let mut p = Self::new(PropertyKind::Options, name, display_name, description);
        p.options = options;
        p.default = json!(default);
        p
    }

    /// The node's operation selector.
    pub fn operation(options: Vec<OptionValue>, default: &'static str) -> Self {
        let mut p = Self::options("operation", "Operation", options, default, "");
        p.no_data_expression = true;
        p.required = true;
        p
    }

    pub fn json(name: &'static str, display_name: &'static str, description: &'static str) -> Self {
        let mut p = Self::new(PropertyKind::Json, name, display_name, description);
        p.default = json!([]);
        p
    }

    /// Repeated `message` entries (content, role type, role, timestamp).
    pub fn messages(description: &'static str) -> Self {
        let mut p = Self::new(PropertyKind::FixedCollection, "messages", "Messages", description);
        p.default = json!({});
        p.type_options = Some(TypeOptions {
            multiple_values: true,
            ..Default::default()
        });
        p
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn bounds(mut self, min: u64, max: Option<u64>) -> Self {
        let opts = self.type_options.get_or_insert_with(TypeOptions::default);
        opts.min_value = Some(min);
        opts.max_value = max;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = value;
        self
    }

    /// Declare the alias chain. Auto-detected fields have no literal default.
    pub fn detect(mut self, detect: &Detect) -> Self {
        self.auto_detect = detect.aliases;
        self.default = Value::Null;
        self
    }

    pub fn show(mut self, key: &'static str, values: &[&'static str]) -> Self {
        self.display_options
            .get_or_insert_with(DisplayOptions::default)
            .show
            .insert(key, values.to_vec());
        self
    }

    pub fn is_visible(&self, values: &Map<String, Value>) -> bool {
        self.display_options
            .as_ref()
            .map_or(true, |d| d.is_visible(values))
    }

    fn json_schema(&self) -> Value {
        let mut schema = Map::new();
        match self.kind {
            PropertyKind::Number => {
                schema.insert("type".into(), json!("number"));
                if let Some(opts) = &self.type_options {
                    if let Some(min) = opts.min_value {
                        schema.insert("minimum".into(), json!(min));
                    }
                    if let Some(max) = opts.max_value {
                        schema.insert("maximum".into(), json!(max));
                    }
                }
            }
            PropertyKind::Options => {
                schema.insert("type".into(), json!("string"));
                let values: Vec<_> = self.options.iter().map(|o| o.value).collect();
                schema.insert("enum".into(), json!(values));
            }
            PropertyKind::FixedCollection | PropertyKind::Json => {
                schema.insert("type".into(), json!("array"));
                schema.insert("items".into(), message_schema());
            }
            PropertyKind::String | PropertyKind::DateTime => {
                schema.insert("type".into(), json!("string"));
            }
        }
        if !self.description.is_empty() {
            schema.insert("description".into(), json!(self.description));
        }
        if !self.default.is_null() && self.default != json!("") && self.kind != PropertyKind::FixedCollection {
            schema.insert("default".into(), self.default.clone());
        }
        Value::Object(schema)
    }
}

fn message_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "content": {"type": "string", "description": "Message content"},
            "role_type": {"type": "string", "enum": ["user", "assistant", "system"], "description": "Role type"},
            "role": {"type": "string", "description": "Custom role name"},
            "timestamp": {"type": "string", "description": "Message timestamp"}
        },
        "required": ["content", "role_type"]
    })
}

#[derive(Clone, Debug, Serialize)]
pub struct CredentialRequirement {
    pub name: &'static str,
    pub required: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescription {
    pub display_name: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub group: &'static str,
    pub version: u32,
    pub subtitle: &'static str,
    pub description: &'static str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub usable_as_tool: bool,
    pub credentials: Vec<CredentialRequirement>,
    pub properties: Vec<NodeProperty>,
}

impl NodeDescription {
    pub fn graphiti_credentials() -> Vec<CredentialRequirement> {
        vec![CredentialRequirement {
            name: CREDENTIALS_NAME,
            required: true,
        }]
    }

    fn operation_property(&self) -> Option<&NodeProperty> {
        self.properties.iter().find(|p| p.name == "operation")
    }

    pub fn operations(&self) -> Vec<&'static str> {
        self.operation_property()
            .map(|p| p.options.iter().map(|o| o.value).collect())
            .unwrap_or_default()
    }

    pub fn default_operation(&self) -> Option<&str> {
        self.operation_property().and_then(|p| p.default.as_str())
    }

    pub fn has_operation(&self, operation: &str) -> bool {
        self.operations().contains(&operation)
    }

    /// Distinct parameter names, in declaration order.
    pub fn parameter_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Vec::new();
        for p in &self.properties {
            if !names.contains(&p.name) {
                names.push(p.name);
            }
        }
        names
    }

    /// Properties shown for the given parameter values. Unset keys take the
    /// first declared default.
    pub fn visible_properties(&self, values: &Map<String, Value>) -> Vec<&NodeProperty> {
        let mut effective = values.clone();
        for p in &self.properties {
            if !effective.contains_key(p.name) && p.default.is_string() {
                effective.insert(p.name.to_string(), p.default.clone());
            }
        }
        self.properties
            .iter()
            .filter(|p| p.is_visible(&effective))
            .collect()
    }

    /// JSON Schema of the tool contract: one entry per distinct parameter.
    /// Only unconditional required parameters are required.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for p in &self.properties {
            if properties.contains_key(p.name) {
                continue;
            }
            properties.insert(p.name.to_string(), p.json_schema());
            if p.required && p.display_options.is_none() {
                required.push(p.name);
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }
}
