//! Parameter resolution for one input item.
//!
//! Adapters read typed values through [`ItemContext`]. Auto-detected
//! parameters follow a [`Detect`] chain: explicit host value, then the
//! listed input-item fields in order, then the fallback.

use chrono::{SecondsFormat, Utc};
use kgflow_api::{GraphApi, Host};
use kgflow_core::{Error, Message, Result};
use serde_json::Value;
use std::str::FromStr;

static NULL: Value = Value::Null;

/// What to use when neither the host nor the input item supplies a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fallback {
    /// No value is an error.
    Required,
    /// Empty string.
    Empty,
    Text(&'static str),
    /// Current time, ISO-8601 UTC with milliseconds.
    Now,
    /// `{workflowId}_{executionId}`
    ExecutionScoped,
}

/// Ordered alias chain for one parameter.
#[derive(Clone, Copy, Debug)]
pub struct Detect {
    pub aliases: &'static [&'static str],
    pub fallback: Fallback,
}

impl Detect {
    pub const fn new(aliases: &'static [&'static str], fallback: Fallback) -> Self {
        Self { aliases, fallback }
    }
}

pub fn iso_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn epoch_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Empty strings, zero, false and null do not count as a value.
pub fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn to_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn to_u32(name: &str, v: &Value) -> Result<u32> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| Error::invalid_parameter(name, format!("expected a number, got {}", v)))?;
    if n < 0.0 || n.fract() != 0.0 || n > u32::MAX as f64 {
        return Err(Error::invalid_parameter(
            name,
            format!("expected a non-negative integer, got {}", n),
        ));
    }
    Ok(n as u32)
}

/// Parameter access for item `index` of the current invocation.
pub struct ItemContext<'a> {
    host: &'a dyn Host,
    index: usize,
}

impl<'a> ItemContext<'a> {
    pub fn new(host: &'a dyn Host, index: usize) -> Self {
        Self { host, index }
    }

    pub fn host(&self) -> &'a dyn Host {
        self.host
    }

    pub fn api(&self) -> GraphApi<'a> {
        GraphApi::new(self.host)
    }

    /// The input item's JSON.
    pub fn item(&self) -> &'a Value {
        self.host.input_items().get(self.index).unwrap_or(&NULL)
    }

    /// Value the host holds for `name`, if any and non-empty.
    fn configured(&self, name: &str) -> Result<Option<Value>> {
        let v = self
            .host
            .get_parameter(name, self.index, Some(Value::Null))?;
        Ok(if v.is_null() || v == Value::String(String::new()) {
            None
        } else {
            Some(v)
        })
    }

    /// Required string. Blank counts as missing.
    pub fn string(&self, name: &str) -> Result<String> {
        match self.configured(name)? {
            Some(v) => Ok(to_text(&v)),
            None => Err(Error::missing(name)),
        }
    }

    pub fn string_or(&self, name: &str, default: &str) -> Result<String> {
        Ok(self
            .configured(name)?
            .map(|v| to_text(&v))
            .unwrap_or_else(|| default.to_string()))
    }

    pub fn u32_or(&self, name: &str, default: u32) -> Result<u32> {
        match self.configured(name)? {
            Some(v) => to_u32(name, &v),
            None => Ok(default),
        }
    }

    pub fn u32_opt(&self, name: &str) -> Result<Option<u32>> {
        self.configured(name)?.map(|v| to_u32(name, &v)).transpose()
    }

    /// Parse an enum-like parameter, falling back to `T::default()`.
    pub fn parse_or_default<T>(&self, name: &str) -> Result<T>
    where
        T: FromStr<Err = Error> + Default,
    {
        match self.configured(name)? {
            Some(v) => to_text(&v).parse(),
            None => Ok(T::default()),
        }
    }

    /// Resolve an auto-detected parameter.
    pub fn detect(&self, name: &str, detect: &Detect) -> Result<String> {
        if let Some(v) = self.configured(name)?.filter(is_truthy) {
            return Ok(to_text(&v));
        }
        let item = self.item();
        if let Some(v) = detect
            .aliases
            .iter()
            .filter_map(|alias| item.get(*alias))
            .find(|v| is_truthy(v))
        {
            return Ok(to_text(v));
        }
        match detect.fallback {
            Fallback::Required => Err(Error::missing(name)),
            Fallback::Empty => Ok(String::new()),
            Fallback::Text(s) => Ok(s.to_string()),
            Fallback::Now => Ok(iso_now()),
            Fallback::ExecutionScoped => Ok(format!(
                "{}_{}",
                self.host.workflow_id(),
                self.host.execution_id()
            )),
        }
    }

    /// Message history. Accepts a plain array or the form shape
    /// `{"message": [...]}`; absent means empty.
    pub fn messages(&self, name: &str) -> Result<Vec<Message>> {
        let raw = match self.configured(name)? {
            Some(Value::Object(mut map)) => map.remove("message").unwrap_or(Value::Null),
            Some(v) => v,
            None => return Ok(Vec::new()),
        };
        match raw {
            Value::Null => Ok(Vec::new()),
            Value::Array(_) => serde_json::from_value(raw)
                .map_err(|e| Error::invalid_parameter(name, e.to_string())),
            other => Err(Error::invalid_parameter(
                name,
                format!("expected a list of messages, got {}", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&serde_json::json!("")));
        assert!(!is_truthy(&serde_json::json!(0)));
        assert!(!is_truthy(&serde_json::json!(false)));
        assert!(is_truthy(&serde_json::json!("x")));
        assert!(is_truthy(&serde_json::json!(3)));
        assert!(is_truthy(&serde_json::json!({})));
    }

    #[test]
    fn numbers_from_strings_and_floats() {
        assert_eq!(to_u32("n", &serde_json::json!(5)).unwrap(), 5);
        assert_eq!(to_u32("n", &serde_json::json!(5.0)).unwrap(), 5);
        assert_eq!(to_u32("n", &serde_json::json!(" 12 ")).unwrap(), 12);
        assert!(to_u32("n", &serde_json::json!(-1)).is_err());
        assert!(to_u32("n", &serde_json::json!(2.5)).is_err());
        assert!(to_u32("n", &serde_json::json!("many")).is_err());
    }

    #[test]
    fn iso_now_shape() {
        let ts = iso_now();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
        assert_eq!(ts.len(), "2024-01-01T00:00:00.000Z".len());
    }

    #[test]
    fn text_conversion() {
        assert_eq!(to_text(&serde_json::json!("a")), "a");
        assert_eq!(to_text(&serde_json::json!(7)), "7");
        assert_eq!(to_text(&serde_json::json!({"k": 1})), r#"{"k":1}"#);
    }
}
