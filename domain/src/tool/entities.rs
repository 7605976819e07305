//! Tool domain entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// JSON type accepted by a tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    StringArray,
}

impl ParamType {
    /// JSON Schema `type` keyword for this parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::StringArray => "array",
        }
    }

    /// Whether a JSON value is acceptable for this parameter type.
    ///
    /// Integers are accepted where a number is expected; LLMs frequently
    /// send `2.0` for an integer field, so integral floats are accepted too.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Integer => {
                value.is_i64()
                    || value.is_u64()
                    || value.as_f64().is_some_and(|f| f.fract() == 0.0)
            }
            ParamType::Number => value.is_number(),
            ParamType::Boolean => value.is_boolean(),
            ParamType::StringArray => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
        }
    }

    /// Convert a loosely typed value (LLMs often quote numbers and booleans).
    ///
    /// Returns `None` when no conversion applies.
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        let text = value.as_str()?.trim();
        match self {
            ParamType::Integer => text.parse::<i64>().ok().map(Value::from),
            ParamType::Number => text.parse::<f64>().ok().map(Value::from),
            ParamType::Boolean => match text.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Some(Value::Bool(true)),
                "false" | "0" | "no" => Some(Value::Bool(false)),
                _ => None,
            },
            ParamType::StringArray => Some(Value::from(vec![text.to_string()])),
            ParamType::String => None,
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Definition of a tool that the planner may invoke
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Canonical name (e.g., "search_date_ideas")
    pub name: String,
    /// Human-readable description, also shown to the LLM
    pub description: String,
    /// Parameter specifications
    pub parameters: Vec<ToolParameter>,
}

/// Parameter specification for a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub param_type: ParamType,
    /// Closed set of accepted values, empty when unrestricted
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<Value>,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&ToolParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn required_parameters(&self) -> impl Iterator<Item = &ToolParameter> {
        self.parameters.iter().filter(|p| p.required)
    }
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: ParamType::String,
            allowed_values: Vec::new(),
        }
    }

    pub fn with_type(mut self, param_type: ParamType) -> Self {
        self.param_type = param_type;
        self
    }

    pub fn with_allowed<V: Into<Value>>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        self.allowed_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Whether a value is in the allowed set (always true when unrestricted)
    pub fn allows(&self, value: &Value) -> bool {
        if self.allowed_values.is_empty() {
            return true;
        }
        // Compare numerically so 2 and 2.0 are the same tier
        match value.as_f64() {
            Some(n) => self.allowed_values.iter().any(|v| v.as_f64() == Some(n)),
            None => self.allowed_values.contains(value),
        }
    }
}

/// Who asked for an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationOrigin {
    /// Requested by the LLM's function-calling step
    Llm,
    /// Added by the selection policy to reach the diversity threshold
    Forced,
    /// Added during the extra reflection round
    Reflection,
}

impl InvocationOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvocationOrigin::Llm => "llm",
            InvocationOrigin::Forced => "forced",
            InvocationOrigin::Reflection => "reflection",
        }
    }
}

/// A request to call one tool with concrete arguments (Value Object)
///
/// Arguments are kept in a `BTreeMap` so that serialisation is canonical
/// (sorted keys), which makes [`cache_key`](Self::cache_key) stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub tool_name: String,
    pub arguments: BTreeMap<String, Value>,
    pub issued_at: DateTime<Utc>,
    pub origin: InvocationOrigin,
}

impl ToolInvocation {
    pub fn new(tool_name: impl Into<String>, origin: InvocationOrigin) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments: BTreeMap::new(),
            issued_at: Utc::now(),
            origin,
        }
    }

    /// Shorthand for an LLM-requested invocation
    pub fn requested(tool_name: impl Into<String>) -> Self {
        Self::new(tool_name, InvocationOrigin::Llm)
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    pub fn with_arguments(mut self, arguments: BTreeMap<String, Value>) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(Value::as_str)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.arguments.get(key).and_then(Value::as_f64)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.arguments
            .get(key)
            .and_then(|v| v.as_u64().or_else(|| v.as_f64().map(|f| f as u64)))
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.arguments.get(key).and_then(Value::as_bool)
    }

    pub fn get_string_list(&self, key: &str) -> Vec<String> {
        self.arguments
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Cache key: tool name plus canonical JSON of the arguments.
    ///
    /// `issued_at` and `origin` do not participate, so the same arguments
    /// requested by the LLM and forced by the policy share a cache entry.
    pub fn cache_key(&self) -> String {
        let args = serde_json::to_string(&self.arguments).unwrap_or_default();
        format!("{}:{}", self.tool_name, args)
    }

    /// Coerce string-typed arguments to the declared parameter types.
    ///
    /// Values that already match, or cannot be converted, are left alone
    /// for the validator to judge.
    pub fn coerce_to(&mut self, definition: &ToolDefinition) {
        for param in &definition.parameters {
            let Some(value) = self.arguments.get_mut(&param.name) else {
                continue;
            };
            if param.param_type.accepts(value) {
                continue;
            }
            if let Some(coerced) = param.param_type.coerce(value) {
                *value = coerced;
            }
        }
    }
}
