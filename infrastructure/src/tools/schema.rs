//! JSON Schema tool converter.
//!
//! Default implementation of [`ToolSchemaPort`] that produces provider-neutral
//! JSON Schema for function calling.

use planner_application::ports::tool_schema::ToolSchemaPort;
use planner_domain::{ParamType, ToolDefinition};

/// Default implementation producing provider-neutral JSON Schema.
///
/// Handles param_type → JSON Schema type mapping:
/// - `String` → `"string"`
/// - `Integer` / `Number` / `Boolean` → same-named JSON type
/// - `StringArray` → `"array"` of `"string"` items
///
/// Restricted parameters get an `enum` of their allowed values.
pub struct JsonSchemaToolConverter;

impl ToolSchemaPort for JsonSchemaToolConverter {
    fn tool_to_schema(&self, tool: &ToolDefinition) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for param in &tool.parameters {
            let mut prop = serde_json::Map::new();
            prop.insert(
                "type".to_string(),
                serde_json::json!(param.param_type.as_str()),
            );
            if param.param_type == ParamType::StringArray {
                prop.insert("items".to_string(), serde_json::json!({ "type": "string" }));
            }
            prop.insert(
                "description".to_string(),
                serde_json::json!(param.description),
            );
            if !param.allowed_values.is_empty() {
                prop.insert(
                    "enum".to_string(),
                    serde_json::Value::Array(param.allowed_values.clone()),
                );
            }
            properties.insert(param.name.clone(), serde_json::Value::Object(prop));

            if param.required {
                required.push(serde_json::json!(param.name));
            }
        }

        serde_json::json!({
            "name": tool.name,
            "description": tool.description,
            "input_schema": {
                "type": "object",
                "properties": properties,
                "required": required,
            }
        })
    }
}
