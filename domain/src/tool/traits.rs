//! Tool domain traits
//!
//! Contains pure domain logic traits for tool validation.
//! The async executor port is defined in the application layer (ports).

use super::entities::{ToolDefinition, ToolInvocation};

/// Validator for tool invocations
///
/// This is a pure domain trait that validates invocations
/// against their definitions without any I/O operations.
pub trait ToolValidator: Send + Sync {
    /// Validate an invocation against its definition
    fn validate(&self, invocation: &ToolInvocation, definition: &ToolDefinition) -> Result<(), String>;
}

/// Default implementation of ToolValidator
#[derive(Debug, Clone, Default)]
pub struct DefaultToolValidator;

impl ToolValidator for DefaultToolValidator {
    fn validate(&self, invocation: &ToolInvocation, definition: &ToolDefinition) -> Result<(), String> {
        // Required parameters must be present, non-null and (for strings) non-blank
        for param in definition.required_parameters() {
            match invocation.arguments.get(&param.name) {
                None | Some(serde_json::Value::Null) => {
                    return Err(format!(
                        "Missing required parameter '{}' for tool '{}'",
                        param.name, definition.name
                    ));
                }
                Some(serde_json::Value::String(s)) if s.trim().is_empty() => {
                    return Err(format!(
                        "Required parameter '{}' for tool '{}' is empty",
                        param.name, definition.name
                    ));
                }
                Some(_) => {}
            }
        }

        for (arg_name, value) in &invocation.arguments {
            let Some(param) = definition.parameter(arg_name) else {
                return Err(format!(
                    "Unknown parameter '{}' for tool '{}'",
                    arg_name, definition.name
                ));
            };
            // Optional parameters may be explicitly null
            if value.is_null() && !param.required {
                continue;
            }
            if !param.param_type.accepts(value) {
                return Err(format!(
                    "Parameter '{}' for tool '{}' must be of type {}",
                    arg_name, definition.name, param.param_type
                ));
            }
            if !param.allows(value) {
                return Err(format!(
                    "Parameter '{}' for tool '{}' has unsupported value {}",
                    arg_name, definition.name, value
                ));
            }
        }

        Ok(())
    }
}
