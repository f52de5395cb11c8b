//! Tool descriptors and invocation outcomes.

use std::fmt;

use serde_json::{json, Map, Value};

use crate::spec::HttpMethod;

/// Prefix of every failure message returned by an invocation.
pub const ERROR_MARKER: &str = "Error making API call: ";

/// Where an argument ends up in the outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamSource {
    /// Substituted into the `{name}` placeholder of the path template.
    Path,
    /// Attached as a URL query parameter.
    Query,
    /// Field of the JSON request body.
    Body,
}

/// One entry of a tool's flattened parameter schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolParameter {
    pub name: String,
    pub source: ParamSource,
    pub schema_type: String,
    pub description: String,
    /// Advisory only. The invoker never rejects a call for a missing
    /// required argument.
    pub required: bool,
}

/// A named, invocable unit bound to one API operation.
///
/// Carries everything needed to build a request without consulting the
/// document again.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiTool {
    pub(crate) name: String,
    pub(crate) summary: String,
    pub(crate) details: String,
    pub(crate) method: HttpMethod,
    pub(crate) path_template: String,
    pub(crate) parameters: Vec<ToolParameter>,
    pub(crate) accepts_json_body: bool,
}

impl ApiTool {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path_template(&self) -> &str {
        &self.path_template
    }

    pub fn parameters(&self) -> &[ToolParameter] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&ToolParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn accepts_json_body(&self) -> bool {
        self.accepts_json_body
    }

    /// `"GET /items/{id}"`, for logs and error messages.
    pub fn endpoint(&self) -> String {
        format!("{} {}", self.method, self.path_template)
    }

    /// Summary, description and a `- name: description` line per parameter.
    pub fn description(&self) -> String {
        let parameters = self
            .parameters
            .iter()
            .map(|p| format!("- {}: {}", p.name, p.description))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "{}\n\n{}\n\nParameters:\n{}",
            self.summary, self.details, parameters
        )
    }

    /// JSON Schema object describing the tool's arguments.
    pub fn input_schema(&self) -> Map<String, Value> {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in &self.parameters {
            let mut property = json!({ "type": param.schema_type });
            if !param.description.is_empty() {
                property["description"] = json!(param.description);
            }
            properties.insert(param.name.clone(), property);
            if param.required {
                required.push(Value::String(param.name.clone()));
            }
        }

        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        schema.insert("required".to_string(), Value::Array(required));
        schema
    }
}

/// Why an invocation did not produce a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationFailure {
    /// HTTP status of the response, when one was received.
    pub status: Option<u16>,
    /// Human-readable message, always starting with [`ERROR_MARKER`].
    pub message: String,
}

impl InvocationFailure {
    pub fn new(status: Option<u16>, detail: impl fmt::Display) -> Self {
        Self {
            status,
            message: format!("{ERROR_MARKER}{detail}"),
        }
    }
}

impl fmt::Display for InvocationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result of invoking a tool. Failures are data, never panics or errors.
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationOutcome {
    /// Decoded JSON response body.
    Success(Value),
    Failure(InvocationFailure),
}

impl InvocationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn into_result(self) -> Result<Value, InvocationFailure> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(failure) => Err(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool() -> ApiTool {
        ApiTool {
            name: "createItem".to_string(),
            summary: "Create an item".to_string(),
            details: "Adds an item to the store".to_string(),
            method: HttpMethod::Post,
            path_template: "/stores/{storeId}/items".to_string(),
            parameters: vec![
                ToolParameter {
                    name: "storeId".to_string(),
                    source: ParamSource::Path,
                    schema_type: "integer".to_string(),
                    description: "Store identifier".to_string(),
                    required: true,
                },
                ToolParameter {
                    name: "name".to_string(),
                    source: ParamSource::Body,
                    schema_type: "string".to_string(),
                    description: String::new(),
                    required: false,
                },
            ],
            accepts_json_body: true,
        }
    }

    #[test]
    fn test_description_layout() {
        assert_eq!(
            tool().description(),
            "Create an item\n\nAdds an item to the store\n\nParameters:\n- storeId: Store identifier\n- name: "
        );
    }

    #[test]
    fn test_input_schema() {
        let schema = Value::Object(tool().input_schema());
        assert_eq!(
            schema,
            json!({
                "type": "object",
                "properties": {
                    "storeId": {"type": "integer", "description": "Store identifier"},
                    "name": {"type": "string"}
                },
                "required": ["storeId"]
            })
        );
    }

    #[test]
    fn test_failure_message_carries_marker() {
        let failure = InvocationFailure::new(Some(500), "boom");
        assert_eq!(failure.message, "Error making API call: boom");
        assert_eq!(failure.to_string(), failure.message);
        assert_eq!(
            InvocationOutcome::Failure(failure.clone()).into_result(),
            Err(failure)
        );
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(tool().endpoint(), "POST /stores/{storeId}/items");
    }
}
