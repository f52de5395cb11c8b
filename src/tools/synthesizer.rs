//! Turns a loaded document into one [`ApiTool`] per operation.

use super::types::{ApiTool, ParamSource, ToolParameter};
use crate::spec::{Document, Operation, ParameterLocation};

/// Build the tool list for every operation in `document`.
///
/// Pure: nothing is registered anywhere. Name uniqueness is checked when
/// the list is handed to [`ToolRegistry`](super::ToolRegistry).
pub fn synthesize(document: &Document) -> Vec<ApiTool> {
    let tools: Vec<ApiTool> = Operation::from_document(document)
        .iter()
        .map(ApiTool::from_operation)
        .collect();
    log::debug!("Synthesized {} tools", tools.len());
    tools
}

impl ApiTool {
    /// Flatten an operation's declared parameters and JSON body properties
    /// into a single ordered parameter list.
    pub fn from_operation(operation: &Operation) -> Self {
        let mut parameters: Vec<ToolParameter> = operation
            .parameters
            .iter()
            .map(|param| ToolParameter {
                name: param.name.clone(),
                source: match param.location {
                    ParameterLocation::Path => ParamSource::Path,
                    ParameterLocation::Query => ParamSource::Query,
                },
                schema_type: param.schema_type.clone(),
                description: param.description.clone(),
                required: param.required,
            })
            .collect();

        if let Some(body) = &operation.request_body {
            for field in &body.fields {
                // Same name as a declared parameter: the body schema wins,
                // the declared location still routes the value
                if let Some(existing) = parameters.iter_mut().find(|p| p.name == field.name) {
                    log::debug!(
                        "Body field '{}' of {} {} overrides the schema of a declared parameter",
                        field.name,
                        operation.method,
                        operation.path
                    );
                    existing.schema_type = field.schema_type.clone();
                    existing.description = field.description.clone();
                    existing.required = field.required;
                    continue;
                }
                parameters.push(ToolParameter {
                    name: field.name.clone(),
                    source: ParamSource::Body,
                    schema_type: field.schema_type.clone(),
                    description: field.description.clone(),
                    required: field.required,
                });
            }
        }

        Self {
            name: operation.tool_name(),
            summary: operation.summary.clone(),
            details: operation.description.clone(),
            method: operation.method,
            path_template: operation.path.clone(),
            parameters,
            accepts_json_body: operation.request_body.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::HttpMethod;
    use serde_json::json;

    fn document() -> Document {
        Document::from_value(json!({
            "servers": [{"url": "https://api.example.com/v1"}],
            "paths": {
                "/items": {
                    "get": {
                        "operationId": "listItems",
                        "summary": "List items",
                        "parameters": [
                            {"name": "limit", "in": "query", "schema": {"type": "integer"}, "description": "Page size"}
                        ]
                    },
                    "post": {
                        "summary": "Create item",
                        "parameters": [
                            {"name": "dryRun", "in": "query", "schema": {"type": "boolean"}}
                        ],
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "properties": {
                                            "name": {"type": "string", "description": "Item name"},
                                            "dryRun": {"type": "string", "description": "Validate only"}
                                        },
                                        "required": ["name"]
                                    }
                                }
                            }
                        }
                    }
                },
                "/items/{id}": {
                    "get": {
                        "operationId": "getItem",
                        "parameters": [{"name": "id", "in": "path", "required": true}]
                    },
                    "delete": {"operationId": "deleteItem"},
                    "head": {"operationId": "headItem"}
                }
            }
        }))
    }

    #[test]
    fn test_one_tool_per_operation() {
        let tools = synthesize(&document());
        let names: Vec<&str> = tools.iter().map(ApiTool::name).collect();
        assert_eq!(names, vec!["listItems", "post__items", "getItem", "deleteItem"]);
    }

    #[test]
    fn test_parameter_sources() {
        let tools = synthesize(&document());
        let get_item = &tools[2];
        assert_eq!(get_item.method(), HttpMethod::Get);
        assert_eq!(get_item.path_template(), "/items/{id}");
        assert_eq!(get_item.parameter("id").unwrap().source, ParamSource::Path);
        assert!(!get_item.accepts_json_body());

        let list = &tools[0];
        assert_eq!(list.parameter("limit").unwrap().source, ParamSource::Query);
        assert_eq!(list.parameter("limit").unwrap().schema_type, "integer");
    }

    #[test]
    fn test_body_fields_are_flattened_with_required_flag() {
        let tools = synthesize(&document());
        let create = &tools[1];
        assert!(create.accepts_json_body());

        let name = create.parameter("name").unwrap();
        assert_eq!(name.source, ParamSource::Body);
        assert!(name.required);

        let schema = create.input_schema();
        assert_eq!(schema["required"], json!(["name"]));
    }

    #[test]
    fn test_body_field_overrides_schema_of_declared_parameter() {
        let tools = synthesize(&document());
        let create = &tools[1];
        let dry_runs: Vec<_> = create
            .parameters()
            .iter()
            .filter(|p| p.name == "dryRun")
            .collect();
        assert_eq!(dry_runs.len(), 1);
        assert_eq!(dry_runs[0].source, ParamSource::Query);
        assert_eq!(dry_runs[0].schema_type, "string");
        assert_eq!(dry_runs[0].description, "Validate only");
        assert!(create.description().contains("- dryRun: Validate only"));
    }

    #[test]
    fn test_description_lists_every_parameter() {
        let tools = synthesize(&document());
        let description = tools[1].description();
        assert!(description.starts_with("Create item\n\n"));
        assert!(description.contains("- name: Item name"));
        assert!(description.contains("- dryRun: "));
    }
}
