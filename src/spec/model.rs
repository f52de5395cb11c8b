//! Typed views over a loaded [`Document`].
//!
//! Only the fields the tool synthesizer needs are extracted:
//! `paths.<path>.<method>.{operationId, summary, description, parameters, requestBody}`
//! plus path-level `parameters`. Everything else in the document is ignored.

use std::fmt;

use serde_json::{Map, Value};

use super::Document;

const JSON_MEDIA_TYPE: &str = "application/json";
const DEFAULT_TYPE: &str = "string";

/// HTTP methods that produce tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
    ];

    /// Parse a path-item key. Keys such as `parameters`, `head` or
    /// `summary` yield `None`.
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(key))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
        }
    }
}

/// Where a declared parameter goes in the outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    Path,
    Query,
}

impl ParameterLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
        }
    }
}

/// A declared `path` or `query` parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub location: ParameterLocation,
    pub schema_type: String,
    pub description: String,
    pub required: bool,
}

/// One property of a JSON request body schema.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyField {
    pub name: String,
    pub schema_type: String,
    pub description: String,
    pub required: bool,
}

/// A JSON request body. `fields` is empty when the schema declares no
/// `properties`; the operation still accepts a body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequestBody {
    pub fields: Vec<BodyField>,
}

/// One (path, method) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub path: String,
    pub method: HttpMethod,
    /// The method key exactly as written in the document (e.g. `get`).
    pub method_key: String,
    pub operation_id: Option<String>,
    pub summary: String,
    pub description: String,
    pub parameters: Vec<Parameter>,
    pub request_body: Option<RequestBody>,
}

impl Operation {
    /// Enumerate every operation in the document.
    ///
    /// Paths are visited in sorted order; within a path, methods follow
    /// [`HttpMethod::ALL`].
    pub fn from_document(document: &Document) -> Vec<Operation> {
        let Some(paths) = document.paths() else {
            log::warn!("Spec has no 'paths' object; no operations found");
            return Vec::new();
        };

        let mut operations = Vec::new();
        for (path, path_item) in paths {
            let path_item = document.resolve(path_item);
            let Some(item) = path_item.as_object() else {
                continue;
            };

            let shared_params = item
                .get("parameters")
                .map(|params| parse_parameters(document, params))
                .unwrap_or_default();

            let mut methods: Vec<(HttpMethod, &String, &Value)> = item
                .iter()
                .filter_map(|(key, raw)| HttpMethod::parse(key).map(|method| (method, key, raw)))
                .collect();
            methods.sort_by_key(|(method, _, _)| *method);

            for (method, key, raw) in methods {
                operations.push(Self::parse(document, path, method, key, raw, &shared_params));
            }
        }
        operations
    }

    fn parse(
        document: &Document,
        path: &str,
        method: HttpMethod,
        method_key: &str,
        raw: &Value,
        shared_params: &[Parameter],
    ) -> Self {
        let own_params = raw
            .get("parameters")
            .map(|params| parse_parameters(document, params))
            .unwrap_or_default();

        Self {
            path: path.to_string(),
            method,
            method_key: method_key.to_string(),
            operation_id: str_field(raw, "operationId").map(str::to_string),
            summary: str_field(raw, "summary").unwrap_or_default().to_string(),
            description: str_field(raw, "description").unwrap_or_default().to_string(),
            parameters: merge_parameters(shared_params, own_params),
            request_body: raw
                .get("requestBody")
                .and_then(|body| parse_request_body(document, body)),
        }
    }

    /// The explicit `operationId`, else `"{method}_{path}"` with every `/`
    /// replaced by `_`.
    pub fn tool_name(&self) -> String {
        match &self.operation_id {
            Some(id) => id.clone(),
            None => format!("{}_{}", self.method_key, self.path.replace('/', "_")),
        }
    }
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

/// `schema.type`, defaulting to `string`. For OpenAPI 3.1 type arrays the
/// first non-null entry wins.
fn schema_type(document: &Document, schema: Option<&Value>) -> String {
    let Some(schema) = schema.map(|s| document.resolve(s)) else {
        return DEFAULT_TYPE.to_string();
    };
    match schema.get("type") {
        Some(Value::String(ty)) => ty.clone(),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|ty| *ty != "null")
            .unwrap_or(DEFAULT_TYPE)
            .to_string(),
        _ => DEFAULT_TYPE.to_string(),
    }
}

fn parse_parameters(document: &Document, params: &Value) -> Vec<Parameter> {
    params
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|raw| parse_parameter(document, raw))
                .collect()
        })
        .unwrap_or_default()
}

fn parse_parameter(document: &Document, raw: &Value) -> Option<Parameter> {
    let raw = document.resolve(raw);
    let Some(name) = str_field(raw, "name") else {
        log::debug!("Skipping parameter without a name");
        return None;
    };

    let location = match str_field(raw, "in") {
        Some("path") => ParameterLocation::Path,
        Some("query") => ParameterLocation::Query,
        other => {
            log::debug!("Skipping parameter '{name}' in unsupported location {other:?}");
            return None;
        }
    };

    Some(Parameter {
        name: name.to_string(),
        location,
        schema_type: schema_type(document, raw.get("schema")),
        description: str_field(raw, "description").unwrap_or_default().to_string(),
        required: raw.get("required").and_then(Value::as_bool).unwrap_or(false),
    })
}

/// Path-level parameters first, in declared order; an operation-level
/// parameter with the same (name, location) replaces its path-level twin.
fn merge_parameters(shared: &[Parameter], own: Vec<Parameter>) -> Vec<Parameter> {
    let mut merged = shared.to_vec();
    for param in own {
        match merged
            .iter_mut()
            .find(|p| p.name == param.name && p.location == param.location)
        {
            Some(existing) => *existing = param,
            None => merged.push(param),
        }
    }
    merged
}

fn parse_request_body(document: &Document, raw: &Value) -> Option<RequestBody> {
    let body = document.resolve(raw);
    let media = body.get("content")?.get(JSON_MEDIA_TYPE)?;

    let Some(schema) = media.get("schema").map(|s| document.resolve(s)) else {
        return Some(RequestBody::default());
    };

    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let fields = schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|properties| body_fields(document, properties, &required))
        .unwrap_or_default();

    Some(RequestBody { fields })
}

fn body_fields(document: &Document, properties: &Map<String, Value>, required: &[&str]) -> Vec<BodyField> {
    properties
        .iter()
        .map(|(name, property)| {
            let property = document.resolve(property);
            BodyField {
                name: name.clone(),
                schema_type: schema_type(document, Some(property)),
                description: str_field(property, "description").unwrap_or_default().to_string(),
                required: required.contains(&name.as_str()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn operations(root: Value) -> Vec<Operation> {
        Operation::from_document(&Document::from_value(root))
    }

    #[test]
    fn test_one_operation_per_supported_method() {
        let ops = operations(json!({
            "paths": {
                "/items": {
                    "parameters": [],
                    "summary": "Items",
                    "get": {},
                    "post": {},
                    "head": {},
                    "options": {}
                },
                "/items/{id}": {"put": {}, "delete": {}, "patch": {}, "trace": {}}
            }
        }));
        let pairs: Vec<(String, HttpMethod)> =
            ops.iter().map(|op| (op.path.clone(), op.method)).collect();
        assert_eq!(
            pairs,
            vec![
                ("/items".to_string(), HttpMethod::Get),
                ("/items".to_string(), HttpMethod::Post),
                ("/items/{id}".to_string(), HttpMethod::Put),
                ("/items/{id}".to_string(), HttpMethod::Delete),
                ("/items/{id}".to_string(), HttpMethod::Patch),
            ]
        );
    }

    #[test]
    fn test_missing_paths_yields_nothing() {
        assert!(operations(json!({"openapi": "3.0.0"})).is_empty());
    }

    #[test]
    fn test_tool_name_derivation() {
        let ops = operations(json!({
            "paths": {
                "/users/{id}/pets": {
                    "get": {"operationId": "listUserPets"},
                    "post": {}
                }
            }
        }));
        assert_eq!(ops[0].tool_name(), "listUserPets");
        assert_eq!(ops[1].tool_name(), "post__users_{id}_pets");
    }

    #[test]
    fn test_parameter_defaults() {
        let ops = operations(json!({
            "paths": {
                "/search": {
                    "get": {
                        "parameters": [
                            {"name": "q", "in": "query"},
                            {"name": "limit", "in": "query", "required": true,
                             "description": "Max results", "schema": {"type": "integer"}},
                            {"name": "X-Trace", "in": "header"},
                            {"name": "session", "in": "cookie"}
                        ]
                    }
                }
            }
        }));
        let params = &ops[0].parameters;
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].schema_type, "string");
        assert_eq!(params[0].description, "");
        assert!(!params[0].required);
        assert_eq!(params[1].schema_type, "integer");
        assert_eq!(params[1].description, "Max results");
        assert!(params[1].required);
    }

    #[test]
    fn test_path_level_parameters_are_merged_and_overridden() {
        let ops = operations(json!({
            "paths": {
                "/items/{itemId}": {
                    "parameters": [
                        {"name": "itemId", "in": "path", "required": true},
                        {"name": "format", "in": "query", "description": "path-level"}
                    ],
                    "get": {
                        "parameters": [
                            {"name": "format", "in": "query", "required": true, "description": "override"},
                            {"name": "verbose", "in": "query", "schema": {"type": "boolean"}}
                        ]
                    }
                }
            }
        }));
        let names: Vec<&str> = ops[0].parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["itemId", "format", "verbose"]);
        assert_eq!(ops[0].parameters[1].description, "override");
        assert!(ops[0].parameters[1].required);
    }

    #[test]
    fn test_request_body_fields_use_schema_required_list() {
        let ops = operations(json!({
            "paths": {
                "/items": {
                    "post": {
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "properties": {
                                            "name": {"type": "string", "description": "Item name"},
                                            "price": {"type": "number"},
                                            "tags": {}
                                        },
                                        "required": ["name"]
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }));
        let body = ops[0].request_body.as_ref().unwrap();
        let name = body.fields.iter().find(|f| f.name == "name").unwrap();
        assert!(name.required);
        assert_eq!(name.description, "Item name");
        let price = body.fields.iter().find(|f| f.name == "price").unwrap();
        assert!(!price.required);
        assert_eq!(price.schema_type, "number");
        let tags = body.fields.iter().find(|f| f.name == "tags").unwrap();
        assert_eq!(tags.schema_type, "string");
    }

    #[test]
    fn test_non_json_body_is_ignored() {
        let ops = operations(json!({
            "paths": {
                "/upload": {
                    "post": {
                        "requestBody": {"content": {"multipart/form-data": {"schema": {"type": "object"}}}}
                    }
                }
            }
        }));
        assert!(ops[0].request_body.is_none());
    }

    #[test]
    fn test_json_body_without_properties_still_accepts_body() {
        let ops = operations(json!({
            "paths": {"/raw": {"post": {"requestBody": {"content": {"application/json": {}}}}}}
        }));
        assert_eq!(ops[0].request_body, Some(RequestBody::default()));
    }

    #[test]
    fn test_component_references_are_resolved() {
        let ops = operations(json!({
            "components": {
                "parameters": {
                    "PetId": {"name": "petId", "in": "path", "required": true, "schema": {"$ref": "#/components/schemas/Id"}}
                },
                "schemas": {
                    "Id": {"type": "integer"},
                    "NewPet": {
                        "type": "object",
                        "properties": {"name": {"type": "string"}},
                        "required": ["name"]
                    }
                },
                "requestBodies": {
                    "Pet": {"content": {"application/json": {"schema": {"$ref": "#/components/schemas/NewPet"}}}}
                }
            },
            "paths": {
                "/pets/{petId}": {
                    "put": {
                        "parameters": [{"$ref": "#/components/parameters/PetId"}],
                        "requestBody": {"$ref": "#/components/requestBodies/Pet"}
                    }
                }
            }
        }));
        let op = &ops[0];
        assert_eq!(op.parameters[0].name, "petId");
        assert_eq!(op.parameters[0].schema_type, "integer");
        let body = op.request_body.as_ref().unwrap();
        assert_eq!(body.fields[0].name, "name");
        assert!(body.fields[0].required);
    }

    #[test]
    fn test_openapi_31_type_arrays() {
        let ops = operations(json!({
            "paths": {
                "/a": {"get": {"parameters": [
                    {"name": "n", "in": "query", "schema": {"type": ["null", "integer"]}}
                ]}}
            }
        }));
        assert_eq!(ops[0].parameters[0].schema_type, "integer");
    }

    #[test]
    fn test_method_parse_is_case_insensitive() {
        assert_eq!(HttpMethod::parse("get"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::parse("PATCH"), Some(HttpMethod::Patch));
        assert_eq!(HttpMethod::parse("head"), None);
        assert_eq!(HttpMethod::parse("parameters"), None);
    }
}
