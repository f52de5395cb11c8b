//! Builds and executes the HTTP request behind a tool call.
//!
//! Every failure (unresolved path placeholder, transport error, non-2xx
//! status, undecodable body) is converted to
//! [`InvocationOutcome::Failure`]; [`Invoker::invoke`] never returns an
//! error or panics.

use std::collections::HashSet;
use std::time::Duration;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde_json::{Map, Value};

use super::types::{ApiTool, InvocationFailure, InvocationOutcome, ParamSource};
use crate::spec::HttpMethod;

/// A fully resolved request, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: String,
    /// Query pairs; array arguments contribute one pair per element.
    pub query: Vec<(String, String)>,
    /// JSON body, only when at least one body field was supplied.
    pub body: Option<Map<String, Value>>,
}

/// Executes tool calls against one base URL.
///
/// Cheap to clone; the underlying `reqwest::Client` pools connections.
#[derive(Debug, Clone)]
pub struct Invoker {
    client: reqwest::Client,
    base_url: String,
}

impl Invoker {
    /// Create an invoker with its own HTTP client.
    ///
    /// `timeout` bounds each whole request; `None` leaves it unbounded.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Invoke `tool` with `args`.
    pub async fn invoke(&self, tool: &ApiTool, args: &Map<String, Value>) -> InvocationOutcome {
        let result = match self.prepare(tool, args) {
            Ok(request) => self.execute(request).await,
            Err(failure) => Err(failure),
        };

        match result {
            Ok(value) => InvocationOutcome::Success(value),
            Err(failure) => {
                log::warn!("Tool '{}' failed: {}", tool.name(), failure.message);
                InvocationOutcome::Failure(failure)
            }
        }
    }

    /// Resolve the URL, query pairs and body for a call without sending it.
    ///
    /// - Path arguments replace their `{name}` placeholder (percent-encoded).
    ///   A placeholder left unresolved fails the call.
    /// - Declared query parameters present in `args` become query pairs.
    /// - When the operation takes a JSON body, every argument not placed in
    ///   the query becomes a body field, path arguments included.
    ///   Required-ness is not enforced.
    pub fn prepare(
        &self,
        tool: &ApiTool,
        args: &Map<String, Value>,
    ) -> Result<PreparedRequest, InvocationFailure> {
        let mut path = tool.path_template().to_string();
        for param in tool.parameters().iter().filter(|p| p.source == ParamSource::Path) {
            if let Some(value) = args.get(&param.name) {
                let placeholder = format!("{{{}}}", param.name);
                path = path.replace(&placeholder, &urlencoding::encode(&value_to_string(value)));
            }
        }

        let unresolved = unresolved_placeholders(&path);
        if !unresolved.is_empty() {
            return Err(InvocationFailure::new(
                None,
                format!(
                    "missing path parameter(s) {} for {}",
                    unresolved.join(", "),
                    tool.endpoint()
                ),
            ));
        }

        let mut query = Vec::new();
        let mut in_query: HashSet<&str> = HashSet::new();
        for param in tool.parameters().iter().filter(|p| p.source == ParamSource::Query) {
            if let Some(value) = args.get(&param.name) {
                query.extend(encode_query_param(&param.name, value));
                in_query.insert(param.name.as_str());
            }
        }

        let mut body = Map::new();
        for (name, value) in args {
            if in_query.contains(name.as_str()) {
                continue;
            }
            if tool.accepts_json_body() {
                body.insert(name.clone(), value.clone());
            } else if tool.parameter(name).is_none_or(|p| p.source != ParamSource::Path) {
                log::debug!("Ignoring argument '{name}' for {}: no JSON body", tool.endpoint());
            }
        }

        Ok(PreparedRequest {
            method: tool.method(),
            url: join_url(&self.base_url, &path),
            query,
            body: (!body.is_empty()).then_some(body),
        })
    }

    async fn execute(&self, request: PreparedRequest) -> Result<Value, InvocationFailure> {
        log::debug!("{} {}", request.method, request.url);

        let mut builder = self
            .client
            .request(request.method.into(), &request.url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| InvocationFailure::new(None, e))?;

        let status = response.status();
        if !status.is_success() {
            let reason = response
                .error_for_status_ref()
                .err()
                .map(|e| e.to_string())
                .unwrap_or_else(|| format!("HTTP status {status} for url ({})", request.url));
            let body = response.text().await.unwrap_or_default();
            let detail = if body.trim().is_empty() {
                reason
            } else {
                format!("{reason}: {body}")
            };
            return Err(InvocationFailure::new(Some(status.as_u16()), detail));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| InvocationFailure::new(Some(status.as_u16()), e))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| {
            InvocationFailure::new(
                Some(status.as_u16()),
                format!("failed to decode response body as JSON: {e}"),
            )
        })
    }
}

/// Base URL + path, without doubling the `/` between them.
fn join_url(base_url: &str, path: &str) -> String {
    if base_url.ends_with('/') && path.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), path)
    } else {
        format!("{base_url}{path}")
    }
}

/// `{name}` tokens still present in a substituted path.
fn unresolved_placeholders(path: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        found.push(rest[start..=start + len].to_string());
        rest = &rest[start + len + 1..];
    }
    found
}

/// String form of an argument: strings unquoted, other scalars via their
/// JSON text, `null` empty.
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => value.to_string(),
    }
}

/// Arrays repeat the key once per element (`?tag=a&tag=b`).
fn encode_query_param(name: &str, value: &Value) -> Vec<(String, String)> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| (name.to_string(), value_to_string(item)))
            .collect(),
        _ => vec![(name.to_string(), value_to_string(value))],
    }
}
