use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::dispatch::DispatchConfig;
use crate::error::RpcError;
use crate::methods::MethodRegistry;
use crate::response::Response;
use crate::schema;
use crate::types::{JsonRpcVersion, RequestId};

/// The `params` member of a request.
///
/// Positional and named forms are mutually exclusive on the wire, which
/// the untagged enum captures by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestParams {
    /// Positional parameters as an array
    Array(Vec<Value>),
    /// Named parameters as an object
    Object(HashMap<String, Value>),
}

impl RequestParams {
    /// Get a named parameter (object params only).
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            RequestParams::Object(map) => map.get(name),
            RequestParams::Array(_) => None,
        }
    }

    /// Get a positional parameter (array params only).
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        match self {
            RequestParams::Array(items) => items.get(index),
            RequestParams::Object(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RequestParams::Array(items) => items.len(),
            RequestParams::Object(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_value(&self) -> Value {
        match self {
            RequestParams::Array(items) => Value::Array(items.clone()),
            RequestParams::Object(map) => {
                Value::Object(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            }
        }
    }

    /// Deserialize the parameters into a concrete type. Array params bind
    /// tuples and sequences, object params bind structs and maps. A shape
    /// mismatch is an invalid-params failure carrying the decoder message.
    pub fn parse<T>(&self) -> Result<T, RpcError>
    where
        T: serde::de::DeserializeOwned,
    {
        serde_json::from_value(self.to_value())
            .map_err(|err| RpcError::invalid_params(err.to_string()))
    }
}

impl From<Vec<Value>> for RequestParams {
    fn from(items: Vec<Value>) -> Self {
        RequestParams::Array(items)
    }
}

impl From<HashMap<String, Value>> for RequestParams {
    fn from(map: HashMap<String, Value>) -> Self {
        RequestParams::Object(map)
    }
}

/// One decoded request, immutable once constructed and consumed by
/// [`Request::process`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<RequestParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
}

impl Request {
    /// Build a typed request from a decoded value.
    ///
    /// With validation enabled the candidate is checked against the request
    /// schema first and rejected with an invalid-request failure. With
    /// validation disabled the input is trusted: a missing or mangled
    /// method name ends up failing lookup later, an unusable id reads as
    /// absent, and only scalar or null `params` fail here since there is
    /// no argument shape they could ever bind to.
    pub fn from_value(value: Value, config: &DispatchConfig) -> Result<Self, RpcError> {
        if config.validate {
            schema::validate(&value)?;
        }
        let mut request = Self::decode(value)?;
        if config.convert_camel_case {
            request.method = camel_to_snake(&request.method);
            request.params = match request.params {
                Some(RequestParams::Object(map)) => {
                    Some(RequestParams::Object(convert_camel_case_keys(map)))
                }
                other => other,
            };
        }
        Ok(request)
    }

    fn decode(value: Value) -> Result<Self, RpcError> {
        let mut members = match value {
            Value::Object(members) => members,
            _ => serde_json::Map::new(),
        };
        let method = match members.remove("method") {
            Some(Value::String(method)) => method,
            _ => String::new(),
        };
        let params = match members.remove("params") {
            None => None,
            Some(Value::Array(items)) => Some(RequestParams::Array(items)),
            Some(Value::Object(map)) => Some(RequestParams::Object(map.into_iter().collect())),
            Some(other) => {
                return Err(RpcError::invalid_params(format!(
                    "parameters of type {} are not allowed",
                    json_type_name(&other)
                )));
            }
        };
        let id = match members.remove("id") {
            Some(Value::String(id)) => Some(RequestId::String(id)),
            Some(Value::Number(n)) => n.as_i64().map(RequestId::Number),
            _ => None,
        };
        Ok(Self {
            version: JsonRpcVersion::V2_0,
            method,
            params,
            id,
        })
    }

    /// True iff the request carries no `id` and expects no reply.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Resolve the method, invoke it, and wrap the outcome.
    ///
    /// For notifications every outcome collapses into
    /// [`Response::notification`]; the method still runs, its result is
    /// simply not reported.
    pub fn process<R>(self, registry: &R, config: &DispatchConfig) -> Response
    where
        R: MethodRegistry + ?Sized,
    {
        let Request {
            method, params, id, ..
        } = self;

        let outcome = match registry.lookup(&method) {
            Some(callable) => callable.call(params),
            None => Err(RpcError::method_not_found(method.as_str())),
        };
        wrap_outcome(&method, outcome, id, config)
    }
}

/// Turn an invocation outcome into the response the caller sees, honoring
/// notification suppression and the debug gate on error data.
pub(crate) fn wrap_outcome(
    method: &str,
    outcome: Result<Value, RpcError>,
    id: Option<RequestId>,
    config: &DispatchConfig,
) -> Response {
    if let Err(error) = &outcome {
        debug!(method = %method, code = error.code(), "method call failed: {}", error);
    }
    match (outcome, id) {
        (_, None) => Response::notification(),
        (Ok(result), Some(id)) => Response::success(id, result),
        (Err(error), Some(id)) => Response::error(&error, Some(id), config.debug),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// camelCase (or PascalCase) to snake_case, leaving existing snake_case
/// untouched.
fn camel_to_snake(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let after_lower = i > 0
                && (chars[i - 1].is_ascii_lowercase() || chars[i - 1].is_ascii_digit());
            let before_lower = chars.get(i + 1).is_some_and(|next| next.is_ascii_lowercase());
            if i > 0 && (after_lower || before_lower) {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert the keys of named params, recursing into nested objects.
/// Values themselves (including arrays) are left alone.
fn convert_camel_case_keys(map: HashMap<String, Value>) -> HashMap<String, Value> {
    map.into_iter()
        .map(|(key, value)| (camel_to_snake(&key), convert_nested(value)))
        .collect()
}

fn convert_nested(value: Value) -> Value {
    match value {
        Value::Object(nested) => Value::Object(
            nested
                .into_iter()
                .map(|(key, value)| (camel_to_snake(&key), convert_nested(value)))
                .collect(),
        ),
        other => other,
    }
}
