//! The inbound event envelope.
//!
//! Field names mirror the host's event JSON exactly, key for key; the
//! envelope is a wire contract, not an internal convenience shape. Absent
//! and explicitly-null fields both deserialize to their zero values, which
//! is how the host serializes empty collections.

use serde_derive::{Deserialize, Serialize};
use serde_json::{error::Error as JsonError, Value};
use std::{collections::HashMap, io::Read};

/// The request delivered for one invocation.
///
/// Constructed by deserializing the invocation event; read-only for the
/// lifetime of the invocation and discarded when the handler returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Request {
    /// The resource path defined in the gateway
    pub resource: String,
    /// The url path for the caller
    pub path: String,
    pub http_method: String,
    #[serde(deserialize_with = "nullable_default")]
    pub headers: HashMap<String, String>,
    #[serde(deserialize_with = "nullable_default")]
    pub multi_value_headers: HashMap<String, Vec<String>>,
    #[serde(deserialize_with = "nullable_default")]
    pub query_string_parameters: HashMap<String, String>,
    #[serde(deserialize_with = "nullable_default")]
    pub multi_value_query_string_parameters: HashMap<String, Vec<String>>,
    #[serde(deserialize_with = "nullable_default")]
    pub path_parameters: HashMap<String, String>,
    #[serde(deserialize_with = "nullable_default")]
    pub stage_variables: HashMap<String, String>,
    #[serde(deserialize_with = "nullable_default")]
    pub request_context: RequestContext,
    #[serde(deserialize_with = "nullable_default")]
    pub body: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_base64_encoded: bool,
}

/// Gateway metadata describing the call and the deployed API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestContext {
    pub account_id: String,
    pub resource_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub operation_name: String,
    pub stage: String,
    pub domain_name: String,
    pub domain_prefix: String,
    pub request_id: String,
    pub extended_request_id: String,
    pub protocol: String,
    #[serde(deserialize_with = "nullable_default")]
    pub identity: Identity,
    pub resource_path: String,
    pub path: String,
    #[serde(deserialize_with = "nullable_default")]
    pub authorizer: HashMap<String, Value>,
    pub http_method: String,
    pub request_time: String,
    pub request_time_epoch: i64,
    /// The gateway rest API id
    pub api_id: String,
}

/// Caller identity fields, passed through verbatim and never validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Identity {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cognito_identity_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cognito_identity_pool_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub account_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub caller: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub access_key: String,
    pub source_ip: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cognito_authentication_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cognito_authentication_provider: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user_arn: String,
    pub user_agent: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user: String,
}

/// Deserializes a field that the host may serialize as `null` into the
/// field type's zero value.
fn nullable_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + serde::Deserialize<'de>,
{
    let value: Option<T> = serde::Deserialize::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

/// Deserializes a `Request` from a `Read` impl providing JSON events.
///
/// # Example
///
/// ```rust,no_run
/// use netlify_functions::request::from_reader;
/// use std::fs::File;
/// use std::error::Error;
///
/// fn main() -> Result<(), Box<dyn Error>> {
///     let request = from_reader(
///         File::open("path/to/request.json")?
///     )?;
///     Ok(println!("{:#?}", request))
/// }
/// ```
pub fn from_reader<R>(rdr: R) -> Result<Request, JsonError>
where
    R: Read,
{
    serde_json::from_reader(rdr)
}

/// Deserializes a `Request` from a string of JSON text.
///
/// # Example
///
/// ```rust,no_run
/// use netlify_functions::request::from_str;
/// use std::error::Error;
///
/// fn main() -> Result<(), Box<dyn Error>> {
///     let request = from_str(
///         r#"{ ...raw json here... }"#
///     )?;
///     Ok(println!("{:#?}", request))
/// }
/// ```
pub fn from_str(s: &str) -> Result<Request, JsonError> {
    serde_json::from_str(s)
}
