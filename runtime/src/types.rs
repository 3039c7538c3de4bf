use crate::Error;
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, env};

/// Configuration derived from environment variables set by the function
/// host before the process is started.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Config {
    /// The host:port of the invocation API endpoint.
    pub endpoint: String,
    /// The name of the deployed function.
    pub function_name: String,
    /// The memory allocated to the function, in megabytes.
    pub memory: i32,
    /// The version of the deployed function.
    pub version: String,
    /// The log stream associated with the function, if any.
    pub log_stream: String,
    /// The log group associated with the function, if any.
    pub log_group: String,
}

impl Config {
    /// Reads the host-provided configuration from the environment.
    pub fn from_env() -> Result<Self, Error> {
        let conf = Config {
            endpoint: env::var("AWS_LAMBDA_RUNTIME_API")?,
            function_name: env::var("AWS_LAMBDA_FUNCTION_NAME")?,
            memory: env::var("AWS_LAMBDA_FUNCTION_MEMORY_SIZE")?.parse::<i32>()?,
            version: env::var("AWS_LAMBDA_FUNCTION_VERSION")?,
            log_stream: env::var("AWS_LAMBDA_LOG_STREAM_NAME").unwrap_or_default(),
            log_group: env::var("AWS_LAMBDA_LOG_GROUP_NAME").unwrap_or_default(),
        };
        Ok(conf)
    }
}

/// Metadata describing a single invocation, extracted from the headers the
/// host attaches to each delivered event.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// The identifier the host assigned to this invocation.
    pub request_id: String,
    /// The invocation deadline as epoch milliseconds.
    pub deadline: u64,
    /// The ARN of the function being invoked.
    pub invoked_function_arn: String,
    /// The tracing id propagated from the caller, if any.
    pub xray_trace_id: String,
}

impl TryFrom<HeaderMap> for Context {
    type Error = Error;

    fn try_from(headers: HeaderMap) -> Result<Self, Self::Error> {
        let request_id = headers
            .get("lambda-runtime-aws-request-id")
            .ok_or("missing lambda-runtime-aws-request-id header")?
            .to_str()?
            .to_owned();
        let deadline = match headers.get("lambda-runtime-deadline-ms") {
            Some(value) => value.to_str()?.parse::<u64>()?,
            None => 0,
        };
        let invoked_function_arn = match headers.get("lambda-runtime-invoked-function-arn") {
            Some(value) => value.to_str()?.to_owned(),
            None => String::new(),
        };
        let xray_trace_id = match headers.get("lambda-runtime-trace-id") {
            Some(value) => value.to_str()?.to_owned(),
            None => String::new(),
        };
        Ok(Context {
            request_id,
            deadline,
            invoked_function_arn,
            xray_trace_id,
        })
    }
}

/// The error document posted to the host when an invocation fails.
#[derive(Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic<'a> {
    pub(crate) error_type: &'a str,
    pub(crate) error_message: &'a str,
}
