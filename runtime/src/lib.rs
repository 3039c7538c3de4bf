#![warn(missing_docs, nonstandard_style, rust_2018_idioms)]

//! The invocation runtime for Netlify functions.
//!
//! The function host delivers one event at a time over a small HTTP API.
//! [`run`] registers a [`Handler`] as the process's sole callback and
//! drives the poll → invoke → respond loop until the host tears the
//! process down; handler outcomes, including errors, are reported back to
//! the host and never end the loop.
//!
//! ```no_run
//! use netlify_runtime::{handler_fn, run, Context, Error};
//! use serde_json::Value;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     run(handler_fn(echo)).await
//! }
//!
//! async fn echo(event: Value, _: Context) -> Result<Value, Error> {
//!     Ok(event)
//! }
//! ```

use crate::{
    client::Client,
    requests::{EventCompletionRequest, EventErrorRequest, IntoRequest, NextEventRequest},
    types::Diagnostic,
};
use futures_core::Stream;
use futures_util::stream::StreamExt;
use http::Uri;
use hyper::client::connect::Connect;
use serde::Serialize;
use std::{
    convert::{TryFrom, TryInto},
    env, fmt,
    future::Future,
};
use tracing::{error, trace};
use tracing_futures::Instrument;

mod client;
mod requests;
#[cfg(feature = "simulated")]
pub mod simulated;
mod types;

pub use types::{Config, Context};

/// The boxed error type carried through the runtime.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// A function invoked once per delivered event.
pub trait Handler<A, B> {
    /// The error produced when an invocation fails.
    type Error;
    /// The future produced by [`Handler::call`].
    type Fut: Future<Output = Result<B, Self::Error>>;
    /// Processes one event within its invocation context.
    fn call(&mut self, event: A, context: Context) -> Self::Fut;
}

/// Adapts a plain async function into a [`Handler`].
pub fn handler_fn<F>(f: F) -> HandlerFn<F> {
    HandlerFn { f }
}

/// A [`Handler`] implemented by an enclosed async function.
#[derive(Clone, Debug)]
pub struct HandlerFn<F> {
    f: F,
}

impl<F, A, B, Err, Fut> Handler<A, B> for HandlerFn<F>
where
    F: Fn(A, Context) -> Fut,
    Fut: Future<Output = Result<B, Err>>,
{
    type Error = Err;
    type Fut = Fut;

    fn call(&mut self, event: A, context: Context) -> Self::Fut {
        (self.f)(event, context)
    }
}

/// Registers `handler` as the process's invocation callback and blocks on
/// the host's event loop.
///
/// Returns only when the transport to the host or the host-provided
/// configuration fails.
pub async fn run<A, B, F>(handler: F) -> Result<(), Error>
where
    F: Handler<A, B>,
    F::Error: fmt::Display,
    A: for<'de> serde::Deserialize<'de>,
    B: Serialize,
{
    trace!("reading host configuration from the environment");
    let config = Config::from_env()?;
    let uri: Uri = format!("http://{}", config.endpoint).try_into()?;
    let client = Client::with(uri, hyper::Client::new());
    let incoming = incoming(&client);
    run_inner(&client, incoming, handler).await
}

fn incoming<'a, C>(client: &'a Client<C>) -> impl Stream<Item = Result<http::Response<hyper::Body>, Error>> + 'a
where
    C: Connect + Clone + Send + Sync + 'static,
{
    async_stream::stream! {
        loop {
            trace!("waiting for the next event");
            let req = NextEventRequest.into_req();
            let res = match req {
                Ok(req) => client.call(req).await,
                Err(err) => Err(err),
            };
            yield res;
        }
    }
}

async fn run_inner<C, A, B, F>(
    client: &Client<C>,
    incoming: impl Stream<Item = Result<http::Response<hyper::Body>, Error>>,
    mut handler: F,
) -> Result<(), Error>
where
    C: Connect + Clone + Send + Sync + 'static,
    F: Handler<A, B>,
    F::Error: fmt::Display,
    A: for<'de> serde::Deserialize<'de>,
    B: Serialize,
{
    tokio::pin!(incoming);
    while let Some(event) = incoming.next().await {
        let event = event?;
        let (parts, body) = event.into_parts();
        let body: bytes::Bytes = hyper::body::to_bytes(body).await?;
        trace!("event payload - {}", std::str::from_utf8(&body)?);

        let context = Context::try_from(parts.headers)?;
        if !context.xray_trace_id.is_empty() {
            env::set_var("_X_AMZN_TRACE_ID", &context.xray_trace_id);
        }
        let request_id = context.request_id.clone();
        let span = tracing::trace_span!("invocation", request_id = %request_id);

        let mut deserializer = serde_json::Deserializer::from_slice(&body);
        let req = match serde_path_to_error::deserialize(&mut deserializer) {
            Ok(event) => match handler.call(event, context).instrument(span).await {
                Ok(response) => EventCompletionRequest {
                    request_id: &request_id,
                    body: response,
                }
                .into_req()?,
                Err(err) => {
                    error!("handler for invocation {} failed: {}", request_id, err);
                    let message = err.to_string();
                    EventErrorRequest {
                        request_id: &request_id,
                        diagnostic: Diagnostic {
                            error_type: type_name_of_val(&err),
                            error_message: &message,
                        },
                    }
                    .into_req()?
                }
            },
            Err(err) => {
                error!("event for invocation {} could not be deserialized: {}", request_id, err);
                let message = err.to_string();
                EventErrorRequest {
                    request_id: &request_id,
                    diagnostic: Diagnostic {
                        error_type: type_name_of_val(&err),
                        error_message: &message,
                    },
                }
                .into_req()?
            }
        };
        client.call(req).await?;
    }
    Ok(())
}

fn type_name_of_val<T>(_: &T) -> &'static str {
    std::any::type_name::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulated;
    use http::{Method, Response, StatusCode};
    use hyper::{server::conn::Http, service::service_fn, Body};
    use once_cell::sync::Lazy;
    use serde_json::{json, Value};
    use simple_error::SimpleError;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use tokio::sync::mpsc;

    static TRACING: Lazy<()> = Lazy::new(|| {
        tracing_subscriber::fmt().with_max_level(tracing::Level::TRACE).init();
    });

    const REQUEST_ID: &str = "8476a536-e9f4-11e8-9739-2dfe598c3fcd";

    /// A scripted host on the far side of a duplex pipe: serves one event,
    /// records what the runtime posts back, then answers further polls
    /// with a bare 500 so the loop tears down.
    fn scripted_host(event: &'static str) -> (Client<simulated::Connector>, mpsc::UnboundedReceiver<(String, String)>) {
        let (client_io, server_io) = tokio::io::duplex(4096);
        let (tx, rx) = mpsc::unbounded_channel();
        let polls = Arc::new(AtomicUsize::new(0));
        tokio::spawn(async move {
            let service = service_fn(move |req: http::Request<Body>| {
                let tx = tx.clone();
                let polls = Arc::clone(&polls);
                async move {
                    let (parts, body) = req.into_parts();
                    let body = hyper::body::to_bytes(body).await?;
                    if parts.method == Method::GET {
                        if polls.fetch_add(1, Ordering::SeqCst) == 0 {
                            Response::builder()
                                .header("lambda-runtime-aws-request-id", REQUEST_ID)
                                .header("lambda-runtime-deadline-ms", "1542409706888")
                                .body(Body::from(event))
                                .map_err(Error::from)
                        } else {
                            Response::builder()
                                .status(StatusCode::INTERNAL_SERVER_ERROR)
                                .body(Body::empty())
                                .map_err(Error::from)
                        }
                    } else {
                        let posted = String::from_utf8(body.to_vec())?;
                        tx.send((parts.uri.path().to_owned(), posted)).ok();
                        Response::builder()
                            .status(StatusCode::ACCEPTED)
                            .body(Body::empty())
                            .map_err(Error::from)
                    }
                }
            });
            Http::new().serve_connection(server_io, service).await.ok();
        });
        let connector = simulated::Connector::new(client_io);
        let client = Client::with(
            Uri::from_static("http://simulated.host"),
            hyper::Client::builder().build(connector),
        );
        (client, rx)
    }

    #[tokio::test]
    async fn handler_fn_adapts_async_functions() -> Result<(), Error> {
        let mut handler = handler_fn(|event: Value, _: Context| async move { Ok::<Value, Error>(event) });
        let output = handler.call(json!({ "command": "hello" }), Context::default()).await?;
        assert_eq!(output, json!({ "command": "hello" }));
        Ok(())
    }

    #[tokio::test]
    async fn runtime_posts_the_handler_output() -> Result<(), Error> {
        Lazy::force(&TRACING);
        let (client, mut rx) = scripted_host(r#"{"command":"hello"}"#);
        let handler = handler_fn(|event: Value, _: Context| async move { Ok::<Value, Error>(event) });
        let events = incoming(&client);
        // the scripted teardown surfaces as an error once the response is posted
        assert!(run_inner(&client, events, handler).await.is_err());

        let (path, body) = rx.recv().await.ok_or("nothing was posted back to the host")?;
        assert_eq!(path, format!("/2018-06-01/runtime/invocation/{}/response", REQUEST_ID));
        assert_eq!(body, r#"{"command":"hello"}"#);
        Ok(())
    }

    #[tokio::test]
    async fn runtime_reports_handler_errors() -> Result<(), Error> {
        Lazy::force(&TRACING);
        let (client, mut rx) = scripted_host(r#"{"command":"hello"}"#);
        let handler =
            handler_fn(|_: Value, _: Context| async move { Err::<Value, Error>(SimpleError::new("boom").into()) });
        let events = incoming(&client);
        assert!(run_inner(&client, events, handler).await.is_err());

        let (path, body) = rx.recv().await.ok_or("nothing was posted back to the host")?;
        assert_eq!(path, format!("/2018-06-01/runtime/invocation/{}/error", REQUEST_ID));
        let diagnostic: Value = serde_json::from_str(&body)?;
        assert_eq!(diagnostic["errorMessage"], "boom");
        Ok(())
    }

    #[tokio::test]
    async fn runtime_reports_undeserializable_events() -> Result<(), Error> {
        Lazy::force(&TRACING);
        let (client, mut rx) = scripted_host(r#"{"command":"#);
        let handler = handler_fn(|event: Value, _: Context| async move { Ok::<Value, Error>(event) });
        let events = incoming(&client);
        assert!(run_inner(&client, events, handler).await.is_err());

        let (path, body) = rx.recv().await.ok_or("nothing was posted back to the host")?;
        assert_eq!(path, format!("/2018-06-01/runtime/invocation/{}/error", REQUEST_ID));
        let diagnostic: Value = serde_json::from_str(&body)?;
        assert_ne!(diagnostic["errorMessage"], "");
        Ok(())
    }
}
