//! Request and response adapters for Netlify functions.
//!
//! A function is an async `Fn(Request, Context) -> Response`. [`start`]
//! registers it as the process's sole invocation callback with the
//! deployed host; [`local::serve`] runs the same handler behind a plain
//! HTTP listener instead. Either way the handler sees one normalized
//! [`Request`] per invocation and answers with a [`Response`] built by a
//! single constructor call.
//!
//! ```no_run
//! use netlify_functions::{Context, Error, Request, Response};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     netlify_functions::start(hello).await
//! }
//!
//! async fn hello(_: Request, _: Context) -> Response {
//!     Response::text("Hello Netlify")
//! }
//! ```

use std::future::Future;

pub use netlify_attributes::netlify;
pub use netlify_runtime::{self as runtime, Context, Error};

#[cfg(feature = "local")]
pub mod local;
pub mod request;
pub mod response;

pub use crate::{
    request::{Identity, Request, RequestContext},
    response::Response,
};

/// Registers `handler` as the process's invocation callback and blocks on
/// the host's event loop.
///
/// The handler is infallible: the builder helpers fold serialization and
/// template failures into 500-class responses, so every invocation
/// produces a [`Response`]. Returns only when the transport to the host
/// or the host-provided configuration fails.
pub async fn start<H, F>(handler: H) -> Result<(), Error>
where
    H: Fn(Request, Context) -> F,
    F: Future<Output = Response>,
{
    let handler = &handler;
    runtime::run(runtime::handler_fn(move |request: Request, context: Context| {
        async move { Ok::<Response, Error>(handler(request, context).await) }
    }))
    .await
}

/// Registers `handler` for invocations that produce no HTTP response,
/// only a success or error outcome.
///
/// An `Err` is reported to the host as an invocation error; it does not
/// end the event loop.
pub async fn start_bg<H, F>(handler: H) -> Result<(), Error>
where
    H: Fn(Request, Context) -> F,
    F: Future<Output = Result<(), Error>>,
{
    runtime::run(runtime::handler_fn(handler)).await
}
