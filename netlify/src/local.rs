//! A plain HTTP listener for running one handler locally.
//!
//! Binds the fixed local port, routes every path to the handler, and logs
//! method, uri, status and duration per request. The raw HTTP request is
//! re-wrapped into the same normalized [`Request`] the deployed runtime
//! delivers, so a handler moves between the two deployments unchanged.

use crate::{request::Request, response::Response};
use hyper::{service::make_service_fn, Body, Server};
use itertools::Itertools;
use netlify_runtime::{Context, Error};
use std::{
    collections::HashMap,
    convert::Infallible,
    future::Future,
    net::SocketAddr,
    pin::Pin,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    task::{Context as TaskContext, Poll},
    time::Instant,
};
use tracing::info;

/// The port the listener binds on.
pub const LOCAL_PORT: u16 = 8080;

/// Serves `handler` on the fixed local port, routing all paths to it.
pub async fn serve<H, F>(handler: H) -> Result<(), Error>
where
    H: Fn(Request, Context) -> F + Send + Sync + 'static,
    F: Future<Output = Response> + Send + 'static,
{
    let addr = SocketAddr::from(([127, 0, 0, 1], LOCAL_PORT));
    let handler = Arc::new(handler);
    let invocations = Arc::new(AtomicU64::new(0));
    let make_svc = make_service_fn(move |_conn| {
        let service = LocalService {
            handler: Arc::clone(&handler),
            invocations: Arc::clone(&invocations),
        };
        async move { Ok::<_, Infallible>(service) }
    });
    info!(port = LOCAL_PORT, "listening for function invocations");
    Server::bind(&addr).serve(make_svc).await?;
    Ok(())
}

struct LocalService<H> {
    handler: Arc<H>,
    invocations: Arc<AtomicU64>,
}

impl<H, F> hyper::service::Service<http::Request<Body>> for LocalService<H>
where
    H: Fn(Request, Context) -> F + Send + Sync + 'static,
    F: Future<Output = Response> + Send + 'static,
{
    type Response = http::Response<Body>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<Body>) -> Self::Future {
        let handler = Arc::clone(&self.handler);
        let seq = self.invocations.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            let started = Instant::now();
            let method = req.method().clone();
            let uri = req.uri().clone();
            let event = into_event(req).await?;
            let context = Context {
                request_id: format!("local-{}", seq),
                ..Context::default()
            };
            let response = handler(event, context).await;
            let status = response.status_code;
            let res = into_http_response(response)?;
            info!(
                %method,
                %uri,
                status,
                duration_ms = started.elapsed().as_millis() as u64,
                "handled request"
            );
            Ok(res)
        })
    }
}

/// Re-wraps a raw HTTP request into the normalized event shape.
async fn into_event(req: http::Request<Body>) -> Result<Request, Error> {
    let (parts, body) = req.into_parts();

    let mut headers = HashMap::new();
    let mut multi_value_headers = HashMap::new();
    for name in parts.headers.keys() {
        let values = parts
            .headers
            .get_all(name)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_owned)
            .collect::<Vec<_>>();
        if let Some(first) = values.first() {
            headers.insert(name.as_str().to_owned(), first.clone());
        }
        multi_value_headers.insert(name.as_str().to_owned(), values);
    }

    let pairs: Vec<(String, String)> = match parts.uri.query() {
        Some(query) => serde_urlencoded::from_str(query)?,
        None => Vec::new(),
    };
    let multi_value_query_string_parameters = pairs.iter().cloned().into_group_map();
    let query_string_parameters = pairs.into_iter().collect();

    let bytes = hyper::body::to_bytes(body).await?;
    let (body, is_base64_encoded) = match String::from_utf8(bytes.to_vec()) {
        Ok(text) => (text, false),
        Err(raw) => (base64::encode(raw.into_bytes()), true),
    };

    Ok(Request {
        resource: parts.uri.path().to_owned(),
        path: parts.uri.path().to_owned(),
        http_method: parts.method.to_string(),
        headers,
        multi_value_headers,
        query_string_parameters,
        multi_value_query_string_parameters,
        body,
        is_base64_encoded,
        ..Request::default()
    })
}

/// Maps a response envelope back onto the wire.
fn into_http_response(response: Response) -> Result<http::Response<Body>, Error> {
    let mut builder = http::Response::builder().status(response.status_code);
    for (name, value) in &response.headers {
        // multi-value headers are the canonical source when both carry a key
        if !response.multi_value_headers.contains_key(name) {
            builder = builder.header(name.as_str(), value.as_str());
        }
    }
    for (name, values) in &response.multi_value_headers {
        for value in values {
            builder = builder.header(name.as_str(), value.as_str());
        }
    }
    let body = if response.is_base64_encoded {
        Body::from(base64::decode(&response.body)?)
    } else {
        Body::from(response.body)
    };
    Ok(builder.body(body)?)
}
