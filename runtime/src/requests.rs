use crate::{types::Diagnostic, Error};
use http::{Method, Request, Uri};
use hyper::Body;
use serde::Serialize;

pub(crate) trait IntoRequest {
    fn into_req(self) -> Result<Request<Body>, Error>;
}

/// `GET /2018-06-01/runtime/invocation/next`
pub(crate) struct NextEventRequest;

impl IntoRequest for NextEventRequest {
    fn into_req(self) -> Result<Request<Body>, Error> {
        let req = Request::builder()
            .method(Method::GET)
            .uri(Uri::from_static("/2018-06-01/runtime/invocation/next"))
            .body(Body::empty())?;
        Ok(req)
    }
}

/// `POST /2018-06-01/runtime/invocation/{id}/response`
pub(crate) struct EventCompletionRequest<'a, T> {
    pub(crate) request_id: &'a str,
    pub(crate) body: T,
}

impl<'a, T> IntoRequest for EventCompletionRequest<'a, T>
where
    T: Serialize,
{
    fn into_req(self) -> Result<Request<Body>, Error> {
        let uri = format!("/2018-06-01/runtime/invocation/{}/response", self.request_id);
        let body = serde_json::to_vec(&self.body)?;
        let req = Request::builder()
            .method(Method::POST)
            .uri(Uri::from_maybe_shared(uri)?)
            .body(Body::from(body))?;
        Ok(req)
    }
}

/// `POST /2018-06-01/runtime/invocation/{id}/error`
pub(crate) struct EventErrorRequest<'a> {
    pub(crate) request_id: &'a str,
    pub(crate) diagnostic: Diagnostic<'a>,
}

impl<'a> IntoRequest for EventErrorRequest<'a> {
    fn into_req(self) -> Result<Request<Body>, Error> {
        let uri = format!("/2018-06-01/runtime/invocation/{}/error", self.request_id);
        let body = serde_json::to_vec(&self.diagnostic)?;
        let req = Request::builder()
            .method(Method::POST)
            .uri(Uri::from_maybe_shared(uri)?)
            .header("lambda-runtime-function-error-type", "unhandled")
            .body(Body::from(body))?;
        Ok(req)
    }
}
