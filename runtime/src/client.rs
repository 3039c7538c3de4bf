use crate::Error;
use http::{
    uri::{PathAndQuery, Scheme},
    Request, Response, Uri,
};
use hyper::{client::connect::Connect, client::HttpConnector, Body};

/// A client scoped to the host's invocation API endpoint.
///
/// Requests built by [`crate::requests`] carry only a path; the client
/// grafts the endpoint's scheme and authority on before dispatch.
#[derive(Debug, Clone)]
pub(crate) struct Client<C = HttpConnector> {
    base: Uri,
    client: hyper::Client<C>,
}

impl<C> Client<C>
where
    C: Connect + Clone + Send + Sync + 'static,
{
    pub(crate) fn with(base: Uri, client: hyper::Client<C>) -> Self {
        Self { base, client }
    }

    pub(crate) async fn call(&self, req: Request<Body>) -> Result<Response<Body>, Error> {
        let (mut parts, body) = req.into_parts();
        let (scheme, authority) = {
            let base = self.base.clone().into_parts();
            (
                base.scheme.unwrap_or(Scheme::HTTP),
                base.authority.ok_or("endpoint uri is missing an authority")?,
            )
        };
        let path_and_query = parts
            .uri
            .path_and_query()
            .cloned()
            .unwrap_or_else(|| PathAndQuery::from_static("/"));
        parts.uri = Uri::builder()
            .scheme(scheme)
            .authority(authority)
            .path_and_query(path_and_query)
            .build()?;
        let req = Request::from_parts(parts, body);
        let res = self.client.request(req).await?;
        Ok(res)
    }
}
