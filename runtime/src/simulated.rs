//! In-process connections for exercising the client against a scripted
//! host endpoint, without a network listener.

use crate::Error;
use http::Uri;
use hyper::client::connect::{Connected, Connection};
use std::{
    future::Future,
    io,
    pin::Pin,
    sync::{Arc, Mutex},
    task::{Context, Poll},
};
use tokio::io::{AsyncRead, AsyncWrite, DuplexStream, ReadBuf};

/// Hands a pre-established duplex stream to the client in place of a TCP
/// connection. Holds a single stream; a second connection attempt fails.
#[derive(Clone)]
pub struct Connector {
    inner: Arc<Mutex<Option<DuplexStreamWrapper>>>,
}

/// One half of a [`tokio::io::duplex`] pair, dressed up as a connection.
pub struct DuplexStreamWrapper(DuplexStream);

impl Connector {
    /// Creates a connector that will yield `stream` for the next connection.
    pub fn new(stream: DuplexStream) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(DuplexStreamWrapper(stream)))),
        }
    }
}

impl tower_service::Service<Uri> for Connector {
    type Response = DuplexStreamWrapper;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _uri: Uri) -> Self::Future {
        let stream = self
            .inner
            .lock()
            .map_err(|_| Error::from("simulated connection lock was poisoned"))
            .map(|mut inner| inner.take());
        Box::pin(async move {
            match stream? {
                Some(stream) => Ok(stream),
                None => Err(Error::from("no simulated connection is available")),
            }
        })
    }
}

impl Connection for DuplexStreamWrapper {
    fn connected(&self) -> Connected {
        Connected::new()
    }
}

impl AsyncRead for DuplexStreamWrapper {
    fn poll_read(mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.0).poll_read(cx, buf)
    }
}

impl AsyncWrite for DuplexStreamWrapper {
    fn poll_write(mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.0).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.0).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.0).poll_shutdown(cx)
    }
}
