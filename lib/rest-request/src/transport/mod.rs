//! Execution of request descriptors.
//!
//! A [`TransportAdapter`] turns a [`RequestDescriptor`] into an HTTP exchange.
//! The descriptor is only borrowed, so the same one can be sent any number of
//! times, concurrently if needed. [`ReqwestAdapter`] is the provided
//! implementation.
//!
//! Sends are blocking. The asynchronous variants run the blocking send on a
//! tokio blocking pool, either from a caller-supplied runtime or from a
//! process-wide default pool started on first use.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, LazyLock};
use std::task::{Context, Poll};

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::de::value::StrDeserializer;
use serde::de::{DeserializeOwned, IntoDeserializer};
use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::descriptor::{RequestDescriptor, ResponseType};
use crate::error::TransportError;

mod reqwest;
pub use self::reqwest::{ReqwestAdapter, ReqwestAdapterBuilder};

/// Name of the threads of the default worker pool.
pub const WORKER_THREAD_NAME: &str = "rest-request-worker";

static WORKER_POOL: LazyLock<io::Result<Runtime>> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .thread_name(WORKER_THREAD_NAME)
        .enable_all()
        .build()
});

fn worker_pool() -> Result<&'static Runtime, TransportError> {
    WORKER_POOL
        .as_ref()
        .map_err(|err| TransportError::Io(io::Error::new(err.kind(), err.to_string())))
}

/// Executes request descriptors against a live HTTP client.
///
/// Failures of the underlying client are surfaced unmodified as
/// [`TransportError`]; nothing is retried.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
///
/// use rest_request::prelude::*;
/// use rest_request::ReqwestAdapter;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let adapter = Arc::new(ReqwestAdapter::new());
/// let request = RestRequest::with_expected_map_body()
///     .uri("http://localhost:8080/users/42")?
///     .get()
///     .accept("application/json")?
///     .build()?;
///
/// let user = adapter.send_for_body(&request)?;
/// let pending = adapter.send_async_default(request);
/// let response = pending.wait()?;
/// assert_eq!(user.as_ref(), response.body());
/// # Ok(())
/// # }
/// ```
pub trait TransportAdapter: Send + Sync + 'static {
    /// Sends the request and waits for the response.
    ///
    /// The response body is decoded into `T` when the descriptor declares a
    /// response type; otherwise only the raw bytes are kept.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] on network or protocol failure, or when
    /// the response body cannot be decoded.
    fn send<T>(&self, descriptor: &RequestDescriptor<T>) -> Result<ResponseEnvelope<T>, TransportError>
    where
        T: DeserializeOwned;

    /// Sends the request and returns the decoded body, if any.
    ///
    /// # Errors
    ///
    /// Same as [`send`](Self::send).
    fn send_for_body<T>(&self, descriptor: &RequestDescriptor<T>) -> Result<Option<T>, TransportError>
    where
        T: DeserializeOwned,
    {
        let response = self.send(descriptor)?;
        Ok(response.into_body())
    }

    /// Schedules the send on the blocking pool of `runtime` and returns immediately.
    ///
    /// Errors are reported through the returned [`PendingResponse`].
    fn send_async<T>(
        self: &Arc<Self>,
        descriptor: RequestDescriptor<T>,
        runtime: &Handle,
    ) -> PendingResponse<T>
    where
        Self: Sized,
        T: DeserializeOwned + Send + 'static,
    {
        let adapter = Arc::clone(self);
        let task = runtime.spawn_blocking(move || adapter.send(&descriptor));
        PendingResponse::running(task)
    }

    /// Schedules the send on the default worker pool and returns immediately.
    fn send_async_default<T>(self: &Arc<Self>, descriptor: RequestDescriptor<T>) -> PendingResponse<T>
    where
        Self: Sized,
        T: DeserializeOwned + Send + 'static,
    {
        match worker_pool() {
            Ok(pool) => self.send_async(descriptor, pool.handle()),
            Err(error) => PendingResponse::failed(error),
        }
    }
}

/// The outcome of an HTTP exchange.
#[derive(Debug, Clone)]
pub struct ResponseEnvelope<T> {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<T>,
    raw: Bytes,
}

impl<T> ResponseEnvelope<T>
where
    T: DeserializeOwned,
{
    /// Wraps a received response, decoding its body for the declared response type.
    ///
    /// An empty body, or a descriptor without a response type, yields no decoded body.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Deserialization`] when the body is neither
    /// a JSON document nor plain text matching `T`.
    pub fn decode(
        response_type: Option<ResponseType>,
        status: StatusCode,
        headers: HeaderMap,
        raw: Bytes,
    ) -> Result<Self, TransportError> {
        let body = match response_type {
            Some(response_type) if !raw.is_empty() => {
                trace!(%status, token = %response_type.token(), "decoding response body");
                Some(decode_body(&raw)?)
            }
            _ => None,
        };
        Ok(Self {
            status,
            headers,
            body,
            raw,
        })
    }
}

impl<T> ResponseEnvelope<T> {
    /// The response status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The decoded body.
    pub fn body(&self) -> Option<&T> {
        self.body.as_ref()
    }

    /// Consumes the envelope, returning the decoded body.
    pub fn into_body(self) -> Option<T> {
        self.body
    }

    /// The body as received.
    pub fn raw_body(&self) -> &Bytes {
        &self.raw
    }

    /// The body as received, read as UTF-8 text.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.raw).ok()
    }
}

fn decode_body<T>(raw: &[u8]) -> Result<T, TransportError>
where
    T: DeserializeOwned,
{
    let deserializer = &mut serde_json::Deserializer::from_slice(raw);
    let error = match serde_path_to_error::deserialize(deserializer) {
        Ok(body) => return Ok(body),
        Err(error) => error,
    };

    // plain text bodies, e.g. `text/plain` into a `String`
    if let Ok(text) = std::str::from_utf8(raw) {
        let deserializer: StrDeserializer<'_, serde::de::value::Error> = text.into_deserializer();
        if let Ok(body) = T::deserialize(deserializer) {
            return Ok(body);
        }
    }

    Err(TransportError::Deserialization {
        path: error.path().to_string(),
        error: error.into_inner(),
        body: String::from_utf8_lossy(raw).into_owned(),
    })
}

enum Pending<T> {
    Running(JoinHandle<Result<ResponseEnvelope<T>, TransportError>>),
    Failed(Option<TransportError>),
}

/// A response being received on a worker thread.
///
/// Await it from async code, or [`wait`](Self::wait) for it from blocking code.
#[must_use = "a pending response does nothing unless awaited or waited for"]
pub struct PendingResponse<T> {
    inner: Pending<T>,
}

impl<T> PendingResponse<T> {
    fn running(task: JoinHandle<Result<ResponseEnvelope<T>, TransportError>>) -> Self {
        Self {
            inner: Pending::Running(task),
        }
    }

    fn failed(error: TransportError) -> Self {
        Self {
            inner: Pending::Failed(Some(error)),
        }
    }

    /// Requests cancellation.
    ///
    /// Advisory only: a send that has not started yet is dropped and the
    /// waiter gets a [`TransportError::Join`], but a send already in flight
    /// runs to completion and its response is still delivered.
    pub fn cancel(&self) {
        if let Pending::Running(task) = &self.inner {
            debug!("cancelling pending response");
            task.abort();
        }
    }

    /// Whether the response is available.
    pub fn is_finished(&self) -> bool {
        match &self.inner {
            Pending::Running(task) => task.is_finished(),
            Pending::Failed(_) => true,
        }
    }

    /// Blocks the current thread until the response is available.
    ///
    /// Must not be called from async code; await the pending response there.
    ///
    /// # Errors
    ///
    /// Returns the send's error, or [`TransportError::Join`] if it was cancelled.
    pub fn wait(self) -> Result<ResponseEnvelope<T>, TransportError> {
        let runtime = tokio::runtime::Builder::new_current_thread().build()?;
        runtime.block_on(self)
    }
}

impl<T> Future for PendingResponse<T> {
    type Output = Result<ResponseEnvelope<T>, TransportError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().inner {
            Pending::Running(task) => match Pin::new(task).poll(cx) {
                Poll::Ready(Ok(result)) => Poll::Ready(result),
                Poll::Ready(Err(error)) => Poll::Ready(Err(error.into())),
                Poll::Pending => Poll::Pending,
            },
            Pending::Failed(error) => Poll::Ready(Err(error.take().unwrap_or_else(|| {
                TransportError::Io(io::Error::other("pending response already consumed"))
            }))),
        }
    }
}

impl<T> std::fmt::Debug for PendingResponse<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingResponse")
            .field("finished", &self.is_finished())
            .finish()
    }
}
