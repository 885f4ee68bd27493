use std::fmt::Debug;
use std::marker::PhantomData;

use serde::Serialize;

use super::sealed::Accumulator;
use super::{FormSpec, HeaderSpec, RequestState};
use crate::body::{Body, BodyContent};
use crate::descriptor::RequestDescriptor;
use crate::error::RequestError;
use crate::multipart::PendingPayload;
use crate::parameters::{Attachment, HeaderStore, ParameterStore};

/// Stage of requests with a body (`POST`, `PUT`, `PATCH`).
///
/// Adds the body and file operations to the header and parameter ones.
/// The payload is resolved by [`build`](Self::build):
///
/// | attachments | body | payload | parameters |
/// |---|---|---|---|
/// | no | no | form fields | in the payload |
/// | no | yes | the body | in the query string |
/// | yes | no | `multipart/form-data` | in the payload |
/// | yes | yes | `multipart/mixed`, body as a `body` part | in the payload |
///
/// # Example
///
/// ```rust
/// use rest_request::prelude::*;
///
/// # fn example() -> Result<(), rest_request::RequestError> {
/// let request = RestRequest::with_no_body()
///     .uri("https://api.example.com/documents")?
///     .post()
///     .json(serde_json::json!({ "title": "Quarterly report" }))
///     .add_file("file", Attachment::bytes("report.pdf", b"%PDF-1.7".to_vec()))
///     .build()?;
///
/// assert_eq!(request.headers()["content-type"], "multipart/mixed");
/// let Payload::Multipart(params) = request.payload() else {
///     panic!("expected a multipart payload");
/// };
/// assert_eq!(params.keys().collect::<Vec<_>>(), ["file", "body"]);
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Debug)]
pub struct BodyStage<T> {
    state: RequestState,
    body: Option<BodyContent>,
    multipart: bool,
    _response: PhantomData<fn() -> T>,
}

impl<T> BodyStage<T> {
    pub(super) fn new(state: RequestState) -> Self {
        Self {
            state,
            body: None,
            multipart: false,
            _response: PhantomData,
        }
    }

    /// Sets the request body.
    ///
    /// A [`ParameterStore`] is not a scalar body: its entries are merged into
    /// the request parameters and sent as form fields. Any other body replaces
    /// the previous one.
    #[must_use]
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        match body.into() {
            Body::Content(content) => self.body = Some(content),
            Body::Params(params) => self.state.params.merge(params),
        }
        self
    }

    /// Sets a structured body serialized as JSON.
    #[must_use]
    pub fn json<B>(self, value: B) -> Self
    where
        B: Serialize + Debug + Send + Sync + 'static,
    {
        self.body(Body::json(value))
    }

    /// Appends an attachment under `key` and switches the request to multipart.
    #[must_use]
    pub fn add_file(mut self, key: impl Into<String>, attachment: impl Into<Attachment>) -> Self {
        self.state.params.add(key, attachment.into());
        self.multipart = true;
        self
    }

    /// Builds the request descriptor, resolving the payload.
    ///
    /// When the payload becomes multipart, `Content-Type` is set to
    /// `multipart/form-data` (files only) or `multipart/mixed` (files and a
    /// body) unless a multipart media type was already declared.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::SerializationError`] when the body has to be
    /// marshalled into a `multipart/mixed` part and cannot be serialized.
    pub fn build(self) -> Result<RequestDescriptor<T>, RequestError> {
        let Self {
            mut state,
            body,
            multipart,
            ..
        } = self;
        let pending = PendingPayload {
            params: std::mem::take(&mut state.params),
            body,
            multipart,
        };
        let payload = pending.resolve(&mut state.uri, &mut state.headers)?;
        Ok(state.into_descriptor(payload))
    }
}

impl<T> Accumulator for BodyStage<T> {
    fn headers_mut(&mut self) -> &mut HeaderStore {
        &mut self.state.headers
    }

    fn params_mut(&mut self) -> &mut ParameterStore {
        &mut self.state.params
    }
}

impl<T> HeaderSpec for BodyStage<T> {}

impl<T> FormSpec for BodyStage<T> {}
