//! The staged request builder.
//!
//! A request is specified in a fixed order, each stage narrowing what can be
//! called next:
//!
//! 1. [`RestRequest`] declares the expected response type and yields a [`UriStage`]
//! 2. [`UriStage`] takes the target URI and yields a [`MethodStage`]
//! 3. [`MethodStage`] selects the HTTP method:
//!    - `GET`/`DELETE` yield a [`FormStage`] (headers and query parameters)
//!    - `POST`/`PUT`/`PATCH` yield a [`BodyStage`] (headers, parameters, body and files)
//! 4. `build()` consumes the stage and returns an immutable [`RequestDescriptor`]
//!
//! Header operations come from [`HeaderSpec`], parameter operations from
//! [`FormSpec`]; both traits are implemented by the two last stages.

use std::marker::PhantomData;

use http::Method;
use tracing::debug;
use url::Url;

use crate::descriptor::{MapBody, Payload, RequestDescriptor, ResponseType, TypeToken};
use crate::error::RequestError;
use crate::parameters::{HeaderStore, ParameterStore};
use crate::uri;

mod header;
pub use self::header::HeaderSpec;

mod form;
pub use self::form::{FormSpec, FormStage};

mod body;
pub use self::body::BodyStage;

#[cfg(test)]
mod tests;

pub(crate) mod sealed {
    use crate::parameters::{HeaderStore, ParameterStore};

    /// Access to the stores a stage accumulates into.
    pub trait Accumulator {
        fn headers_mut(&mut self) -> &mut HeaderStore;

        fn params_mut(&mut self) -> &mut ParameterStore;
    }
}

/// Entry points of the builder.
///
/// # Example
///
/// ```rust
/// use rest_request::prelude::*;
///
/// # fn example() -> Result<(), rest_request::RequestError> {
/// let request = RestRequest::with_no_body()
///     .uri_template("https://api.example.com/users/{id}/posts", [42])?
///     .get()
///     .accept("application/json")?
///     .add_param("page", 2)
///     .build()?;
///
/// assert_eq!(
///     request.uri().as_str(),
///     "https://api.example.com/users/42/posts?page=2"
/// );
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RestRequest;

impl RestRequest {
    /// Starts a request whose response body decodes into `T`.
    pub fn with_expected_body<T: 'static>() -> UriStage<T> {
        UriStage::new(Some(ResponseType::Plain(TypeToken::of::<T>())))
    }

    /// Starts a request whose response body decodes into a parameterized type,
    /// such as `Vec<User>` or `HashMap<String, User>`.
    pub fn with_expected_generic_body<T: 'static>() -> UriStage<T> {
        UriStage::new(Some(ResponseType::Generic(TypeToken::of::<T>())))
    }

    /// Starts a request with no response body; the exchange is still executed.
    pub fn with_no_body() -> UriStage<()> {
        UriStage::new(None)
    }

    /// Starts a request whose response body is a JSON object.
    pub fn with_expected_map_body() -> UriStage<MapBody> {
        Self::with_expected_generic_body::<MapBody>()
    }
}

/// First stage: only the URI can be supplied.
#[derive(Debug)]
pub struct UriStage<T> {
    response_type: Option<ResponseType>,
    _response: PhantomData<fn() -> T>,
}

impl<T> UriStage<T> {
    fn new(response_type: Option<ResponseType>) -> Self {
        Self {
            response_type,
            _response: PhantomData,
        }
    }

    /// Sets the absolute target URI.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidArgument`] for an empty URI and
    /// [`RequestError::InvalidUri`] when it is not an absolute URI.
    pub fn uri(self, uri: &str) -> Result<MethodStage<T>, RequestError> {
        let uri = uri::parse_absolute(uri)?;
        Ok(self.uri_url(uri))
    }

    /// Sets an already parsed target URI.
    pub fn uri_url(self, uri: Url) -> MethodStage<T> {
        MethodStage {
            uri,
            response_type: self.response_type,
            _response: PhantomData,
        }
    }

    /// Expands a URI template and sets the result as target URI.
    ///
    /// `{name}` placeholders take the variables positionally, in order of
    /// first appearance. Each value is percent-encoded as a path segment.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidArgument`] for an empty template or too
    /// few variables, and [`RequestError::InvalidUri`] when the expanded text
    /// is not an absolute URI.
    pub fn uri_template<I>(self, template: &str, variables: I) -> Result<MethodStage<T>, RequestError>
    where
        I: IntoIterator,
        I::Item: std::fmt::Display,
    {
        let uri = uri::expand_template(template, variables)?;
        Ok(self.uri_url(uri))
    }
}

/// Second stage: selects the HTTP method.
#[derive(Debug)]
pub struct MethodStage<T> {
    uri: Url,
    response_type: Option<ResponseType>,
    _response: PhantomData<fn() -> T>,
}

impl<T> MethodStage<T> {
    fn into_state(self, method: Method) -> RequestState {
        RequestState {
            uri: self.uri,
            method,
            headers: HeaderStore::new(),
            params: ParameterStore::new(),
            response_type: self.response_type,
        }
    }

    /// A `GET` request.
    pub fn get(self) -> FormStage<T> {
        FormStage::new(self.into_state(Method::GET))
    }

    /// A `DELETE` request.
    pub fn delete(self) -> FormStage<T> {
        FormStage::new(self.into_state(Method::DELETE))
    }

    /// A `POST` request.
    pub fn post(self) -> BodyStage<T> {
        BodyStage::new(self.into_state(Method::POST))
    }

    /// A `PUT` request.
    pub fn put(self) -> BodyStage<T> {
        BodyStage::new(self.into_state(Method::PUT))
    }

    /// A `PATCH` request.
    pub fn patch(self) -> BodyStage<T> {
        BodyStage::new(self.into_state(Method::PATCH))
    }
}

/// State shared by the header and parameter capable stages.
#[derive(Debug)]
pub(crate) struct RequestState {
    uri: Url,
    method: Method,
    headers: HeaderStore,
    params: ParameterStore,
    response_type: Option<ResponseType>,
}

impl RequestState {
    fn into_descriptor<T>(self, payload: Payload) -> RequestDescriptor<T> {
        debug!(method = %self.method, uri = %self.uri, payload = payload.kind(), "request built");
        RequestDescriptor::new(
            self.uri,
            self.method,
            self.headers.snapshot(),
            payload,
            self.response_type,
        )
    }
}
