use std::marker::PhantomData;

use serde::Serialize;

use super::sealed::Accumulator;
use super::{HeaderSpec, RequestState};
use crate::descriptor::{Payload, RequestDescriptor};
use crate::error::RequestError;
use crate::multipart::append_query;
use crate::parameters::{HeaderStore, ParamValue, ParameterStore};

/// Parameter operations, on top of the [`HeaderSpec`] ones.
///
/// Parameters accumulate in insertion order: values of a key are never
/// reordered or de-duplicated. Where they end up (query string, form fields
/// or multipart parts) is decided when the request is built.
pub trait FormSpec: HeaderSpec {
    /// Appends one value under `key`.
    #[must_use]
    fn add_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params_mut().add(key, value);
        self
    }

    /// Appends every value under `key`, in order.
    #[must_use]
    fn add_params<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        self.params_mut().add_all(key, values);
        self
    }

    /// Merges a parameter multi-map.
    ///
    /// Values of keys already present are appended after the existing ones.
    #[must_use]
    fn merge_params(mut self, params: ParameterStore) -> Self {
        self.params_mut().merge(params);
        self
    }

    /// Adds every `(key, value)` pair, as [`add_param`](Self::add_param) would.
    #[must_use]
    fn set_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        let store = self.params_mut();
        for (key, value) in params {
            store.add(key, value);
        }
        self
    }

    /// Adds the fields of a serializable value as parameters.
    ///
    /// Every field becomes a key; a sequence field adds one value per element.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidArgument`] if the value does not
    /// serialize to an object, such as a sequence or a plain string.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rest_request::prelude::*;
    /// use serde::Serialize;
    ///
    /// #[derive(Serialize)]
    /// struct Search {
    ///     query: String,
    ///     tags: Vec<String>,
    /// }
    ///
    /// # fn example() -> Result<(), rest_request::RequestError> {
    /// let search = Search {
    ///     query: "rust".to_string(),
    ///     tags: vec!["http".to_string(), "client".to_string()],
    /// };
    /// let request = RestRequest::with_no_body()
    ///     .uri("https://api.example.com/search")?
    ///     .get()
    ///     .set_params_from(&search)?
    ///     .build()?;
    ///
    /// assert_eq!(
    ///     request.uri().query(),
    ///     Some("query=rust&tags=http&tags=client")
    /// );
    /// # Ok(())
    /// # }
    /// # example().unwrap();
    /// ```
    fn set_params_from<P>(mut self, value: &P) -> Result<Self, RequestError>
    where
        P: Serialize + ?Sized,
    {
        self.params_mut().add_fields(value)?;
        Ok(self)
    }
}

/// Stage of requests without a body (`GET`, `DELETE`).
///
/// Every parameter is sent in the query string.
#[derive(Debug)]
pub struct FormStage<T> {
    state: RequestState,
    _response: PhantomData<fn() -> T>,
}

impl<T> FormStage<T> {
    pub(super) fn new(state: RequestState) -> Self {
        Self {
            state,
            _response: PhantomData,
        }
    }

    /// Builds the request descriptor.
    ///
    /// Parameters are appended to the URI query, after any query the URI
    /// already carries. A key without values is dropped and a `null` value
    /// emits the bare key. Attachments cannot travel in a query string and
    /// are skipped.
    ///
    /// # Errors
    ///
    /// Kept fallible for symmetry with [`BodyStage::build`](crate::BodyStage::build);
    /// no failure is currently possible at this stage.
    pub fn build(self) -> Result<RequestDescriptor<T>, RequestError> {
        let mut state = self.state;
        append_query(&mut state.uri, &state.params);
        Ok(state.into_descriptor(Payload::Empty))
    }
}

impl<T> Accumulator for FormStage<T> {
    fn headers_mut(&mut self) -> &mut HeaderStore {
        &mut self.state.headers
    }

    fn params_mut(&mut self) -> &mut ParameterStore {
        &mut self.state.params
    }
}

impl<T> HeaderSpec for FormStage<T> {}

impl<T> FormSpec for FormStage<T> {}
