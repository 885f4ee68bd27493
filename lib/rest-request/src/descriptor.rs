use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;

use http::{HeaderMap, Method};
use url::Url;

use crate::body::BodyContent;
use crate::parameters::ParameterStore;

/// JSON object map used by [`RestRequest::with_expected_map_body`](crate::RestRequest::with_expected_map_body).
pub type MapBody = serde_json::Map<String, serde_json::Value>;

/// Runtime token naming the type a response body is decoded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeToken {
    id: TypeId,
    name: &'static str,
}

impl TypeToken {
    /// The token of `T`.
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The fully qualified type name.
    pub fn type_name(&self) -> &'static str {
        self.name
    }

    /// Whether this token names `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The declared response type of a request.
///
/// A plain token and a generic token are mutually exclusive; a request
/// without a declared type carries no `ResponseType` at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    /// A concrete type.
    Plain(TypeToken),
    /// A parameterized type, such as a collection or a map.
    Generic(TypeToken),
}

impl ResponseType {
    /// The underlying token, whichever kind it is.
    pub fn token(&self) -> TypeToken {
        match self {
            Self::Plain(token) | Self::Generic(token) => *token,
        }
    }
}

/// The resolved payload of a request.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Payload {
    /// No request body.
    #[default]
    Empty,
    /// A scalar body sent as the HTTP body.
    Body(BodyContent),
    /// Parameters submitted as form fields.
    Form(ParameterStore),
    /// Parameters and attachments submitted as a multipart payload.
    Multipart(ParameterStore),
}

impl Payload {
    /// Whether there is nothing to send.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Short name of the payload kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Body(_) => "body",
            Self::Form(_) => "form",
            Self::Multipart(_) => "multipart",
        }
    }
}

/// An immutable, fully resolved request.
///
/// Produced by the `build` operation of a stage, a descriptor has no
/// mutators. It can be cloned and sent any number of times, from any thread.
///
/// `T` is the type the response body is decoded into; `()` when no response
/// body is expected.
pub struct RequestDescriptor<T> {
    uri: Url,
    method: Method,
    headers: HeaderMap,
    payload: Payload,
    response_type: Option<ResponseType>,
    _response: PhantomData<fn() -> T>,
}

impl<T> RequestDescriptor<T> {
    pub(crate) fn new(
        uri: Url,
        method: Method,
        headers: HeaderMap,
        payload: Payload,
        response_type: Option<ResponseType>,
    ) -> Self {
        Self {
            uri,
            method,
            headers,
            payload,
            response_type,
            _response: PhantomData,
        }
    }

    /// The absolute URI, query string included.
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// The HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The header snapshot taken at build time.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The resolved payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The declared response type, plain or generic.
    pub fn declared_response_type(&self) -> Option<ResponseType> {
        self.response_type
    }

    /// The plain response token, if one was declared.
    pub fn response_type(&self) -> Option<TypeToken> {
        match self.response_type {
            Some(ResponseType::Plain(token)) => Some(token),
            _ => None,
        }
    }

    /// The generic response token, if one was declared.
    pub fn generic_response_type(&self) -> Option<TypeToken> {
        match self.response_type {
            Some(ResponseType::Generic(token)) => Some(token),
            _ => None,
        }
    }
}

impl<T> Clone for RequestDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            uri: self.uri.clone(),
            method: self.method.clone(),
            headers: self.headers.clone(),
            payload: self.payload.clone(),
            response_type: self.response_type,
            _response: PhantomData,
        }
    }
}

impl<T> PartialEq for RequestDescriptor<T> {
    fn eq(&self, other: &Self) -> bool {
        self.uri == other.uri
            && self.method == other.method
            && self.headers == other.headers
            && self.payload == other.payload
            && self.response_type == other.response_type
    }
}

impl<T> fmt::Debug for RequestDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDescriptor")
            .field("uri", &self.uri.as_str())
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("payload", &self.payload)
            .field("response_type", &self.response_type)
            .finish()
    }
}
