use std::fmt::Debug;
use std::sync::Arc;

use base64::Engine;
use bytes::Bytes;
use serde::Serialize;

use crate::parameters::ParameterStore;

/// A structured value that can be written as JSON.
///
/// Implemented for every `Serialize + Debug + Send + Sync` type, so callers
/// never implement it by hand.
pub trait JsonContent: Debug + Send + Sync {
    /// Writes the value as compact JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error if the value cannot be represented as JSON.
    fn to_json(&self) -> Result<Vec<u8>, serde_json::Error>;
}

impl<T> JsonContent for T
where
    T: Serialize + Debug + Send + Sync,
{
    fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// A structured request body, serialized when the request is built or sent.
#[derive(Debug, Clone)]
pub struct JsonBody(Arc<dyn JsonContent>);

impl JsonBody {
    /// Wraps a serializable value.
    pub fn new<T>(value: T) -> Self
    where
        T: Serialize + Debug + Send + Sync + 'static,
    {
        Self(Arc::new(value))
    }

    /// Writes the value as compact JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error if the value cannot be represented as JSON.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        self.0.to_json()
    }
}

impl PartialEq for JsonBody {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || matches!((self.to_json(), other.to_json()), (Ok(left), Ok(right)) if left == right)
    }
}

/// The scalar body of a request.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyContent {
    /// Plain text.
    Text(String),
    /// Raw bytes.
    Bytes(Bytes),
    /// A structured value written as JSON.
    Json(JsonBody),
}

impl BodyContent {
    /// Marshals the body into a structured text representation.
    ///
    /// Used when the body shares a `multipart/mixed` payload with attachments:
    /// text becomes a JSON string literal, bytes a Base64 JSON string and
    /// structured values their JSON document.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error if the body cannot be written as JSON.
    pub fn to_structured_text(&self) -> Result<String, serde_json::Error> {
        match self {
            Self::Text(text) => serde_json::to_string(text),
            Self::Bytes(bytes) => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
                serde_json::to_string(&encoded)
            }
            Self::Json(json) => {
                let data = json.to_json()?;
                Ok(String::from_utf8_lossy(&data).into_owned())
            }
        }
    }
}

/// Input accepted by [`BodyStage::body`](crate::BodyStage::body).
///
/// A parameter multi-map is not a scalar body: it is merged into the request
/// parameters and submitted as form data.
#[derive(Debug, Clone, PartialEq, derive_more::From)]
pub enum Body {
    /// A scalar body.
    Content(BodyContent),
    /// Form fields merged into the request parameters.
    Params(ParameterStore),
}

impl Body {
    /// A structured body serialized as JSON.
    pub fn json<T>(value: T) -> Self
    where
        T: Serialize + Debug + Send + Sync + 'static,
    {
        Self::Content(BodyContent::Json(JsonBody::new(value)))
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Self::Content(BodyContent::Text(value))
    }
}

impl From<&str> for Body {
    fn from(value: &str) -> Self {
        Self::Content(BodyContent::Text(value.to_string()))
    }
}

impl From<Vec<u8>> for Body {
    fn from(value: Vec<u8>) -> Self {
        Self::Content(BodyContent::Bytes(Bytes::from(value)))
    }
}

impl From<Bytes> for Body {
    fn from(value: Bytes) -> Self {
        Self::Content(BodyContent::Bytes(value))
    }
}

impl From<JsonBody> for Body {
    fn from(value: JsonBody) -> Self {
        Self::Content(BodyContent::Json(value))
    }
}
