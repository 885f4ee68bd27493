/// Errors raised while building a request descriptor.
///
/// Every variant is fail-fast: the builder call that produced it consumed the
/// stage, so the chain has to be restarted from an entry point.
/// The `Invalid*` variants all belong to the invalid-argument family.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum RequestError {
    /// A required input is missing or violates a builder constraint.
    ///
    /// Occurs for an empty URI, missing template variables, a colon in a
    /// basic-auth username, or a sequence passed where an object is expected.
    #[display("Invalid argument: {message}")]
    #[from(skip)]
    InvalidArgument {
        /// Description of the violated constraint.
        message: String,
    },

    /// The URI cannot be parsed as an absolute URI.
    InvalidUri(url::ParseError),

    /// The header name contains characters not allowed by HTTP.
    InvalidHeaderName(http::header::InvalidHeaderName),

    /// The header value contains characters not allowed by HTTP.
    InvalidHeaderValue(http::header::InvalidHeaderValue),

    /// The media type cannot be parsed.
    InvalidMediaType(mime::FromStrError),

    /// Credentials cannot be represented in the charset required by basic authentication.
    #[display("Encoding error: {message}")]
    #[from(skip)]
    EncodingError {
        /// Description of the encoding failure.
        message: String,
    },

    /// A structured value cannot be converted to text.
    ///
    /// Occurs at build time when a body is marshalled into a `multipart/mixed`
    /// payload, or when a value handed to `set_params_from` cannot be serialized.
    SerializationError(serde_json::Error),
}

impl RequestError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Returns `true` for every error of the invalid-argument family.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. }
                | Self::InvalidUri(_)
                | Self::InvalidHeaderName(_)
                | Self::InvalidHeaderValue(_)
                | Self::InvalidMediaType(_)
        )
    }
}

/// Errors surfaced while a [`TransportAdapter`](crate::TransportAdapter) executes a descriptor.
///
/// Failures of the underlying HTTP client are carried unmodified.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum TransportError {
    /// HTTP client error from the underlying reqwest library.
    Reqwest(reqwest::Error),

    /// A file attachment could not be read.
    Io(std::io::Error),

    /// The descriptor payload could not be encoded for the wire.
    Request(RequestError),

    /// The response body could not be decoded into the declared response type.
    #[display("Failed to deserialize response at '{path}': {error}\n{body}")]
    #[from(skip)]
    Deserialization {
        /// Path inside the document where decoding failed.
        path: String,
        /// The underlying JSON error.
        error: serde_json::Error,
        /// The response body that failed to decode.
        body: String,
    },

    /// An asynchronous send was cancelled or its worker panicked.
    Join(tokio::task::JoinError),
}
