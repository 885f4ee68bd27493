use std::time::Duration;

use headers::{ContentType, HeaderMapExt};
use http::header::{CONTENT_TYPE, USER_AGENT};
use http::{HeaderMap, HeaderValue};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::{ResponseEnvelope, TransportAdapter};
use crate::body::BodyContent;
use crate::descriptor::{Payload, RequestDescriptor};
use crate::error::{RequestError, TransportError};
use crate::parameters::{Attachment, ParamValue, ParameterStore, is_multipart};

/// [`TransportAdapter`] over a blocking [`reqwest`] client.
///
/// Payloads are written as follows:
///
/// - a text body as `text/plain`, bytes as `application/octet-stream`, a
///   structured body as `application/json`, unless a `Content-Type` was set
/// - form parameters as `application/x-www-form-urlencoded`, or as multipart
///   when a multipart `Content-Type` was declared
/// - multipart parameters as a multipart payload keeping the declared
///   subtype: strings become text parts, other values `application/json`
///   parts and attachments file parts
///
/// No TLS backend of `reqwest` is enabled here, so `https://` URIs fail at
/// send time unless the depending crate enables one of `reqwest`'s TLS
/// features.
#[derive(Debug, Clone, Default)]
pub struct ReqwestAdapter {
    client: Client,
}

impl ReqwestAdapter {
    /// An adapter over a default client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts configuring the underlying client.
    pub fn builder() -> ReqwestAdapterBuilder {
        ReqwestAdapterBuilder::default()
    }

    fn prepare<T>(&self, descriptor: &RequestDescriptor<T>) -> Result<RequestBuilder, TransportError> {
        let mut headers = descriptor.headers().clone();
        let request = self
            .client
            .request(descriptor.method().clone(), descriptor.uri().clone());

        let request = match descriptor.payload() {
            Payload::Empty => request,
            Payload::Body(body) => {
                let (content_type, data) = match body {
                    BodyContent::Text(text) => (ContentType::text(), text.clone().into_bytes()),
                    BodyContent::Bytes(bytes) => (ContentType::octet_stream(), bytes.to_vec()),
                    BodyContent::Json(json) => (
                        ContentType::json(),
                        json.to_json().map_err(RequestError::from)?,
                    ),
                };
                if !headers.contains_key(CONTENT_TYPE) {
                    headers.typed_insert(content_type);
                }
                request.body(data)
            }
            Payload::Form(params) if !declares_multipart(&headers) => {
                let data = serde_urlencoded::to_string(params.to_text_pairs()).map_err(|err| {
                    RequestError::EncodingError {
                        message: err.to_string(),
                    }
                })?;
                if !headers.contains_key(CONTENT_TYPE) {
                    headers.typed_insert(ContentType::form_url_encoded());
                }
                request.body(data)
            }
            Payload::Form(params) | Payload::Multipart(params) => {
                let form = multipart_form(params)?;
                let content_type = multipart_content_type(&headers, form.boundary())?;
                headers.insert(CONTENT_TYPE, content_type);
                request.multipart(form)
            }
        };

        // set last: replaces the content type chosen by `multipart`
        Ok(request.headers(headers))
    }
}

impl From<Client> for ReqwestAdapter {
    fn from(client: Client) -> Self {
        Self { client }
    }
}

impl TransportAdapter for ReqwestAdapter {
    fn send<T>(&self, descriptor: &RequestDescriptor<T>) -> Result<ResponseEnvelope<T>, TransportError>
    where
        T: DeserializeOwned,
    {
        let request = self.prepare(descriptor)?.build()?;

        debug!(?request, payload = descriptor.payload().kind(), "sending...");
        let response = self.client.execute(request)?;
        debug!(?response, "...receiving");

        let status = response.status();
        let headers = response.headers().clone();
        let raw = response.bytes()?;

        ResponseEnvelope::decode(descriptor.declared_response_type(), status, headers, raw)
    }
}

fn declares_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(is_multipart)
}

/// Keeps the declared multipart media type, attaching the boundary of the generated payload.
fn multipart_content_type(headers: &HeaderMap, boundary: &str) -> Result<HeaderValue, RequestError> {
    let essence = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .filter(|value| is_multipart(value))
        .and_then(|value| value.split(';').next())
        .map_or("multipart/form-data", str::trim);

    let value = HeaderValue::from_str(&format!("{essence}; boundary={boundary}"))?;
    Ok(value)
}

fn multipart_form(params: &ParameterStore) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for (key, values) in params.iter() {
        for value in values {
            form = match value {
                ParamValue::Value(Value::Null) => form,
                ParamValue::Value(Value::String(text)) => form.text(key.to_string(), text.clone()),
                ParamValue::Value(value) => {
                    let part = Part::text(value.to_string()).mime_str("application/json")?;
                    form.part(key.to_string(), part)
                }
                ParamValue::Attachment(Attachment::File(path)) => form.file(key.to_string(), path)?,
                ParamValue::Attachment(Attachment::Bytes {
                    filename,
                    content_type,
                    content,
                }) => {
                    let mut part = Part::bytes(content.to_vec());
                    if let Some(filename) = filename {
                        part = part.file_name(filename.clone());
                    }
                    let part = match content_type {
                        Some(content_type) => part.mime_str(content_type.as_ref())?,
                        None => part.mime_str("application/octet-stream")?,
                    };
                    form.part(key.to_string(), part)
                }
            };
        }
    }
    Ok(form)
}

/// Configures the client of a [`ReqwestAdapter`].
///
/// Timeouts and connection pooling belong to the client, not to the request
/// descriptors.
#[derive(Debug, Default)]
pub struct ReqwestAdapterBuilder {
    default_headers: HeaderMap,
    user_agent: Option<String>,
    timeout: Option<Duration>,
}

impl ReqwestAdapterBuilder {
    /// Adds a header sent with every request that does not set it itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or the value is not valid in an HTTP header.
    pub fn with_default_header(mut self, name: &str, value: &str) -> Result<Self, RequestError> {
        let name = http::HeaderName::from_bytes(name.as_bytes())?;
        let value = HeaderValue::from_str(value)?;
        self.default_headers.append(name, value);
        Ok(self)
    }

    /// Sets the `User-Agent` header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Sets the total timeout of a request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the adapter.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Reqwest`] if the client cannot be created.
    pub fn build(self) -> Result<ReqwestAdapter, TransportError> {
        let Self {
            mut default_headers,
            user_agent,
            timeout,
        } = self;

        if let Some(user_agent) = user_agent {
            let value = HeaderValue::from_str(&user_agent).map_err(RequestError::from)?;
            default_headers.insert(USER_AGENT, value);
        }

        let mut builder = Client::builder().default_headers(default_headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(ReqwestAdapter { client })
    }
}
