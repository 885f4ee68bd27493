use std::sync::LazyLock;

use mime::Mime;
use tracing::{debug, warn};
use url::Url;

use crate::body::BodyContent;
use crate::descriptor::Payload;
use crate::error::RequestError;
use crate::parameters::{HeaderStore, ParamValue, ParameterStore};

/// Key under which a scalar body is stored when it shares a multipart payload with attachments.
pub(crate) const BODY_KEY: &str = "body";

/// Accumulated state of a body-capable request, resolved into its payload at build time.
#[derive(Debug)]
pub(crate) struct PendingPayload {
    pub(crate) params: ParameterStore,
    pub(crate) body: Option<BodyContent>,
    pub(crate) multipart: bool,
}

impl PendingPayload {
    /// Classifies the payload as plain, form, `multipart/form-data` or `multipart/mixed`.
    ///
    /// May rewrite the `Content-Type` header, and appends the parameters to
    /// `uri` when a scalar body takes the request body slot.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::SerializationError`] when a scalar body cannot
    /// be marshalled into the `multipart/mixed` payload.
    pub(crate) fn resolve(
        self,
        uri: &mut Url,
        headers: &mut HeaderStore,
    ) -> Result<Payload, RequestError> {
        let Self {
            mut params,
            body,
            multipart,
        } = self;
        let multipart = multipart || params.has_attachment();

        let payload = match (multipart, body) {
            (false, Some(body)) => {
                if !params.is_empty() {
                    append_query(uri, &params);
                }
                Payload::Body(body)
            }
            (false, None) if params.is_empty() => Payload::Empty,
            (false, None) => Payload::Form(params),
            (true, None) => {
                force_multipart_content_type(headers, &mime::MULTIPART_FORM_DATA)?;
                Payload::Multipart(params)
            }
            (true, Some(body)) => {
                force_multipart_content_type(headers, &MULTIPART_MIXED)?;
                params.add(BODY_KEY, body.to_structured_text()?);
                Payload::Multipart(params)
            }
        };

        debug!(kind = payload.kind(), "payload resolved");
        Ok(payload)
    }
}

// `mime` has no constant for this subtype
static MULTIPART_MIXED: LazyLock<Mime> =
    LazyLock::new(|| "multipart/mixed".parse().expect("a valid media type"));

/// Sets `Content-Type` to `media_type` unless a multipart-family type is already declared.
fn force_multipart_content_type(
    headers: &mut HeaderStore,
    media_type: &Mime,
) -> Result<(), RequestError> {
    if headers.has_multipart_content_type() {
        return Ok(());
    }
    headers.set_content_type(Some(media_type))
}

/// Appends every parameter to the query string of `uri`.
///
/// Keys keep their insertion order and are repeated once per value. A key
/// with no values is dropped, a `null` value emits the bare key, and
/// attachments are skipped since a query string cannot carry them.
pub(crate) fn append_query(uri: &mut Url, params: &ParameterStore) {
    let mut pairs = Vec::new();
    for (key, values) in params.iter() {
        for value in values {
            match value {
                ParamValue::Attachment(attachment) => {
                    warn!(
                        key,
                        filename = attachment.filename(),
                        "attachment cannot be sent in a query string, skipped"
                    );
                }
                value => pairs.push((key, value.as_text())),
            }
        }
    }

    if pairs.is_empty() {
        return;
    }

    let mut query = uri.query_pairs_mut();
    for (key, text) in pairs {
        match text {
            Some(text) => query.append_pair(key, &text),
            None => query.append_key_only(key),
        };
    }
}
