use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue};
use mime::Mime;

use crate::error::RequestError;

/// Ordered multi-map of request headers.
///
/// Backed by [`http::HeaderMap`], which owns header-name canonicalization:
/// names match case-insensitively and the values of one name keep their
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderStore {
    headers: HeaderMap,
}

impl HeaderStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value to `name`, keeping existing values.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or value is not valid in an HTTP header.
    pub fn append(&mut self, name: &str, value: &str) -> Result<(), RequestError> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        let value = HeaderValue::from_str(value)?;
        self.headers.append(name, value);
        Ok(())
    }

    /// Replaces every value of `name` with a single value.
    pub(crate) fn set(&mut self, name: HeaderName, value: &str) -> Result<(), RequestError> {
        let value = HeaderValue::from_str(value)?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Replaces the `Accept` header with the given media types, in order.
    ///
    /// The list is emitted as a single comma-separated value. An empty list removes the header.
    pub(crate) fn set_accept(&mut self, media_types: &[Mime]) -> Result<(), RequestError> {
        if media_types.is_empty() {
            self.headers.remove(ACCEPT);
            return Ok(());
        }
        let value = media_types
            .iter()
            .map(Mime::as_ref)
            .collect::<Vec<_>>()
            .join(", ");
        self.set(ACCEPT, &value)
    }

    /// Replaces the `Content-Type` header; `None` removes it.
    pub(crate) fn set_content_type(&mut self, media_type: Option<&Mime>) -> Result<(), RequestError> {
        match media_type {
            Some(media_type) => self.set(CONTENT_TYPE, media_type.as_ref()),
            None => {
                self.headers.remove(CONTENT_TYPE);
                Ok(())
            }
        }
    }

    /// Replaces the `Authorization` header.
    pub(crate) fn set_authorization(&mut self, value: &str) -> Result<(), RequestError> {
        let mut value = HeaderValue::from_str(value)?;
        value.set_sensitive(true);
        self.headers.insert(AUTHORIZATION, value);
        Ok(())
    }

    /// The current `Content-Type` value, if set and readable as text.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    /// Whether the current `Content-Type` belongs to the multipart family.
    ///
    /// Matches the media type's main type against `multipart`, ignoring case,
    /// so custom subtypes count as well.
    pub fn has_multipart_content_type(&self) -> bool {
        self.content_type().is_some_and(is_multipart)
    }

    /// Values stored under `name`, in insertion order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect()
    }

    /// Whether no header is set.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Freezes the headers into the map stored by a request descriptor.
    pub fn snapshot(self) -> HeaderMap {
        self.headers
    }
}

/// Case-insensitive `multipart` prefix test on a media type string.
pub(crate) fn is_multipart(media_type: &str) -> bool {
    media_type
        .trim_start()
        .get(..9)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("multipart"))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_append_keeps_existing_values() {
        let mut headers = HeaderStore::new();
        headers.append("X-Trace", "a").expect("valid header");
        headers.append("x-trace", "b").expect("valid header");

        assert_eq!(headers.get_all("X-TRACE"), vec!["a", "b"]);
    }

    #[test]
    fn test_accept_replaces_previous_values() {
        let mut headers = HeaderStore::new();
        headers.append("Accept", "text/html").expect("valid header");

        headers
            .set_accept(&[mime::APPLICATION_JSON])
            .expect("valid accept");
        headers
            .set_accept(&[mime::TEXT_PLAIN, mime::TEXT_XML])
            .expect("valid accept");

        assert_eq!(headers.get_all("accept"), vec!["text/plain, text/xml"]);
    }

    #[test]
    fn test_content_type_can_be_cleared() {
        let mut headers = HeaderStore::new();
        headers
            .set_content_type(Some(&mime::APPLICATION_JSON))
            .expect("valid content type");
        assert_eq!(headers.content_type(), Some("application/json"));

        headers.set_content_type(None).expect("clearing never fails");
        assert_eq!(headers.content_type(), None);
    }

    #[test]
    fn test_invalid_header_name_is_rejected() {
        let mut headers = HeaderStore::new();

        let error = headers
            .append("Invalid Header", "value")
            .expect_err("space in name");

        assert!(matches!(error, RequestError::InvalidHeaderName(_)));
        assert!(headers.is_empty());
    }

    #[test]
    fn test_authorization_is_sensitive() {
        let mut headers = HeaderStore::new();
        headers
            .set_authorization("Bearer secret")
            .expect("valid token");

        let snapshot = headers.snapshot();
        let value = snapshot.get(AUTHORIZATION).expect("authorization set");
        assert!(value.is_sensitive());
    }

    #[rstest]
    #[case("multipart/form-data", true)]
    #[case("Multipart/Mixed", true)]
    #[case("MULTIPART/related; boundary=x", true)]
    #[case("application/json", false)]
    #[case("multi", false)]
    #[case("", false)]
    fn test_is_multipart(#[case] media_type: &str, #[case] expected: bool) {
        assert_eq!(is_multipart(media_type), expected);
    }
}
