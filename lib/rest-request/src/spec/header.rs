use mime::Mime;

use super::sealed::Accumulator;
use crate::auth::{self, SecureString};
use crate::error::RequestError;

/// Header operations of the [`FormStage`](crate::FormStage) and [`BodyStage`](crate::BodyStage).
///
/// Every operation consumes the stage and hands it back, so calls chain.
/// Header names and values are validated as they are added.
///
/// # Example
///
/// ```rust
/// use rest_request::prelude::*;
///
/// # fn example() -> Result<(), rest_request::RequestError> {
/// let request = RestRequest::with_no_body()
///     .uri("https://api.example.com/reports")?
///     .get()
///     .add_header("X-Trace", "a")?
///     .add_header("X-Trace", "b")?
///     .accept_all(["application/json", "text/csv"])?
///     .bearer_token("token")?
///     .build()?;
///
/// assert_eq!(request.headers().get_all("x-trace").iter().count(), 2);
/// assert_eq!(request.headers()["accept"], "application/json, text/csv");
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub trait HeaderSpec: Accumulator + Sized {
    /// Appends a header value, keeping the values already set for `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or the value is not valid in an HTTP header.
    fn add_header(mut self, name: &str, value: &str) -> Result<Self, RequestError> {
        self.headers_mut().append(name, value)?;
        Ok(self)
    }

    /// Appends every value to `name`, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or one of the values is not valid in an HTTP header.
    fn add_headers<I, V>(mut self, name: &str, values: I) -> Result<Self, RequestError>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<str>,
    {
        for value in values {
            self.headers_mut().append(name, value.as_ref())?;
        }
        Ok(self)
    }

    /// Replaces the `Accept` header with a single media type.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidMediaType`] if the media type cannot be parsed.
    fn accept(self, media_type: &str) -> Result<Self, RequestError> {
        self.accept_all([media_type])
    }

    /// Replaces the `Accept` header with an ordered list of media types.
    ///
    /// Calling it again replaces the previous list; an empty list removes the header.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidMediaType`] if a media type cannot be parsed.
    fn accept_all<I, V>(mut self, media_types: I) -> Result<Self, RequestError>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<str>,
    {
        let media_types = media_types
            .into_iter()
            .map(|media_type| media_type.as_ref().parse::<Mime>())
            .collect::<Result<Vec<_>, _>>()?;
        self.headers_mut().set_accept(&media_types)?;
        Ok(self)
    }

    /// Replaces the `Content-Type` header; an empty media type clears it.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidMediaType`] if the media type cannot be parsed.
    fn content_type(mut self, media_type: &str) -> Result<Self, RequestError> {
        let media_type = media_type.trim();
        if media_type.is_empty() {
            self.headers_mut().set_content_type(None)?;
        } else {
            let media_type = media_type.parse::<Mime>()?;
            self.headers_mut().set_content_type(Some(&media_type))?;
        }
        Ok(self)
    }

    /// Replaces the `Authorization` header with a raw value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not valid in an HTTP header.
    fn authorization(mut self, value: &str) -> Result<Self, RequestError> {
        self.headers_mut().set_authorization(value)?;
        Ok(self)
    }

    /// Sets a basic `Authorization` header.
    ///
    /// # Errors
    ///
    /// - [`RequestError::InvalidArgument`] if the username contains a colon
    /// - [`RequestError::EncodingError`] if a credential is not representable in ISO-8859-1
    fn basic_auth(
        mut self,
        username: &str,
        password: impl Into<SecureString>,
    ) -> Result<Self, RequestError> {
        let value = auth::basic_authorization(username, &password.into())?;
        self.headers_mut().set_authorization(value.as_str())?;
        Ok(self)
    }

    /// Sets a bearer `Authorization` header.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not valid in an HTTP header.
    fn bearer_token(mut self, token: impl Into<SecureString>) -> Result<Self, RequestError> {
        let value = auth::bearer_authorization(&token.into());
        self.headers_mut().set_authorization(value.as_str())?;
        Ok(self)
    }
}
