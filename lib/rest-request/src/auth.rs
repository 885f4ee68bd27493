use std::fmt;

use base64::Engine;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::RequestError;

/// Secure wrapper for sensitive string data that zeroes its memory on drop.
///
/// Used for passwords and tokens so credentials never linger after the
/// `Authorization` value has been computed.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString(String);

impl SecureString {
    /// Creates a new secure string from the provided value.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Returns a reference to the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Masks sensitive data for display/logging purposes.
    fn mask_sensitive(value: &str) -> String {
        let chars: Vec<char> = value.chars().collect();
        if chars.len() <= 8 {
            return "***".to_string();
        }
        let head: String = chars.iter().take(4).collect();
        let tail: String = chars.iter().skip(chars.len() - 4).collect();
        format!("{head}...{tail}")
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureString")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Self::mask_sensitive(&self.0))
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

/// Encodes a string as ISO-8859-1, failing on any character above U+00FF.
fn encode_latin1(value: &str) -> Option<Vec<u8>> {
    value
        .chars()
        .map(|ch| u8::try_from(u32::from(ch)).ok())
        .collect()
}

/// Computes the value of a basic `Authorization` header (RFC 7617).
///
/// The credentials are encoded as ISO-8859-1 before Base64.
///
/// # Errors
///
/// - [`RequestError::InvalidArgument`] if the username contains a colon
/// - [`RequestError::EncodingError`] if a credential has characters outside ISO-8859-1
pub(crate) fn basic_authorization(
    username: &str,
    password: &SecureString,
) -> Result<SecureString, RequestError> {
    if username.contains(':') {
        return Err(RequestError::invalid_argument(
            "Username must not contain a colon",
        ));
    }

    let credentials = SecureString::new(format!("{username}:{}", password.as_str()));
    let mut bytes = encode_latin1(credentials.as_str()).ok_or_else(|| {
        RequestError::EncodingError {
            message: "Username or password contains characters that cannot be encoded to ISO-8859-1"
                .to_string(),
        }
    })?;

    let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
    bytes.zeroize();

    Ok(SecureString::new(format!("Basic {encoded}")))
}

/// Computes the value of a bearer `Authorization` header (RFC 6750).
pub(crate) fn bearer_authorization(token: &SecureString) -> SecureString {
    SecureString::new(format!("Bearer {}", token.as_str()))
}
