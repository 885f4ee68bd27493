use serde_json::Value;

use super::Attachment;

/// A single value stored under a parameter key.
///
/// Values are either plain data (scalars or structured JSON) or binary attachments.
#[derive(Debug, Clone, PartialEq, derive_more::From)]
pub enum ParamValue {
    /// A scalar or structured value.
    Value(Value),
    /// A binary attachment.
    Attachment(Attachment),
}

impl ParamValue {
    /// Whether this value is an attachment handle.
    pub fn is_attachment(&self) -> bool {
        matches!(self, Self::Attachment(_))
    }

    /// Returns the plain value, `None` for attachments.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Attachment(_) => None,
        }
    }

    /// Returns the attachment, `None` for plain values.
    pub fn as_attachment(&self) -> Option<&Attachment> {
        match self {
            Self::Attachment(attachment) => Some(attachment),
            Self::Value(_) => None,
        }
    }

    /// Text used when this value is written as a query parameter or a text field.
    ///
    /// Strings are used verbatim, numbers and booleans by their display form,
    /// arrays and objects as compact JSON. Returns `None` for `null` and attachments.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Value(Value::Null) | Self::Attachment(_) => None,
            Self::Value(Value::String(text)) => Some(text.clone()),
            Self::Value(value) => Some(value.to_string()),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Value(Value::String(value.to_string()))
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Value(Value::String(value))
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::Value(Value::String(value.clone()))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Value(Value::Bool(value))
    }
}

macro_rules! impl_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    Self::Value(Value::from(value))
                }
            }
        )*
    };
}

impl_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<T> From<Option<T>> for ParamValue
where
    T: Into<ParamValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Value(Value::Null), Into::into)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case::string(ParamValue::from("hello world"), Some("hello world"))]
    #[case::integer(ParamValue::from(42), Some("42"))]
    #[case::float(ParamValue::from(1.5), Some("1.5"))]
    #[case::boolean(ParamValue::from(true), Some("true"))]
    #[case::null(ParamValue::from(None::<String>), None)]
    #[case::array(ParamValue::from(json!([1, 2])), Some("[1,2]"))]
    #[case::object(ParamValue::from(json!({"a": "b"})), Some(r#"{"a":"b"}"#))]
    fn test_as_text(#[case] value: ParamValue, #[case] expected: Option<&str>) {
        assert_eq!(value.as_text().as_deref(), expected);
    }

    #[test]
    fn test_attachment_detection() {
        let file = ParamValue::from(Attachment::file("a.txt"));
        let plain = ParamValue::from("a.txt");

        assert!(file.is_attachment());
        assert!(file.as_text().is_none());
        assert_eq!(
            file.as_attachment(),
            Some(&Attachment::File(PathBuf::from("a.txt")))
        );
        assert!(!plain.is_attachment());
        assert!(plain.as_attachment().is_none());
    }

    #[test]
    fn test_some_value_converts_inner() {
        let value = ParamValue::from(Some(7_u8));

        assert_eq!(value.as_value(), Some(&json!(7)));
    }
}
