use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::Serialize;
use serde_json::Value;

use super::ParamValue;
use crate::error::RequestError;

/// Ordered multi-map from parameter keys to ordered lists of values.
///
/// Accumulates query parameters, form fields and file attachments. Both the
/// key order and the value order within a key follow insertion order; nothing
/// is reordered or de-duplicated.
///
/// # Example
///
/// ```rust
/// use rest_request::ParameterStore;
///
/// let mut params = ParameterStore::new();
/// params.add("tag", "rust");
/// params.add("tag", "http");
/// params.add("page", 2);
///
/// assert_eq!(params.keys().collect::<Vec<_>>(), vec!["tag", "page"]);
/// assert_eq!(params.get("tag").map(<[_]>::len), Some(2));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterStore {
    entries: IndexMap<String, Vec<ParamValue>>,
}

impl ParameterStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one value under `key`.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.entries
            .entry(key.into())
            .or_default()
            .push(value.into());
    }

    /// Appends every value under `key`, in iteration order.
    ///
    /// An empty iterator still registers the key with an empty value list.
    pub fn add_all<I, V>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        self.entries
            .entry(key.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
    }

    /// Merges another store into this one.
    ///
    /// Keys unknown to this store are added at the end; for known keys the
    /// other store's values are appended after the existing ones.
    pub fn merge(&mut self, other: Self) {
        for (key, values) in other.entries {
            match self.entries.entry(key) {
                Entry::Occupied(mut entry) => entry.get_mut().extend(values),
                Entry::Vacant(entry) => {
                    entry.insert(values);
                }
            }
        }
    }

    /// Adds every field of a serializable value as a parameter.
    ///
    /// The value must serialize to an object. Each field becomes a key; a
    /// sequence-valued field contributes one value per element and a `null`
    /// field contributes a single `null` value.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidArgument`] when the value serializes to
    /// a sequence or a scalar, and [`RequestError::SerializationError`] when it
    /// cannot be serialized at all.
    pub fn add_fields<T>(&mut self, value: &T) -> Result<(), RequestError>
    where
        T: Serialize + ?Sized,
    {
        let fields = match serde_json::to_value(value)? {
            Value::Object(fields) => fields,
            Value::Array(_) => {
                return Err(RequestError::invalid_argument(
                    "Parameter must not be a collection",
                ));
            }
            other => {
                return Err(RequestError::invalid_argument(format!(
                    "Parameter must be an object with named fields, got {other}"
                )));
            }
        };

        for (name, field) in fields {
            match field {
                Value::Array(items) => self.add_all(name, items),
                field => self.add(name, field),
            }
        }
        Ok(())
    }

    /// Values stored under `key`.
    pub fn get(&self, key: &str) -> Option<&[ParamValue]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ParamValue])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Whether any value under any key is an attachment.
    pub fn has_attachment(&self) -> bool {
        self.entries.values().flatten().any(ParamValue::is_attachment)
    }

    /// Whether the store has no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Flattens the store into `(key, text)` pairs for url-encoded forms.
    ///
    /// Keys with an empty value list, `null` values and attachments produce no pair.
    pub(crate) fn to_text_pairs(&self) -> Vec<(&str, String)> {
        self.iter()
            .flat_map(|(key, values)| {
                values
                    .iter()
                    .filter_map(move |value| value.as_text().map(|text| (key, text)))
            })
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterStore
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (key, value) in iter {
            store.add(key, value);
        }
        store
    }
}

impl IntoIterator for ParameterStore {
    type Item = (String, Vec<ParamValue>);
    type IntoIter = indexmap::map::IntoIter<String, Vec<ParamValue>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
