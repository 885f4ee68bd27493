use std::collections::HashMap;
use std::fmt::Display;
use std::sync::LazyLock;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use regex::{Captures, Regex};
use tracing::trace;
use url::Url;

use crate::error::RequestError;

/// Regular expression for matching template variables in the format `{name}`.
static RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(?<name>[^{}/?#]+)}").expect("a valid regex"));

/// Characters escaped in an expanded path segment value.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Characters escaped in an expanded query value.
const QUERY_VALUE: &AsciiSet = &SEGMENT.add(b'&').add(b'=').add(b'+').add(b';');

fn encode_value(value: &str, in_query: bool) -> String {
    let set = if in_query { QUERY_VALUE } else { SEGMENT };
    utf8_percent_encode(value, set).to_string()
}

/// Parses an absolute URI.
///
/// # Errors
///
/// Returns [`RequestError::InvalidArgument`] for blank input and
/// [`RequestError::InvalidUri`] when the text is not an absolute URI.
pub(crate) fn parse_absolute(uri: &str) -> Result<Url, RequestError> {
    let uri = uri.trim();
    if uri.is_empty() {
        return Err(RequestError::invalid_argument("URI must not be empty"));
    }
    let url = Url::parse(uri)?;
    Ok(url)
}

/// Expands `{name}` variables positionally, then parses the result.
///
/// Variables are bound in order of first appearance; a name used twice
/// reuses its value. Values are percent-encoded as path segment text, or as
/// query component text after the first `?`.
///
/// # Errors
///
/// Returns [`RequestError::InvalidArgument`] when fewer values than distinct
/// variable names are given, plus the errors of [`parse_absolute`].
pub(crate) fn expand_template<I>(template: &str, variables: I) -> Result<Url, RequestError>
where
    I: IntoIterator,
    I::Item: Display,
{
    if template.trim().is_empty() {
        return Err(RequestError::invalid_argument("URI must not be empty"));
    }

    let query_start = template.find('?').unwrap_or(template.len());
    let mut values = variables.into_iter();
    let mut bound: HashMap<String, String> = HashMap::new();
    let mut missing = None;

    let expanded = RE.replace_all(template, |caps: &Captures<'_>| {
        let name = caps.name("name").map_or("", |it| it.as_str());
        let in_query = caps.get(0).is_some_and(|it| it.start() > query_start);
        if let Some(value) = bound.get(name) {
            return encode_value(value, in_query);
        }
        let Some(value) = values.next() else {
            missing.get_or_insert_with(|| name.to_string());
            return String::new();
        };
        let value = value.to_string();
        let encoded = encode_value(&value, in_query);
        trace!(name, value = %encoded, in_query, "template variable bound");
        bound.insert(name.to_string(), value);
        encoded
    });

    if let Some(name) = missing {
        return Err(RequestError::invalid_argument(format!(
            "Not enough variable values available to expand '{name}'"
        )));
    }

    parse_absolute(&expanded)
}
