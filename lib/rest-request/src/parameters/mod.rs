//! Accumulators for the variable parts of a request.
//!
//! - [`ParameterStore`] - query parameters, form fields and attachments
//! - [`HeaderStore`] - request headers
//! - [`ParamValue`] - a single parameter value
//! - [`Attachment`] - a binary file handle

mod attachment;
pub use self::attachment::Attachment;

mod value;
pub use self::value::ParamValue;

mod store;
pub use self::store::ParameterStore;

mod headers;
pub use self::headers::HeaderStore;
pub(crate) use self::headers::is_multipart;
