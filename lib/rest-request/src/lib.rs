//! # Rest Request
//!
//! A staged, fluent builder for HTTP requests. The builder accumulates the
//! parts of a request into an immutable [`RequestDescriptor`], which a
//! [`TransportAdapter`] then executes any number of times.
//!
//! ## Quick Start
//!
//! ```rust
//! use rest_request::prelude::*;
//!
//! # fn example() -> Result<(), rest_request::RequestError> {
//! let request = RestRequest::with_expected_map_body()
//!     .uri("https://api.example.com/users")?
//!     .post()
//!     .accept("application/json")?
//!     .bearer_token("secret-token")?
//!     .json(serde_json::json!({ "name": "Ada" }))
//!     .build()?;
//!
//! assert_eq!(request.method(), http::Method::POST);
//! assert!(matches!(request.payload(), Payload::Body(_)));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Stages
//!
//! Each stage only offers the operations valid at that point:
//!
//! | Stage | Obtained from | Operations |
//! |---|---|---|
//! | [`UriStage`] | [`RestRequest`] entry points | `uri`, `uri_url`, `uri_template` |
//! | [`MethodStage`] | [`UriStage`] | `get`, `delete`, `post`, `put`, `patch` |
//! | [`FormStage`] | `get`, `delete` | [`HeaderSpec`], [`FormSpec`], `build` |
//! | [`BodyStage`] | `post`, `put`, `patch` | [`HeaderSpec`], [`FormSpec`], `body`, `json`, `add_file`, `build` |
//!
//! The entry point fixes the response type:
//!
//! - [`RestRequest::with_expected_body`] for a concrete type
//! - [`RestRequest::with_expected_generic_body`] for a parameterized type
//! - [`RestRequest::with_expected_map_body`] for a JSON object
//! - [`RestRequest::with_no_body`] when the response body is not used
//!
//! ## Parameters and payload
//!
//! Parameters of `GET` and `DELETE` requests always go to the query string.
//! For `POST`, `PUT` and `PATCH`, [`BodyStage::build`] decides:
//!
//! - no attachment, no body: parameters become form fields
//! - no attachment, a body: the body is sent and parameters go to the query string
//! - attachments, no body: `multipart/form-data` with every parameter as a part
//! - attachments and a body: `multipart/mixed`, the body is serialized as JSON
//!   into a part named `body`
//!
//! A multipart `Content-Type` set by the caller is never overwritten, so custom
//! subtypes such as `multipart/related` are kept.
//!
//! ```rust
//! use rest_request::prelude::*;
//!
//! # fn example() -> Result<(), rest_request::RequestError> {
//! let request = RestRequest::with_no_body()
//!     .uri("https://api.example.com/uploads")?
//!     .post()
//!     .add_param("description", "scan")
//!     .add_file("file", Attachment::bytes("scan.png", vec![0x89, 0x50]))
//!     .build()?;
//!
//! assert_eq!(request.headers()["content-type"], "multipart/form-data");
//! assert!(request.uri().query().is_none());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Sending
//!
//! [`ReqwestAdapter`] sends descriptors with a blocking [`reqwest`] client.
//! [`TransportAdapter::send_async`] and [`TransportAdapter::send_async_default`]
//! run the send on a worker thread and return a [`PendingResponse`], which can
//! be awaited or waited for.
//!
//! ## Errors
//!
//! Builder operations fail fast with a [`RequestError`]; the stage is consumed
//! and the chain has to be restarted. Sending fails with a [`TransportError`].

mod auth;
mod body;
mod descriptor;
mod error;
mod multipart;
mod parameters;
mod spec;
mod transport;
mod uri;

pub use self::auth::SecureString;
pub use self::body::{Body, BodyContent, JsonBody, JsonContent};
pub use self::descriptor::{MapBody, Payload, RequestDescriptor, ResponseType, TypeToken};
pub use self::error::{RequestError, TransportError};
pub use self::parameters::{Attachment, HeaderStore, ParamValue, ParameterStore};
pub use self::spec::{
    BodyStage, FormSpec, FormStage, HeaderSpec, MethodStage, RestRequest, UriStage,
};
pub use self::transport::{
    PendingResponse, ReqwestAdapter, ReqwestAdapterBuilder, ResponseEnvelope, TransportAdapter,
    WORKER_THREAD_NAME,
};

/// The types and traits needed to build and send requests.
pub mod prelude {
    pub use crate::{
        Attachment, Body, FormSpec, HeaderSpec, ParameterStore, Payload, RestRequest,
        TransportAdapter,
    };
}
