use std::sync::Arc;

use rest_request::prelude::*;
use rest_request::ReqwestAdapter;
use serde::Deserialize;
use tracing::info;

/// The part of the httpbin `/anything` answer this example looks at.
#[derive(Debug, Deserialize)]
struct Anything {
    method: String,
    url: String,
    #[serde(default)]
    form: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    files: serde_json::Map<String, serde_json::Value>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let adapter = Arc::new(
        ReqwestAdapter::builder()
            .with_user_agent("rest-request-example")
            .build()?,
    );

    // Query parameters from a template URI
    let search = RestRequest::with_expected_body::<Anything>()
        .uri_template("http://httpbin.org/anything/{resource}", ["breeds"])?
        .get()
        .accept("application/json")?
        .add_params("breed", ["hound", "terrier"])
        .build()?;
    if let Some(answer) = adapter.send_for_body(&search)? {
        info!(method = %answer.method, url = %answer.url, "search");
    }

    // Form fields and a file: multipart/form-data
    let upload = RestRequest::with_expected_body::<Anything>()
        .uri("http://httpbin.org/anything/uploads")?
        .post()
        .basic_auth("user", "pass")?
        .add_param("description", "hound picture")
        .add_file("picture", Attachment::bytes("hound.txt", "not really a picture"))
        .build()?;
    let answer = adapter.send_async_default(upload).wait()?;
    if let Some(body) = answer.body() {
        info!(
            status = %answer.status(),
            form = ?body.form,
            files = ?body.files.keys().collect::<Vec<_>>(),
            "upload"
        );
    }

    // The descriptor is reusable
    let ping = RestRequest::with_no_body()
        .uri("http://httpbin.org/status/204")?
        .delete()
        .build()?;
    for attempt in 1..=2 {
        let response = adapter.send(&ping)?;
        info!(attempt, status = %response.status(), "ping");
    }

    Ok(())
}
