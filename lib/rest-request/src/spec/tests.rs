use std::collections::HashMap;

use http::Method;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use rstest::rstest;
use serde::Serialize;
use serde_json::json;

use super::*;
use crate::body::{BodyContent, JsonBody};
use crate::parameters::{Attachment, ParamValue};

#[derive(Debug, Clone, Serialize)]
struct TestBody {
    id: String,
    list: Vec<String>,
}

fn test_body() -> TestBody {
    TestBody {
        id: "testId".to_string(),
        list: vec!["a".to_string(), "b".to_string()],
    }
}

fn texts(params: &ParameterStore, key: &str) -> Vec<Option<String>> {
    params
        .get(key)
        .unwrap_or_default()
        .iter()
        .map(ParamValue::as_text)
        .collect()
}

fn content_type<T>(request: &RequestDescriptor<T>) -> Option<&str> {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
}

#[test]
fn should_keep_param_values_in_call_order() {
    let request = RestRequest::with_no_body()
        .uri("http://localhost:8080/test")
        .expect("valid uri")
        .post()
        .add_param("k", "b")
        .add_param("k", "a")
        .add_param("k", "b")
        .build()
        .expect("request should build");

    let Payload::Form(params) = request.payload() else {
        panic!("expected a form payload, got {:?}", request.payload());
    };
    assert_eq!(
        texts(params, "k"),
        vec![Some("b".into()), Some("a".into()), Some("b".into())]
    );
}

#[test]
fn should_replace_accept_header() {
    let request = RestRequest::with_no_body()
        .uri("http://localhost:8080/test")
        .expect("valid uri")
        .get()
        .accept("application/xml")
        .expect("valid media type")
        .accept_all(["application/json", "text/plain"])
        .expect("valid media types")
        .build()
        .expect("request should build");

    let accept: Vec<_> = request.headers().get_all(ACCEPT).iter().collect();
    assert_eq!(accept, vec!["application/json, text/plain"]);
}

#[test]
fn should_append_headers() {
    let request = RestRequest::with_no_body()
        .uri("http://localhost:8080/test")
        .expect("valid uri")
        .get()
        .add_header("X-Test", "1")
        .expect("valid header")
        .add_headers("x-test", ["2", "3"])
        .expect("valid headers")
        .build()
        .expect("request should build");

    let values: Vec<_> = request.headers().get_all("X-Test").iter().collect();
    assert_eq!(values, vec!["1", "2", "3"]);
}

#[test]
fn should_send_get_params_as_query() {
    let request = RestRequest::with_expected_body::<TestBody>()
        .uri("http://localhost:8080/test")
        .expect("valid uri")
        .get()
        .add_param("k", "v")
        .build()
        .expect("request should build");

    insta::assert_snapshot!(request.uri(), @"http://localhost:8080/test?k=v");
    assert_eq!(request.method(), Method::GET);
    assert!(request.payload().is_empty());
}

#[test]
fn should_expand_template_and_append_query() {
    let request = RestRequest::with_expected_map_body()
        .uri_template("http://localhost:8080/users/{id}/{section}", ["1", "a b"])
        .expect("valid template")
        .delete()
        .add_params("ids", [1, 2])
        .add_params("none", Vec::<String>::new())
        .add_param("flag", None::<String>)
        .build()
        .expect("request should build");

    insta::assert_snapshot!(
        request.uri(),
        @"http://localhost:8080/users/1/a%20b?ids=1&ids=2&flag"
    );
    assert_eq!(request.method(), Method::DELETE);
}

#[test]
fn should_skip_attachments_in_query() {
    let params: ParameterStore = [("upload", ParamValue::from(Attachment::file("a.txt")))]
        .into_iter()
        .collect();

    let request = RestRequest::with_no_body()
        .uri("http://localhost:8080/test")
        .expect("valid uri")
        .get()
        .merge_params(params)
        .add_param("k", "v")
        .build()
        .expect("request should build");

    insta::assert_snapshot!(request.uri(), @"http://localhost:8080/test?k=v");
}

#[test]
fn should_send_params_as_query_when_body_is_set() {
    let request = RestRequest::with_no_body()
        .uri("http://localhost:8080/test")
        .expect("valid uri")
        .post()
        .add_param("k", "v")
        .json(test_body())
        .build()
        .expect("request should build");

    insta::assert_snapshot!(request.uri(), @"http://localhost:8080/test?k=v");
    assert_eq!(
        request.payload(),
        &Payload::Body(BodyContent::Json(JsonBody::new(test_body())))
    );
    assert_eq!(content_type(&request), None);
}

#[test]
fn should_send_params_as_form_without_body() {
    let request = RestRequest::with_no_body()
        .uri("http://localhost:8080/test")
        .expect("valid uri")
        .put()
        .add_param("k", "v")
        .build()
        .expect("request should build");

    assert_eq!(request.uri().query(), None);
    let Payload::Form(params) = request.payload() else {
        panic!("expected a form payload, got {:?}", request.payload());
    };
    assert_eq!(texts(params, "k"), vec![Some("v".into())]);
}

#[test]
fn should_have_empty_payload_without_body_nor_params() {
    let request = RestRequest::with_no_body()
        .uri("http://localhost:8080/test")
        .expect("valid uri")
        .patch()
        .build()
        .expect("request should build");

    assert_eq!(request.payload(), &Payload::Empty);
}

#[test]
fn should_merge_param_store_given_as_body() {
    let form: ParameterStore = [("name", "value")].into_iter().collect();

    let request = RestRequest::with_no_body()
        .uri("http://localhost:8080/test")
        .expect("valid uri")
        .post()
        .add_param("name", "first")
        .body(form)
        .build()
        .expect("request should build");

    let Payload::Form(params) = request.payload() else {
        panic!("expected a form payload, got {:?}", request.payload());
    };
    assert_eq!(
        texts(params, "name"),
        vec![Some("first".into()), Some("value".into())]
    );
}

#[test]
fn should_use_form_data_for_files_only() {
    let request = RestRequest::with_no_body()
        .uri("http://localhost:8080/test")
        .expect("valid uri")
        .post()
        .add_param("description", "scan")
        .add_file("file1", Attachment::file("/tmp/one.txt"))
        .add_file("file2", Attachment::bytes("two.txt", "content"))
        .build()
        .expect("request should build");

    assert_eq!(content_type(&request), Some("multipart/form-data"));
    assert_eq!(request.uri().query(), None);
    let Payload::Multipart(params) = request.payload() else {
        panic!("expected a multipart payload, got {:?}", request.payload());
    };
    assert_eq!(
        params.keys().collect::<Vec<_>>(),
        vec!["description", "file1", "file2"]
    );
    assert!(
        params
            .get("file1")
            .is_some_and(|values| values.iter().all(ParamValue::is_attachment))
    );
}

#[test]
fn should_use_mixed_for_body_and_files() {
    let request = RestRequest::with_no_body()
        .uri("http://localhost:8080/test")
        .expect("valid uri")
        .post()
        .add_param("key", "value")
        .json(test_body())
        .add_file("file", Attachment::file("/tmp/one.txt"))
        .build()
        .expect("request should build");

    assert_eq!(content_type(&request), Some("multipart/mixed"));
    assert_eq!(request.uri().query(), None);
    let Payload::Multipart(params) = request.payload() else {
        panic!("expected a multipart payload, got {:?}", request.payload());
    };
    assert_eq!(params.keys().collect::<Vec<_>>(), vec!["key", "file", "body"]);
    insta::assert_snapshot!(
        texts(params, "body")[0].clone().unwrap_or_default(),
        @r#"{"id":"testId","list":["a","b"]}"#
    );
}

#[test]
fn should_detect_attachments_added_as_params() {
    let request = RestRequest::with_no_body()
        .uri("http://localhost:8080/test")
        .expect("valid uri")
        .post()
        .add_param("doc", "cover letter")
        .add_param("doc", Attachment::file("cv.pdf"))
        .build()
        .expect("request should build");

    assert_eq!(content_type(&request), Some("multipart/form-data"));
    assert!(matches!(request.payload(), Payload::Multipart(_)));
}

#[rstest]
#[case::form_data("multipart/form-data")]
#[case::related("multipart/related")]
#[case::upper_case("MULTIPART/ALTERNATIVE")]
fn should_keep_declared_multipart_content_type(#[case] declared: &str) {
    let request = RestRequest::with_no_body()
        .uri("http://localhost:8080/test")
        .expect("valid uri")
        .post()
        .content_type(declared)
        .expect("valid media type")
        .body("text body")
        .add_file("file", Attachment::file("/tmp/one.txt"))
        .build()
        .expect("request should build");

    assert_eq!(
        content_type(&request).map(str::to_ascii_lowercase),
        Some(declared.to_ascii_lowercase())
    );
}

#[test]
fn should_replace_non_multipart_content_type() {
    let request = RestRequest::with_no_body()
        .uri("http://localhost:8080/test")
        .expect("valid uri")
        .post()
        .content_type("application/json")
        .expect("valid media type")
        .add_file("file", Attachment::file("/tmp/one.txt"))
        .build()
        .expect("request should build");

    assert_eq!(content_type(&request), Some("multipart/form-data"));
}

#[test]
fn should_clear_content_type_with_empty_value() {
    let request = RestRequest::with_no_body()
        .uri("http://localhost:8080/test")
        .expect("valid uri")
        .post()
        .content_type("application/json")
        .expect("valid media type")
        .content_type("")
        .expect("clearing never fails")
        .build()
        .expect("request should build");

    assert_eq!(content_type(&request), None);
}

#[test]
fn should_append_marshalled_body_to_existing_body_key() {
    let request = RestRequest::with_no_body()
        .uri("http://localhost:8080/test")
        .expect("valid uri")
        .post()
        .add_param("body", "caller value")
        .body("plain text")
        .add_file("file", Attachment::file("/tmp/one.txt"))
        .build()
        .expect("request should build");

    let Payload::Multipart(params) = request.payload() else {
        panic!("expected a multipart payload, got {:?}", request.payload());
    };
    assert_eq!(
        texts(params, "body"),
        vec![
            Some("caller value".into()),
            Some("\"plain text\"".into())
        ]
    );
}

#[test]
fn should_report_body_serialization_failure() {
    #[derive(Debug)]
    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot serialize"))
        }
    }

    let error = RestRequest::with_no_body()
        .uri("http://localhost:8080/test")
        .expect("valid uri")
        .post()
        .json(Unserializable)
        .add_file("file", Attachment::file("/tmp/one.txt"))
        .build()
        .expect_err("body cannot be marshalled");

    assert!(matches!(error, RequestError::SerializationError(_)));
}

#[test]
fn should_reject_colon_in_basic_auth_username() {
    let result = RestRequest::with_no_body()
        .uri("http://localhost:8080/test")
        .expect("valid uri")
        .get()
        .basic_auth("user:name", "pw");

    let error = result.expect_err("colon in username");
    assert!(matches!(error, RequestError::InvalidArgument { .. }));
}

#[test]
fn should_set_basic_auth_header() {
    let request = RestRequest::with_no_body()
        .uri("http://localhost:8080/test")
        .expect("valid uri")
        .get()
        .authorization("Custom xyz")
        .expect("valid header")
        .basic_auth("user", "pass")
        .expect("valid credentials")
        .build()
        .expect("request should build");

    let values: Vec<_> = request.headers().get_all(AUTHORIZATION).iter().collect();
    assert_eq!(values, vec!["Basic dXNlcjpwYXNz"]);
}

#[test]
fn should_set_bearer_token() {
    let request = RestRequest::with_no_body()
        .uri("http://localhost:8080/test")
        .expect("valid uri")
        .delete()
        .bearer_token("abc.def")
        .expect("valid token")
        .build()
        .expect("request should build");

    assert_eq!(
        request.headers().get(AUTHORIZATION).map(|value| value.as_bytes()),
        Some(&b"Bearer abc.def"[..])
    );
}

#[test]
fn should_build_equal_descriptors_from_equal_chains() {
    let build = || {
        RestRequest::with_expected_generic_body::<Vec<String>>()
            .uri("http://localhost:8080/test")
            .expect("valid uri")
            .post()
            .accept("application/json")
            .expect("valid media type")
            .add_param("k", 1)
            .json(test_body())
            .add_file("file", Attachment::bytes("a.txt", "abc"))
            .build()
            .expect("request should build")
    };

    let first = build();
    let second = build();

    assert_eq!(first, second);
    assert_eq!(first.clone(), second);
}

#[test]
fn should_merge_repeated_set_params() {
    let request = RestRequest::with_no_body()
        .uri("http://localhost:8080/test")
        .expect("valid uri")
        .post()
        .merge_params([("a", "1"), ("b", "2")].into_iter().collect())
        .merge_params([("b", "3"), ("c", "4")].into_iter().collect())
        .set_params(HashMap::from([("d", 5)]))
        .build()
        .expect("request should build");

    let Payload::Form(params) = request.payload() else {
        panic!("expected a form payload, got {:?}", request.payload());
    };
    assert_eq!(params.keys().collect::<Vec<_>>(), vec!["a", "b", "c", "d"]);
    assert_eq!(texts(params, "b"), vec![Some("2".into()), Some("3".into())]);
}

#[test]
fn should_set_params_from_object() {
    let request = RestRequest::with_no_body()
        .uri("http://localhost:8080/test")
        .expect("valid uri")
        .get()
        .set_params_from(&test_body())
        .expect("object fields")
        .build()
        .expect("request should build");

    insta::assert_snapshot!(
        request.uri(),
        @"http://localhost:8080/test?id=testId&list=a&list=b"
    );
}

#[test]
fn should_reject_collection_in_set_params_from() {
    let error = RestRequest::with_no_body()
        .uri("http://localhost:8080/test")
        .expect("valid uri")
        .get()
        .set_params_from(&json!(["a", "b"]))
        .expect_err("collections are rejected");

    assert!(error.is_invalid_argument());
}

#[rstest]
#[case::empty("")]
#[case::blank("   ")]
fn should_reject_empty_uri(#[case] uri: &str) {
    let error = RestRequest::with_no_body()
        .uri(uri)
        .expect_err("empty uri");

    assert!(matches!(error, RequestError::InvalidArgument { .. }));
}

#[test]
fn should_declare_response_types() {
    let url = Url::parse("http://localhost/").expect("valid url");

    let plain = RestRequest::with_expected_body::<TestBody>()
        .uri_url(url.clone())
        .get()
        .build()
        .expect("request should build");
    let generic = RestRequest::with_expected_generic_body::<Vec<TestBody>>()
        .uri_url(url.clone())
        .get()
        .build()
        .expect("request should build");
    let map = RestRequest::with_expected_map_body()
        .uri_url(url.clone())
        .get()
        .build()
        .expect("request should build");
    let none = RestRequest::with_no_body()
        .uri_url(url)
        .get()
        .build()
        .expect("request should build");

    assert!(plain.response_type().is_some_and(|token| token.is::<TestBody>()));
    assert!(plain.generic_response_type().is_none());
    assert!(
        generic
            .generic_response_type()
            .is_some_and(|token| token.is::<Vec<TestBody>>())
    );
    assert!(map.generic_response_type().is_some_and(|token| token.is::<MapBody>()));
    assert_eq!(none.declared_response_type(), None);
}
