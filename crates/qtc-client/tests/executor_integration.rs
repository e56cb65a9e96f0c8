//! Request executor against a mock HTTP server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use qtc_client::{
    Error, Executor, Method, Payload, RequestDescriptor, RequestLogger, RequestSummary, Scheme,
};
use serde_json::json;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn descriptor(server: &MockServer, method: Method, path: &str) -> RequestDescriptor {
    RequestDescriptor::new(method, server.address().to_string(), path).with_scheme(Scheme::Http)
}

#[tokio::test]
async fn test_success_statuses_return_decoded_json() {
    let server = MockServer::start().await;
    for status in [200u16, 201, 299] {
        Mock::given(method("GET"))
            .and(path(format!("/status/{}", status)))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({"ok": status})))
            .mount(&server)
            .await;
    }

    let executor = Executor::new().unwrap();
    for status in [200u16, 201, 299] {
        let response = executor
            .execute(descriptor(&server, Method::Get, &format!("/status/{}", status)))
            .await
            .unwrap();
        assert_eq!(response.status, status);
        assert_eq!(response.body, Payload::Json(json!({"ok": status})));
    }
}

#[tokio::test]
async fn test_error_statuses_carry_code_and_body() {
    let server = MockServer::start().await;
    for status in [400u16, 404, 500] {
        Mock::given(method("GET"))
            .and(path(format!("/status/{}", status)))
            .respond_with(
                ResponseTemplate::new(status).set_body_json(json!({"message": "failed"})),
            )
            .mount(&server)
            .await;
    }

    let executor = Executor::new().unwrap();
    for status in [400u16, 404, 500] {
        let err = executor
            .execute(descriptor(&server, Method::Get, &format!("/status/{}", status)))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(status));
        match err {
            Error::Remote { body, .. } => {
                assert_eq!(body, Payload::Json(json!({"message": "failed"})));
            }
            other => panic!("expected remote error, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_redirect_is_returned_not_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/moved"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/elsewhere"))
        .mount(&server)
        .await;

    let response = Executor::new()
        .unwrap()
        .execute(descriptor(&server, Method::Get, "/moved"))
        .await
        .unwrap();
    assert_eq!(response.status, 302);
}

#[tokio::test]
async fn test_content_length_is_utf8_byte_length() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/echo"))
        .and(header("content-length", "6"))
        .and(body_string("héllo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let desc = descriptor(&server, Method::Post, "/echo").with_body("héllo");
    Executor::new().unwrap().execute(desc).await.unwrap();
}

#[tokio::test]
async fn test_query_string_is_sent_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/objects/todos/"))
        .and(wiremock::matchers::query_param("q", "{}"))
        .and(wiremock::matchers::query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let desc = descriptor(&server, Method::Get, "/v1/objects/todos/?q=%7B%7D&limit=5");
    Executor::new().unwrap().execute(desc).await.unwrap();
}

#[tokio::test]
async fn test_invalid_json_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{not json", "application/json"))
        .mount(&server)
        .await;

    let err = Executor::new()
        .unwrap()
        .execute(descriptor(&server, Method::Get, "/broken"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}

#[tokio::test]
async fn test_non_json_body_is_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/plain"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .mount(&server)
        .await;

    let response = Executor::new()
        .unwrap()
        .execute(descriptor(&server, Method::Get, "/plain"))
        .await
        .unwrap();
    assert_eq!(response.body, Payload::Text("pong".to_string()));
}

#[tokio::test]
async fn test_refused_connection_is_transport_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let desc = RequestDescriptor::new(Method::Get, format!("127.0.0.1:{}", port), "/")
        .with_scheme(Scheme::Http);
    let err = Executor::new().unwrap().execute(desc).await.unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_concurrent_calls_are_independent() {
    let server = MockServer::start().await;
    for i in 0..5u64 {
        Mock::given(method("GET"))
            .and(path(format!("/item/{}", i)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"item": i}))
                    .set_delay(Duration::from_millis(50 * (5 - i))),
            )
            .mount(&server)
            .await;
    }

    let executor = Executor::new().unwrap();
    let calls = (0..5u64).map(|i| {
        let executor = executor.clone();
        let desc = descriptor(&server, Method::Get, &format!("/item/{}", i));
        async move { executor.execute(desc).await }
    });
    let responses = futures::future::join_all(calls).await;

    for (i, response) in responses.into_iter().enumerate() {
        let value = response.unwrap().into_value();
        assert_eq!(value["item"], i as u64);
    }
}

#[derive(Default)]
struct RecordingLogger {
    seen: Mutex<Vec<RequestSummary>>,
}

impl RequestLogger for RecordingLogger {
    fn log_request(&self, summary: &RequestSummary) {
        self.seen.lock().unwrap().push(summary.clone());
    }
}

#[tokio::test]
async fn test_logger_sees_redacted_requests() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/objects/todos/1"))
        .and(header("authorization", "Bearer top-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let logger = Arc::new(RecordingLogger::default());
    let executor = Executor::builder().logger(logger.clone()).build().unwrap();
    let desc = descriptor(&server, Method::Delete, "/v1/objects/todos/1")
        .with_header("Authorization", "Bearer top-secret")
        .unwrap();
    executor.execute(desc).await.unwrap();

    let seen = logger.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].kind, "request");
    assert_eq!(seen[0].method, "DELETE");
    assert!(seen[0].url.ends_with("/v1/objects/todos/1"));
    let auth = seen[0]
        .headers
        .iter()
        .find(|(name, _)| name == "authorization")
        .map(|(_, value)| value.as_str());
    assert_eq!(auth, Some("Bearer ***"));
}
