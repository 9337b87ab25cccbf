//! End-to-end tests for the backend role.

use compreflex::config::AppConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

mod common;

#[tokio::test]
async fn executes_unary_invoke() {
    let backend = common::spawn_backend().await;
    let res = common::client()
        .get(backend.url("/compreflex"))
        .query(&[("comando", "unaryInvoke(java.lang.Math,abs,int,-3)")])
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(
        res.headers()["content-type"],
        "application/json; charset=UTF-8"
    );
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    assert_eq!(res.text().await.unwrap(), r#"{"value":3}"#);
}

#[tokio::test]
async fn describes_a_class() {
    let backend = common::spawn_backend().await;
    let json: serde_json::Value = common::client()
        .get(backend.url("/compreflex?comando=Class(java.lang.Math)"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let class = &json["value"];
    assert_eq!(class["class"], "java.lang.Math");
    assert!(!class["fields"].as_array().unwrap().is_empty());
    assert!(!class["methods"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn binary_invoke_with_quoted_string() {
    let backend = common::spawn_backend().await;
    let body = common::client()
        .get(backend.url("/compreflex"))
        .query(&[("comando", r#"binaryInvoke(java.lang.Integer, parseInt, string, "ff", int, 16)"#)])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, r#"{"value":255}"#);
}

#[tokio::test]
async fn engine_failures_are_200_with_error_body() {
    let backend = common::spawn_backend().await;
    let client = common::client();

    for (command, prefix) in [
        ("invoke(java.lang.Math, nope)", "MethodResolutionFailure"),
        ("unaryInvoke(java.lang.Math, abs, int, \"abc\")", "ValueCoercionFailure"),
        ("Class(com.example.Missing)", "TypeResolutionFailure"),
        ("frobnicate(x)", "Unknown operation"),
    ] {
        let res = client
            .get(backend.url("/compreflex"))
            .query(&[("comando", command)])
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200, "{command}");
        let json: serde_json::Value = res.json().await.unwrap();
        let error = json["error"].as_str().unwrap();
        assert!(error.starts_with(prefix), "{command}: {error}");
    }
}

#[tokio::test]
async fn missing_command_is_400() {
    let backend = common::spawn_backend().await;
    let res = common::client().get(backend.url("/compreflex")).send().await.unwrap();
    assert_eq!(res.status(), 400);
    assert_eq!(res.text().await.unwrap(), r#"{"error":"Missing 'comando'"}"#);
}

#[tokio::test]
async fn unknown_path_is_404() {
    let backend = common::spawn_backend().await;
    let res = common::client().get(backend.url("/nope")).send().await.unwrap();
    assert_eq!(res.status(), 404);
    assert_eq!(res.text().await.unwrap(), r#"{"error":"Use /compreflex"}"#);
}

#[tokio::test]
async fn allow_list_hides_other_types() {
    let mut config = AppConfig::default();
    config.engine.allowed_types = vec!["java.lang.Math".to_string()];
    let backend = common::spawn_backend_with(config).await;

    let body = common::client()
        .get(backend.url("/compreflex?comando=Class(java.lang.System)"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, r#"{"error":"TypeResolutionFailure: java.lang.System"}"#);
}

#[tokio::test]
async fn raw_socket_exchange_closes_connection() {
    let backend = common::spawn_backend().await;
    let mut stream = TcpStream::connect(backend.addr).await.unwrap();
    stream
        .write_all(b"GET /compreflex?comando=unaryInvoke(java.lang.Math,abs,int,-3) HTTP/1.1\r\nHost: test\r\n\r\n")
        .await
        .unwrap();

    // The server closes after one response, so read_to_end terminates.
    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();

    let (head, body) = raw.split_once("\r\n\r\n").unwrap();
    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(head.contains("\r\nConnection: close"));
    assert!(head.contains(&format!("\r\nContent-Length: {}", body.len())));
    assert_eq!(body, r#"{"value":3}"#);
}

#[tokio::test]
async fn garbage_request_is_dropped_without_reply() {
    let backend = common::spawn_backend().await;
    let mut stream = TcpStream::connect(backend.addr).await.unwrap();
    stream.write_all(b"\r\n").await.unwrap();
    stream.shutdown().await.unwrap();

    let mut raw = Vec::new();
    let _ = stream.read_to_end(&mut raw).await;
    assert!(raw.is_empty());
}
