#![allow(unused_crate_dependencies)]
#![allow(clippy::tests_outside_test_module, reason = "integration tests live in tests/ dir")]
#![allow(clippy::expect_used, clippy::unwrap_used, reason = "integration test: panics are the assertion mechanism")]

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::{app, enc, get, proxy_app, send};
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use wiremock::matchers::{any, body_string, header as header_eq, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_missing_cms_never_reaches_upstream() {
    let cms = MockServer::start().await;
    Mock::given(any()).respond_with(ResponseTemplate::new(200)).expect(0).mount(&cms).await;

    for (uri, message) in [
        ("/xmds-proxy?serverKey=ABC123&method=Ping", "Missing cms parameter"),
        ("/rest-proxy?path=/api/displays", "Missing cms parameter"),
        ("/file-proxy?url=/media/1.mp4", "Missing cms or url parameter"),
    ] {
        let (_dir, app) = proxy_app();
        let relayed = send(app, get(uri)).await;
        assert_eq!(relayed.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(relayed.json(), serde_json::json!({ "error": message }), "{uri}");
    }

    // A url without a cms is just as incomplete.
    let (_dir, app) = proxy_app();
    let relayed = send(app, get(&format!("/file-proxy?cms={}", enc(&cms.uri())))).await;
    assert_eq!(relayed.status, StatusCode::BAD_REQUEST);

    cms.verify().await;
}

#[tokio::test]
async fn test_xmds_ping_relayed() {
    let cms = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/xmds.php"))
        .and(query_param("serverKey", "ABC123"))
        .and(query_param("method", "Ping"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<pong/>", "text/xml"))
        .expect(1)
        .mount(&cms)
        .await;

    let (_dir, app) = proxy_app();
    let uri = format!("/xmds-proxy?cms={}&serverKey=ABC123&method=Ping", enc(&cms.uri()));
    let relayed = send(app, get(&uri)).await;

    assert_eq!(relayed.status, StatusCode::OK);
    assert_eq!(relayed.text(), "<pong/>");
    assert_eq!(relayed.headers[header::CONTENT_TYPE], "text/xml");
    assert_eq!(relayed.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let received = cms.received_requests().await.expect("recording enabled");
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].url.query(), Some("serverKey=ABC123&method=Ping"));
    let agent = received[0].headers.get(header::USER_AGENT).unwrap().to_str().unwrap();
    assert!(agent.starts_with("Kiosk Player Relay/"), "{agent}");
}

#[tokio::test]
async fn test_xmds_post_forwards_envelope() {
    let cms = MockServer::start().await;
    let envelope = r#"<soap:Envelope><soap:Body><RegisterDisplay/></soap:Body></soap:Envelope>"#;
    Mock::given(method("POST"))
        .and(path("/xmds.php"))
        .and(query_param("v", "7"))
        .and(header_eq("soapaction", "urn:xmds#RegisterDisplay"))
        .and(header_eq("content-type", "text/xml; charset=utf-8"))
        .and(body_string(envelope))
        .respond_with(ResponseTemplate::new(500).set_body_raw("<soap:Fault/>", "text/xml"))
        .expect(1)
        .mount(&cms)
        .await;

    let (_dir, app) = proxy_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/xmds-proxy?cms={}&v=7", enc(&cms.uri())))
        .header("SOAPAction", "urn:xmds#RegisterDisplay")
        .body(Body::from(envelope))
        .unwrap();
    let relayed = send(app, request).await;

    // Upstream faults pass through untouched; they are not proxy errors.
    assert_eq!(relayed.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(relayed.text(), "<soap:Fault/>");
}

#[tokio::test]
async fn test_rest_strips_transport_headers_and_stamps_cors() {
    let cms = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/displays"))
        .and(query_param("limit", "10"))
        .and(header_eq("authorization", "Bearer t0ken"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"displays":[]}"#, "application/json")
                .insert_header("content-encoding", "identity")
                .insert_header("access-control-allow-origin", "https://cms.example.org")
                .insert_header("etag", "\"v42\"")
                .insert_header("x-cms-version", "4.0"),
        )
        .expect(1)
        .mount(&cms)
        .await;

    let (_dir, app) = proxy_app();
    let request = Request::builder()
        .uri(format!("/rest-proxy?cms={}&path=%2Fapi%2Fdisplays&limit=10", enc(&cms.uri())))
        .header(header::AUTHORIZATION, "Bearer t0ken")
        .header(header::COOKIE, "session=1")
        .body(Body::empty())
        .unwrap();
    let relayed = send(app, request).await;

    assert_eq!(relayed.status, StatusCode::OK);
    assert_eq!(relayed.json(), serde_json::json!({ "displays": [] }));
    for name in [header::TRANSFER_ENCODING, header::CONNECTION, header::CONTENT_ENCODING] {
        assert!(!relayed.headers.contains_key(&name), "{name} leaked through");
    }
    // Any length present is the relay's own framing of the body it sends.
    if let Some(length) = relayed.headers.get(header::CONTENT_LENGTH) {
        assert_eq!(length.to_str().unwrap(), relayed.body.len().to_string());
    }
    assert_eq!(relayed.headers.get_all(header::ACCESS_CONTROL_ALLOW_ORIGIN).iter().count(), 1);
    assert_eq!(relayed.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(relayed.headers[header::ETAG], "\"v42\"");
    assert_eq!(relayed.headers["x-cms-version"], "4.0");

    let received = cms.received_requests().await.unwrap();
    assert!(!received[0].headers.contains_key(header::COOKIE));
}

#[tokio::test]
async fn test_rest_post_forwards_raw_body() {
    let cms = MockServer::start().await;
    let payload = r#"{"type":"layout","count":3}"#;
    Mock::given(method("POST"))
        .and(path("/api/stats"))
        .and(body_string(payload))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&cms)
        .await;

    let (_dir, app) = proxy_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/rest-proxy?cms={}&path=/api/stats", enc(&cms.uri())))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload))
        .unwrap();
    let relayed = send(app, request).await;

    assert_eq!(relayed.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_rest_relays_upstream_404() {
    let cms = MockServer::start().await;
    Mock::given(path("/api/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_raw("gone", "text/plain"))
        .mount(&cms)
        .await;

    let (_dir, app) = proxy_app();
    let relayed =
        send(app, get(&format!("/rest-proxy?cms={}&path=/api/missing", enc(&cms.uri())))).await;
    assert_eq!(relayed.status, StatusCode::NOT_FOUND);
    assert_eq!(relayed.text(), "gone");
}

#[tokio::test]
async fn test_same_get_twice_relays_identically() {
    let cms = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/schedule"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"layouts":[1,2,3]}"#, "application/json")
                .insert_header("etag", "\"s1\""),
        )
        .expect(2)
        .mount(&cms)
        .await;

    let uri = format!("/rest-proxy?cms={}&path=/api/schedule", enc(&cms.uri()));
    let (_dir, app) = proxy_app();
    let first = send(app.clone(), get(&uri)).await;
    let second = send(app, get(&uri)).await;

    let mut first_headers = first.headers.clone();
    let mut second_headers = second.headers.clone();
    first_headers.remove(header::DATE);
    second_headers.remove(header::DATE);

    assert_eq!(first.status, second.status);
    assert_eq!(first_headers, second_headers);
    assert_eq!(first.body, second.body);
}

#[tokio::test]
async fn test_file_range_relayed_as_partial_content() {
    let cms = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/media/42.mp4"))
        .and(header_eq("range", "bytes=0-3"))
        .and(header_eq("accept-encoding", "identity"))
        .respond_with(
            ResponseTemplate::new(206)
                .set_body_bytes(b"\x00\x00\x00\x18".to_vec())
                .insert_header("content-type", "video/mp4")
                .insert_header("content-range", "bytes 0-3/1048576")
                .insert_header("accept-ranges", "bytes"),
        )
        .expect(1)
        .mount(&cms)
        .await;

    let (_dir, app) = proxy_app();
    let request = Request::builder()
        .uri(format!("/file-proxy?cms={}&url={}", enc(&cms.uri()), enc("/media/42.mp4")))
        .header(header::RANGE, "bytes=0-3")
        .body(Body::empty())
        .unwrap();
    let relayed = send(app, request).await;

    assert_eq!(relayed.status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(relayed.headers[header::CONTENT_RANGE], "bytes 0-3/1048576");
    assert_eq!(relayed.headers[header::CONTENT_TYPE], "video/mp4");
    assert_eq!(relayed.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(!relayed.headers.contains_key(header::CONTENT_LENGTH));
    assert_eq!(&relayed.body[..], b"\x00\x00\x00\x18");
}

#[tokio::test]
async fn test_file_proxy_rejects_post() {
    let (_dir, app) = proxy_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/file-proxy?cms=http%3A%2F%2Fcms&url=%2Fm.mp4")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(app, request).await.status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_unreachable_cms_is_json_500() {
    // Bind then drop to get a port nothing listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
    let cms = format!("http://127.0.0.1:{port}");

    for (uri, code) in [
        (format!("/xmds-proxy?cms={}", enc(&cms)), "Proxy error"),
        (format!("/rest-proxy?cms={}&path=/api", enc(&cms)), "REST proxy error"),
        (format!("/file-proxy?cms={}&url=/m.mp4", enc(&cms)), "File proxy error"),
    ] {
        let (_dir, app) = proxy_app();
        let relayed = send(app, get(&uri)).await;
        assert_eq!(relayed.status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        let body = relayed.json();
        assert_eq!(body["error"], code);
        assert!(!body["message"].as_str().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_compressed_upstream_length_never_leaks() {
    let decoded = "signage ".repeat(625);
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::best());
    encoder.write_all(decoded.as_bytes()).unwrap();
    let compressed = encoder.finish().unwrap();
    assert!(compressed.len() < decoded.len());

    let cms = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/library"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(compressed.clone())
                .insert_header("content-type", "text/plain")
                .insert_header("content-encoding", "gzip"),
        )
        .expect(1)
        .mount(&cms)
        .await;

    let (_dir, app) = proxy_app();
    let relayed =
        send(app, get(&format!("/rest-proxy?cms={}&path=/api/library", enc(&cms.uri())))).await;

    assert_eq!(relayed.status, StatusCode::OK);
    assert_eq!(relayed.text(), decoded);
    assert!(!relayed.headers.contains_key(header::CONTENT_ENCODING));
    if let Some(length) = relayed.headers.get(header::CONTENT_LENGTH) {
        assert_ne!(length.to_str().unwrap(), compressed.len().to_string());
        assert_eq!(length.to_str().unwrap(), decoded.len().to_string());
    }
}

/// A CMS that accepts the connection, reads the request and never answers.
/// Resolves to true once the relay closes its side.
async fn upstream_closed_after_client_drop(uri_for: impl FnOnce(&str) -> String) -> bool {
    let cms = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let cms_base = format!("http://{}", cms.local_addr().unwrap());

    let bundle = tempfile::tempdir().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let handle = kiosk_core::ServerHandle::spawn(
        listener,
        app(bundle.path(), kiosk_core::ProxyConfig::default()),
    )
    .unwrap();

    let mut client = TcpStream::connect(handle.local_addr()).await.unwrap();
    let request = format!("GET {} HTTP/1.1\r\nHost: localhost\r\n\r\n", uri_for(&cms_base));
    client.write_all(request.as_bytes()).await.unwrap();

    let (mut upstream, _) =
        tokio::time::timeout(Duration::from_secs(5), cms.accept()).await.unwrap().unwrap();
    let mut received = Vec::new();
    let mut buf = [0_u8; 1024];
    while !received.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = upstream.read(&mut buf).await.unwrap();
        assert!(n > 0, "relay closed before sending its request");
        received.extend_from_slice(&buf[..n]);
    }

    drop(client);

    let closed = match tokio::time::timeout(Duration::from_secs(5), upstream.read(&mut buf)).await
    {
        Ok(Ok(0)) | Ok(Err(_)) => true,
        Ok(Ok(_)) | Err(_) => false,
    };
    handle.shutdown().await.unwrap();
    closed
}

#[tokio::test]
async fn test_client_disconnect_aborts_upstream_call() {
    assert!(
        upstream_closed_after_client_drop(|cms| format!(
            "/rest-proxy?cms={}&path=/api/schedule",
            enc(cms)
        ))
        .await,
        "rest"
    );
    assert!(
        upstream_closed_after_client_drop(|cms| format!(
            "/file-proxy?cms={}&url=/media/big.mp4",
            enc(cms)
        ))
        .await,
        "file"
    );
    assert!(
        upstream_closed_after_client_drop(|cms| format!(
            "/xmds-proxy?cms={}&method=RequiredFiles",
            enc(cms)
        ))
        .await,
        "xmds"
    );
}
