use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tunesmith_engine::api::{ApiError, GenerationClient};
use tunesmith_engine::config::schema::ApiConfig;
use tunesmith_engine::protocol::{Cookie, GenerationRequest, JobId, JobStatus, StorageState};
use tunesmith_engine::session::Session;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

struct NoCookieHeader;

impl Match for NoCookieHeader {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("cookie")
    }
}

fn client_for(server: &MockServer) -> GenerationClient {
    GenerationClient::new(&ApiConfig {
        base_url: server.uri(),
        ..ApiConfig::default()
    })
    .expect("client")
}

fn session_with_cookies() -> Session {
    Session::new(
        "auth.json",
        StorageState {
            cookies: vec![Cookie::new("__session", "jwt"), Cookie::new("ajs_id", "42")],
            origins: vec![],
        },
    )
}

/// Drain one request (headers plus `Content-Length` body) from a raw socket.
async fn read_request(socket: &mut tokio::net::TcpStream) {
    let mut data = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            return;
        }
        data.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&data);
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if data.len() >= end + 4 + length {
                return;
            }
        }
    }
}

fn request() -> GenerationRequest {
    GenerationRequest {
        song_name: "My Test Song".into(),
        artist: "Test Artist".into(),
        genre: "Pop".into(),
    }
}

#[tokio::test]
async fn submit_sends_payload_with_session_cookies() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/song/generate"))
        .and(header("cookie", "__session=jwt; ajs_id=42"))
        .and(body_json(json!({
            "song_name": "My Test Song",
            "artist": "Test Artist",
            "genre": "Pop"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"song_uuid": "abc-123"})))
        .expect(1)
        .mount(&server)
        .await;

    let job = client_for(&server)
        .submit(&session_with_cookies(), &request())
        .await
        .expect("submit ok");
    assert_eq!(job, JobId::new("abc-123"));
}

#[tokio::test]
async fn submit_without_cookies_still_sends_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/song/generate"))
        .and(NoCookieHeader)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"song_uuid": "u-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::new("auth.json", StorageState::default());
    let job = client_for(&server)
        .submit(&session, &request())
        .await
        .expect("submit ok");
    assert_eq!(job.as_str(), "u-1");
}

#[tokio::test]
async fn submit_non_200_keeps_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/song/generate"))
        .respond_with(ResponseTemplate::new(401).set_body_string("{\"detail\":\"Unauthorized\"}"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .submit(&session_with_cookies(), &request())
        .await
        .expect_err("401 must fail");
    match err {
        ApiError::Status { code, body } => {
            assert_eq!(code, 401);
            assert_eq!(body, "{\"detail\":\"Unauthorized\"}");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn submit_truncated_error_body_reports_read_failure() {
    // Promises 100 bytes of body, sends 7, then hangs up
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;
        let _ = socket
            .write_all(
                b"HTTP/1.1 500 Internal Server Error\r\n\
                  Content-Length: 100\r\n\
                  Connection: close\r\n\r\n\
                  partial",
            )
            .await;
        let _ = socket.shutdown().await;
    });

    let client = GenerationClient::new(&ApiConfig {
        base_url: format!("http://{}", addr),
        ..ApiConfig::default()
    })
    .expect("client");
    let err = client
        .submit(&session_with_cookies(), &request())
        .await
        .unwrap_err();

    match err {
        ApiError::Status { code, body } => {
            assert_eq!(code, 500);
            assert!(body.starts_with("<unreadable body: "), "body was {:?}", body);
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn submit_other_success_codes_are_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"song_uuid": "x"})))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .submit(&session_with_cookies(), &request())
        .await
        .expect_err("only 200 is accepted");
    assert!(matches!(err, ApiError::Status { code: 202, .. }));
}

#[tokio::test]
async fn submit_without_uuid_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .submit(&session_with_cookies(), &request())
        .await
        .expect_err("missing uuid");
    assert!(matches!(err, ApiError::MissingJobId));
}

#[tokio::test]
async fn submit_with_non_json_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .submit(&session_with_cookies(), &request())
        .await
        .expect_err("html is not json");
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn status_reads_job_path_and_maps_values() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/song/status/abc-123"))
        .and(header("cookie", "__session=jwt; ajs_id=42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "queued"})))
        .expect(1)
        .mount(&server)
        .await;

    let status = client_for(&server)
        .status(&session_with_cookies(), &JobId::new("abc-123"))
        .await
        .expect("status ok");
    assert_eq!(status, JobStatus::Pending(Some("queued".into())));
}

#[tokio::test]
async fn status_without_field_is_pending() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let status = client_for(&server)
        .status(&session_with_cookies(), &JobId::new("abc-123"))
        .await
        .expect("status ok");
    assert_eq!(status, JobStatus::Pending(None));
}
