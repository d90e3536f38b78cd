//! API integration tests.
//!
//! yt-dlp is replaced by a shell script that prints a canned JSON document,
//! and caption tracks are served by a local mock server.

use std::io::Write;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ytx_api::{create_router, ApiConfig, AppState};

const VIDEO_ID: &str = "dQw4w9WgXcQ";

/// Write a stub extraction script; it ignores its arguments.
fn stub_script(body: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{}", body).unwrap();
    file.flush().unwrap();
    file
}

/// Stub that prints `document` on stdout and exits 0.
fn json_stub(document: &Value) -> tempfile::NamedTempFile {
    stub_script(&format!("cat <<'JSON'\n{}\nJSON", document))
}

fn test_config(script: &tempfile::NamedTempFile) -> ApiConfig {
    ApiConfig {
        ytdlp_path: "sh".to_string(),
        ytdlp_extra_args: vec![script.path().to_string_lossy().into_owned()],
        extraction_timeout: Duration::from_secs(10),
        caption_timeout: Duration::from_secs(5),
        metrics_enabled: false,
        ..Default::default()
    }
}

fn create_test_router(config: ApiConfig) -> Router {
    let state = AppState::new(config).unwrap();
    create_router(state, None)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_transcript(video_id: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/transcript")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "video_id": video_id }).to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn metadata(extra: Value) -> Value {
    let mut document = json!({
        "id": VIDEO_ID,
        "title": "Never Gonna Give You Up",
        "channel": "Rick Astley",
        "channel_url": "https://www.youtube.com/channel/UCuAXFkgsw1L7xaCfnd5JJOw",
        "description": "The official video",
        "duration": 213,
        "view_count": 1500000000u64,
        "like_count": 17000000,
        "upload_date": "20091025",
        "tags": ["music", "live"],
        "categories": ["Music"],
        "thumbnail": "https://i.ytimg.com/vi/dQw4w9WgXcQ/maxresdefault.jpg"
    });
    if let (Some(base), Some(extra)) = (document.as_object_mut(), extra.as_object()) {
        base.extend(extra.clone());
    }
    document
}

async fn caption_server(body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/captions/en"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_health_endpoint() {
    let config = ApiConfig {
        ytdlp_path: "definitely-not-a-real-ytdlp-binary".to_string(),
        metrics_enabled: false,
        ..Default::default()
    };
    let (status, body) = send(create_test_router(config), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "youtube-transcript-service");
    assert_eq!(body["yt-dlp"], "installed");
}

#[tokio::test]
async fn test_ready_reports_missing_tool() {
    let config = ApiConfig {
        ytdlp_path: "definitely-not-a-real-ytdlp-binary".to_string(),
        metrics_enabled: false,
        ..Default::default()
    };
    let (status, body) = send(create_test_router(config), get("/ready")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["checks"]["ytdlp"]["status"], "error");
}

#[tokio::test]
async fn test_root_endpoint() {
    let script = stub_script("exit 0");
    let (status, body) = send(create_test_router(test_config(&script)), get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "YouTube Transcript Service");
    assert_eq!(body["status"], "running");
    assert_eq!(body["fields"], 17);
    assert!(body["endpoints"]["/transcript"].is_string());
}

#[tokio::test]
async fn test_schema_endpoint() {
    let script = stub_script("exit 0");
    let (status, body) = send(create_test_router(test_config(&script)), get("/schema")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["TranscriptRequest"]["properties"]["video_id"].is_object());
    assert!(body["VideoDataResponse"]["properties"]["videoId"].is_object());
}

#[tokio::test]
async fn test_invalid_video_id_is_rejected() {
    let script = stub_script("exit 0");
    let app = create_test_router(test_config(&script));

    let (status, body) = send(app.clone(), post_transcript("abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid video_id: abc. Must be 11 characters.");

    let (status, _) = send(app.clone(), get("/transcript?video_id=abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unrecognized URL is passed through unchanged and fails the length check
    let (status, body) = send(app, post_transcript("https://vimeo.com/76979871")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["detail"],
        "Invalid video_id: https://vimeo.com/76979871. Must be 11 characters."
    );
}

#[tokio::test]
async fn test_missing_query_parameter_is_rejected() {
    let script = stub_script("exit 0");
    let (status, body) = send(create_test_router(test_config(&script)), get("/transcript")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_no_captions_yields_empty_transcript() {
    // Tracks exist only for another language, and the `en` list is empty.
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<transcript/>"))
        .expect(0)
        .mount(&server)
        .await;

    let script = json_stub(&metadata(json!({
        "subtitles": { "fr": [{ "url": format!("{}/captions/fr", server.uri()) }] },
        "automatic_captions": { "en": [] }
    })));
    let (status, body) = send(
        create_test_router(test_config(&script)),
        post_transcript(VIDEO_ID),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["videoId"], VIDEO_ID);
    assert_eq!(body["videoTitle"], "Never Gonna Give You Up");
    assert_eq!(body["tags"], "music, live");
    assert_eq!(body["categories"], "Music");
    assert_eq!(body["duration"], 213);
    assert_eq!(body["transcript"], "");
    assert_eq!(body["length"], 0);
    assert_eq!(body["error"], Value::Null);
}

#[tokio::test]
async fn test_manual_subtitles_are_fetched_and_parsed() {
    let server =
        caption_server(r#"<?xml version="1.0"?><transcript><text>Hello</text><text>world</text></transcript>"#)
            .await;

    let script = json_stub(&metadata(json!({
        "subtitles": { "en": [{ "url": format!("{}/captions/en", server.uri()), "ext": "srv1" }] },
        "automatic_captions": { "en": [{ "url": format!("{}/auto/en", server.uri()) }] }
    })));

    let (status, body) = send(
        create_test_router(test_config(&script)),
        post_transcript("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=1s"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["videoId"], VIDEO_ID);
    assert_eq!(body["transcript"], "Hello world");
    assert_eq!(body["length"], 11);
}

#[tokio::test]
async fn test_automatic_captions_via_get() {
    let server = caption_server("<transcript><text>auto</text><text>generated</text></transcript>").await;

    let script = json_stub(&metadata(json!({
        "automatic_captions": { "en": [{ "url": format!("{}/captions/en", server.uri()) }] }
    })));

    let (status, body) = send(
        create_test_router(test_config(&script)),
        get("/transcript?video_id=https%3A%2F%2Fyoutu.be%2FdQw4w9WgXcQ"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["videoId"], VIDEO_ID);
    assert_eq!(body["transcript"], "auto generated");
    assert_eq!(body["length"], 14);
}

#[tokio::test]
async fn test_absent_metadata_fields_get_defaults() {
    let script = json_stub(&json!({ "id": VIDEO_ID, "like_count": null }));
    let (_, body) = send(
        create_test_router(test_config(&script)),
        post_transcript(VIDEO_ID),
    )
    .await;

    assert_eq!(body["success"], true);
    assert_eq!(body["videoTitle"], "");
    assert_eq!(body["channelName"], "");
    assert_eq!(body["viewCount"], 0);
    assert_eq!(body["likeCount"], 0);
    assert_eq!(body["uploadDate"], "");
    assert_eq!(body["tags"], "");
    assert_eq!(body["thumbnailUrl"], "");
}

#[tokio::test]
async fn test_tool_failure_is_a_structured_failure() {
    let script = stub_script("echo 'ERROR: [youtube] dQw4w9WgXcQ: Video unavailable' >&2\nexit 1");
    let (status, body) = send(
        create_test_router(test_config(&script)),
        post_transcript(VIDEO_ID),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["videoId"], VIDEO_ID);
    assert_eq!(
        body["error"],
        "Error: yt-dlp error: ERROR: [youtube] dQw4w9WgXcQ: Video unavailable"
    );
    assert_eq!(body["videoTitle"], Value::Null);
    assert_eq!(body["transcript"], Value::Null);
}

#[tokio::test]
async fn test_invalid_json_output() {
    let script = stub_script("echo '[download] not json'");
    let (status, body) = send(
        create_test_router(test_config(&script)),
        post_transcript(VIDEO_ID),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid JSON response");
}

#[tokio::test]
async fn test_malformed_caption_xml_fails_whole_request() {
    let server = caption_server("<transcript><text>Hello</transcript>").await;
    let script = json_stub(&metadata(json!({
        "subtitles": { "en": [{ "url": format!("{}/captions/en", server.uri()) }] }
    })));

    let (status, body) = send(
        create_test_router(test_config(&script)),
        post_transcript(VIDEO_ID),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().starts_with("Error: "));
    // No partial metadata
    assert_eq!(body["videoTitle"], Value::Null);
}

#[cfg(unix)]
#[tokio::test]
async fn test_extraction_timeout_kills_subprocess_tree() {
    // The grandchild is not exec'd, so it runs beside the shell.
    let pid_file = tempfile::NamedTempFile::new().unwrap();
    let script = stub_script(&format!(
        "sleep 30 &\necho $! > '{}'\nwait",
        pid_file.path().display()
    ));
    let config = ApiConfig {
        extraction_timeout: Duration::from_secs(1),
        ..test_config(&script)
    };
    let input = "https://youtu.be/dQw4w9WgXcQ";

    let started = std::time::Instant::now();
    let (status, body) = send(create_test_router(config), post_transcript(input)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Request timeout");
    assert_eq!(body["videoId"], input);
    assert!(started.elapsed() < Duration::from_secs(5));

    let pid = std::fs::read_to_string(pid_file.path()).unwrap();
    let pid = pid.trim();
    assert!(!pid.is_empty());
    #[cfg(target_os = "linux")]
    assert!(process_gone(pid).await, "subprocess {} still running", pid);
}

/// Polls `/proc` until `pid` is gone or only a zombie remains.
#[cfg(target_os = "linux")]
async fn process_gone(pid: &str) -> bool {
    for _ in 0..40 {
        let running = std::fs::read_to_string(format!("/proc/{}/stat", pid))
            .map(|stat| {
                let state = stat.rsplit(')').next().unwrap_or("").trim_start();
                !state.starts_with('Z') && !state.starts_with('X')
            })
            .unwrap_or(false);
        if !running {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test]
async fn test_security_and_request_id_headers() {
    let script = stub_script("exit 0");
    let response = create_test_router(test_config(&script))
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(headers.get("x-request-id").unwrap(), "req-123");
}
