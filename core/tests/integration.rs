//! End-to-end calls against the live mock server.
//!
//! # Design
//! Each test starts the mock server on a random port, then drives the client
//! over real HTTP through `UreqTransport`. This checks request shaping,
//! status routing and error classification against an actual server.

use std::time::Duration;

use api_client::{
    Api, ApiClient, ApiResult, ClientConfig, ErrorCode, Messages, Progress, RequestOptions,
    ServiceCatalog, UreqTransport,
};
use serde_json::{json, Value};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Start the mock server on a random port and return its base URL.
fn start_server() -> String {
    init_logging();
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}/")
}

fn api(base_url: &str) -> Api {
    Api::from_config(ClientConfig::new(base_url).unwrap())
}

/// An `Api` over a custom catalog, for the diagnostic routes.
fn custom_api(base_url: &str, catalog: &str, timeout: Duration) -> Api {
    let config = ClientConfig::new(base_url).unwrap().with_timeout(timeout);
    let client = ApiClient::new(
        config,
        ServiceCatalog::from_json(catalog).unwrap(),
        Messages::default(),
    );
    Api::new(client, UreqTransport::new(timeout))
}

fn data(result: &ApiResult) -> &Value {
    result
        .data()
        .unwrap_or_else(|| panic!("expected success, got {}", result.to_json()))
}

#[test]
fn blog_lifecycle() {
    let base = start_server();
    let api = api(&base);

    // Step 1: sign up and log in.
    let user = json!({"name": "Ada", "username": "ada", "password": "pw"});
    let result = api.user_signup(&user, Progress::none());
    assert_eq!(data(&result)["msg"], "signup successfull");

    let result = api.user_login(&json!({"username": "ada", "password": "pw"}), Progress::none());
    assert_eq!(data(&result)["name"], "Ada");

    // Step 2: create two posts.
    let result = api.create_post(
        &json!({"title": "Song", "description": "la", "username": "ada", "categories": "music"}),
        Progress::none(),
    );
    let song = data(&result).clone();
    let id = song["_id"].as_str().unwrap().to_string();
    api.create_post(
        &json!({"title": "Goal", "username": "ada", "categories": "sports"}),
        Progress::none(),
    );

    // Step 3: list with query parameters.
    let result = api.get_all_posts(&json!({"category": "music"}), Progress::none());
    let posts = data(&result).as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"], "Song");

    let result = api.get_all_posts(&Value::Null, Progress::none());
    assert_eq!(data(&result).as_array().unwrap().len(), 2);

    // Step 4: fetch by path segment.
    let result = api.get_post_by_id(&json!(id), Progress::none());
    assert_eq!(data(&result), &song);

    // Step 5: update, taking the segment from the post's id.
    let mut edited = song.clone();
    edited["title"] = json!("Song (remastered)");
    let result = api.update_post(&edited, Progress::none());
    assert!(result.is_success(), "{}", result.to_json());
    let result = api.get_post_by_id(&json!(id), Progress::none());
    assert_eq!(data(&result)["title"], "Song (remastered)");

    // Step 6: comment, list, delete comment.
    let result = api.new_comment(
        &json!({"postId": id, "name": "bo", "comments": "nice"}),
        Progress::none(),
    );
    let comment_id = data(&result)["_id"].as_str().unwrap().to_string();
    let result = api.get_all_comments(&json!(id), Progress::none());
    assert_eq!(data(&result).as_array().unwrap().len(), 1);
    let result = api.delete_comment(&json!(comment_id), Progress::none());
    assert!(result.is_success(), "{}", result.to_json());

    // Step 7: delete with a full post as body. The server rejects DELETE
    // bodies, so success means the body was dropped.
    let result = api.delete_post(&edited, Progress::none());
    assert!(result.is_success(), "{}", result.to_json());

    // Step 8: the post is gone; the server's 404 is a response error.
    let result = api.get_post_by_id(&json!(id), Progress::none());
    assert_eq!(
        result,
        ApiResult::Error {
            msg: Messages::default().response_failure,
            code: ErrorCode::Status(404),
        }
    );
}

#[test]
fn rejected_login_is_response_error_with_status() {
    let base = start_server();
    let result = api(&base).user_login(&json!({"username": "ghost", "password": "x"}), Progress::none());
    assert_eq!(result.to_json()["isError"], true);
    assert_eq!(result.to_json()["code"], 400);
}

#[test]
fn reserved_characters_in_segment_reach_the_route() {
    let base = start_server();
    let result = api(&base).get_post_by_id(&json!("no such post"), Progress::none());
    assert_eq!(
        result,
        ApiResult::Error {
            msg: Messages::default().response_failure,
            code: ErrorCode::Status(400),
        }
    );

    let result = api(&base).get_all_comments(&json!("a/b?c=1"), Progress::none());
    assert_eq!(result.to_json()["code"], 400);
}

#[test]
fn non_200_success_status_is_failure() {
    let base = start_server();
    let api = custom_api(
        &base,
        r#"{"created": {"url": "/status/201", "method": "POST"}}"#,
        Duration::from_secs(5),
    );
    let result = api.call("created", &json!({}), Progress::none());
    assert_eq!(
        result,
        ApiResult::Failure {
            status: 201,
            msg: Some("Created".to_string()),
            code: Some(json!(201)),
        }
    );
}

#[test]
fn server_error_status_is_response_error() {
    let base = start_server();
    let api = custom_api(
        &base,
        r#"{"broken": {"url": "/status/503", "method": "GET"}}"#,
        Duration::from_secs(5),
    );
    let result = api.call("broken", &Value::Null, Progress::none());
    assert_eq!(result.to_json()["code"], 503);
}

#[test]
fn timeout_is_request_error() {
    let base = start_server();
    let api = custom_api(
        &base,
        r#"{"slow": {"url": "/slow/2000", "method": "GET"}}"#,
        Duration::from_millis(200),
    );
    let result = api.call("slow", &Value::Null, Progress::none());
    assert_eq!(
        result,
        ApiResult::Error {
            msg: Messages::default().request_failure,
            code: ErrorCode::Empty,
        }
    );
}

#[test]
fn refused_connection_is_request_error() {
    init_logging();
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let api = api(&format!("http://127.0.0.1:{port}/"));
    let result = api.get_all_posts(&Value::Null, Progress::none());
    assert_eq!(result.to_json()["msg"], json!(Messages::default().request_failure));
    assert_eq!(result.to_json()["code"], "");
}

#[test]
fn malformed_base_url_is_network_error() {
    init_logging();
    let api = api("not a valid url");
    let result = api.get_all_posts(&Value::Null, Progress::none());
    assert_eq!(
        result,
        ApiResult::Error {
            msg: Messages::default().network_error,
            code: ErrorCode::Empty,
        }
    );
}

#[test]
fn unknown_operation_is_network_error() {
    let base = start_server();
    let result = api(&base).call("launchRocket", &Value::Null, Progress::none());
    assert_eq!(result.to_json()["msg"], json!(Messages::default().network_error));
}

#[test]
fn download_progress_reaches_one_hundred() {
    let base = start_server();
    let api = custom_api(
        &base,
        r#"{"download": {"url": "/download/65536", "method": "GET"}}"#,
        Duration::from_secs(5),
    );
    let mut seen = Vec::new();
    let mut on_download = |p: u8| seen.push(p);
    let result = api.call(
        "download",
        &Value::Null,
        Progress::none().on_download(&mut on_download),
    );
    assert!(result.is_success());
    assert_eq!(result.data().unwrap().as_str().unwrap().len(), 65536);
    assert_eq!(seen.last(), Some(&100));
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn upload_progress_reaches_one_hundred() {
    let base = start_server();
    let api = api(&base);
    let mut uploads = Vec::new();
    let mut on_upload = |p: u8| uploads.push(p);
    let file = json!({"name": "cat.png", "data": "x".repeat(32 * 1024)});
    let result = api.upload_file(&file, Progress::none().on_upload(&mut on_upload));
    assert!(result.is_success(), "{}", result.to_json());
    assert_eq!(
        data(&result)["size"],
        serde_json::to_string(&file).unwrap().len()
    );
    assert_eq!(uploads.last(), Some(&100));
}

#[test]
fn explicit_options_override_hint() {
    let base = start_server();
    let api = api(&base);
    api.create_post(&json!({"title": "Jazz", "categories": "music"}), Progress::none());
    api.create_post(&json!({"title": "Chess", "categories": "games"}), Progress::none());

    let options = RequestOptions::params([("category", "games")]);
    let result = api.call_with("getAllPosts", &Value::Null, &options, Progress::none());
    let posts = data(&result).as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"], "Chess");
}

#[test]
fn repeated_calls_are_independent() {
    let base = start_server();
    let api = api(&base);
    let post = json!({"title": "Twice"});
    let first = api.create_post(&post, Progress::none());
    let second = api.create_post(&post, Progress::none());
    assert_ne!(data(&first)["_id"], data(&second)["_id"]);

    let result = api.get_all_posts(&Value::Null, Progress::none());
    assert_eq!(data(&result).as_array().unwrap().len(), 2);
}
