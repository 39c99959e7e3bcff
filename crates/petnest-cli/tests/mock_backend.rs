//! CLI tests against a mock backend.

mod common;

use common::{credentials_file, run_cli, run_cli_success};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"phone_number": "99112233", "password": "secret"})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "refresh_token=r1; Path=/; HttpOnly")
                .set_body_json(json!({"accessToken": token, "user": {"id": 7}})),
        )
        .mount(server)
        .await;
}

async fn mount_rejecting_refresh(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .mount(server)
        .await;
}

const LOGIN: &[&str] = &[
    "login",
    "--phone-number",
    "99112233",
    "--password",
    "secret",
];

#[tokio::test(flavor = "multi_thread")]
async fn login_caches_token_for_later_commands() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    mount_login(&server, "tok-1").await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7, "name": "Saraa"})))
        .expect(1)
        .mount(&server)
        .await;

    let stdout = run_cli_success(LOGIN, home.path(), Some(&server.uri())).await;
    assert!(stdout.contains("\"id\": 7"));

    let cached = std::fs::read_to_string(credentials_file(home.path())).unwrap();
    assert!(cached.contains("tok-1"));

    let stdout = run_cli_success(&["whoami"], home.path(), Some(&server.uri())).await;
    assert!(stdout.contains("Saraa"));
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_login_fails() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "bad"})))
        .mount(&server)
        .await;

    let output = run_cli(LOGIN, home.path(), Some(&server.uri())).await;
    assert!(!output.status.success());
    assert!(!credentials_file(home.path()).exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn whoami_without_session_suggests_login() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    mount_rejecting_refresh(&server).await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let output = run_cli(&["whoami"], home.path(), Some(&server.uri())).await;
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("petnest login"), "stderr: {}", stderr);
}

#[tokio::test(flavor = "multi_thread")]
async fn ended_session_forgets_stale_token() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    mount_rejecting_refresh(&server).await;

    let cache = credentials_file(home.path());
    std::fs::create_dir_all(cache.parent().unwrap()).unwrap();
    std::fs::write(&cache, r#"{"access_token": "stale"}"#).unwrap();

    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_cli(&["whoami"], home.path(), Some(&server.uri())).await;
    assert!(!output.status.success());
    assert!(!cache.exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn protected_command_stops_at_gate() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    mount_rejecting_refresh(&server).await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let output = run_cli(&["pets", "list"], home.path(), Some(&server.uri())).await;
    assert!(!output.status.success());
}

#[tokio::test(flavor = "multi_thread")]
async fn pets_create_sends_payload() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    mount_login(&server, "tok-1").await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/pets"))
        .and(header("authorization", "Bearer tok-1"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"name": "Bor", "species": "dog"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"pet": {"id": "p1"}})))
        .expect(1)
        .mount(&server)
        .await;

    run_cli_success(LOGIN, home.path(), Some(&server.uri())).await;
    let stdout = run_cli_success(
        &["pets", "create", "--json", r#"{"name": "Bor", "species": "dog"}"#],
        home.path(),
        Some(&server.uri()),
    )
    .await;
    assert!(stdout.contains("p1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn logout_forgets_cached_token() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    mount_login(&server, "tok-1").await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    run_cli_success(LOGIN, home.path(), Some(&server.uri())).await;
    assert!(credentials_file(home.path()).exists());

    run_cli_success(&["logout"], home.path(), Some(&server.uri())).await;
    assert!(!credentials_file(home.path()).exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn refresh_uses_cookie_from_earlier_login() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    mount_login(&server, "tok-1").await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(header("cookie", "refresh_token=r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "tok-2"})))
        .expect(1)
        .mount(&server)
        .await;

    run_cli_success(LOGIN, home.path(), Some(&server.uri())).await;
    run_cli_success(&["refresh"], home.path(), Some(&server.uri())).await;

    let cached = std::fs::read_to_string(credentials_file(home.path())).unwrap();
    assert!(cached.contains("tok-2"));
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_backend_keeps_cached_token() {
    let home = tempfile::tempdir().unwrap();

    let cache = credentials_file(home.path());
    std::fs::create_dir_all(cache.parent().unwrap()).unwrap();
    std::fs::write(&cache, r#"{"access_token": "tok-1"}"#).unwrap();

    let output = run_cli(&["pets", "list"], home.path(), Some("http://127.0.0.1:9")).await;
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unreachable"), "stderr: {}", stderr);
    assert!(cache.exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_backend_is_reported() {
    let home = tempfile::tempdir().unwrap();

    let output = run_cli(&["whoami"], home.path(), None).await;
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("PETNEST_API_BASE"), "stderr: {}", stderr);
}
