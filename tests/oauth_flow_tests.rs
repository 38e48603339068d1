//! End-to-end OAuth flow tests
//!
//! Runs the operations against an in-process fake provider:
//! - Authorization URL construction
//! - Callback state validation
//! - Code exchange and user-info retrieval
//! - Failure propagation between the stages

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use oauth_exchange_worker::Error;
use oauth_exchange_worker::config::HttpConfig;
use oauth_exchange_worker::oauth::{ClientConfig, Endpoint, OAuthClient, TokenPlacement};
use oauth_exchange_worker::operation::OperationRegistry;
use pretty_assertions::assert_eq;
use reqwest::Client;
use serde_json::{Value, json};
use tokio::net::TcpListener;

const GOOD_CODE: &str = "ABC123";
const ISSUED_TOKEN: &str = "ya29.test-token";

/// What the fake provider has seen
#[derive(Default)]
struct ProviderLog {
    token_calls: AtomicUsize,
    userinfo_calls: AtomicUsize,
    last_token_form: Mutex<Option<HashMap<String, String>>>,
}

async fn token_handler(
    State(log): State<Arc<ProviderLog>>,
    Form(form): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    log.token_calls.fetch_add(1, Ordering::SeqCst);
    let code = form.get("code").cloned().unwrap_or_default();
    *log.last_token_form.lock().unwrap() = Some(form);

    match code.as_str() {
        GOOD_CODE => (
            StatusCode::OK,
            Json(json!({"access_token": ISSUED_TOKEN, "token_type": "Bearer", "expires_in": 3599})),
        ),
        "NO-TOKEN" => (StatusCode::OK, Json(json!({"token_type": "Bearer"}))),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_grant", "error_description": "Bad Request"})),
        ),
    }
}

async fn userinfo_handler(
    State(log): State<Arc<ProviderLog>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    log.userinfo_calls.fetch_add(1, Ordering::SeqCst);
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(String::from);
    let token = query.get("access_token").cloned().or(bearer);

    if token.as_deref() == Some(ISSUED_TOKEN) {
        (StatusCode::OK, Json(json!({"id": "1", "email": "a@b.com"})))
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"error": "invalid_token"})))
    }
}

async fn broken_userinfo_handler(State(log): State<Arc<ProviderLog>>) -> impl IntoResponse {
    log.userinfo_calls.fetch_add(1, Ordering::SeqCst);
    (StatusCode::OK, "<html>not json</html>")
}

async fn numeric_userinfo_handler(State(log): State<Arc<ProviderLog>>) -> impl IntoResponse {
    log.userinfo_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({"id": 42, "email": "a@b.com", "verified_email": "true", "hd": null}))
}

/// Answers long after any sane client timeout
async fn stalled_handler() -> impl IntoResponse {
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(json!({"access_token": ISSUED_TOKEN}))
}

/// Start the fake provider, returning its base URL
async fn spawn_provider() -> (String, Arc<ProviderLog>) {
    let log = Arc::new(ProviderLog::default());
    let app = Router::new()
        .route("/token", post(token_handler))
        .route("/userinfo", get(userinfo_handler))
        .route("/userinfo-broken", get(broken_userinfo_handler))
        .route("/userinfo-numeric", get(numeric_userinfo_handler))
        .route("/token-stalled", post(stalled_handler))
        .route("/userinfo-stalled", get(stalled_handler))
        .with_state(Arc::clone(&log));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), log)
}

fn client_config(base: &str) -> ClientConfig {
    ClientConfig {
        client_id: "client-123".to_string(),
        client_secret: "secret-456".to_string(),
        scopes: vec!["email".to_string(), "profile".to_string()],
        endpoint: Endpoint {
            auth_url: format!("{base}/auth"),
            token_url: format!("{base}/token"),
            userinfo_url: format!("{base}/userinfo"),
        },
        ..ClientConfig::default()
    }
}

fn impatient_registry(config: ClientConfig) -> OperationRegistry {
    let http = HttpConfig {
        request_timeout: Duration::from_millis(200),
        ..HttpConfig::default()
    };
    let oauth = OAuthClient::from_config(&http, Arc::new(config)).unwrap();
    OperationRegistry::with_defaults(Arc::new(oauth))
}

fn registry(config: ClientConfig) -> OperationRegistry {
    OperationRegistry::with_defaults(Arc::new(OAuthClient::new(Client::new(), Arc::new(config))))
}

async fn get_user_info(registry: &OperationRegistry, callback: &str) -> oauth_exchange_worker::Result<Value> {
    registry
        .dispatch(
            "getUserInfo",
            &[json!("https://host"), json!(callback), json!("/cb")],
            None,
        )
        .await
}

#[tokio::test]
async fn construct_url_embeds_redirect_and_state() {
    let registry = registry(client_config("https://idp.example"));
    let value = registry
        .dispatch("constructOAuthUrl", &[json!("https://host"), json!("/cb")], None)
        .await
        .unwrap();

    let url = value.as_str().unwrap();
    let (endpoint, query) = url.split_once('?').unwrap();
    let query: HashMap<String, String> = serde_urlencoded::from_str(query).unwrap();
    assert_eq!(endpoint, "https://idp.example/auth");
    assert_eq!(query["redirect_uri"], "https://host/cb?host=https://host");
    assert_eq!(query["state"], "state");
    assert_eq!(query["scope"], "email profile");
    assert_eq!(query["client_id"], "client-123");
}

#[tokio::test]
async fn callback_yields_profile() {
    let (base, log) = spawn_provider().await;
    let registry = registry(client_config(&base));

    let profile = get_user_info(&registry, "https://host/cb?state=state&code=ABC123")
        .await
        .unwrap();

    assert_eq!(profile, json!({"id": "1", "email": "a@b.com"}));
    assert_eq!(log.token_calls.load(Ordering::SeqCst), 1);
    assert_eq!(log.userinfo_calls.load(Ordering::SeqCst), 1);

    let form = log.last_token_form.lock().unwrap().clone().unwrap();
    assert_eq!(form["grant_type"], "authorization_code");
    assert_eq!(form["code"], GOOD_CODE);
    assert_eq!(form["redirect_uri"], "https://host/cb?host=https://host");
    assert_eq!(form["client_id"], "client-123");
    assert_eq!(form["client_secret"], "secret-456");
}

#[tokio::test]
async fn wrong_state_never_reaches_token_endpoint() {
    let (base, log) = spawn_provider().await;
    let registry = registry(client_config(&base));

    for code in ["ABC123", "anything", ""] {
        let callback = format!("https://host/cb?state=wrong&code={code}");
        let err = get_user_info(&registry, &callback).await.unwrap_err();
        assert!(matches!(err, Error::InvalidState), "{code}: {err}");
    }

    assert_eq!(log.token_calls.load(Ordering::SeqCst), 0);
    assert_eq!(log.userinfo_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rejected_code_never_reaches_userinfo() {
    let (base, log) = spawn_provider().await;
    let registry = registry(client_config(&base));

    let err = get_user_info(&registry, "https://host/cb?state=state&code=EXPIRED")
        .await
        .unwrap_err();

    match err {
        Error::CodeExchangeFailed(message) => assert!(message.contains("invalid_grant"), "{message}"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(log.token_calls.load(Ordering::SeqCst), 1);
    assert_eq!(log.userinfo_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn token_response_without_access_token_fails_exchange() {
    let (base, log) = spawn_provider().await;
    let registry = registry(client_config(&base));

    let err = get_user_info(&registry, "https://host/cb?state=state&code=NO-TOKEN")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::CodeExchangeFailed(_)), "{err}");
    assert_eq!(log.userinfo_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_callback_url_is_parse_error() {
    let (base, log) = spawn_provider().await;
    let registry = registry(client_config(&base));

    let err = get_user_info(&registry, "not a url").await.unwrap_err();

    assert!(matches!(err, Error::UrlParse(_)), "{err}");
    assert_eq!(log.token_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn bearer_header_placement() {
    let (base, _log) = spawn_provider().await;
    let config = ClientConfig {
        token_placement: TokenPlacement::Header,
        ..client_config(&base)
    };

    let profile = get_user_info(&registry(config), "https://host/cb?state=state&code=ABC123")
        .await
        .unwrap();

    assert_eq!(profile["email"], "a@b.com");
}

#[tokio::test]
async fn userinfo_rejection_is_fetch_error() {
    let (base, _log) = spawn_provider().await;
    let mut config = client_config(&base);
    // Send the token where the fake provider does not look for it
    config.endpoint.userinfo_url = format!("{base}/userinfo?access_token=stale");
    config.token_placement = TokenPlacement::Header;

    let err = get_user_info(&registry(config), "https://host/cb?state=state&code=ABC123")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ProfileFetchFailed(_)), "{err}");
}

#[tokio::test]
async fn malformed_profile_is_decode_error() {
    let (base, log) = spawn_provider().await;
    let mut config = client_config(&base);
    config.endpoint.userinfo_url = format!("{base}/userinfo-broken");

    let err = get_user_info(&registry(config), "https://host/cb?state=state&code=ABC123")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ProfileDecodeFailed(_)), "{err}");
    assert_eq!(log.userinfo_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn profile_values_pass_through_untyped() {
    let (base, _log) = spawn_provider().await;
    let mut config = client_config(&base);
    config.endpoint.userinfo_url = format!("{base}/userinfo-numeric");

    let profile = get_user_info(&registry(config), "https://host/cb?state=state&code=ABC123")
        .await
        .unwrap();

    assert_eq!(
        profile,
        json!({"id": 42, "email": "a@b.com", "verified_email": "true", "hd": null})
    );
}

#[tokio::test]
async fn stalled_token_endpoint_times_out() {
    let (base, log) = spawn_provider().await;
    let mut config = client_config(&base);
    config.endpoint.token_url = format!("{base}/token-stalled");

    let started = std::time::Instant::now();
    let err = get_user_info(&impatient_registry(config), "https://host/cb?state=state&code=ABC123")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::CodeExchangeFailed(_)), "{err}");
    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(log.userinfo_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn stalled_userinfo_endpoint_times_out() {
    let (base, _log) = spawn_provider().await;
    let mut config = client_config(&base);
    config.endpoint.userinfo_url = format!("{base}/userinfo-stalled");

    let started = std::time::Instant::now();
    let err = get_user_info(&impatient_registry(config), "https://host/cb?state=state&code=ABC123")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ProfileFetchFailed(_)), "{err}");
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn unreachable_userinfo_is_fetch_error() {
    let (base, _log) = spawn_provider().await;
    let mut config = client_config(&base);
    config.endpoint.userinfo_url = "http://127.0.0.1:9/userinfo".to_string();

    let err = get_user_info(&registry(config), "https://host/cb?state=state&code=ABC123")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ProfileFetchFailed(_)), "{err}");
}

#[tokio::test]
async fn concurrent_flows_share_one_client() {
    let (base, log) = spawn_provider().await;
    let registry = Arc::new(registry(client_config(&base)));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                get_user_info(&registry, "https://host/cb?state=state&code=ABC123").await
            })
        })
        .collect();

    for handle in handles {
        let profile = handle.await.unwrap().unwrap();
        assert_eq!(profile["id"], "1");
    }
    assert_eq!(log.token_calls.load(Ordering::SeqCst), 8);
}
