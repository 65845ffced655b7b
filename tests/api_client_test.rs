// ==========================================
// ApiClient 集成测试
// ==========================================
// 测试范围:
// 1. URL 拼接与查询参数、请求头合并
// 2. GET 重试（仅网络失败）与非 GET 单次发送
// 3. 错误归一化: HTTP 失败、网络失败、取消
// ==========================================

mod helpers;

use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;

use helpers::api_test_helper::*;
use helpers::mock_transport::Reply;
use plant_care_client::api::{
    AbortController, ApiError, HttpMethod, RequestOptions, ResponseBody, RetryPolicy,
};
use plant_care_client::config::ClientConfig;

// ==========================================
// URL 与请求头
// ==========================================

#[tokio::test]
async fn test_url_joins_base_and_query() {
    let env = ApiTestEnv::new();
    env.transport
        .on_json(HttpMethod::Get, "/measurements/last", 200, json!(null));

    env.client
        .get(
            "measurements/last",
            RequestOptions::new(HttpMethod::Get).query("plant_id", PLANT_A),
        )
        .await
        .unwrap();

    let requests = env.transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].url,
        format!("{}/measurements/last?plant_id={}", BASE_URL, PLANT_A)
    );
}

#[tokio::test]
async fn test_headers_merge_case_insensitively() {
    let config = ClientConfig::with_base_url(BASE_URL)
        .with_retry(RetryPolicy::without_delays(1))
        .with_header("Authorization", "Bearer abc")
        .with_header("X-Client", "cli");
    let env = ApiTestEnv::with_config(config);
    env.transport.on_json(HttpMethod::Post, "/plants", 200, json!({"ok": true}));

    env.client
        .post(
            "/plants",
            &json!({"name": "Fern"}),
            RequestOptions::default().header("x-client", "override"),
        )
        .await
        .unwrap();

    let request = &env.transport.requests()[0];
    assert_eq!(request.header("authorization"), Some("Bearer abc"));
    assert_eq!(request.header("X-CLIENT"), Some("override"));
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert_eq!(request.header("accept"), Some("application/json"));
    assert_eq!(request.body.as_deref(), Some(r#"{"name":"Fern"}"#));
}

// ==========================================
// 重试
// ==========================================

#[tokio::test]
async fn test_get_retries_network_failures_then_succeeds() {
    let env = ApiTestEnv::new();
    env.transport
        .on(HttpMethod::Get, "/plants", Reply::Fail("connection reset".into()))
        .on(HttpMethod::Get, "/plants", Reply::Fail("connection reset".into()))
        .on_json(HttpMethod::Get, "/plants", 200, json!([]));

    let body = env
        .client
        .get("/plants", RequestOptions::new(HttpMethod::Get))
        .await
        .unwrap();

    assert_eq!(body, ResponseBody::Json(json!([])));
    assert_eq!(env.transport.count(HttpMethod::Get, "/plants"), 3);
}

#[tokio::test]
async fn test_get_gives_up_after_attempts_with_last_failure() {
    let env = ApiTestEnv::new();
    env.transport
        .on(HttpMethod::Get, "/plants", Reply::Fail("first".into()))
        .on(HttpMethod::Get, "/plants", Reply::Fail("second".into()))
        .on(HttpMethod::Get, "/plants", Reply::Fail("third".into()));

    let err = env
        .client
        .get("/plants", RequestOptions::new(HttpMethod::Get))
        .await
        .unwrap_err();

    match err {
        ApiError::Network { detail } => assert_eq!(detail, "third"),
        other => panic!("Expected Network, got {:?}", other),
    }
    assert_eq!(env.transport.count(HttpMethod::Get, "/plants"), 3);
}

#[tokio::test]
async fn test_explicit_retry_sets_total_attempts() {
    let env = ApiTestEnv::new();
    env.transport
        .on(HttpMethod::Get, "/plants", Reply::Fail("down".into()));

    let err = env
        .client
        .get("/plants", RequestOptions::new(HttpMethod::Get).retry(0))
        .await
        .unwrap_err();

    assert_eq!(err.status(), 0);
    assert_eq!(env.transport.count(HttpMethod::Get, "/plants"), 1);
}

#[tokio::test]
async fn test_post_is_never_retried() {
    let env = ApiTestEnv::new();
    env.transport
        .on(HttpMethod::Post, "/locations", Reply::Fail("timeout".into()));

    let err = env
        .client
        .post(
            "/locations",
            &json!({"name": "Balcony"}),
            RequestOptions::default().retry(5),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Network { .. }));
    assert_eq!(env.transport.count(HttpMethod::Post, "/locations"), 1);
}

#[tokio::test]
async fn test_http_errors_are_not_retried() {
    let env = ApiTestEnv::new();
    env.transport.on_json(
        HttpMethod::Get,
        "/plants",
        503,
        json!({"message": "maintenance"}),
    );

    let err = env
        .client
        .get("/plants", RequestOptions::new(HttpMethod::Get))
        .await
        .unwrap_err();

    assert_eq!(err.status(), 503);
    assert_eq!(err.detail(), "maintenance");
    assert_eq!(env.transport.count(HttpMethod::Get, "/plants"), 1);
}

// ==========================================
// 错误体
// ==========================================

#[tokio::test]
async fn test_plain_text_error_body_becomes_detail() {
    let env = ApiTestEnv::new();
    env.transport
        .on(HttpMethod::Get, "/plants", Reply::text(502, "Bad Gateway"));

    let err = env
        .client
        .get("/plants", RequestOptions::new(HttpMethod::Get))
        .await
        .unwrap_err();

    assert_eq!(err.status(), 502);
    assert_eq!(err.detail(), "Bad Gateway");
}

#[tokio::test]
async fn test_decode_failure_is_reported() {
    let env = ApiTestEnv::new();
    env.transport
        .on_json(HttpMethod::Get, "/plants", 200, json!({"not": "a list"}));

    let err = env.state.plant_api.list(None).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

// ==========================================
// 取消
// ==========================================

#[tokio::test]
async fn test_abort_interrupts_stalled_request() {
    let env = ApiTestEnv::new();
    env.transport.on(HttpMethod::Get, "/plants", Reply::Stall);

    let controller = AbortController::new();
    let signal = controller.signal();
    let client = env.client.clone();
    let pending = tokio::spawn(async move {
        client
            .get("/plants", RequestOptions::new(HttpMethod::Get).signal(Some(signal)))
            .await
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    controller.abort();

    let result = tokio::time::timeout(Duration::from_secs(1), pending)
        .await
        .expect("取消未生效")
        .unwrap();
    assert!(matches!(result, Err(ApiError::Aborted)));
    assert_eq!(env.transport.count(HttpMethod::Get, "/plants"), 1);
}

#[tokio::test]
async fn test_aborted_signal_sends_nothing() {
    let env = ApiTestEnv::new();
    let controller = AbortController::new();
    controller.abort();

    let err = env
        .state
        .plant_api
        .list(Some(controller.signal()))
        .await
        .unwrap_err();

    assert!(err.is_aborted());
    assert!(env.transport.requests().is_empty());
}
