//! Integration tests for common push relay workflows.
//!
//! These tests drive the public facade the way an application would.

use pushrelay::prelude::*;
use pushrelay::testing::MockTransport;
use pushrelay::{Callback, Value, codes, json};
use std::time::Duration;

async fn configured(transport: &MockTransport) -> PushClient {
    let client = PushClient::new(transport.connector());
    client.configure(ClientConfig::default()).await.unwrap();
    client
}

// =============================================================================
// Provision / Notify / Feedback
// =============================================================================

#[tokio::test]
async fn test_provision_then_notify_then_feedback() {
    let transport = MockTransport::new()
        .respond("provision", json!(null))
        .respond("notify", json!(null))
        .respond(
            "feedback",
            json!([["20240115T10:30:00", "aabbccdd"], ["20240116T08:00:00", "eeff0011"]]),
        );
    let client = configured(&transport).await;

    client
        .provision(ProvisionArgs::new("cf", "/path/cert.pem", Environment::Production, 15))
        .await
        .unwrap();
    client
        .notify(NotifyArgs::single(
            "cf",
            "aabb ccdd",
            Notification::new("Build finished").badge(3).extra("build", 42),
        ))
        .await
        .unwrap();
    let inactive = client.feedback_entries(FeedbackArgs::new("cf")).await.unwrap();

    let methods: Vec<String> = transport.calls().into_iter().map(|c| c.method).collect();
    assert_eq!(methods, ["provision", "notify", "feedback"]);

    let notify = &transport.calls_to("notify")[0];
    assert_eq!(notify.args[1], json!("aabbccdd"));
    assert_eq!(
        notify.args[2],
        json!({"aps": {"alert": "Build finished", "badge": 3}, "build": 42})
    );

    assert_eq!(inactive.len(), 2);
    assert_eq!(inactive[1].token, "eeff0011");
}

#[tokio::test]
async fn test_loose_notification_reaches_relay_without_nulls() {
    let transport = MockTransport::new();
    let client = configured(&transport).await;

    client
        .notify(json!({
            "app_id": "cf",
            "tokens": "tok1",
            "notifications": {"alert": "hi", "badge": null},
        }))
        .await
        .unwrap();

    let call = &transport.calls_to("notify")[0];
    assert_eq!(call.args, vec![json!("cf"), json!("tok1"), json!({"aps": {"alert": "hi"}})]);
}

#[test]
fn test_blocking_caller() {
    let transport = MockTransport::new().respond("provision", json!(true));
    let client = PushClient::new(transport.connector());

    let result = tokio_test::block_on(async {
        client.configure(ClientConfig::default()).await?;
        client
            .provision(vec![json!("cf"), json!("/c.pem"), json!("sandbox"), json!(15)])
            .await
    });

    assert_eq!(tokio_test::assert_ok!(result), json!(true));
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn test_relay_faults_map_to_domain_errors() {
    let cases = [
        (codes::UNKNOWN_APP_ID, PushError::UnknownAppId("gone".into())),
        (codes::INVALID_ENVIRONMENT, PushError::InvalidEnvironment("gone".into())),
        (codes::SERVER_TIMEOUT, PushError::ServerTimeout("gone".into())),
    ];

    for (code, expected) in cases {
        let transport = MockTransport::new().fault("feedback", code, "gone");
        let client = configured(&transport).await;

        let err = client.feedback("cf").await.unwrap_err();
        assert!(err.is_domain_error());
        assert_eq!(err, expected);
    }
}

#[tokio::test]
async fn test_unknown_fault_is_preserved() {
    let transport = MockTransport::new().fault("notify", 418, "teapot");
    let client = configured(&transport).await;

    let err = client
        .notify(NotifyArgs::single("cf", "tok", Notification::new("hi")))
        .await
        .unwrap_err();

    assert!(!err.is_domain_error());
    assert_eq!(err.fault_code(), Some(418));
    assert_eq!(
        err,
        PushError::Fault {
            code: 418,
            message: "teapot".into()
        }
    );
}

#[tokio::test]
async fn test_missing_fields_rejected_before_relay() {
    let transport = MockTransport::new();
    let client = configured(&transport).await;

    let err = client
        .provision(json!({"app_id": "cf", "cert": null, "env": "sandbox"}))
        .await
        .unwrap_err();

    assert!(matches!(err, PushError::InvalidArguments { operation: "provision", .. }));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_calls_before_configure_fail() {
    let transport = MockTransport::new();
    let client = PushClient::new(transport.connector());

    let err = client.feedback("cf").await.unwrap_err();
    assert!(matches!(err, PushError::NotConfigured(_)));
    assert_eq!(transport.connect_count(), 0);
    assert_eq!(transport.call_count(), 0);
}

// =============================================================================
// Configuration
// =============================================================================

#[tokio::test]
async fn test_configure_from_options_with_initial_apps() {
    let transport = MockTransport::new();
    let client = PushClient::new(transport.connector());

    let config = ClientConfig::from_options(json!({
        "HOST": "relay.internal",
        "Port": 8088,
        "initial": [{"APP_ID": "cf", "CERT": "/cf.pem", "ENV": "sandbox"}],
    }))
    .unwrap();
    client.configure(config).await.unwrap();

    let config = client.config().unwrap();
    assert_eq!(config.url(), "http://relay.internal:8088/");
    assert_eq!(config.timeout, Duration::from_secs(15));
    assert_eq!(
        transport.calls_to("provision")[0].args,
        vec![json!("cf"), json!("/cf.pem"), json!("sandbox"), json!(15)]
    );
}

// =============================================================================
// Background dispatch
// =============================================================================

#[tokio::test]
async fn test_background_notify_reports_outcome() {
    let transport = MockTransport::new().fault("notify", codes::SERVER_TIMEOUT, "upstream slow");
    let client = configured(&transport).await;
    let (tx, rx) = tokio::sync::oneshot::channel();

    let handle = client
        .notify_with(
            NotifyArgs::single("cf", "tok", Notification::new("hi")),
            move |result| {
                let _ = tx.send(result);
            },
        )
        .unwrap();
    handle.await.unwrap();

    let result = rx.await.unwrap();
    assert_eq!(result, Err(PushError::ServerTimeout("upstream slow".into())));
}

#[tokio::test]
async fn test_dispatch_with_callback_spawns() {
    let transport = MockTransport::new().respond("feedback", json!([]));
    let client = configured(&transport).await;
    let (tx, rx) = tokio::sync::oneshot::channel();

    let callback: Callback = Box::new(move |result: Result<Value>| {
        let _ = tx.send(result);
    });

    let dispatch = client
        .dispatch(Operation::Feedback, CallArgs::from("cf"), Some(callback))
        .await
        .unwrap();
    assert!(matches!(dispatch, Dispatch::Spawned(_)));

    let result = tokio::time::timeout(Duration::from_secs(1), rx)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.unwrap(), json!([]));
}
