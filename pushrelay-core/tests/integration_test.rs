//! Integration tests for pushrelay-core

use pushrelay_core::testing::MockTransport;
use pushrelay_core::*;
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn test_configure_is_idempotent() {
    let transport = MockTransport::new();
    let client = PushClient::new(transport.connector());
    assert!(!client.is_configured());

    let first = ClientConfig::builder().host("first").port(1000).build();
    let second = ClientConfig::builder().host("second").port(2000).build();

    client.configure(first.clone()).await.unwrap();
    client.configure(second).await.unwrap();

    assert!(client.is_configured());
    assert_eq!(client.config(), Some(&first));
    assert_eq!(transport.connect_count(), 1);
}

#[tokio::test]
async fn test_concurrent_first_configure_connects_once() {
    let transport = MockTransport::new();
    let client = PushClient::new(transport.connector());

    let mut handles = Vec::new();
    for port in 0..16u16 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            let config = ClientConfig::builder().port(9000 + port).build();
            client.configure(config).await.map(|_| ())
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert!(client.is_configured());
    assert_eq!(transport.connect_count(), 1);
}

#[tokio::test]
async fn test_initial_apps_provisioned_in_order() {
    let transport = MockTransport::new();
    let client = PushClient::with_transport(transport.clone());

    let config = ClientConfig::from_options(json!({
        "initial": [
            {"app_id": "one", "cert": "/one.pem", "env": "sandbox"},
            {"app_id": "two", "cert": "/two.pem", "environment": "production", "timeout": 30},
        ]
    }))
    .unwrap();
    client.configure(config).await.unwrap();

    let calls = transport.calls_to("provision");
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[0].args,
        vec![json!("one"), json!("/one.pem"), json!("sandbox"), json!(15)]
    );
    assert_eq!(
        calls[1].args,
        vec![json!("two"), json!("/two.pem"), json!("production"), json!(30)]
    );
}

#[tokio::test]
async fn test_initial_provision_failure_aborts_configuration() {
    let transport = MockTransport::new().fault("provision", 401, "certificate mismatch");
    let client = PushClient::with_transport(transport.clone());

    let config = ClientConfig::builder()
        .initial(InitialApp::new("one", "/one.pem", "sandbox"))
        .initial(InitialApp::new("two", "/two.pem", "sandbox"))
        .build();

    let err = client.configure(config).await.unwrap_err();
    assert_eq!(err, PushError::InvalidEnvironment("certificate mismatch".into()));
    assert!(!client.is_configured());
    assert_eq!(transport.calls_to("provision").len(), 1);

    let err = client.feedback("one").await.unwrap_err();
    assert!(matches!(err, PushError::NotConfigured(_)));
}

#[tokio::test]
async fn test_connector_failure_leaves_client_unconfigured() {
    let client = PushClient::new(|_: &ClientConfig| -> Result<std::sync::Arc<dyn Transport>> {
        Err(PushError::Config("relay unreachable".into()))
    });

    let err = client.configure(ClientConfig::default()).await.unwrap_err();
    assert_eq!(err, PushError::Config("relay unreachable".into()));
    assert!(!client.is_configured());
}

#[tokio::test]
async fn test_named_and_positional_reach_transport_identically() {
    let transport = MockTransport::new();
    let client = PushClient::with_transport(transport.clone());
    client.configure(ClientConfig::default()).await.unwrap();

    client
        .provision(json!({"app_id": "cf", "cert": "c.pem", "env": "sandbox", "timeout": 15}))
        .await
        .unwrap();
    client
        .provision(vec![json!("cf"), json!("c.pem"), json!("sandbox"), json!(15)])
        .await
        .unwrap();
    client
        .provision(ProvisionArgs::new("cf", "c.pem", Environment::Sandbox, 15))
        .await
        .unwrap();

    let calls = transport.calls_to("provision");
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0], calls[1]);
    assert_eq!(calls[1], calls[2]);
}

#[tokio::test]
async fn test_notify_batch() {
    let transport = MockTransport::new();
    let client = PushClient::with_transport(transport.clone());
    client.configure(ClientConfig::default()).await.unwrap();

    client
        .notify(NotifyArgs::batch(
            "cf",
            ["aa bb", "cc dd"],
            [
                Notification::new("first").badge(1),
                Notification::new("second").sound("chime"),
            ],
        ))
        .await
        .unwrap();

    let calls = transport.calls_to("notify");
    assert_eq!(
        calls[0].args,
        vec![
            json!("cf"),
            json!(["aabb", "ccdd"]),
            json!([
                {"aps": {"alert": "first", "badge": 1}},
                {"aps": {"alert": "second", "sound": "chime"}},
            ]),
        ]
    );
}

#[tokio::test]
async fn test_notify_sends_the_encoded_notification() {
    let transport = MockTransport::new();
    let client = PushClient::with_transport(transport.clone());
    client.configure(ClientConfig::default()).await.unwrap();

    let notes = [
        Notification::new("hi").extra("sound", "bell"),
        Notification::default().extra("alert", "meta"),
        Notification::new("hi").badge(2).extra("thread", json!({"id": 7, "gone": null})),
    ];
    for note in &notes {
        client
            .notify(NotifyArgs::single("cf", "tok", note.clone()))
            .await
            .unwrap();
    }

    let calls = transport.calls_to("notify");
    assert_eq!(calls.len(), notes.len());
    for (call, note) in calls.iter().zip(&notes) {
        assert_eq!(call.args[2], note.encode().unwrap());
    }
    assert_eq!(calls[1].args[2], json!({"aps": {"alert": "meta"}}));
}

#[tokio::test]
async fn test_lone_bundle_in_positional_list() {
    let transport = MockTransport::new();
    let client = PushClient::with_transport(transport.clone());
    client.configure(ClientConfig::default()).await.unwrap();

    client
        .feedback(vec![json!({"app_id": "cf"})])
        .await
        .unwrap();

    assert_eq!(transport.calls_to("feedback")[0].args, vec![json!("cf")]);
}

#[tokio::test]
async fn test_server_timeout() {
    let transport = MockTransport::new().fault("notify", 500, "apple did not answer");
    let client = PushClient::with_transport(transport);
    client.configure(ClientConfig::default()).await.unwrap();

    let err = client
        .notify(NotifyArgs::single("cf", "tok", Notification::new("hi")))
        .await
        .unwrap_err();
    assert_eq!(err, PushError::ServerTimeout("apple did not answer".into()));
}

#[tokio::test]
async fn test_transport_failure_is_not_a_fault() {
    let transport = MockTransport::new().fail(
        "feedback",
        TransportError::Connection("connection refused".into()),
    );
    let client = PushClient::with_transport(transport);
    client.configure(ClientConfig::default()).await.unwrap();

    let err = client.feedback("cf").await.unwrap_err();
    assert!(matches!(err, PushError::Transport(_)));
    assert_eq!(err.fault_code(), None);
}

#[tokio::test]
async fn test_background_calls_do_not_block() {
    let transport = MockTransport::new().respond("notify", json!(null));
    let client = PushClient::with_transport(transport.clone());
    client.configure(ClientConfig::default()).await.unwrap();

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    for i in 0..5 {
        let tx = tx.clone();
        client
            .notify_with(
                json!({"app_id": "cf", "token": format!("tok{i}"), "notification": {"alert": "x"}}),
                move |result| {
                    let _ = tx.send(result);
                },
            )
            .unwrap();
    }
    drop(tx);

    let mut delivered = 0;
    while let Ok(Some(result)) = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await {
        assert_eq!(result.unwrap(), json!(null));
        delivered += 1;
    }
    assert_eq!(delivered, 5);
    assert_eq!(transport.calls_to("notify").len(), 5);
}
