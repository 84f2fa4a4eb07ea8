//! Integration tests against a mock status API

use mockito::{Matcher, Server};
use paybutton::{
    ButtonOptions, EventKind, HeadlessHost, PayButtonError, StatusClient, StatusSource, Widget,
    WidgetConfig,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_fetch_status_sends_token_header() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/transaction/ref/order-55")
        .match_header("authorization", "Bearer tok_live_55")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "accepted": false,
                "status": "pending",
                "amount": "0.00042",
                "id": "tx-55"
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let client = StatusClient::new(server.url()).unwrap();
    let status = client.fetch_status("order-55", "tok_live_55").await.unwrap();

    assert!(!status.accepted);
    assert_eq!(status.status.as_deref(), Some("pending"));
    assert_eq!(status.id.as_deref(), Some("tx-55"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_status_encodes_reference() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock(
            "GET",
            Matcher::Regex(r"^/transaction/ref/invoice(%20| )42$".to_string()),
        )
        .with_status(200)
        .with_body(json!({ "accepted": true }).to_string())
        .create_async()
        .await;

    let client = StatusClient::new(server.url()).unwrap();
    let status = client.fetch_status("invoice 42", "tok").await.unwrap();

    assert!(status.accepted);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_status_error_status() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", Matcher::Regex(r"^/transaction/ref/.*$".to_string()))
        .with_status(401)
        .with_body(json!({ "error": "invalid embed token" }).to_string())
        .create_async()
        .await;

    let client = StatusClient::new(server.url()).unwrap();
    let result = client.fetch_status("order-1", "bad").await;

    assert!(matches!(
        result,
        Err(PayButtonError::StatusRequest { status: 401 })
    ));
}

#[tokio::test]
async fn test_fetch_status_rejects_body_without_flag() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/transaction/ref/order-1")
        .with_status(200)
        .with_body(json!({ "status": "pending" }).to_string())
        .create_async()
        .await;

    let client = StatusClient::new(server.url()).unwrap();
    let result = client.fetch_status("order-1", "tok").await;

    assert!(matches!(result, Err(PayButtonError::Http(_))));
}

#[tokio::test]
async fn test_widget_end_to_end_acceptance() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/transaction/ref/e2e-1")
        .match_header("authorization", "Bearer tok_e2e")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "accepted": true,
                "id": "tx-e2e",
                "status": "confirmed",
                "redirectUrl": "https://shop.example/receipt"
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let config = WidgetConfig::default()
        .with_checkout_url("https://checkout.test")
        .with_status_url(server.url());
    let widget = Widget::new(config).unwrap();
    let host = Arc::new(HeadlessHost::new());

    let button = widget
        .create(
            ButtonOptions::new("tok_e2e")
                .with_btc("0.0005")
                .with_reference("e2e-1"),
            host.clone(),
        )
        .unwrap();

    let mut events = button.subscribe();
    button.activate().unwrap();

    let accepted = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let event = events.recv().await.unwrap();
            if event.kind == EventKind::PaymentAccepted {
                return event;
            }
        }
    })
    .await
    .expect("payment accepted in time");

    let detail = accepted.detail.unwrap();
    assert_eq!(detail.id.as_deref(), Some("tx-e2e"));
    assert_eq!(host.navigations(), vec!["https://shop.example/receipt"]);
    assert!(host
        .overlay()
        .unwrap()
        .frame_url
        .as_str()
        .starts_with("https://checkout.test/checkout/"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_widget_survives_unreachable_status_api() {
    let config = WidgetConfig::default()
        .with_status_url("http://127.0.0.1:9")
        .with_request_timeout(Duration::from_secs(1));
    let widget = Widget::new(config).unwrap();
    let host = Arc::new(HeadlessHost::new());

    let button = widget
        .create(ButtonOptions::new("tok").with_usd("5"), host.clone())
        .unwrap();
    button.open().unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(button.is_open());
    assert!(button.is_polling());
    assert!(button.transaction().is_none());
}

#[tokio::test]
async fn test_widget_accepts_loosely_typed_status_body() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/transaction/ref/loose-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "accepted": true,
                "id": 12345,
                "transactionId": "tx-loose",
                "amount": "0.5 BTC"
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let config = WidgetConfig::default().with_status_url(server.url());
    let widget = Widget::new(config).unwrap();
    let host = Arc::new(HeadlessHost::new());

    let button = widget
        .create(
            ButtonOptions::new("tok_loose")
                .with_usd("12")
                .with_reference("loose-1")
                .with_redirect_url("https://shop.example/done"),
            host.clone(),
        )
        .unwrap();

    let mut events = button.subscribe();
    button.open().unwrap();

    let accepted = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let event = events.recv().await.unwrap();
            if event.kind == EventKind::PaymentAccepted {
                return event;
            }
        }
    })
    .await
    .expect("payment accepted in time");

    let detail = accepted.detail.unwrap();
    assert_eq!(detail.id.as_deref(), Some("12345"));
    assert_eq!(detail.amount, None);
    assert!(button.is_accepted());
    assert_eq!(host.navigations(), vec!["https://shop.example/done"]);
    mock.assert_async().await;
}
