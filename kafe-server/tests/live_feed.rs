//! Live WebSocket feed against a real listener

mod common;

use common::TestApp;
use futures::{SinkExt, StreamExt};
use kafe_server::api::build_app;
use shared::live::{ChangeEvent, LiveClientCommand, LiveServerMessage, decode_server_message};
use shared::models::{CallCreate, CallType, OrderCreate, OrderItem, OrderStatus};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn serve(app: &TestApp) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = build_app().with_state(app.state.clone());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("ws://{addr}")
}

async fn next_message(ws: &mut Ws) -> LiveServerMessage {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for a live frame")
            .expect("stream ended")
            .unwrap();
        if let Message::Text(text) = frame {
            return decode_server_message(&text).unwrap();
        }
    }
}

async fn no_message_within(ws: &mut Ws, wait: Duration) -> bool {
    loop {
        match tokio::time::timeout(wait, ws.next()).await {
            Err(_) => return true,
            Ok(Some(Ok(Message::Text(_)))) => return false,
            Ok(Some(Ok(_))) => continue,
            Ok(_) => return true,
        }
    }
}

fn one_tea(table_no: &str) -> OrderCreate {
    OrderCreate {
        table_no: table_no.to_string(),
        items: vec![OrderItem {
            product_id: 1,
            name: "Çay".into(),
            quantity: 1,
            unit_price: 15.0,
        }],
        total_price: 15.0,
    }
}

#[tokio::test]
async fn test_dashboard_receives_snapshot_then_changes() {
    let app = TestApp::new().await;
    let store = app.create_store("live").await;
    let existing = kafe_server::orders::create(&app.state, store.id, one_tea("1"))
        .await
        .unwrap();
    let base = serve(&app).await;

    let (mut ws, _) = connect_async(format!("{base}/api/stores/{}/live", store.id))
        .await
        .unwrap();

    let LiveServerMessage::Ready { snapshot } = next_message(&mut ws).await else {
        panic!("expected Ready first");
    };
    assert_eq!(snapshot.store.id, store.id);
    assert_eq!(snapshot.orders.len(), 1);
    assert_eq!(snapshot.orders[0].id, existing.id);

    let placed = kafe_server::orders::create(&app.state, store.id, one_tea("2"))
        .await
        .unwrap();
    let LiveServerMessage::Change { envelope } = next_message(&mut ws).await else {
        panic!("expected Change");
    };
    assert_eq!(envelope.seq, snapshot.seq + 1);
    assert!(matches!(envelope.event, ChangeEvent::OrderInserted { ref order } if order.id == placed.id));

    kafe_server::orders::advance(&app.state, store.id, placed.id, OrderStatus::Preparing)
        .await
        .unwrap();
    let LiveServerMessage::Change { envelope } = next_message(&mut ws).await else {
        panic!("expected Change");
    };
    assert!(matches!(
        envelope.event,
        ChangeEvent::OrderUpdated { ref order } if order.status == OrderStatus::Preparing
    ));
}

#[tokio::test]
async fn test_table_scope_filters_other_tables() {
    let app = TestApp::new().await;
    let store = app.create_store("scope").await;
    let base = serve(&app).await;

    let (mut ws, _) = connect_async(format!(
        "{base}/api/stores/{}/live?table_no=5",
        store.id
    ))
    .await
    .unwrap();
    assert!(matches!(
        next_message(&mut ws).await,
        LiveServerMessage::Ready { .. }
    ));

    kafe_server::orders::create(&app.state, store.id, one_tea("4"))
        .await
        .unwrap();
    kafe_server::calls::create(
        &app.state,
        store.id,
        CallCreate {
            table_no: "4".into(),
            call_type: CallType::Waiter,
        },
    )
    .await
    .unwrap();
    assert!(no_message_within(&mut ws, Duration::from_millis(300)).await);

    let mine = kafe_server::orders::create(&app.state, store.id, one_tea("5"))
        .await
        .unwrap();
    let LiveServerMessage::Change { envelope } = next_message(&mut ws).await else {
        panic!("expected Change");
    };
    assert_eq!(envelope.event.table_no(), Some("5"));
    assert!(matches!(envelope.event, ChangeEvent::OrderInserted { ref order } if order.id == mine.id));

    kafe_server::settlement::settle_table(&app.state, store.id, "5")
        .await
        .unwrap();
    let LiveServerMessage::Change { envelope } = next_message(&mut ws).await else {
        panic!("expected Change");
    };
    assert!(matches!(
        envelope.event,
        ChangeEvent::OrderUpdated { ref order } if order.status == OrderStatus::Paid
    ));
}

#[tokio::test]
async fn test_resync_sends_fresh_snapshot() {
    let app = TestApp::new().await;
    let store = app.create_store("resync").await;
    let base = serve(&app).await;

    let (mut ws, _) = connect_async(format!("{base}/api/stores/{}/live", store.id))
        .await
        .unwrap();
    let LiveServerMessage::Ready { snapshot } = next_message(&mut ws).await else {
        panic!("expected Ready first");
    };
    assert!(snapshot.orders.is_empty());

    let placed = kafe_server::orders::create(&app.state, store.id, one_tea("1"))
        .await
        .unwrap();
    assert!(matches!(
        next_message(&mut ws).await,
        LiveServerMessage::Change { .. }
    ));

    let command = serde_json::to_string(&LiveClientCommand::Resync).unwrap();
    ws.send(Message::Text(command.into())).await.unwrap();

    let LiveServerMessage::Ready { snapshot } = next_message(&mut ws).await else {
        panic!("expected Ready after resync");
    };
    assert_eq!(snapshot.orders.len(), 1);
    assert_eq!(snapshot.orders[0].id, placed.id);
}

#[tokio::test]
async fn test_unknown_store_is_rejected_before_upgrade() {
    let app = TestApp::new().await;
    let base = serve(&app).await;
    assert!(connect_async(format!("{base}/api/stores/404/live")).await.is_err());
}
