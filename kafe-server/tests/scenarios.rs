//! End-to-end ordering scenarios at the service layer

mod common;

use common::TestApp;
use kafe_server::{calls, orders, settlement, tables};
use shared::live::{ChangeEvent, SubscriptionScope};
use shared::models::{
    CallCreate, CallType, EntryParams, OrderCreate, OrderItem, OrderStatus, TableAccess,
};

fn order(table_no: &str, unit_price: f64) -> OrderCreate {
    OrderCreate {
        table_no: table_no.to_string(),
        items: vec![OrderItem {
            product_id: 1,
            name: "Latte".into(),
            quantity: 1,
            unit_price,
        }],
        total_price: unit_price,
    }
}

fn table_scope(store_id: i64, table_no: &str) -> SubscriptionScope {
    SubscriptionScope::Table {
        store_id,
        table_no: table_no.to_string(),
    }
}

#[tokio::test]
async fn test_observed_statuses_never_decrease() {
    let app = TestApp::new().await;
    let store = app.create_store("mono").await;
    let mut rx = app.state.hub.subscribe(store.id);

    let placed = orders::create(&app.state, store.id, order("1", 50.0))
        .await
        .unwrap();
    for target in [
        OrderStatus::Done,
        OrderStatus::Preparing,
        OrderStatus::Preparing,
        OrderStatus::Done,
    ] {
        orders::advance(&app.state, store.id, placed.id, target)
            .await
            .unwrap();
    }
    settlement::settle_table(&app.state, store.id, "1")
        .await
        .unwrap();
    orders::advance(&app.state, store.id, placed.id, OrderStatus::Done)
        .await
        .unwrap();

    let mut observed = Vec::new();
    while let Ok(envelope) = rx.try_recv() {
        match envelope.event {
            ChangeEvent::OrderInserted { order } | ChangeEvent::OrderUpdated { order } => {
                observed.push(order.status)
            }
            _ => {}
        }
    }
    assert_eq!(
        observed,
        vec![OrderStatus::New, OrderStatus::Done, OrderStatus::Paid]
    );
    assert!(observed.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_paid_orders_leave_every_live_view() {
    let app = TestApp::new().await;
    let store = app.create_store("term").await;
    let placed = orders::create(&app.state, store.id, order("3", 20.0))
        .await
        .unwrap();
    settlement::settle_table(&app.state, store.id, "3")
        .await
        .unwrap();

    // a late advance must not bring it back
    let late = orders::advance(&app.state, store.id, placed.id, OrderStatus::Done)
        .await
        .unwrap();
    assert!(!late.changed);
    assert_eq!(late.order.status, OrderStatus::Paid);

    let kitchen = orders::list_live(
        &app.state.pool,
        &SubscriptionScope::Dashboard { store_id: store.id },
    )
    .await
    .unwrap();
    assert!(kitchen.is_empty());
    let mine = orders::list_live(&app.state.pool, &table_scope(store.id, "3"))
        .await
        .unwrap();
    assert!(mine.is_empty());
}

#[tokio::test]
async fn test_settle_table_four() {
    let app = TestApp::new().await;
    let store = app.create_store("four").await;

    let fresh = orders::create(&app.state, store.id, order("4", 10.0))
        .await
        .unwrap();
    let served = orders::create(&app.state, store.id, order("4", 30.0))
        .await
        .unwrap();
    orders::advance(&app.state, store.id, served.id, OrderStatus::Done)
        .await
        .unwrap();
    let waiter = calls::create(
        &app.state,
        store.id,
        CallCreate {
            table_no: "4".into(),
            call_type: CallType::Waiter,
        },
    )
    .await
    .unwrap();

    let report = settlement::settle_table(&app.state, store.id, "4")
        .await
        .unwrap();
    assert_eq!(report.settled_orders.len(), 2);
    assert!(report.settled_orders.contains(&fresh.id));
    assert!(report.settled_orders.contains(&served.id));
    assert_eq!(report.dismissed_calls, vec![waiter.id]);

    let kitchen = orders::list_live(
        &app.state.pool,
        &SubscriptionScope::Dashboard { store_id: store.id },
    )
    .await
    .unwrap();
    assert!(kitchen.iter().all(|o| o.table_no != "4"));
    let active_calls = calls::list_active(&app.state.pool, &table_scope(store.id, "4"))
        .await
        .unwrap();
    assert!(active_calls.is_empty());
}

#[tokio::test]
async fn test_rotated_token_resolves_unresolved() {
    let app = TestApp::new().await;
    let store = app.create_store("seven").await;

    let token_a = tables::rotate_table(&app.state, store.id, "7")
        .await
        .unwrap()
        .qr_token;
    let token_b = tables::rotate_table(&app.state, store.id, "7")
        .await
        .unwrap()
        .qr_token;
    assert_ne!(token_a, token_b);

    let with_a = tables::enter(
        &app.state,
        "seven",
        &EntryParams {
            t: Some(token_a),
            table: None,
        },
    )
    .await
    .unwrap();
    assert!(matches!(with_a.table, TableAccess::Unresolved { .. }));

    let with_b = tables::enter(
        &app.state,
        "seven",
        &EntryParams {
            t: Some(token_b),
            table: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(with_b.table.table_no(), Some("7"));
}

#[tokio::test]
async fn test_concurrent_tables_see_only_their_orders() {
    let app = TestApp::new().await;
    let store = app.create_store("pair").await;

    let (two, five) = tokio::join!(
        orders::create(&app.state, store.id, order("2", 40.0)),
        orders::create(&app.state, store.id, order("5", 55.0)),
    );
    let (two, five) = (two.unwrap(), five.unwrap());

    let mine_two = orders::list_live(&app.state.pool, &table_scope(store.id, "2"))
        .await
        .unwrap();
    let mine_five = orders::list_live(&app.state.pool, &table_scope(store.id, "5"))
        .await
        .unwrap();
    assert_eq!(mine_two.iter().map(|o| o.id).collect::<Vec<_>>(), vec![two.id]);
    assert_eq!(mine_five.iter().map(|o| o.id).collect::<Vec<_>>(), vec![five.id]);
}

#[tokio::test]
async fn test_double_advance_to_preparing() {
    let app = TestApp::new().await;
    let store = app.create_store("idem").await;
    let placed = orders::create(&app.state, store.id, order("1", 12.0))
        .await
        .unwrap();
    let mut rx = app.state.hub.subscribe(store.id);

    let first = orders::advance(&app.state, store.id, placed.id, OrderStatus::Preparing)
        .await
        .unwrap();
    let second = orders::advance(&app.state, store.id, placed.id, OrderStatus::Preparing)
        .await
        .unwrap();
    assert!(first.changed);
    assert!(!second.changed);
    assert_eq!(second.order.status, OrderStatus::Preparing);

    // exactly one notification
    assert!(rx.try_recv().is_ok());
    assert!(rx.try_recv().is_err());
}
