mod support;

use std::{
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use pharmacy_engine::{
    db_types::{OrderStatusType, PaymentStatusType},
    events::{EventHandlers, EventHooks, EventProducers},
    order_objects::{OrderItemRequest, OrderRequest},
    payment_objects::{PaymentIntentRequest, PaymentVerificationRequest},
    traits::{PaymentGatewayError, PharmacyDatabase, RemotePaymentStatus},
    OrderFlowApi,
    PaymentFlowApi,
    PaymentFlowError,
    SqliteDatabase,
};
use pharmacy_engine::{api::payment_flow_api::INVALID_SIGNATURE_CODE, test_utils::mock_provider::MockPaymentProvider};
use ppg_common::Rupees;
use support::{new_db, new_provider, seed_medicine, seed_user, KEY_ID};

async fn checkout_fixture(db: &SqliteDatabase) -> (i64, Rupees) {
    seed_user(db, "alice@example.com", "Alice").await;
    let medicine = seed_medicine(db, "Paracetamol 500mg", 12_500, 10).await;
    let orders = OrderFlowApi::new(db.clone(), EventProducers::default());
    let request = OrderRequest {
        items: vec![OrderItemRequest { medicine_id: medicine.id, quantity: 2 }],
        shipping_address: "12 MG Road, Bengaluru".to_string(),
        payment_method: "razorpay".to_string(),
    };
    let order = orders.create_order("alice@example.com", request).await.expect("Error creating order");
    (order.id, order.total_amount)
}

fn intent_request(order_id: i64, amount: Rupees) -> PaymentIntentRequest {
    PaymentIntentRequest {
        order_id,
        amount,
        currency: "INR".to_string(),
        receipt: Some("rcpt-001".to_string()),
        note: Some("deliver after 6pm".to_string()),
    }
}

#[tokio::test]
async fn intent_sends_minor_units_to_the_gateway() {
    let db = new_db().await;
    let provider = new_provider();
    let (order_id, total) = checkout_fixture(&db).await;
    assert_eq!(total, Rupees::from_paise(25_000));
    let api = PaymentFlowApi::new(db.clone(), provider.clone(), EventProducers::default());

    let result = api.create_payment_intent("alice@example.com", intent_request(order_id, total)).await.unwrap();

    // 250.00 INR crosses the wire as 25000 paise
    let sent = provider.created_orders();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].amount, 25_000);
    assert_eq!(sent[0].currency, "INR");
    assert_eq!(result.status, "created");
    assert_eq!(result.key_id, KEY_ID);
    assert!(result.gateway_order_id.starts_with("order_mock"));

    let payment = db.fetch_payment_by_gateway_order_id(&result.gateway_order_id).await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatusType::Created);
    assert_eq!(payment.amount, total);
    assert_eq!(payment.receipt.as_deref(), Some("rcpt-001"));
}

#[tokio::test]
async fn intent_for_missing_order_fails() {
    let db = new_db().await;
    seed_user(&db, "alice@example.com", "Alice").await;
    let api = PaymentFlowApi::new(db, new_provider(), EventProducers::default());

    let err = api.create_payment_intent("alice@example.com", intent_request(42, Rupees::from_paise(100))).await.unwrap_err();
    assert!(matches!(err, PaymentFlowError::DatabaseError(PaymentGatewayError::OrderNotFound(42))));
}

#[tokio::test]
async fn intent_amount_must_match_the_order_total() {
    let db = new_db().await;
    let provider = new_provider();
    let (order_id, _) = checkout_fixture(&db).await;
    let api = PaymentFlowApi::new(db, provider, EventProducers::default());

    let err =
        api.create_payment_intent("alice@example.com", intent_request(order_id, Rupees::from_paise(1))).await.unwrap_err();
    assert!(matches!(err, PaymentFlowError::AmountMismatch { .. }));
}

#[tokio::test]
async fn gateway_failure_aborts_the_intent() {
    let db = new_db().await;
    let provider = new_provider();
    let (order_id, total) = checkout_fixture(&db).await;
    provider.fail_next_create("upstream maintenance window");
    let api = PaymentFlowApi::new(db.clone(), provider, EventProducers::default());

    let err = api.create_payment_intent("alice@example.com", intent_request(order_id, total)).await.unwrap_err();
    match err {
        PaymentFlowError::GatewayError(message) => assert!(message.contains("upstream maintenance window")),
        e => panic!("Expected GatewayError, got {e}"),
    }
    // no payment row was persisted for the failed intent
    assert!(db.fetch_first_payment_for_order(order_id).await.unwrap().is_none());
}

#[tokio::test]
async fn intent_reassigns_a_mismatched_order_owner() {
    let db = new_db().await;
    let provider = new_provider();
    let (order_id, total) = checkout_fixture(&db).await;
    let bob = seed_user(&db, "bob@example.com", "Bob").await;

    let reconciliations = Arc::new(AtomicU64::new(0));
    let counter = reconciliations.clone();
    let mut hooks = EventHooks::default();
    hooks.on_ownership_reconciled(move |_| {
        let counter = counter.clone();
        Box::pin(async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    let handlers = EventHandlers::new(8, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;

    let api = PaymentFlowApi::new(db.clone(), provider, producers);
    api.create_payment_intent("bob@example.com", intent_request(order_id, total)).await.unwrap();

    let (order, _) = db.fetch_order_by_id(order_id).await.unwrap().unwrap();
    assert_eq!(order.user_id, bob.id);
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    assert_eq!(reconciliations.load(Ordering::SeqCst), 1);
}

async fn verified_checkout(
    db: &SqliteDatabase,
    provider: &MockPaymentProvider,
) -> (PaymentFlowApi<SqliteDatabase, MockPaymentProvider>, i64, String) {
    let (order_id, total) = checkout_fixture(db).await;
    let api = PaymentFlowApi::new(db.clone(), provider.clone(), EventProducers::default());
    let intent = api.create_payment_intent("alice@example.com", intent_request(order_id, total)).await.unwrap();
    (api, order_id, intent.gateway_order_id)
}

#[tokio::test]
async fn verify_completes_payment_and_order_on_captured() {
    let db = new_db().await;
    let provider = new_provider();
    let (api, order_id, gateway_order_id) = verified_checkout(&db, &provider).await;

    let request = PaymentVerificationRequest {
        order_id,
        gateway_order_id: gateway_order_id.clone(),
        gateway_payment_id: "pay_29QQoUBi66xm2f".to_string(),
        signature: provider.sign(&gateway_order_id, "pay_29QQoUBi66xm2f"),
    };
    let result = api.verify_payment("alice@example.com", request).await.unwrap();

    assert_eq!(result.status, PaymentStatusType::Completed);
    assert_eq!(result.gateway_payment_id.as_deref(), Some("pay_29QQoUBi66xm2f"));
    assert_eq!(result.payment_method.as_deref(), Some("card"));
    let (order, _) = db.fetch_order_by_id(order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatusType::Completed);
}

#[tokio::test]
async fn tampered_signature_fails_payment_regardless_of_remote_status() {
    let db = new_db().await;
    let provider = new_provider();
    let (api, order_id, gateway_order_id) = verified_checkout(&db, &provider).await;

    // the gateway would report "captured" for this payment, but the signature does not check out
    let request = PaymentVerificationRequest {
        order_id,
        gateway_order_id: gateway_order_id.clone(),
        gateway_payment_id: "pay_29QQoUBi66xm2f".to_string(),
        signature: "forged-signature".to_string(),
    };
    let result = api.verify_payment("alice@example.com", request).await.unwrap();

    assert_eq!(result.status, PaymentStatusType::Failed);
    let payment = db.fetch_payment_by_gateway_order_id(&gateway_order_id).await.unwrap().unwrap();
    assert_eq!(payment.error_code.as_deref(), Some(INVALID_SIGNATURE_CODE));
    let (order, _) = db.fetch_order_by_id(order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatusType::PaymentFailed);
}

#[tokio::test]
async fn uncaptured_remote_payment_stays_processing() {
    let db = new_db().await;
    let provider = new_provider();
    let (api, order_id, gateway_order_id) = verified_checkout(&db, &provider).await;
    provider.set_remote_status("pay_auth01", RemotePaymentStatus::Authorized);

    let request = PaymentVerificationRequest {
        order_id,
        gateway_order_id: gateway_order_id.clone(),
        gateway_payment_id: "pay_auth01".to_string(),
        signature: provider.sign(&gateway_order_id, "pay_auth01"),
    };
    let result = api.verify_payment("alice@example.com", request).await.unwrap();

    assert_eq!(result.status, PaymentStatusType::Processing);
    let (order, _) = db.fetch_order_by_id(order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatusType::Processing);
}

#[tokio::test]
async fn unreachable_gateway_falls_back_to_signature_only() {
    let db = new_db().await;
    let provider = new_provider();
    let (api, order_id, gateway_order_id) = verified_checkout(&db, &provider).await;
    provider.set_offline(true);

    let request = PaymentVerificationRequest {
        order_id,
        gateway_order_id: gateway_order_id.clone(),
        gateway_payment_id: "pay_29QQoUBi66xm2f".to_string(),
        signature: provider.sign(&gateway_order_id, "pay_29QQoUBi66xm2f"),
    };
    let result = api.verify_payment("alice@example.com", request).await.unwrap();

    // degraded-trust fallback: valid signature settles the payment even though the gateway is unreachable
    assert_eq!(result.status, PaymentStatusType::Completed);
    let (order, _) = db.fetch_order_by_id(order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatusType::Completed);
}

#[tokio::test]
async fn unreachable_gateway_still_rejects_bad_signatures() {
    let db = new_db().await;
    let provider = new_provider();
    let (api, order_id, gateway_order_id) = verified_checkout(&db, &provider).await;
    provider.set_offline(true);

    let request = PaymentVerificationRequest {
        order_id,
        gateway_order_id: gateway_order_id.clone(),
        gateway_payment_id: "pay_29QQoUBi66xm2f".to_string(),
        signature: "forged-signature".to_string(),
    };
    let result = api.verify_payment("alice@example.com", request).await.unwrap();

    assert_eq!(result.status, PaymentStatusType::Failed);
    let (order, _) = db.fetch_order_by_id(order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatusType::PaymentFailed);
}

#[tokio::test]
async fn repeated_verification_is_idempotent() {
    let db = new_db().await;
    let provider = new_provider();
    let (api, order_id, gateway_order_id) = verified_checkout(&db, &provider).await;

    let request = PaymentVerificationRequest {
        order_id,
        gateway_order_id: gateway_order_id.clone(),
        gateway_payment_id: "pay_29QQoUBi66xm2f".to_string(),
        signature: provider.sign(&gateway_order_id, "pay_29QQoUBi66xm2f"),
    };
    let first = api.verify_payment("alice@example.com", request.clone()).await.unwrap();
    assert_eq!(first.status, PaymentStatusType::Completed);
    let settled = db.fetch_payment_by_gateway_order_id(&gateway_order_id).await.unwrap().unwrap();

    let second = api.verify_payment("alice@example.com", request).await.unwrap();
    assert_eq!(second.status, PaymentStatusType::Completed);
    assert_eq!(second.payment_id, first.payment_id);
    // the stored row was not touched again
    let after = db.fetch_payment_by_gateway_order_id(&gateway_order_id).await.unwrap().unwrap();
    assert_eq!(after.updated_at, settled.updated_at);
}

#[tokio::test]
async fn verification_resolves_payments_by_gateway_order_id_only() {
    let db = new_db().await;
    let provider = new_provider();
    let (api, order_id, _) = verified_checkout(&db, &provider).await;

    let request = PaymentVerificationRequest {
        order_id,
        gateway_order_id: "order_nonexistent".to_string(),
        gateway_payment_id: "pay_29QQoUBi66xm2f".to_string(),
        signature: "irrelevant".to_string(),
    };
    let err = api.verify_payment("alice@example.com", request).await.unwrap_err();
    assert!(matches!(err, PaymentFlowError::DatabaseError(PaymentGatewayError::PaymentNotFound(_))));
}

#[tokio::test]
async fn payment_for_order_is_a_relaxed_access_read() {
    let db = new_db().await;
    let provider = new_provider();
    let (api, order_id, gateway_order_id) = verified_checkout(&db, &provider).await;
    seed_user(&db, "mallory@example.com", "Mallory").await;

    // a different authenticated user may read the payment; the mismatch is logged, not fatal
    let result = api.payment_for_order("mallory@example.com", order_id).await.unwrap();
    assert_eq!(result.gateway_order_id, gateway_order_id);
    assert_eq!(result.order_id, order_id);

    let err = api.payment_for_order("mallory@example.com", order_id + 1).await.unwrap_err();
    assert!(matches!(err, PaymentFlowError::DatabaseError(PaymentGatewayError::PaymentNotFound(_))));
}
