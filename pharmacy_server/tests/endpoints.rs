//! Endpoint tests: drive the HTTP surface against a real SQLite backend and the in-process mock gateway.
use actix_web::{test, web, App};
use pharmacy_engine::{
    api::{order_objects::OrderRequest, payment_objects::PaymentIntentRequest},
    db_types::{NewMedicine, PaymentStatusType},
    events::EventProducers,
    order_objects::{OrderItemRequest, OrderResult},
    payment_objects::{PaymentIntentResult, PaymentResult, PaymentVerificationRequest},
    test_utils::{
        mock_provider::MockPaymentProvider,
        prepare_env::{prepare_test_env, random_db_path},
    },
    AccountApi,
    CatalogApi,
    OrderFlowApi,
    PaymentFlowApi,
    SqliteDatabase,
};
use pharmacy_server::{
    auth::TokenIssuer,
    config::AuthConfig,
    data_objects::UserRegistrationRequest,
    routes::{
        add_medicine,
        create_order,
        create_payment_intent,
        health,
        medicines,
        my_orders,
        payment_for_order,
        register_user,
        verify_payment,
    },
};
use ppg_common::{Rupees, Secret};

fn test_auth_config() -> AuthConfig {
    AuthConfig { jwt_secret: Secret::new("endpoint-test-secret".to_string()), token_lifetime: chrono::Duration::hours(1) }
}

async fn test_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database")
}

macro_rules! test_app {
    ($db:expr, $provider:expr) => {{
        let db = $db.clone();
        let producers = EventProducers::default();
        test::init_service(
            App::new()
                .app_data(web::Data::new(OrderFlowApi::new(db.clone(), producers.clone())))
                .app_data(web::Data::new(PaymentFlowApi::new(db.clone(), $provider.clone(), producers)))
                .app_data(web::Data::new(CatalogApi::new(db.clone())))
                .app_data(web::Data::new(AccountApi::new(db)))
                .app_data(web::Data::new(test_auth_config()))
                .service(health)
                .service(
                    web::scope("/api")
                        .route("/users", web::post().to(register_user::<SqliteDatabase>))
                        .route("/medicines", web::get().to(medicines::<SqliteDatabase>))
                        .route("/medicines", web::post().to(add_medicine::<SqliteDatabase>))
                        .route("/orders", web::post().to(create_order::<SqliteDatabase>))
                        .route("/orders", web::get().to(my_orders::<SqliteDatabase>))
                        .route(
                            "/payments/order",
                            web::post().to(create_payment_intent::<SqliteDatabase, MockPaymentProvider>),
                        )
                        .route(
                            "/payments/verify",
                            web::post().to(verify_payment::<SqliteDatabase, MockPaymentProvider>),
                        )
                        .route(
                            "/payments/order/{order_id}",
                            web::get().to(payment_for_order::<SqliteDatabase, MockPaymentProvider>),
                        ),
                ),
        )
        .await
    }};
}

#[actix_web::test]
async fn health_check_works() {
    let db = test_db().await;
    let provider = MockPaymentProvider::new("rzp_test_key", "secret");
    let app = test_app!(db, provider);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn requests_without_a_bearer_token_are_rejected() {
    let db = test_db().await;
    let provider = MockPaymentProvider::new("rzp_test_key", "secret");
    let app = test_app!(db, provider);

    let body = OrderRequest {
        items: vec![OrderItemRequest { medicine_id: 1, quantity: 1 }],
        shipping_address: "12 MG Road".to_string(),
        payment_method: "razorpay".to_string(),
    };
    let req = test::TestRequest::post().uri("/api/orders").set_json(&body).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 401);
}

#[actix_web::test]
async fn full_checkout_over_http() {
    let db = test_db().await;
    let provider = MockPaymentProvider::new("rzp_test_key", "secret");
    let app = test_app!(db, provider);
    let auth = test_auth_config();
    let token = TokenIssuer::new(&auth).issue_token("alice@example.com", "Alice").unwrap();
    let bearer = ("Authorization", format!("Bearer {token}"));

    // provision the identity and the catalog
    let req = test::TestRequest::post()
        .uri("/api/users")
        .set_json(UserRegistrationRequest { email: "alice@example.com".to_string(), name: "Alice".to_string() })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let medicine = NewMedicine::new("Paracetamol 500mg", Rupees::from_paise(12_500), 10);
    let req = test::TestRequest::post().uri("/api/medicines").set_json(&medicine).to_request();
    let medicine: pharmacy_engine::db_types::Medicine =
        test::read_body_json(test::call_service(&app, req).await).await;

    // place the order
    let body = OrderRequest {
        items: vec![OrderItemRequest { medicine_id: medicine.id, quantity: 2 }],
        shipping_address: "12 MG Road, Bengaluru".to_string(),
        payment_method: "razorpay".to_string(),
    };
    let req = test::TestRequest::post()
        .uri("/api/orders")
        .insert_header(bearer.clone())
        .set_json(&body)
        .to_request();
    let order: OrderResult = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(order.total_amount, Rupees::from_paise(25_000));

    let req = test::TestRequest::get().uri("/api/orders").insert_header(bearer.clone()).to_request();
    let mine: Vec<OrderResult> = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(mine.len(), 1);

    // create the payment intent
    let body = PaymentIntentRequest {
        order_id: order.id,
        amount: order.total_amount,
        currency: "INR".to_string(),
        receipt: Some("rcpt-42".to_string()),
        note: None,
    };
    let req = test::TestRequest::post()
        .uri("/api/payments/order")
        .insert_header(bearer.clone())
        .set_json(&body)
        .to_request();
    let intent: PaymentIntentResult = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(intent.status, "created");
    assert_eq!(intent.key_id, "rzp_test_key");

    // verify the checkout callback
    let body = PaymentVerificationRequest {
        order_id: order.id,
        gateway_order_id: intent.gateway_order_id.clone(),
        gateway_payment_id: "pay_http01".to_string(),
        signature: provider.sign(&intent.gateway_order_id, "pay_http01"),
    };
    let req = test::TestRequest::post()
        .uri("/api/payments/verify")
        .insert_header(bearer.clone())
        .set_json(&body)
        .to_request();
    let result: PaymentResult = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(result.status, PaymentStatusType::Completed);

    let req = test::TestRequest::get()
        .uri(&format!("/api/payments/order/{}", order.id))
        .insert_header(bearer)
        .to_request();
    let fetched: PaymentResult = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(fetched.payment_id, result.payment_id);
    assert_eq!(fetched.status, PaymentStatusType::Completed);
}
