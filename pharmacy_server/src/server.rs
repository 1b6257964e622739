use std::{future::Future, pin::Pin, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use pharmacy_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    AccountApi,
    CatalogApi,
    OrderFlowApi,
    PaymentFlowApi,
    SqliteDatabase,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::RazorpayGateway,
    routes::{
        add_medicine,
        all_orders,
        create_order,
        create_payment_intent,
        health,
        medicine_by_id,
        medicines,
        my_orders,
        order_by_id,
        payment_for_order,
        register_user,
        update_order_status,
        verify_payment,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway =
        RazorpayGateway::new(config.razorpay.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let producers = start_default_event_handlers().await;
    let srv = create_server_instance(config, db, gateway, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Wires up the default event subscribers. Ownership reconciliations are trust-relevant, so they always land in
/// the audit log, whatever else subscribes.
pub async fn start_default_event_handlers() -> EventProducers {
    let mut hooks = EventHooks::default();
    hooks.on_ownership_reconciled(|event| {
        Box::pin(async move {
            info!(
                "🔏️ AUDIT: ownership of {:?} moved from user #{} to user #{}",
                event.entity, event.previous_user_id, event.new_user_id
            );
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    let handlers = EventHandlers::new(16, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;
    producers
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: RazorpayGateway,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), producers.clone());
        let payments_api = PaymentFlowApi::new(db.clone(), gateway.clone(), producers.clone());
        let catalog_api = CatalogApi::new(db.clone());
        let accounts_api = AccountApi::new(db.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("ppg::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(payments_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(accounts_api))
            .app_data(web::Data::new(config.auth.clone()))
            .service(health)
            .service(
                web::scope("/api")
                    .route("/users", web::post().to(register_user::<SqliteDatabase>))
                    .route("/medicines", web::get().to(medicines::<SqliteDatabase>))
                    .route("/medicines", web::post().to(add_medicine::<SqliteDatabase>))
                    .route("/medicines/{id}", web::get().to(medicine_by_id::<SqliteDatabase>))
                    .route("/orders", web::post().to(create_order::<SqliteDatabase>))
                    .route("/orders", web::get().to(my_orders::<SqliteDatabase>))
                    .route("/orders/all", web::get().to(all_orders::<SqliteDatabase>))
                    .route("/orders/{id}", web::get().to(order_by_id::<SqliteDatabase>))
                    .route("/orders/{id}/status", web::patch().to(update_order_status::<SqliteDatabase>))
                    .route(
                        "/payments/order",
                        web::post().to(create_payment_intent::<SqliteDatabase, RazorpayGateway>),
                    )
                    .route("/payments/verify", web::post().to(verify_payment::<SqliteDatabase, RazorpayGateway>))
                    .route(
                        "/payments/order/{order_id}",
                        web::get().to(payment_for_order::<SqliteDatabase, RazorpayGateway>),
                    ),
            )
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
