//! Request handler definitions
//!
//! Define each route and its handler here. Handlers that are more than a line or two MUST go into a separate
//! module. Keep this module neat and tidy 🙏
//!
//! Handlers are generic over the storage backend and the payment provider; [`crate::server`] registers them with
//! the concrete `SqliteDatabase` + `RazorpayGateway` pair. Anything long and non-cpu-bound (database calls, gateway
//! calls) is awaited, never blocked on, so worker threads keep serving other requests.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use pharmacy_engine::{
    api::{
        order_objects::OrderRequest,
        payment_objects::{PaymentIntentRequest, PaymentVerificationRequest},
    },
    db_types::{NewMedicine, NewUser},
    traits::{AccountApiError, PaymentProvider, PharmacyDatabase},
    AccountApi,
    CatalogApi,
    OrderFlowApi,
    PaymentFlowApi,
};

use crate::{
    auth::JwtClaims,
    data_objects::{MedicineSearchQuery, OrderStatusUpdateRequest, UserRegistrationRequest},
    errors::ServerError,
};

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Users   ----------------------------------------------------
/// Provisions a user record for the given email. Credentials and login live in the storefront's auth service;
/// this endpoint only creates the identity that orders and payments will be keyed against.
pub async fn register_user<B: PharmacyDatabase>(
    body: web::Json<UserRegistrationRequest>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    debug!("💻️ POST user registration for {}", request.email);
    let user = match api.register_user(NewUser::new(request.email, request.name)).await {
        Ok(user) => user,
        Err(e @ AccountApiError::UserAlreadyExists(_)) => return Err(ServerError::InvalidOperation(e.to_string())),
        Err(e) => return Err(ServerError::BackendError(e.to_string())),
    };
    Ok(HttpResponse::Ok().json(user))
}

//----------------------------------------------  Medicines ----------------------------------------------------
pub async fn medicines<B: PharmacyDatabase>(
    query: web::Query<MedicineSearchQuery>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let result = match query.into_inner().q {
        Some(term) => {
            debug!("💻️ GET medicines matching '{term}'");
            api.search(&term).await
        },
        None => api.all_medicines().await,
    }
    .map_err(|e| ServerError::BackendError(e.to_string()))?;
    Ok(HttpResponse::Ok().json(result))
}

pub async fn medicine_by_id<B: PharmacyDatabase>(
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let medicine_id = path.into_inner();
    let medicine = api
        .medicine_by_id(medicine_id)
        .await
        .map_err(|e| ServerError::BackendError(e.to_string()))?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Medicine with id {medicine_id} does not exist")))?;
    Ok(HttpResponse::Ok().json(medicine))
}

pub async fn add_medicine<B: PharmacyDatabase>(
    body: web::Json<NewMedicine>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let medicine = api.add_medicine(body.into_inner()).await.map_err(|e| ServerError::BackendError(e.to_string()))?;
    info!("💻️ Medicine #{} ({}) added to the catalog", medicine.id, medicine.name);
    Ok(HttpResponse::Ok().json(medicine))
}

//----------------------------------------------   Orders   ----------------------------------------------------
/// Creates an order for the authenticated caller.
///
/// Stock for every line is validated and decremented atomically; the response carries the snapshotted unit prices,
/// the per-line totals and the exact grand total.
pub async fn create_order<B: PharmacyDatabase>(
    claims: JwtClaims,
    body: web::Json<OrderRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST order for {}", claims.email());
    let order = api.create_order(claims.email(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}

pub async fn my_orders<B: PharmacyDatabase>(
    claims: JwtClaims,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET orders for {}", claims.email());
    let orders = api.orders_for_user(claims.email()).await?;
    Ok(HttpResponse::Ok().json(orders))
}

pub async fn all_orders<B: PharmacyDatabase>(
    _claims: JwtClaims,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let orders = api.all_orders().await?;
    Ok(HttpResponse::Ok().json(orders))
}

pub async fn order_by_id<B: PharmacyDatabase>(
    _claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    let order = api
        .order_by_id(order_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order with id {order_id} does not exist")))?;
    Ok(HttpResponse::Ok().json(order))
}

/// Overwrites the order status; used by the fulfilment tracking surface. Transitions back to `PENDING` are
/// rejected.
pub async fn update_order_status<B: PharmacyDatabase>(
    _claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<OrderStatusUpdateRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    let order = api.update_status(order_id, body.into_inner().status).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------  Payments  ----------------------------------------------------
/// Creates a payment intent: a remote order on the gateway bound to the given storefront order, and a `CREATED`
/// payment row. The response carries everything the client needs to open the checkout widget, including the
/// gateway's public key id.
///
/// An ownership mismatch between the caller and the order is reconciled by reassigning the order to the caller;
/// see the engine documentation for this policy.
pub async fn create_payment_intent<B: PharmacyDatabase, P: PaymentProvider>(
    claims: JwtClaims,
    body: web::Json<PaymentIntentRequest>,
    api: web::Data<PaymentFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST payment intent for {}", claims.email());
    let intent = api.create_payment_intent(claims.email(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(intent))
}

/// Verifies a checkout callback. The payment is resolved by gateway order id, the signature is checked against the
/// shared secret, and the authoritative gateway status is fetched best-effort before the payment and order are
/// updated together.
pub async fn verify_payment<B: PharmacyDatabase, P: PaymentProvider>(
    claims: JwtClaims,
    body: web::Json<PaymentVerificationRequest>,
    api: web::Data<PaymentFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST payment verification for {}", claims.email());
    let result = api.verify_payment(claims.email(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(result))
}

pub async fn payment_for_order<B: PharmacyDatabase, P: PaymentProvider>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<PaymentFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET payment for order #{order_id}");
    let result = api.payment_for_order(claims.email(), order_id).await?;
    Ok(HttpResponse::Ok().json(result))
}
