use chrono::Utc;
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewPayment, Payment, PaymentStatusType, VerificationOutcome},
    traits::PaymentGatewayError,
};

/// Inserts a payment row with `Created` status. At most one payment may exist per gateway order id; a duplicate
/// insert surfaces as [`PaymentGatewayError::PaymentAlreadyExists`].
pub async fn insert_payment(payment: NewPayment, conn: &mut SqliteConnection) -> Result<Payment, PaymentGatewayError> {
    let now = Utc::now();
    let result = sqlx::query_as::<_, Payment>(
        r#"
            INSERT INTO payments (
                order_id,
                user_id,
                gateway_order_id,
                amount,
                currency,
                status,
                receipt,
                note,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING *;
        "#,
    )
    .bind(payment.order_id)
    .bind(payment.user_id)
    .bind(payment.gateway_order_id.clone())
    .bind(payment.amount.value())
    .bind(payment.currency)
    .bind(PaymentStatusType::Created)
    .bind(payment.receipt)
    .bind(payment.note)
    .bind(now)
    .fetch_one(conn)
    .await;
    match result {
        Ok(payment) => {
            debug!("🗃️ Payment #{} inserted for gateway order {}", payment.id, payment.gateway_order_id);
            Ok(payment)
        },
        Err(e) if e.as_database_error().is_some_and(|de| de.is_unique_violation()) => {
            Err(PaymentGatewayError::PaymentAlreadyExists(payment.gateway_order_id))
        },
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_payment_by_id(payment_id: i64, conn: &mut SqliteConnection) -> Result<Option<Payment>, sqlx::Error> {
    let payment = sqlx::query_as("SELECT * FROM payments WHERE id = $1").bind(payment_id).fetch_optional(conn).await?;
    Ok(payment)
}

pub async fn fetch_payment_by_gateway_order_id(
    gateway_order_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    let payment = sqlx::query_as("SELECT * FROM payments WHERE gateway_order_id = $1")
        .bind(gateway_order_id)
        .fetch_optional(conn)
        .await?;
    Ok(payment)
}

/// The earliest payment recorded against the order.
pub async fn fetch_first_payment_for_order(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    let payment = sqlx::query_as("SELECT * FROM payments WHERE order_id = $1 ORDER BY id LIMIT 1")
        .bind(order_id)
        .fetch_optional(conn)
        .await?;
    Ok(payment)
}

pub async fn update_owner(
    payment_id: i64,
    new_user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    let payment = sqlx::query_as("UPDATE payments SET user_id = $2, updated_at = $3 WHERE id = $1 RETURNING *")
        .bind(payment_id)
        .bind(new_user_id)
        .bind(Utc::now())
        .fetch_optional(conn)
        .await?;
    Ok(payment)
}

/// Writes the verification result onto the payment row. Status-machine checks happen in the caller, which holds
/// the enclosing transaction.
pub async fn apply_verification(
    outcome: &VerificationOutcome,
    conn: &mut SqliteConnection,
) -> Result<Payment, sqlx::Error> {
    let payment = sqlx::query_as(
        r#"
            UPDATE payments SET
                gateway_payment_id = $2,
                signature = $3,
                status = $4,
                payment_method = COALESCE($5, payment_method),
                error_code = $6,
                error_description = $7,
                updated_at = $8
            WHERE id = $1
            RETURNING *;
        "#,
    )
    .bind(outcome.payment_id)
    .bind(outcome.gateway_payment_id.clone())
    .bind(outcome.signature.clone())
    .bind(outcome.payment_status)
    .bind(outcome.payment_method.clone())
    .bind(outcome.error_code.clone())
    .bind(outcome.error_description.clone())
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    Ok(payment)
}
