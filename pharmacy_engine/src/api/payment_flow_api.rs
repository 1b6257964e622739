use std::fmt::Debug;

use log::*;

use crate::{
    api::{
        errors::PaymentFlowError,
        payment_objects::{PaymentIntentRequest, PaymentIntentResult, PaymentResult, PaymentVerificationRequest},
    },
    db_types::{NewPayment, Order, OrderStatusType, Payment, PaymentStatusType, VerificationOutcome},
    events::{EventProducers, OwnershipReconciledEvent, PaymentFailedEvent, PaymentSettledEvent, ReconciledEntity},
    traits::{GatewayOrderRequest, PaymentGatewayError, PaymentProvider, PharmacyDatabase},
};

pub const INVALID_SIGNATURE_CODE: &str = "INVALID_SIGNATURE";
const INVALID_SIGNATURE_DESCRIPTION: &str = "Payment signature verification failed";

/// `PaymentFlowApi` orchestrates the payment lifecycle for an order: creating a payment intent on the external
/// gateway, and reconciling the checkout callback against gateway truth.
///
/// The gateway is only reached through the [`PaymentProvider`] trait, after all identity and order lookups have
/// completed and outside any storage transaction, so a slow gateway never holds inventory or order locks.
pub struct PaymentFlowApi<B, P> {
    db: B,
    provider: P,
    producers: EventProducers,
}

impl<B, P> Debug for PaymentFlowApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentFlowApi")
    }
}

impl<B, P> PaymentFlowApi<B, P> {
    pub fn new(db: B, provider: P, producers: EventProducers) -> Self {
        Self { db, provider, producers }
    }
}

impl<B, P> PaymentFlowApi<B, P>
where
    B: PharmacyDatabase,
    P: PaymentProvider,
{
    /// Creates a payment intent for an order: a remote order on the gateway, and a `Created` payment row bound to
    /// it.
    ///
    /// The caller's email is resolved to an internal user id first. If the order is owned by a different user, the
    /// order is reassigned to the caller rather than rejected; this reconciliation is logged and emitted as an
    /// [`OwnershipReconciledEvent`]. The amount is converted to the gateway's minor unit without rounding loss
    /// (sub-paise amounts were already rejected at the boundary) and must equal the order total.
    pub async fn create_payment_intent(
        &self,
        email: &str,
        request: PaymentIntentRequest,
    ) -> Result<PaymentIntentResult, PaymentFlowError> {
        let user = self
            .db
            .fetch_user_by_email(email)
            .await?
            .ok_or_else(|| PaymentFlowError::IdentityNotFound(email.to_string()))?;
        info!("💳️ Creating payment intent for order #{} and user #{}", request.order_id, user.id);
        let (order, _) = self
            .db
            .fetch_order_by_id(request.order_id)
            .await?
            .ok_or(PaymentGatewayError::OrderNotFound(request.order_id))?;
        if order.user_id != user.id {
            self.reconcile_order_owner(&order, user.id).await?;
        }
        if request.amount != order.total_amount {
            return Err(PaymentFlowError::AmountMismatch {
                expected: order.total_amount.to_string(),
                actual: request.amount.to_string(),
            });
        }
        let gateway_request = GatewayOrderRequest {
            amount: request.amount.value(),
            currency: request.currency.clone(),
            receipt: request.receipt.clone(),
            note: request.note.clone(),
        };
        debug!("💳️ Creating gateway order for {} {}", gateway_request.amount, gateway_request.currency);
        let gateway_order =
            self.provider.create_order(gateway_request).await.map_err(|e| PaymentFlowError::GatewayError(e.to_string()))?;
        info!("💳️ Gateway order {} created for order #{}", gateway_order.gateway_order_id, order.id);
        let mut payment =
            NewPayment::new(order.id, user.id, gateway_order.gateway_order_id.clone(), request.amount, &request.currency);
        payment.receipt = request.receipt;
        payment.note = request.note;
        let payment = self.db.insert_payment(payment).await?;
        debug!("💳️ Payment #{} recorded with status {}", payment.id, payment.status);
        Ok(PaymentIntentResult {
            gateway_order_id: payment.gateway_order_id,
            amount: payment.amount,
            currency: payment.currency,
            receipt: payment.receipt,
            status: "created".to_string(),
            key_id: self.provider.key_id().to_string(),
        })
    }

    /// Reconciles a checkout callback against gateway truth and updates the payment and order rows together.
    ///
    /// The payment is resolved by its gateway order id, never by the client-supplied order id. The callback
    /// signature is verified first (constant-time, inside the provider); then the authoritative remote status is
    /// fetched best-effort:
    ///
    /// * fetch succeeded: an invalid signature fails the payment regardless of remote status; a `captured` remote
    ///   payment completes it; anything else leaves it `Processing`.
    /// * fetch failed (gateway unreachable or timed out): fall back to signature-only inference. A valid signature
    ///   is assumed settled. This is a documented degraded-trust fallback, taken so that a flaky gateway does not
    ///   strand paid orders; the alternative is manual reconciliation.
    ///
    /// Repeating a verification for a payment that has already reached a terminal status is a no-op that returns
    /// the stored result.
    pub async fn verify_payment(
        &self,
        email: &str,
        request: PaymentVerificationRequest,
    ) -> Result<PaymentResult, PaymentFlowError> {
        let user = self
            .db
            .fetch_user_by_email(email)
            .await?
            .ok_or_else(|| PaymentFlowError::IdentityNotFound(email.to_string()))?;
        info!("💳️🔍️ Verifying payment for gateway order {} and user #{}", request.gateway_order_id, user.id);
        let payment = self
            .db
            .fetch_payment_by_gateway_order_id(&request.gateway_order_id)
            .await?
            .ok_or_else(|| PaymentGatewayError::PaymentNotFound(request.gateway_order_id.clone()))?;
        if payment.status.is_terminal() {
            info!(
                "💳️🔍️ Payment #{} is already {}. Returning the stored result without re-applying side effects.",
                payment.id, payment.status
            );
            return Ok(PaymentResult::from(&payment));
        }
        let payment = if payment.user_id != user.id {
            self.reconcile_payment_owner(&payment, user.id).await?
        } else {
            payment
        };

        let signature_valid = self.provider.verify_checkout_signature(
            &request.gateway_order_id,
            &request.gateway_payment_id,
            &request.signature,
        );
        debug!("💳️🔍️ Signature verification result for payment #{}: {signature_valid}", payment.id);

        let fetch_result = self.provider.fetch_payment(&request.gateway_payment_id).await;
        let mut payment_method = None;
        let (payment_status, error_code, error_description) = match fetch_result {
            Ok(remote) => {
                debug!("💳️🔍️ Gateway reports status {:?} for payment {}", remote.status, remote.gateway_payment_id);
                payment_method = remote.payment_method;
                if !signature_valid {
                    (PaymentStatusType::Failed, Some(INVALID_SIGNATURE_CODE), Some(INVALID_SIGNATURE_DESCRIPTION))
                } else if remote.status.is_captured() {
                    (PaymentStatusType::Completed, None, None)
                } else {
                    (PaymentStatusType::Processing, None, None)
                }
            },
            Err(e) => {
                warn!(
                    "💳️🔍️ Could not fetch payment {} from the gateway ({e}). Falling back to signature-only \
                     inference.",
                    request.gateway_payment_id
                );
                if !signature_valid {
                    (PaymentStatusType::Failed, Some(INVALID_SIGNATURE_CODE), Some(INVALID_SIGNATURE_DESCRIPTION))
                } else {
                    (PaymentStatusType::Completed, None, None)
                }
            },
        };
        let order_status = match payment_status {
            PaymentStatusType::Completed => OrderStatusType::Completed,
            PaymentStatusType::Failed => OrderStatusType::PaymentFailed,
            _ => OrderStatusType::Processing,
        };
        let outcome = VerificationOutcome {
            payment_id: payment.id,
            order_id: payment.order_id,
            gateway_payment_id: request.gateway_payment_id,
            signature: request.signature,
            payment_status,
            order_status,
            payment_method,
            error_code: error_code.map(String::from),
            error_description: error_description.map(String::from),
        };
        let (payment, order) = self.db.record_verification_outcome(outcome).await?;
        info!("💳️🔍️ Payment #{} is {} and order #{} is {}", payment.id, payment.status, order.id, order.status);
        match payment.status {
            PaymentStatusType::Completed => self.call_payment_settled_hook(&payment, &order).await,
            PaymentStatusType::Failed => self.call_payment_failed_hook(&payment, &order).await,
            _ => {},
        }
        Ok(PaymentResult::from(&payment))
    }

    /// The first payment recorded against the given order.
    ///
    /// An identity mismatch between the caller and the stored payment owner is logged but does not block the read.
    /// This relaxed-access policy is inherited from the storefront contract and is not production-safe.
    pub async fn payment_for_order(&self, email: &str, order_id: i64) -> Result<PaymentResult, PaymentFlowError> {
        let user = self
            .db
            .fetch_user_by_email(email)
            .await?
            .ok_or_else(|| PaymentFlowError::IdentityNotFound(email.to_string()))?;
        let payment = self
            .db
            .fetch_first_payment_for_order(order_id)
            .await?
            .ok_or_else(|| PaymentGatewayError::PaymentNotFound(format!("order #{order_id}")))?;
        if payment.user_id != user.id {
            warn!(
                "💳️ User #{} fetched payment #{} owned by user #{}. Allowing the read under the relaxed access \
                 policy.",
                user.id, payment.id, payment.user_id
            );
        }
        Ok(PaymentResult::from(&payment))
    }

    async fn reconcile_order_owner(&self, order: &Order, new_user_id: i64) -> Result<(), PaymentFlowError> {
        warn!(
            "💳️ User id mismatch on order #{}: stored owner #{}, authenticated caller #{new_user_id}. Reassigning \
             the order to the caller.",
            order.id, order.user_id
        );
        self.db.reassign_order_owner(order.id, new_user_id).await?;
        self.call_ownership_reconciled_hook(ReconciledEntity::Order(order.id), order.user_id, new_user_id).await;
        Ok(())
    }

    async fn reconcile_payment_owner(&self, payment: &Payment, new_user_id: i64) -> Result<Payment, PaymentFlowError> {
        warn!(
            "💳️ User id mismatch on payment #{}: stored owner #{}, authenticated caller #{new_user_id}. Reassigning \
             the payment to the caller.",
            payment.id, payment.user_id
        );
        let updated = self.db.reassign_payment_owner(payment.id, new_user_id).await?;
        self.call_ownership_reconciled_hook(ReconciledEntity::Payment(payment.id), payment.user_id, new_user_id).await;
        Ok(updated)
    }

    async fn call_ownership_reconciled_hook(&self, entity: ReconciledEntity, previous_user_id: i64, new_user_id: i64) {
        for emitter in &self.producers.ownership_reconciled_producer {
            trace!("💳️ Notifying ownership reconciled hook subscribers");
            let event = OwnershipReconciledEvent { entity, previous_user_id, new_user_id };
            emitter.publish_event(event).await;
        }
    }

    async fn call_payment_settled_hook(&self, payment: &Payment, order: &Order) {
        for emitter in &self.producers.payment_settled_producer {
            trace!("💳️ Notifying payment settled hook subscribers");
            let event = PaymentSettledEvent::new(payment.clone(), order.clone());
            emitter.publish_event(event).await;
        }
    }

    async fn call_payment_failed_hook(&self, payment: &Payment, order: &Order) {
        for emitter in &self.producers.payment_failed_producer {
            trace!("💳️ Notifying payment failed hook subscribers");
            let event = PaymentFailedEvent::new(payment.clone(), order.clone());
            emitter.publish_event(event).await;
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}
