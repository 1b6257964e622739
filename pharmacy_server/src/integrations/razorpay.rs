//! Adapts the Razorpay REST client to the engine's [`PaymentProvider`] contract.
use pharmacy_engine::traits::{
    GatewayError,
    GatewayOrder,
    GatewayOrderRequest,
    PaymentProvider,
    RemotePayment,
    RemotePaymentStatus,
};
use razorpay_tools::{verify_checkout_signature, NewRazorpayOrder, RazorpayApi, RazorpayApiError, RazorpayConfig};

#[derive(Clone)]
pub struct RazorpayGateway {
    api: RazorpayApi,
}

impl RazorpayGateway {
    pub fn new(config: RazorpayConfig) -> Result<Self, RazorpayApiError> {
        let api = RazorpayApi::new(config)?;
        Ok(Self { api })
    }
}

impl PaymentProvider for RazorpayGateway {
    fn key_id(&self) -> &str {
        self.api.key_id()
    }

    async fn create_order(&self, request: GatewayOrderRequest) -> Result<GatewayOrder, GatewayError> {
        let mut order = NewRazorpayOrder::new(request.amount, &request.currency);
        if let Some(receipt) = request.receipt.as_deref() {
            order = order.with_receipt(receipt);
        }
        if let Some(note) = request.note.as_deref() {
            order = order.with_note(note);
        }
        let remote = self.api.create_order(order).await.map_err(into_gateway_error)?;
        Ok(GatewayOrder { gateway_order_id: remote.id, amount: remote.amount, currency: remote.currency })
    }

    async fn fetch_payment(&self, gateway_payment_id: &str) -> Result<RemotePayment, GatewayError> {
        let remote = self.api.fetch_payment(gateway_payment_id).await.map_err(into_gateway_error)?;
        Ok(RemotePayment {
            gateway_payment_id: remote.id,
            status: RemotePaymentStatus::from(remote.status.as_str()),
            payment_method: remote.method,
        })
    }

    fn verify_checkout_signature(&self, gateway_order_id: &str, gateway_payment_id: &str, signature: &str) -> bool {
        verify_checkout_signature(gateway_order_id, gateway_payment_id, signature, self.api.key_secret())
    }
}

fn into_gateway_error(e: RazorpayApiError) -> GatewayError {
    match e {
        RazorpayApiError::QueryError { status, message } => GatewayError::Remote { status, message },
        RazorpayApiError::JsonError(m) => GatewayError::InvalidResponse(m),
        // everything else (timeouts, connect errors, init problems) means the gateway's verdict is unknown
        e => GatewayError::Unavailable(e.to_string()),
    }
}
