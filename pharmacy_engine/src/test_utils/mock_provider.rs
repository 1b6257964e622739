//! An in-process [`PaymentProvider`] for tests.
//!
//! The mock hands out sequential gateway order ids, records every create-order request it sees, and lets tests
//! script the remote payment status or take the gateway "offline" to exercise the degraded fallback paths. The
//! signature scheme is a deterministic string rather than a real HMAC; the real HMAC verification is covered by the
//! gateway client crate's own tests.
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::traits::{
    GatewayError,
    GatewayOrder,
    GatewayOrderRequest,
    PaymentProvider,
    RemotePayment,
    RemotePaymentStatus,
};

pub fn mock_signature(gateway_order_id: &str, gateway_payment_id: &str, secret: &str) -> String {
    format!("sig:{gateway_order_id}:{gateway_payment_id}:{secret}")
}

#[derive(Clone)]
pub struct MockPaymentProvider {
    key_id: String,
    secret: String,
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    offline: bool,
    next_order_seq: u64,
    created_orders: Vec<GatewayOrderRequest>,
    remote_statuses: HashMap<String, RemotePaymentStatus>,
    fail_next_create: Option<String>,
}

impl MockPaymentProvider {
    pub fn new(key_id: &str, secret: &str) -> Self {
        Self { key_id: key_id.to_string(), secret: secret.to_string(), state: Arc::new(Mutex::new(MockState::default())) }
    }

    /// Simulate the gateway being unreachable. All remote calls fail with [`GatewayError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    /// Script the status the gateway reports for the given payment id. Unscripted payments report `Captured`.
    pub fn set_remote_status(&self, gateway_payment_id: &str, status: RemotePaymentStatus) {
        self.state.lock().unwrap().remote_statuses.insert(gateway_payment_id.to_string(), status);
    }

    /// Make the next create-order call fail with a remote error.
    pub fn fail_next_create(&self, message: &str) {
        self.state.lock().unwrap().fail_next_create = Some(message.to_string());
    }

    /// Every create-order request the mock has accepted, in order.
    pub fn created_orders(&self) -> Vec<GatewayOrderRequest> {
        self.state.lock().unwrap().created_orders.clone()
    }

    /// A signature that [`Self::verify_checkout_signature`] will accept for these ids.
    pub fn sign(&self, gateway_order_id: &str, gateway_payment_id: &str) -> String {
        mock_signature(gateway_order_id, gateway_payment_id, &self.secret)
    }
}

impl PaymentProvider for MockPaymentProvider {
    fn key_id(&self) -> &str {
        &self.key_id
    }

    async fn create_order(&self, request: GatewayOrderRequest) -> Result<GatewayOrder, GatewayError> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = state.fail_next_create.take() {
            return Err(GatewayError::Remote { status: 502, message });
        }
        if state.offline {
            return Err(GatewayError::Unavailable("mock gateway is offline".to_string()));
        }
        state.next_order_seq += 1;
        let gateway_order_id = format!("order_mock{:06}", state.next_order_seq);
        state.created_orders.push(request.clone());
        Ok(GatewayOrder { gateway_order_id, amount: request.amount, currency: request.currency })
    }

    async fn fetch_payment(&self, gateway_payment_id: &str) -> Result<RemotePayment, GatewayError> {
        let state = self.state.lock().unwrap();
        if state.offline {
            return Err(GatewayError::Unavailable("mock gateway is offline".to_string()));
        }
        let status = state.remote_statuses.get(gateway_payment_id).cloned().unwrap_or(RemotePaymentStatus::Captured);
        Ok(RemotePayment {
            gateway_payment_id: gateway_payment_id.to_string(),
            status,
            payment_method: Some("card".to_string()),
        })
    }

    fn verify_checkout_signature(&self, gateway_order_id: &str, gateway_payment_id: &str, signature: &str) -> bool {
        signature == mock_signature(gateway_order_id, gateway_payment_id, &self.secret)
    }
}
