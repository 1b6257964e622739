use std::sync::Arc;

use log::*;
use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::RazorpayConfig,
    data_objects::{NewRazorpayOrder, RazorpayOrder, RazorpayPayment},
    RazorpayApiError,
};

/// Authenticated HTTP client for the Razorpay v1 REST API.
///
/// The client carries a bounded request timeout from [`RazorpayConfig`]; a gateway that does not answer within the
/// deadline surfaces as a [`RazorpayApiError::RestResponseError`] rather than blocking the caller.
#[derive(Clone)]
pub struct RazorpayApi {
    config: RazorpayConfig,
    client: Arc<Client>,
}

impl RazorpayApi {
    pub fn new(config: RazorpayConfig) -> Result<Self, RazorpayApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RazorpayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    /// The public key id that the storefront client needs to open the checkout widget.
    pub fn key_id(&self) -> &str {
        &self.config.key_id
    }

    pub fn key_secret(&self) -> &str {
        self.config.key_secret.reveal()
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, RazorpayApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {url}");
        let mut req = self
            .client
            .request(method, url)
            .basic_auth(&self.config.key_id, Some(self.config.key_secret.reveal()));
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| RazorpayApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| RazorpayApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| RazorpayApiError::RestResponseError(e.to_string()))?;
            Err(RazorpayApiError::QueryError { status, message })
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1{path}", self.config.api_url)
    }

    /// Creates a remote order against which the customer's checkout payment will be made.
    pub async fn create_order(&self, order: NewRazorpayOrder) -> Result<RazorpayOrder, RazorpayApiError> {
        debug!("Creating gateway order for {} {}", order.amount, order.currency);
        let result = self.rest_query::<RazorpayOrder, NewRazorpayOrder>(Method::POST, "/orders", Some(order)).await?;
        info!("Gateway order created with id {}", result.id);
        Ok(result)
    }

    /// Fetches the authoritative status of a payment from the gateway.
    pub async fn fetch_payment(&self, payment_id: &str) -> Result<RazorpayPayment, RazorpayApiError> {
        let path = format!("/payments/{payment_id}");
        debug!("Fetching gateway payment {payment_id}");
        let result = self.rest_query::<RazorpayPayment, ()>(Method::GET, &path, None).await?;
        debug!("Gateway payment {payment_id} has status {}", result.status);
        Ok(result)
    }
}
