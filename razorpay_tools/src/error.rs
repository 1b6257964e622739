use thiserror::Error;

#[derive(Debug, Error)]
pub enum RazorpayApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid REST request: {0}")]
    RestRequestError(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}

impl RazorpayApiError {
    /// True if the error came from the transport rather than the gateway itself, i.e. the gateway's verdict is
    /// unknown. Timeouts land here.
    pub fn is_availability_error(&self) -> bool {
        matches!(self, RazorpayApiError::RestResponseError(_))
    }
}
