use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use pharmacy_engine::{traits::PaymentGatewayError, OrderFlowError, PaymentFlowError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Out of stock. {0}")]
    InsufficientStock(String),
    #[error("The payment gateway could not complete the request. {0}")]
    GatewayError(String),
    #[error("The request is not allowed. {0}")]
    InvalidOperation(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::PoorlyFormattedToken(_) => StatusCode::BAD_REQUEST,
                AuthError::CouldNotSerializeToken(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InsufficientStock(_) => StatusCode::CONFLICT,
            Self::GatewayError(_) => StatusCode::BAD_GATEWAY,
            Self::InvalidOperation(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No bearer token was provided.")]
    MissingToken,
    #[error("Login token signature is invalid. {0}")]
    ValidationError(String),
    #[error("Login token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("Could not serialize access token. {0}")]
    CouldNotSerializeToken(String),
}

fn from_gateway_db_error(e: PaymentGatewayError) -> ServerError {
    match e {
        PaymentGatewayError::OrderNotFound(_)
        | PaymentGatewayError::MedicineNotFound(_)
        | PaymentGatewayError::PaymentNotFound(_) => ServerError::NoRecordFound(e.to_string()),
        PaymentGatewayError::InsufficientStock { .. } => ServerError::InsufficientStock(e.to_string()),
        PaymentGatewayError::InvalidQuantity { .. } => ServerError::InvalidOperation(e.to_string()),
        PaymentGatewayError::OrderStatusUpdateError(_) | PaymentGatewayError::PaymentStatusUpdateError(_) => {
            ServerError::InvalidOperation(e.to_string())
        },
        PaymentGatewayError::PaymentAlreadyExists(_) => ServerError::InvalidOperation(e.to_string()),
        e => ServerError::BackendError(e.to_string()),
    }
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        match e {
            OrderFlowError::IdentityNotFound(_) => ServerError::NoRecordFound(e.to_string()),
            OrderFlowError::DatabaseError(inner) => from_gateway_db_error(inner),
            e => ServerError::BackendError(e.to_string()),
        }
    }
}

impl From<PaymentFlowError> for ServerError {
    fn from(e: PaymentFlowError) -> Self {
        match e {
            PaymentFlowError::IdentityNotFound(_) => ServerError::NoRecordFound(e.to_string()),
            PaymentFlowError::GatewayError(m) => ServerError::GatewayError(m),
            PaymentFlowError::AmountMismatch { .. } => ServerError::InvalidOperation(e.to_string()),
            PaymentFlowError::DatabaseError(inner) => from_gateway_db_error(inner),
            e => ServerError::BackendError(e.to_string()),
        }
    }
}

#[cfg(test)]
mod test {
    use actix_web::{http::StatusCode, ResponseError};
    use pharmacy_engine::{traits::PaymentGatewayError, OrderFlowError, PaymentFlowError};

    use super::ServerError;

    #[test]
    fn not_found_errors_map_to_404() {
        let e: ServerError = OrderFlowError::IdentityNotFound("ghost@example.com".into()).into();
        assert_eq!(e.status_code(), StatusCode::NOT_FOUND);
        let e: ServerError = PaymentFlowError::DatabaseError(PaymentGatewayError::OrderNotFound(1)).into();
        assert_eq!(e.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn insufficient_stock_maps_to_409() {
        let inner = PaymentGatewayError::InsufficientStock {
            medicine_id: 1,
            name: "Paracetamol".into(),
            requested: 3,
            available: 1,
        };
        let e: ServerError = OrderFlowError::DatabaseError(inner).into();
        assert_eq!(e.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn gateway_failures_map_to_502() {
        let e: ServerError = PaymentFlowError::GatewayError("connection reset".into()).into();
        assert_eq!(e.status_code(), StatusCode::BAD_GATEWAY);
    }
}
