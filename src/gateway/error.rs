// ABOUTME: Gateway error types with SNAFU pattern.
// ABOUTME: Carries the failing RDS operation for programmatic handling.

use snafu::Snafu;

/// Error raised by an RDS gateway call.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum GatewayError {
    #[snafu(display("{operation} failed: {message}"))]
    Api {
        operation: &'static str,
        message: String,
    },

    #[snafu(display("{operation} response is missing {field}"))]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },

    #[snafu(display("invalid {operation} request: {message}"))]
    InvalidRequest {
        operation: &'static str,
        message: String,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// The service rejected or failed the call.
    Api,
    /// The service answered without a field the gateway relies on.
    MalformedResponse,
    /// The request could not be built client-side.
    InvalidRequest,
}

impl GatewayError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> GatewayErrorKind {
        match self {
            GatewayError::Api { .. } => GatewayErrorKind::Api,
            GatewayError::MissingField { .. } => GatewayErrorKind::MalformedResponse,
            GatewayError::InvalidRequest { .. } => GatewayErrorKind::InvalidRequest,
        }
    }

    /// The RDS operation that failed.
    pub fn operation(&self) -> &'static str {
        match self {
            GatewayError::Api { operation, .. }
            | GatewayError::MissingField { operation, .. }
            | GatewayError::InvalidRequest { operation, .. } => operation,
        }
    }
}
