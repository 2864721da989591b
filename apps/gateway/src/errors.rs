// [apps/gateway/src/errors.rs]
/*!
 * Taxonomía de errores de la frontera HTTP (C10). Cada variante lleva
 * su propio código de estado; todas se serializan al mismo sobre JSON
 * `{error, message, details?, status}` para que un cliente pueda hacer
 * `switch` sobre `error` sin parsear el mensaje humano.
 */

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

#[derive(Debug)]
pub enum GatewayError {
    ValidationError(String),
    UnsafeLabel { reasons: Vec<String> },
    NonAsciiNotAllowed,
    UnicodeMustUsePunycode,
    PremiumNotAllowed,
    SpendCapExceeded { cap: String },
    DailyCapExceeded { remaining: String },
    UnknownDnsTemplate(String),
    NameserversRequired,
    Unauthorized,
    NotFound,
    IdempotencyMismatch,
    PriceDrift { drift: String },
    RateLimited { retry_after_secs: u64 },
    InternalError(String),
}

impl GatewayError {
    fn kind(&self) -> &'static str {
        match self {
            GatewayError::ValidationError(_) => "ValidationError",
            GatewayError::UnsafeLabel { .. } => "UnsafeLabel",
            GatewayError::NonAsciiNotAllowed => "NonASCIINotAllowed",
            GatewayError::UnicodeMustUsePunycode => "UnicodeMustUsePunycode",
            GatewayError::PremiumNotAllowed => "PremiumNotAllowed",
            GatewayError::SpendCapExceeded { .. } => "SpendCapExceeded",
            GatewayError::DailyCapExceeded { .. } => "DailyCapExceeded",
            GatewayError::UnknownDnsTemplate(_) => "UnknownDnsTemplate",
            GatewayError::NameserversRequired => "NameserversRequired",
            GatewayError::Unauthorized => "Unauthorized",
            GatewayError::NotFound => "NotFound",
            GatewayError::IdempotencyMismatch => "IdempotencyMismatch",
            GatewayError::PriceDrift { .. } => "PriceDrift",
            GatewayError::RateLimited { .. } => "RateLimited",
            GatewayError::InternalError(_) => "InternalError",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            GatewayError::ValidationError(_)
            | GatewayError::UnsafeLabel { .. }
            | GatewayError::NonAsciiNotAllowed
            | GatewayError::UnicodeMustUsePunycode
            | GatewayError::PremiumNotAllowed
            | GatewayError::SpendCapExceeded { .. }
            | GatewayError::DailyCapExceeded { .. }
            | GatewayError::UnknownDnsTemplate(_)
            | GatewayError::NameserversRequired => StatusCode::BAD_REQUEST,
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::IdempotencyMismatch | GatewayError::PriceDrift { .. } => StatusCode::CONFLICT,
            GatewayError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            GatewayError::ValidationError(msg) => msg.clone(),
            GatewayError::UnsafeLabel { .. } => "the requested label failed the safety filter".to_string(),
            GatewayError::NonAsciiNotAllowed => "non-ASCII labels are not allowed for this request".to_string(),
            GatewayError::UnicodeMustUsePunycode => "unicode labels must be submitted as punycode (xn--)".to_string(),
            GatewayError::PremiumNotAllowed => "domain is premium-priced and allow_premium was not set".to_string(),
            GatewayError::SpendCapExceeded { cap } => format!("quoted total exceeds the per-transaction cap of {cap}"),
            GatewayError::DailyCapExceeded { .. } => "request would exceed the daily spend cap".to_string(),
            GatewayError::UnknownDnsTemplate(id) => format!("unknown dns_template_id: {id}"),
            GatewayError::NameserversRequired => "custom nameserver_mode requires 2..=13 nameservers".to_string(),
            GatewayError::Unauthorized => "missing or invalid Authorization bearer token".to_string(),
            GatewayError::NotFound => "resource not found".to_string(),
            GatewayError::IdempotencyMismatch => "idempotency_key was reused with a different request body".to_string(),
            GatewayError::PriceDrift { .. } => "server-side re-quote drifted beyond tolerance from the client quote".to_string(),
            GatewayError::RateLimited { .. } => "too many requests for this account".to_string(),
            GatewayError::InternalError(msg) => msg.clone(),
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            GatewayError::UnsafeLabel { reasons } => Some(json!({ "reasons": reasons })),
            GatewayError::SpendCapExceeded { cap } => Some(json!({ "cap": cap })),
            GatewayError::DailyCapExceeded { remaining } => Some(json!({ "remaining": remaining })),
            GatewayError::PriceDrift { drift } => Some(json!({ "drift": drift })),
            GatewayError::RateLimited { retry_after_secs } => Some(json!({ "retryAfterSec": retry_after_secs })),
            _ => None,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let retry_after = match &self {
            GatewayError::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };

        let body = Json(json!({
            "error": self.kind(),
            "message": self.message(),
            "details": self.details(),
            "status": status.as_u16(),
        }));

        let mut response = (status, body).into_response();
        if let Some(secs) = retry_after {
            if let Ok(value) = secs.to_string().parse() {
                response.headers_mut().insert(axum::http::header::RETRY_AFTER, value);
            }
        }
        response
    }
}

impl From<gatewayrs_domain_idempotency::IdempotencyError> for GatewayError {
    fn from(e: gatewayrs_domain_idempotency::IdempotencyError) -> Self {
        GatewayError::InternalError(e.to_string())
    }
}

impl From<gatewayrs_domain_billing::SpendLedgerError> for GatewayError {
    fn from(e: gatewayrs_domain_billing::SpendLedgerError) -> Self {
        GatewayError::InternalError(e.to_string())
    }
}

impl From<gatewayrs_infra_db::DbError> for GatewayError {
    fn from(e: gatewayrs_infra_db::DbError) -> Self {
        GatewayError::InternalError(e.to_string())
    }
}

impl From<gatewayrs_infra_registrar::RegistrarError> for GatewayError {
    fn from(e: gatewayrs_infra_registrar::RegistrarError) -> Self {
        GatewayError::InternalError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_carries_retry_after_header() {
        let err = GatewayError::RateLimited { retry_after_secs: 17 };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(axum::http::header::RETRY_AFTER).unwrap(), "17");
    }

    #[test]
    fn price_drift_maps_to_409_with_drift_detail() {
        let err = GatewayError::PriceDrift { drift: "1.00".to_string() };
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.details().unwrap()["drift"], "1.00");
    }

    #[test]
    fn daily_cap_exceeded_maps_to_400_with_remaining_detail() {
        let err = GatewayError::DailyCapExceeded { remaining: "10.00".to_string() };
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.details().unwrap()["remaining"], "10.00");
    }
}
