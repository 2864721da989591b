// [libs/infra/registrar-client/src/errors.rs]
/*!
 * Catálogo de fallos del driver de registrador. Ninguno se traga
 * silenciosamente: todos se propagan al invocador, que decide si
 * reintentar (sólo 429/5xx/red, ver `retry`) o abortar.
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistrarError {
    #[error("HTTP_ERROR: upstream responded {status}: {body}")]
    HttpError { status: u16, body: String },

    #[error("PARSE_ERROR: {0}")]
    ParseError(String),

    #[error("NETWORK_ERROR: {0}")]
    NetworkError(String),

    #[error("MAX_RETRIES: exhausted {attempts} attempts against {endpoint}")]
    MaxRetries { attempts: u32, endpoint: String },

    #[error("TLD_NOT_SUPPORTED: {0}")]
    TldNotSupported(String),

    #[error("INVALID_NAMESERVER_COUNT: expected 2..=13, got {0}")]
    InvalidNameserverCount(usize),

    #[error("DNS_APPLY_PARTIAL_FAILURE: {applied}/{requested} records applied, first failure: {detail}")]
    DnsApplyPartialFailure {
        applied: usize,
        requested: usize,
        detail: String,
    },
}

impl From<reqwest::Error> for RegistrarError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() {
            RegistrarError::NetworkError(e.to_string())
        } else if let Some(status) = e.status() {
            RegistrarError::HttpError {
                status: status.as_u16(),
                body: e.to_string(),
            }
        } else {
            RegistrarError::NetworkError(e.to_string())
        }
    }
}
