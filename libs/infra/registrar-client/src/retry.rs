// [libs/infra/registrar-client/src/retry.rs]
/*!
 * Política de reintento compartida por ambos drivers: HTTP 429 y 5xx, o
 * fallos de red, se reintentan hasta 3 intentos totales con backoff
 * exponencial `2^attempt` segundos. Cualquier otro error HTTP no se
 * reintenta.
 */

use crate::errors::RegistrarError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

const MAX_ATTEMPTS: u32 = 3;

fn is_retryable(err: &RegistrarError) -> bool {
    match err {
        RegistrarError::HttpError { status, .. } => *status == 429 || *status >= 500,
        RegistrarError::NetworkError(_) => true,
        _ => false,
    }
}

/// Ejecuta `call` hasta `MAX_ATTEMPTS` veces. `call` recibe el número de
/// intento (1-indexado) por si el invocador necesita anotarlo en logs.
pub async fn with_retry<T, F, Fut>(endpoint: &str, mut call: F) -> Result<T, RegistrarError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, RegistrarError>>,
{
    let mut last_err = None;

    for attempt in 1..=MAX_ATTEMPTS {
        match call(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if is_retryable(&err) && attempt < MAX_ATTEMPTS => {
                let backoff = Duration::from_secs(2u64.pow(attempt));
                warn!(
                    endpoint,
                    attempt, backoff_secs = backoff.as_secs(), "registrar call failed, retrying: {err}"
                );
                tokio::time::sleep(backoff).await;
                last_err = Some(err);
            }
            Err(err) if is_retryable(&err) => {
                last_err = Some(err);
            }
            Err(err) => return Err(err),
        }
    }

    let _ = last_err;
    Err(RegistrarError::MaxRetries {
        attempts: MAX_ATTEMPTS,
        endpoint: endpoint.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_without_retry_on_first_try() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, RegistrarError> = with_retry("test", |_attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(42) }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_on_5xx_then_succeeds() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, RegistrarError> = with_retry("test", |_attempt| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(RegistrarError::HttpError { status: 503, body: "x".into() })
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn does_not_retry_non_retryable_errors() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, RegistrarError> = with_retry("test", |_attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(RegistrarError::ParseError("bad json".into())) }
        })
        .await;
        assert!(matches!(result, Err(RegistrarError::ParseError(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, RegistrarError> = with_retry("test", |_attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(RegistrarError::NetworkError("timeout".into())) }
        })
        .await;
        assert!(matches!(result, Err(RegistrarError::MaxRetries { attempts: 3, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
