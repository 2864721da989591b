// [libs/infra/rate-limiter/src/lib.rs]
/*!
 * =================================================================
 * APARATO: LIMITADOR DE TASA POR CLAVE (C6)
 * CLASIFICACIÓN: INFRASTRUCTURE GUARD (ESTRATO L3)
 * RESPONSABILIDAD: CONTENER RÁFAGAS POR CUENTA SIN UN MUTEX GLOBAL
 *
 * Cada clave lleva dos mecanismos acoplados:
 *   - una ventana deslizante de 60s que tope el conteo crudo de
 *     solicitudes en `requestsPerMinute`;
 *   - un token bucket de capacidad `burstSize` que se recarga a razón
 *     de `requestsPerMinute / 60000` tokens por milisegundo.
 * Una solicitud sólo se admite si ambos lo permiten. El rechazo
 * siempre reporta cuántos segundos faltan para que el más restrictivo
 * de los dos se libere.
 * =================================================================
 */

use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const WINDOW_MS: i64 = 60_000;

/// Barrido de claves inactivas, en segundos.
pub const SWEEP_INTERVAL_SECS: u64 = 300;
/// Una clave se considera inactiva (y se elimina) tras este tiempo sin tráfico.
pub const IDLE_EVICTION_SECS: i64 = 600;

#[derive(Debug, Clone, Copy)]
pub struct RateLimiterConfig {
    pub requests_per_minute: u32,
    pub burst_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub retry_after_secs: u64,
}

struct KeyState {
    timestamps: VecDeque<i64>,
    tokens: f64,
    last_refill_ms: i64,
    last_seen_ms: i64,
}

impl KeyState {
    fn new(now_ms: i64, burst: u32) -> Self {
        Self {
            timestamps: VecDeque::new(),
            tokens: burst as f64,
            last_refill_ms: now_ms,
            last_seen_ms: now_ms,
        }
    }
}

pub struct RateLimiter {
    config: RateLimiterConfig,
    keys: DashMap<String, Mutex<KeyState>>,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self { config, keys: DashMap::new() }
    }

    /// Intenta consumir una unidad de cuota para `key` en el instante
    /// `now_ms` (milisegundos desde epoch). No bloquea entre claves
    /// distintas; sólo serializa el acceso a la misma clave.
    pub fn consume(&self, key: &str, now_ms: i64) -> Decision {
        let rpm = self.config.requests_per_minute as f64;
        let burst = self.config.burst_size as f64;
        let rate_per_ms = rpm / WINDOW_MS as f64;

        let entry = self
            .keys
            .entry(key.to_string())
            .or_insert_with(|| Mutex::new(KeyState::new(now_ms, self.config.burst_size)));
        let mut state = entry.lock();
        state.last_seen_ms = now_ms;

        while let Some(&front) = state.timestamps.front() {
            if now_ms - front >= WINDOW_MS {
                state.timestamps.pop_front();
            } else {
                break;
            }
        }

        if state.timestamps.len() as u32 >= self.config.requests_per_minute {
            let front = *state.timestamps.front().expect("len checked above");
            let retry_after = (((front + WINDOW_MS - now_ms) as f64) / 1000.0).ceil().max(0.0) as u64;
            return Decision { allowed: false, retry_after_secs: retry_after };
        }

        let elapsed = (now_ms - state.last_refill_ms).max(0) as f64;
        state.tokens = (state.tokens + elapsed * rate_per_ms).min(burst);
        state.last_refill_ms = now_ms;

        if state.tokens < 1.0 {
            let deficit = 1.0 - state.tokens;
            let retry_after = if rate_per_ms > 0.0 {
                ((deficit / rate_per_ms) / 1000.0).ceil().max(1.0) as u64
            } else {
                60
            };
            return Decision { allowed: false, retry_after_secs: retry_after };
        }

        state.tokens -= 1.0;
        state.timestamps.push_back(now_ms);
        Decision { allowed: true, retry_after_secs: 0 }
    }

    /// Elimina las claves sin tráfico desde hace más de
    /// `IDLE_EVICTION_SECS`.
    pub fn sweep(&self, now_ms: i64) {
        let idle_cutoff_ms = IDLE_EVICTION_SECS * 1000;
        self.keys.retain(|_, state| now_ms - state.lock().last_seen_ms < idle_cutoff_ms);
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }
}

/// Lanza una tarea en segundo plano que invoca `sweep` cada
/// `SWEEP_INTERVAL_SECS`. El handle se descarta deliberadamente por el
/// invocador; la tarea vive mientras viva el runtime.
pub fn spawn_sweeper(limiter: Arc<RateLimiter>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(SWEEP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            let before = limiter.key_count();
            limiter.sweep(now_epoch_ms());
            let evicted = before.saturating_sub(limiter.key_count());
            if evicted > 0 {
                debug!(evicted, "rate limiter swept idle keys");
            }
        }
    })
}

fn now_epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(rpm: u32, burst: u32) -> RateLimiter {
        RateLimiter::new(RateLimiterConfig { requests_per_minute: rpm, burst_size: burst })
    }

    #[test]
    fn allows_up_to_burst_then_rejects() {
        let rl = limiter(60, 3);
        assert!(rl.consume("acct-1", 0).allowed);
        assert!(rl.consume("acct-1", 0).allowed);
        assert!(rl.consume("acct-1", 0).allowed);
        let decision = rl.consume("acct-1", 0);
        assert!(!decision.allowed);
        assert!(decision.retry_after_secs >= 1);
    }

    #[test]
    fn sliding_window_caps_per_minute_even_with_refill() {
        let rl = limiter(2, 10);
        assert!(rl.consume("acct-2", 0).allowed);
        assert!(rl.consume("acct-2", 100).allowed);
        let decision = rl.consume("acct-2", 200);
        assert!(!decision.allowed);
        assert!(decision.retry_after_secs > 0 && decision.retry_after_secs <= 60);
    }

    #[test]
    fn window_ages_out_oldest_timestamp() {
        let rl = limiter(1, 5);
        assert!(rl.consume("acct-3", 0).allowed);
        assert!(!rl.consume("acct-3", 1_000).allowed);
        assert!(rl.consume("acct-3", 60_001).allowed);
    }

    #[test]
    fn tokens_refill_proportionally_to_elapsed_time() {
        let rl = limiter(60, 1);
        assert!(rl.consume("acct-4", 0).allowed);
        assert!(!rl.consume("acct-4", 500).allowed);
        assert!(rl.consume("acct-4", 1_000).allowed);
    }

    #[test]
    fn independent_keys_do_not_interfere() {
        let rl = limiter(1, 1);
        assert!(rl.consume("acct-a", 0).allowed);
        assert!(rl.consume("acct-b", 0).allowed);
    }

    #[test]
    fn sweep_evicts_only_idle_keys() {
        let rl = limiter(60, 5);
        rl.consume("fresh", 0);
        rl.consume("stale", 0);
        rl.sweep(601_000);
        assert_eq!(rl.key_count(), 0);

        rl.consume("fresh", 601_000);
        rl.sweep(601_000 + 599_000);
        assert_eq!(rl.key_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_sweeper_runs_without_panicking() {
        let rl = Arc::new(limiter(60, 5));
        rl.consume("acct-5", 0);
        let handle = spawn_sweeper(Arc::clone(&rl));
        tokio::time::advance(Duration::from_secs(SWEEP_INTERVAL_SECS + 1)).await;
        tokio::task::yield_now().await;
        handle.abort();
    }
}
