// [libs/infra/registrar-client/src/pricing_cache.rs]
/*!
 * Caché de precios por TLD, TTL 300 s. Compartida entre llamadas
 * concurrentes de `quote`/`checkAvailability` dentro de un mismo
 * driver; `DashMap` evita un mutex global sobre todo el mapa.
 */

use crate::types::TldPricing;
use dashmap::DashMap;

const TTL_MS: i64 = 300_000;

pub struct PricingCache {
    entries: DashMap<String, TldPricing>,
}

impl PricingCache {
    pub fn new() -> Self {
        Self { entries: DashMap::new() }
    }

    /// Devuelve la entrada cacheada para `tld` si no ha vencido respecto
    /// a `now_epoch_ms`.
    pub fn get(&self, tld: &str, now_epoch_ms: i64) -> Option<TldPricing> {
        let entry = self.entries.get(tld)?;
        if now_epoch_ms - entry.fetched_at_epoch_ms > TTL_MS {
            None
        } else {
            Some(entry.clone())
        }
    }

    pub fn put(&self, tld: &str, pricing: TldPricing) {
        self.entries.insert(tld.to_string(), pricing);
    }
}

impl Default for PricingCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn entry(fetched_at_epoch_ms: i64) -> TldPricing {
        TldPricing {
            price_usd: Decimal::new(1099, 2),
            premium: false,
            privacy_price_usd: Decimal::new(299, 2),
            fetched_at_epoch_ms,
        }
    }

    #[test]
    fn fresh_entry_is_returned() {
        let cache = PricingCache::new();
        cache.put("com", entry(1_000));
        assert!(cache.get("com", 1_000 + 299_000).is_some());
    }

    #[test]
    fn expired_entry_is_dropped() {
        let cache = PricingCache::new();
        cache.put("com", entry(1_000));
        assert!(cache.get("com", 1_000 + 300_001).is_none());
    }

    #[test]
    fn missing_tld_is_none() {
        let cache = PricingCache::new();
        assert!(cache.get("io", 0).is_none());
    }
}
