// =============================================================================
// Staleness Cache: serve fresh entries, refresh stale ones through the source
// =============================================================================
//
// Entries younger than `freshness` are returned without touching the network.
// Anything older (or missing) triggers one fetch; success replaces the entry,
// failure is returned as-is and the stale entry stays where it was. Stale data
// is never served as a fallback. Provider notices (rate limit, unknown symbol)
// come back as 200 bodies without a series; they are passed through but not
// stored, so the next call asks again.
//
// Without single-flight, concurrent misses on the same key each fetch and the
// last write wins. With single-flight, refreshes of one key are serialised and
// late arrivals re-check freshness before fetching.
// =============================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::store::{CacheEntry, CacheStore};
use crate::error::AdvisorResult;
use crate::provider::parse::DAILY_SERIES_KEY;
use crate::provider::{FetchRequest, MarketDataSource, RawResponse};
use crate::types::{CacheKey, OutputSize};

pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(300);

type FlightLocks = Mutex<HashMap<CacheKey, Arc<tokio::sync::Mutex<()>>>>;

pub struct StalenessCache {
    source: Arc<dyn MarketDataSource>,
    store: Box<dyn CacheStore>,
    freshness: Duration,
    flights: Option<FlightLocks>,
}

impl StalenessCache {
    pub fn new(source: Arc<dyn MarketDataSource>, store: Box<dyn CacheStore>, freshness: Duration) -> Self {
        Self {
            source,
            store,
            freshness,
            flights: None,
        }
    }

    /// Serialise concurrent refreshes per key.
    pub fn with_single_flight(mut self) -> Self {
        self.flights = Some(Mutex::new(HashMap::new()));
        self
    }

    /// Current entry for `key`, fresh or not.
    #[cfg(test)]
    pub fn peek(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.store.load(key)
    }

    pub async fn get_or_refresh(&self, symbol: &str, resolution: OutputSize) -> AdvisorResult<RawResponse> {
        self.get_or_refresh_at(symbol, resolution, SystemTime::now()).await
    }

    /// Same as [`get_or_refresh`](Self::get_or_refresh) with an explicit
    /// clock reading.
    pub async fn get_or_refresh_at(
        &self,
        symbol: &str,
        resolution: OutputSize,
        now: SystemTime,
    ) -> AdvisorResult<RawResponse> {
        let key = CacheKey::new(symbol, resolution);

        if let Some(entry) = self.fresh_entry(&key, now) {
            debug!(%key, "cache hit");
            return Ok(entry.payload);
        }

        let Some(flights) = &self.flights else {
            return self.refresh(key, now).await;
        };

        let lock = flights.lock().entry(key.clone()).or_default().clone();
        let _guard = lock.lock().await;

        // Another caller may have refreshed while we waited.
        if let Some(entry) = self.fresh_entry(&key, now) {
            debug!(%key, "cache hit after waiting on in-flight refresh");
            return Ok(entry.payload);
        }
        self.refresh(key, now).await
    }

    fn fresh_entry(&self, key: &CacheKey, now: SystemTime) -> Option<CacheEntry> {
        self.store
            .load(key)
            .filter(|entry| is_fresh(entry.stored_at, now, self.freshness))
    }

    async fn refresh(&self, key: CacheKey, now: SystemTime) -> AdvisorResult<RawResponse> {
        let request = FetchRequest::daily(key.symbol.clone(), key.resolution);

        let payload = match self.source.fetch(&request).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(%key, error = %e, "cache refresh failed");
                return Err(e);
            }
        };

        if payload.get(DAILY_SERIES_KEY).is_none() {
            warn!(%key, "provider answered without a series, not caching");
            return Ok(payload);
        }

        let entry = CacheEntry {
            key,
            payload,
            stored_at: now,
        };
        if let Err(e) = self.store.save(&entry) {
            warn!(key = %entry.key, error = %e, "failed to persist cache entry");
        } else {
            info!(key = %entry.key, "cache refreshed");
        }

        Ok(entry.payload)
    }
}

/// Entries stamped in the future (clock skew) count as brand new.
pub fn is_fresh(stored_at: SystemTime, now: SystemTime, freshness: Duration) -> bool {
    let age = now.duration_since(stored_at).unwrap_or(Duration::ZERO);
    age < freshness
}
