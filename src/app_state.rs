// =============================================================================
// Central Application State: Ticker Advisor
// =============================================================================
//
// Everything a request handler needs, shared via `Arc<AppState>`. The cache is
// owned by the market service rather than living in a global, so tests can
// build a state around an in-memory source.
// =============================================================================

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::cache::{CacheStore, FileStore, MemoryStore, StalenessCache};
use crate::market_service::MarketService;
use crate::provider::{AlphaVantageClient, MarketDataSource};
use crate::runtime_config::ServiceConfig;

pub struct AppState {
    pub config: ServiceConfig,
    pub market: MarketService,

    /// Instant when the service was started. Used for uptime reporting.
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Wire the production stack: Alpha Vantage client, configured cache
    /// store, optional single-flight.
    pub fn from_config(config: ServiceConfig) -> Result<Self> {
        let client: Arc<dyn MarketDataSource> = Arc::new(AlphaVantageClient::new(&config)?);
        Self::with_source(config, client)
    }

    /// Build the state around any data source.
    pub fn with_source(config: ServiceConfig, source: Arc<dyn MarketDataSource>) -> Result<Self> {
        let store: Box<dyn CacheStore> = match &config.cache_dir {
            Some(dir) => {
                info!(dir = %dir.display(), "using on-disk cache");
                Box::new(FileStore::open(dir)?)
            }
            None => Box::new(MemoryStore::new()),
        };

        let mut cache = StalenessCache::new(source.clone(), store, config.freshness());
        if config.single_flight {
            cache = cache.with_single_flight();
        }

        Ok(Self {
            config,
            market: MarketService::new(source, cache),
            start_time: std::time::Instant::now(),
        })
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
