use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};

use agentcore_config::Config;
use lru::LruCache;
use tracing::debug;

use crate::clock::Clock;

use super::THROTTLE_TARGET;
use super::bucket::TokenBucket;
use super::client::ClientId;
use super::route::Route;

/// Requests per minute allowed on each route; zero disables throttling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteLimits {
    /// Limit applied to `/invocations`.
    pub invocations: u32,
    /// Limit applied to `/ping`.
    pub ping: u32,
}

impl RouteLimits {
    /// Reads the per-route limits from configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            invocations: config.invocations_limit(),
            ping: config.ping_limit(),
        }
    }

    /// Limit configured for `route`.
    #[must_use]
    pub const fn limit_for(&self, route: Route) -> u32 {
        match route {
            Route::Invocations => self.invocations,
            Route::Ping => self.ping,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct BucketKey {
    client: ClientId,
    route: Route,
}

/// Admits or rejects requests per `(client, route)` pair.
pub struct RateLimiter {
    limits: RouteLimits,
    buckets: Mutex<LruCache<BucketKey, Arc<TokenBucket>>>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Builds a limiter retaining at most `max_tracked` buckets.
    #[must_use]
    pub fn new(limits: RouteLimits, max_tracked: NonZeroUsize, clock: Arc<dyn Clock>) -> Self {
        Self {
            limits,
            buckets: Mutex::new(LruCache::new(max_tracked)),
            clock,
        }
    }

    /// Configured per-route limits.
    #[must_use]
    pub const fn limits(&self) -> RouteLimits {
        self.limits
    }

    /// Consumes a token for `client` on `route`, returning whether the request
    /// may proceed. Unlimited routes never touch the bucket table.
    pub fn admit(&self, client: &ClientId, route: Route) -> bool {
        let limit = self.limits.limit_for(route);
        if limit == 0 {
            return true;
        }

        let now = self.clock.elapsed();
        let bucket = self.bucket(client, route, limit, now);
        bucket.try_consume(now)
    }

    /// Number of buckets currently retained.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.lock_buckets().len()
    }

    fn bucket(
        &self,
        client: &ClientId,
        route: Route,
        limit: u32,
        now: std::time::Duration,
    ) -> Arc<TokenBucket> {
        let key = BucketKey {
            client: client.clone(),
            route,
        };
        let mut buckets = self.lock_buckets();
        if let Some(bucket) = buckets.get(&key) {
            return Arc::clone(bucket);
        }

        let bucket = Arc::new(TokenBucket::new(limit, now));
        if let Some((evicted, _)) = buckets.push(key, Arc::clone(&bucket)) {
            debug!(
                target: THROTTLE_TARGET,
                client = %evicted.client,
                route = %evicted.route,
                "evicted least recently used rate-limit bucket"
            );
        }
        bucket
    }

    fn lock_buckets(&self) -> std::sync::MutexGuard<'_, LruCache<BucketKey, Arc<TokenBucket>>> {
        // Buckets stay consistent even if a holder panicked; the table only
        // stores `Arc`s.
        self.buckets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
