//! Per-client, per-route request throttling.
//!
//! Each `(client, route)` pair owns a token bucket holding the route's
//! requests-per-minute limit. Routes configured with a zero limit bypass the
//! bucket table entirely. The table is bounded and evicts the least recently
//! used bucket once it reaches capacity.

mod bucket;
mod client;
mod limiter;
mod route;

pub use self::bucket::TokenBucket;
pub use self::client::{ClientId, DEFAULT_CLIENT, FORWARDED_FOR};
pub use self::limiter::{RateLimiter, RouteLimits};
pub use self::route::Route;

const THROTTLE_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::throttle");
