use std::fmt;
use std::net::SocketAddr;

use axum::http::HeaderMap;

/// Header carrying the proxy chain in front of the runtime.
pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Identity shared by callers whose address cannot be determined.
pub const DEFAULT_CLIENT: &str = "default";

/// Identity used to key rate-limit buckets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(String);

impl ClientId {
    /// Wraps an explicit identity.
    pub fn new(identity: impl Into<String>) -> Self {
        Self(identity.into())
    }

    /// Derives the caller identity from the first `X-Forwarded-For` entry,
    /// falling back to the peer IP and then to [`DEFAULT_CLIENT`].
    #[must_use]
    pub fn resolve(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        forwarded_client(headers)
            .or_else(|| peer.map(|address| address.ip().to_string()))
            .map_or_else(|| Self::new(DEFAULT_CLIENT), Self)
    }

    /// The identity as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

fn forwarded_client(headers: &HeaderMap) -> Option<String> {
    let chain = headers.get(FORWARDED_FOR)?.to_str().ok()?;
    chain
        .split(',')
        .next()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_owned)
}
