use axum::http::StatusCode;
use serde::Serialize;

/// Readiness states reported to the hosting platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PingStatus {
    /// Ready for work and idle.
    Healthy,
    /// Ready for work while other work is still running.
    HealthyBusy,
    /// Not able to serve work.
    Unhealthy,
}

/// Immutable health reading cached between pings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthSnapshot {
    status: PingStatus,
    #[serde(skip)]
    http_status: StatusCode,
    time_of_last_update: i64,
}

impl HealthSnapshot {
    /// Builds a snapshot.
    #[must_use]
    pub const fn new(status: PingStatus, http_status: StatusCode, time_of_last_update: i64) -> Self {
        Self {
            status,
            http_status,
            time_of_last_update,
        }
    }

    /// Reported readiness state.
    #[must_use]
    pub const fn status(&self) -> PingStatus {
        self.status
    }

    /// HTTP status code that accompanies the `/ping` body.
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        self.http_status
    }

    /// Unix seconds of the most recent status transition.
    #[must_use]
    pub const fn time_of_last_update(&self) -> i64 {
        self.time_of_last_update
    }
}
