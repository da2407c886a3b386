//! Readiness reporting for `GET /ping`.
//!
//! [`HealthService`] folds a [`LivenessProbe`] result and the
//! [`TaskCounter`](crate::TaskCounter) into a cached [`HealthSnapshot`]. The
//! snapshot's timestamp records the last status *transition* rather than the
//! last check, so repeated pings in a stable state report the same time.

mod probe;
mod service;
mod status;

pub use self::probe::{LivenessProbe, ProbeError, ProbeStatus};
pub use self::service::HealthService;
pub use self::status::{HealthSnapshot, PingStatus};

const HEALTH_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::health");
