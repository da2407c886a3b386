use std::sync::Arc;

use arc_swap::ArcSwapOption;
use axum::http::StatusCode;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::tasks::TaskCounter;

use super::HEALTH_TARGET;
use super::probe::{LivenessProbe, ProbeStatus};
use super::status::{HealthSnapshot, PingStatus};

/// Computes and caches the readiness signal served on `/ping`.
pub struct HealthService {
    probe: Option<Arc<dyn LivenessProbe>>,
    tasks: Arc<TaskCounter>,
    clock: Arc<dyn Clock>,
    snapshot: ArcSwapOption<HealthSnapshot>,
}

impl HealthService {
    /// Builds a service that consults `probe` on every check.
    #[must_use]
    pub fn new(
        probe: Arc<dyn LivenessProbe>,
        tasks: Arc<TaskCounter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_probe(Some(probe), tasks, clock)
    }

    /// Builds a service for deployments without a liveness probe. The
    /// application is treated as up and only in-flight work changes the
    /// reported status.
    #[must_use]
    pub fn without_probe(tasks: Arc<TaskCounter>, clock: Arc<dyn Clock>) -> Self {
        Self::with_probe(None, tasks, clock)
    }

    /// Builds the probe-backed variant when a probe is supplied and the
    /// probe-less variant otherwise.
    #[must_use]
    pub fn with_probe(
        probe: Option<Arc<dyn LivenessProbe>>,
        tasks: Arc<TaskCounter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            probe,
            tasks,
            clock,
            snapshot: ArcSwapOption::empty(),
        }
    }

    /// Whether an external probe backs this service.
    #[must_use]
    pub fn has_probe(&self) -> bool {
        self.probe.is_some()
    }

    /// The most recently cached snapshot, if any check has run.
    #[must_use]
    pub fn cached(&self) -> Option<Arc<HealthSnapshot>> {
        self.snapshot.load_full()
    }

    /// Re-evaluates health and atomically replaces the cached snapshot.
    ///
    /// The timestamp is carried over from the previous snapshot when the
    /// status is unchanged and stamped from the clock on a transition.
    pub fn check(&self) -> Arc<HealthSnapshot> {
        let (status, http_status) = self.evaluate();
        let mut latest = None;
        let previous = self.snapshot.rcu(|current| {
            let next = Arc::new(self.next_snapshot(current.as_deref(), status, http_status));
            latest = Some(Arc::clone(&next));
            Some(next)
        });

        let previous_status = previous.as_deref().map(HealthSnapshot::status);
        if previous_status != Some(status) {
            info!(
                target: HEALTH_TARGET,
                event = "status_changed",
                from = ?previous_status,
                to = ?status,
                http_status = http_status.as_u16(),
                "health status changed"
            );
        }

        latest.unwrap_or_else(|| {
            Arc::new(HealthSnapshot::new(
                status,
                http_status,
                self.clock.unix_seconds(),
            ))
        })
    }

    fn evaluate(&self) -> (PingStatus, StatusCode) {
        let outcome = match &self.probe {
            Some(probe) => probe.check(),
            None => Ok(ProbeStatus::Up),
        };

        match outcome {
            Ok(ProbeStatus::Up) if self.tasks.get() > 0 => (PingStatus::HealthyBusy, StatusCode::OK),
            Ok(ProbeStatus::Up) => (PingStatus::Healthy, StatusCode::OK),
            Ok(ProbeStatus::Down) => (PingStatus::Unhealthy, StatusCode::SERVICE_UNAVAILABLE),
            Ok(ProbeStatus::Unknown(reported)) => {
                warn!(
                    target: HEALTH_TARGET,
                    event = "probe_unknown",
                    reported = %reported,
                    "liveness probe reported an unrecognised state"
                );
                (PingStatus::Unhealthy, StatusCode::SERVICE_UNAVAILABLE)
            }
            Err(error) => {
                warn!(
                    target: HEALTH_TARGET,
                    event = "probe_failed",
                    error = %error,
                    "liveness probe raised an error"
                );
                (PingStatus::Unhealthy, StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    fn next_snapshot(
        &self,
        previous: Option<&HealthSnapshot>,
        status: PingStatus,
        http_status: StatusCode,
    ) -> HealthSnapshot {
        match previous {
            Some(previous) if previous.status() == status => {
                HealthSnapshot::new(status, http_status, previous.time_of_last_update())
            }
            _ => HealthSnapshot::new(status, http_status, self.clock.unix_seconds()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::http::StatusCode;
    use mockall::mock;
    use rstest::{fixture, rstest};

    use super::HealthService;
    use crate::clock::ManualClock;
    use crate::health::{LivenessProbe, PingStatus, ProbeError, ProbeStatus};
    use crate::tasks::TaskCounter;

    mock! {
        Probe {}
        impl LivenessProbe for Probe {
            fn check(&self) -> Result<ProbeStatus, ProbeError>;
        }
    }

    const EPOCH: i64 = 1_700_000_000;

    #[fixture]
    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::starting_at(EPOCH))
    }

    fn probe_returning(status: ProbeStatus) -> Arc<MockProbe> {
        let mut probe = MockProbe::new();
        probe.expect_check().returning(move || Ok(status.clone()));
        Arc::new(probe)
    }

    #[rstest]
    #[case(ProbeStatus::Up, 0, PingStatus::Healthy, StatusCode::OK)]
    #[case(ProbeStatus::Up, 3, PingStatus::HealthyBusy, StatusCode::OK)]
    #[case(ProbeStatus::Down, 0, PingStatus::Unhealthy, StatusCode::SERVICE_UNAVAILABLE)]
    #[case(ProbeStatus::Down, 2, PingStatus::Unhealthy, StatusCode::SERVICE_UNAVAILABLE)]
    #[case(
        ProbeStatus::Unknown("OUT_OF_SERVICE".to_owned()),
        0,
        PingStatus::Unhealthy,
        StatusCode::SERVICE_UNAVAILABLE
    )]
    fn probe_results_map_to_ping_status(
        clock: Arc<ManualClock>,
        #[case] reported: ProbeStatus,
        #[case] running: u64,
        #[case] status: PingStatus,
        #[case] http_status: StatusCode,
    ) {
        let tasks = Arc::new(TaskCounter::new());
        for _ in 0..running {
            tasks.increment();
        }
        let service = HealthService::new(probe_returning(reported), tasks, clock);

        let snapshot = service.check();
        assert_eq!(snapshot.status(), status);
        assert_eq!(snapshot.http_status(), http_status);
        assert_eq!(snapshot.time_of_last_update(), EPOCH);
    }

    #[rstest]
    fn probe_failures_report_a_server_error(clock: Arc<ManualClock>) {
        let mut probe = MockProbe::new();
        probe
            .expect_check()
            .returning(|| Err(ProbeError::new("actuator unavailable")));
        let service = HealthService::new(Arc::new(probe), Arc::new(TaskCounter::new()), clock);

        let snapshot = service.check();
        assert_eq!(snapshot.status(), PingStatus::Unhealthy);
        assert_eq!(snapshot.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[rstest]
    fn timestamp_only_moves_on_transitions(clock: Arc<ManualClock>) {
        let tasks = Arc::new(TaskCounter::new());
        let service = HealthService::without_probe(Arc::clone(&tasks), clock.clone());

        let first = service.check();
        clock.advance(Duration::from_secs(1));
        let second = service.check();
        assert_eq!(second.status(), PingStatus::Healthy);
        assert_eq!(second.time_of_last_update(), first.time_of_last_update());

        tasks.increment();
        clock.advance(Duration::from_secs(5));
        let busy = service.check();
        assert_eq!(busy.status(), PingStatus::HealthyBusy);
        assert_eq!(busy.time_of_last_update(), EPOCH + 6);

        tasks.decrement();
        clock.advance(Duration::from_secs(2));
        let idle = service.check();
        assert_eq!(idle.status(), PingStatus::Healthy);
        assert_eq!(idle.time_of_last_update(), EPOCH + 8);
    }

    #[rstest]
    fn unhealthy_code_refreshes_without_moving_the_timestamp(clock: Arc<ManualClock>) {
        let mut probe = MockProbe::new();
        let mut calls = 0;
        probe.expect_check().returning(move || {
            calls += 1;
            if calls == 1 {
                Ok(ProbeStatus::Down)
            } else {
                Err(ProbeError::new("probe crashed"))
            }
        });
        let service = HealthService::new(Arc::new(probe), Arc::new(TaskCounter::new()), clock.clone());

        let down = service.check();
        clock.advance(Duration::from_secs(30));
        let failed = service.check();

        assert_eq!(down.http_status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(failed.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(failed.time_of_last_update(), down.time_of_last_update());
    }

    #[rstest]
    fn check_replaces_the_cached_snapshot(clock: Arc<ManualClock>) {
        let service = HealthService::without_probe(Arc::new(TaskCounter::new()), clock);
        assert!(service.cached().is_none());
        assert!(!service.has_probe());

        let snapshot = service.check();
        assert_eq!(service.cached(), Some(snapshot));
    }
}
