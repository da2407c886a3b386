//! Behavioural tests for `/ping` health reporting.

use std::cell::RefCell;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::StatusCode;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::clock::{Clock, ManualClock};
use crate::health::{
    HealthService, HealthSnapshot, LivenessProbe, PingStatus, ProbeError, ProbeStatus,
};
use crate::tasks::{TaskCounter, TaskGuard};

type StepResult = Result<(), String>;

const START: i64 = 1_700_000_000;

/// Probe whose reading can be changed between pings.
#[derive(Default)]
struct ScriptedProbe {
    reading: Mutex<Option<Result<ProbeStatus, String>>>,
}

impl ScriptedProbe {
    fn set(&self, reading: Result<ProbeStatus, String>) {
        *self.reading.lock().expect("probe mutex poisoned") = Some(reading);
    }
}

impl LivenessProbe for ScriptedProbe {
    fn check(&self) -> Result<ProbeStatus, ProbeError> {
        let reading = self.reading.lock().expect("probe mutex poisoned").clone();
        match reading {
            Some(Ok(status)) => Ok(status),
            Some(Err(message)) => Err(ProbeError::new(message)),
            None => Ok(ProbeStatus::Up),
        }
    }
}

struct World {
    clock: Arc<ManualClock>,
    tasks: Arc<TaskCounter>,
    probe: Arc<ScriptedProbe>,
    service: Option<HealthService>,
    running: Vec<TaskGuard>,
    readings: Vec<Arc<HealthSnapshot>>,
}

impl World {
    fn new() -> Self {
        Self {
            clock: Arc::new(ManualClock::starting_at(START)),
            tasks: Arc::new(TaskCounter::new()),
            probe: Arc::new(ScriptedProbe::default()),
            service: None,
            running: Vec::new(),
            readings: Vec::new(),
        }
    }

    fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock) as Arc<dyn Clock>
    }

    fn use_probe(&mut self) {
        let probe: Arc<dyn LivenessProbe> = Arc::clone(&self.probe) as Arc<dyn LivenessProbe>;
        self.service = Some(HealthService::new(probe, Arc::clone(&self.tasks), self.clock()));
    }

    fn ping(&mut self) {
        if self.service.is_none() {
            self.service = Some(HealthService::without_probe(
                Arc::clone(&self.tasks),
                self.clock(),
            ));
        }
        if let Some(service) = &self.service {
            self.readings.push(service.check());
        }
    }

    fn latest(&self) -> Result<&HealthSnapshot, String> {
        self.readings
            .last()
            .map(Arc::as_ref)
            .ok_or_else(|| "no ping was sent".to_owned())
    }
}

#[fixture]
fn world() -> RefCell<World> {
    RefCell::new(World::new())
}

#[given("a runtime without a liveness probe")]
fn given_no_probe(world: &RefCell<World>) {
    world.borrow_mut().service = None;
}

#[given("a liveness probe reporting {reading}")]
fn given_probe_reading(world: &RefCell<World>, reading: String) -> StepResult {
    let mut world = world.borrow_mut();
    world.probe.set(parse_reading(&reading)?);
    world.use_probe();
    Ok(())
}

#[given("{count} invocations are running")]
fn given_running(world: &RefCell<World>, count: usize) {
    let mut world = world.borrow_mut();
    for _ in 0..count {
        let guard = world.tasks.track();
        world.running.push(guard);
    }
}

#[when("the platform pings")]
fn when_pinged(world: &RefCell<World>) {
    world.borrow_mut().ping();
}

#[when("{seconds} seconds pass")]
fn when_time_passes(world: &RefCell<World>, seconds: u64) {
    world.borrow().clock.advance(Duration::from_secs(seconds));
}

#[when("the liveness probe starts reporting {reading}")]
fn when_probe_changes(world: &RefCell<World>, reading: String) -> StepResult {
    world.borrow().probe.set(parse_reading(&reading)?);
    Ok(())
}

#[when("every running invocation completes")]
fn when_invocations_complete(world: &RefCell<World>) {
    world.borrow_mut().running.clear();
}

#[then("the status is {status} with HTTP {code}")]
fn then_status(world: &RefCell<World>, status: String, code: u16) -> StepResult {
    let world = world.borrow();
    let snapshot = world.latest()?;
    let expected_status = parse_status(&status)?;
    let expected_code = StatusCode::from_u16(code).map_err(|error| error.to_string())?;
    if snapshot.status() == expected_status && snapshot.http_status() == expected_code {
        Ok(())
    } else {
        Err(format!(
            "expected {expected_status:?}/{expected_code}, got {:?}/{}",
            snapshot.status(),
            snapshot.http_status()
        ))
    }
}

#[then("the last update is {offset} seconds after start")]
fn then_last_update(world: &RefCell<World>, offset: i64) -> StepResult {
    let world = world.borrow();
    let snapshot = world.latest()?;
    let expected = START + offset;
    if snapshot.time_of_last_update() == expected {
        Ok(())
    } else {
        Err(format!(
            "expected timestamp {expected}, got {}",
            snapshot.time_of_last_update()
        ))
    }
}

#[scenario(path = "tests/features/health_status.feature")]
fn health_status(world: RefCell<World>) -> Result<(), String> {
    let _ = world;
    Ok(())
}

fn parse_reading(reading: &str) -> Result<Result<ProbeStatus, String>, String> {
    match reading {
        "UP" => Ok(Ok(ProbeStatus::Up)),
        "DOWN" => Ok(Ok(ProbeStatus::Down)),
        "a failure" => Ok(Err("probe crashed".to_owned())),
        other if other.starts_with("unknown ") => Ok(Ok(ProbeStatus::Unknown(
            other.trim_start_matches("unknown ").to_owned(),
        ))),
        other => Err(format!("unrecognised probe reading '{other}'")),
    }
}

fn parse_status(status: &str) -> Result<PingStatus, String> {
    match status {
        "Healthy" => Ok(PingStatus::Healthy),
        "HealthyBusy" => Ok(PingStatus::HealthyBusy),
        "Unhealthy" => Ok(PingStatus::Unhealthy),
        other => Err(format!("unrecognised ping status '{other}'")),
    }
}
