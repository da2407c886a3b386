//! Test suites for runtime bootstrap, health reporting, and throttling.

mod health_behaviour;
mod support;
