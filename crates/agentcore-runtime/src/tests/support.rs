//! Shared fixtures for the runtime behavioural suites.

use std::ffi::OsString;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use agentcore_config::Config;
use axum::Router;
use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use ortho_config::{OrthoConfig, OrthoError};
use serde::Deserialize;
use tokio::runtime::Runtime as TokioRuntime;
use tower::ServiceExt;

use crate::bootstrap::{BootstrapError, ConfigLoader};
use crate::handler::{Handler, HandlerError, InvocationMarker, RuntimeServices};
use crate::reporter::LifecycleReporter;

/// Lifecycle events captured by [`RecordingReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    HandlerRegistered(String),
    HandlerMissing,
    ListenerReady(SocketAddr),
    ListenerStopped,
}

/// Reporter that records lifecycle events for assertions.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<LifecycleEvent>>,
}

impl RecordingReporter {
    /// Captures a copy of the recorded events.
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events
            .lock()
            .expect("reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: LifecycleEvent) {
        self.events
            .lock()
            .expect("reporter mutex poisoned")
            .push(event);
    }
}

impl LifecycleReporter for RecordingReporter {
    fn bootstrap_starting(&self) {
        self.record(LifecycleEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(LifecycleEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(LifecycleEvent::BootstrapFailed(error.to_string()));
    }

    fn handler_registered(&self, name: &str) {
        self.record(LifecycleEvent::HandlerRegistered(name.to_owned()));
    }

    fn handler_missing(&self) {
        self.record(LifecycleEvent::HandlerMissing);
    }

    fn listener_ready(&self, address: SocketAddr) {
        self.record(LifecycleEvent::ListenerReady(address));
    }

    fn listener_stopped(&self) {
        self.record(LifecycleEvent::ListenerStopped);
    }
}

/// Loader that fails by passing an unparsable port on the command line.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("agentcore-runtime"),
            OsString::from("--port"),
            OsString::from("not-a-port"),
        ];
        Config::load_from_iter(args)
    }
}

/// Configuration suitable for tests: loopback host and an ephemeral port.
pub fn loopback_config() -> Config {
    Config {
        host: "127.0.0.1".to_owned(),
        port: 0,
        ..Config::default()
    }
}

#[derive(Debug, Deserialize)]
struct PromptRequest {
    prompt: String,
}

fn build_prompt_echo(_services: &RuntimeServices) -> Handler {
    Handler::with_request(|request: PromptRequest| async move {
        Ok::<_, HandlerError>(format!("You said: {}", request.prompt))
    })
}

fn build_status(_services: &RuntimeServices) -> Handler {
    Handler::no_args(|| async { Ok::<_, HandlerError>("ok") })
}

pub static PROMPT_ECHO: InvocationMarker = InvocationMarker::new("prompt_echo", build_prompt_echo);
pub static STATUS: InvocationMarker = InvocationMarker::new("status", build_status);

/// Current-thread Tokio runtime for driving the router from synchronous
/// steps.
pub fn tokio_runtime() -> TokioRuntime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build Tokio runtime")
}

/// Status and body of a completed response.
#[derive(Debug, Clone)]
pub struct Captured {
    pub status: StatusCode,
    pub body: String,
}

/// Sends `request` through `router` and collects the response.
pub fn send(tokio: &TokioRuntime, router: &Router, request: Request<Body>) -> Captured {
    tokio.block_on(async {
        let response = router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body collects")
            .to_bytes();
        Captured {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    })
}

/// `GET /ping`, optionally forwarded for `client`.
pub fn ping_request(client: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri("/ping");
    if let Some(client) = client {
        builder = builder.header(crate::throttle::FORWARDED_FOR, client);
    }
    builder.body(Body::empty()).expect("valid request")
}

/// `POST /invocations` carrying `{"prompt": prompt}`.
pub fn prompt_request(prompt: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/invocations")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::json!({ "prompt": prompt }).to_string()))
        .expect("valid request")
}
