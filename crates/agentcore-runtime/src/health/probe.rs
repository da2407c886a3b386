use thiserror::Error;

/// Tri-state result reported by a liveness probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    /// The application reports itself as up.
    Up,
    /// The application reports itself as down.
    Down,
    /// The probe returned a state the runtime does not recognise.
    Unknown(String),
}

/// Failure raised while running a liveness probe.
#[derive(Debug, Error)]
#[error("liveness probe failed: {message}")]
pub struct ProbeError {
    message: String,
}

impl ProbeError {
    /// Creates a probe failure with a description.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Human-readable description of the failure.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Application-supplied check consulted on every `/ping`.
pub trait LivenessProbe: Send + Sync {
    /// Reports whether the application can accept work.
    fn check(&self) -> Result<ProbeStatus, ProbeError>;
}

impl<F> LivenessProbe for F
where
    F: Fn() -> Result<ProbeStatus, ProbeError> + Send + Sync,
{
    fn check(&self) -> Result<ProbeStatus, ProbeError> {
        self()
    }
}
