//! Start-up discovery of the invocation handler.
//!
//! Applications mark their handler with [`agent_invocation!`], which submits
//! an [`InvocationMarker`] to a link-time collection. Bootstrap walks every
//! marker once and registers each through [`HandlerRegistry::register`], so a
//! second marker anywhere in the binary aborts start-up with
//! [`RegistrationError::MultipleHandlers`].
//!
//! [`agent_invocation!`]: crate::agent_invocation

use std::fmt;
use std::sync::Arc;

use crate::tasks::TaskCounter;

use super::Handler;
use super::errors::RegistrationError;
use super::registry::HandlerRegistry;

/// Runtime collaborators available to handler factories.
#[derive(Debug, Clone)]
pub struct RuntimeServices {
    tasks: Arc<TaskCounter>,
}

impl RuntimeServices {
    /// Bundles the shared collaborators.
    #[must_use]
    pub fn new(tasks: Arc<TaskCounter>) -> Self {
        Self { tasks }
    }

    /// Counter handlers use to report background work, so `/ping` reports
    /// `HealthyBusy` until the work finishes.
    #[must_use]
    pub fn tasks(&self) -> &Arc<TaskCounter> {
        &self.tasks
    }
}

/// Marks a function that builds the invocation handler.
pub struct InvocationMarker {
    name: &'static str,
    factory: fn(&RuntimeServices) -> Handler,
}

impl InvocationMarker {
    /// Declares a marker; usable in `static` and `inventory::submit!` items.
    #[must_use]
    pub const fn new(name: &'static str, factory: fn(&RuntimeServices) -> Handler) -> Self {
        Self { name, factory }
    }

    /// Name the handler registers under.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Builds the handler.
    #[must_use]
    pub fn build(&self, services: &RuntimeServices) -> Handler {
        (self.factory)(services)
    }
}

impl fmt::Debug for InvocationMarker {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("InvocationMarker")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

inventory::collect!(InvocationMarker);

/// Declares the invocation handler for the binary.
///
/// The factory receives the [`RuntimeServices`] and returns the
/// [`Handler`](crate::Handler) to register.
///
/// ```ignore
/// fn build(_services: &RuntimeServices) -> Handler {
///     Handler::with_request(|prompt: String| async move { Ok::<_, HandlerError>(prompt) })
/// }
///
/// agentcore_runtime::agent_invocation!(echo, build);
/// ```
#[macro_export]
macro_rules! agent_invocation {
    ($name:ident, $factory:expr) => {
        $crate::inventory::submit! {
            $crate::InvocationMarker::new(stringify!($name), $factory)
        }
    };
}

/// Every marker linked into the current binary.
#[must_use]
pub fn linked_markers() -> Vec<&'static InvocationMarker> {
    let mut markers = Vec::new();
    for marker in inventory::iter::<InvocationMarker> {
        markers.push(marker);
    }
    markers
}

/// Registers the handler built by each marker, failing on the second.
///
/// Returns the name of the registered handler, or `None` when no marker was
/// supplied.
pub fn discover<'a, I>(
    registry: &HandlerRegistry,
    services: &RuntimeServices,
    markers: I,
) -> Result<Option<&'static str>, RegistrationError>
where
    I: IntoIterator<Item = &'a InvocationMarker>,
{
    let mut registered = None;
    for marker in markers {
        registry.register(marker.name(), marker.build(services))?;
        registered = Some(marker.name());
    }
    Ok(registered)
}

/// Runs [`discover`] over every marker linked into the binary.
pub fn discover_linked(
    registry: &HandlerRegistry,
    services: &RuntimeServices,
) -> Result<Option<&'static str>, RegistrationError> {
    discover(registry, services, linked_markers())
}
