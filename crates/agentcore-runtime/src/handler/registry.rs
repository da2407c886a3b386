use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::{info, warn};

use super::errors::RegistrationError;
use super::signature::{HandlerKind, Signature, UnsupportedSignature};
use super::{Handler, InvocationTarget, REGISTRY_TARGET};

/// The registered handler together with its classified shape.
pub struct HandlerRegistration {
    name: String,
    signature: Signature,
    kind: Result<HandlerKind, UnsupportedSignature>,
    target: Arc<dyn InvocationTarget>,
}

impl HandlerRegistration {
    fn new(name: String, handler: Handler) -> Self {
        let (signature, target) = handler.into_parts();
        let kind = signature.classify();
        Self {
            name,
            signature,
            kind,
            target,
        }
    }

    /// Name the handler was registered under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared signature.
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Shape classified at registration, or why the shape is unsupported.
    pub fn kind(&self) -> Result<HandlerKind, UnsupportedSignature> {
        self.kind.clone()
    }

    /// Target invoked for each request.
    #[must_use]
    pub fn target(&self) -> &Arc<dyn InvocationTarget> {
        &self.target
    }
}

impl fmt::Debug for HandlerRegistration {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("HandlerRegistration")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Write-once holder for the single invocation handler.
///
/// The registry is populated during bootstrap and read without locking by
/// every request afterwards. A second registration always fails and never
/// replaces the first.
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    slot: OnceLock<HandlerRegistration>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: OnceLock::new(),
        }
    }

    /// Registers `handler` under `name`.
    pub fn register(
        &self,
        name: impl Into<String>,
        handler: Handler,
    ) -> Result<(), RegistrationError> {
        let registration = HandlerRegistration::new(name.into(), handler);
        let name = registration.name.clone();
        let kind = registration.kind.clone();
        let returns = registration.signature.returns();

        if let Err(rejected) = self.slot.set(registration) {
            let existing = self
                .slot
                .get()
                .map(|current| current.name.clone())
                .unwrap_or_default();
            return Err(RegistrationError::MultipleHandlers {
                existing,
                rejected: rejected.name,
            });
        }

        match kind {
            Ok(kind) => info!(
                target: REGISTRY_TARGET,
                handler = %name,
                kind = ?kind,
                returns,
                "registered invocation handler"
            ),
            Err(error) => warn!(
                target: REGISTRY_TARGET,
                handler = %name,
                error = %error,
                "registered invocation handler with an unsupported signature"
            ),
        }
        Ok(())
    }

    /// Whether a handler has been registered.
    #[must_use]
    pub fn has_handler(&self) -> bool {
        self.slot.get().is_some()
    }

    /// The registration, if present.
    #[must_use]
    pub fn registration(&self) -> Option<&HandlerRegistration> {
        self.slot.get()
    }

    /// Signature of the registered handler.
    #[must_use]
    pub fn signature(&self) -> Option<&Signature> {
        self.slot.get().map(HandlerRegistration::signature)
    }

    /// Target of the registered handler.
    #[must_use]
    pub fn target(&self) -> Option<&Arc<dyn InvocationTarget>> {
        self.slot.get().map(HandlerRegistration::target)
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::HandlerRegistry;
    use crate::handler::{Handler, HandlerError, HandlerKind, RegistrationError};

    fn greeting() -> Handler {
        Handler::no_args(|| async { Ok::<_, HandlerError>("hello") })
    }

    #[fixture]
    fn registry() -> HandlerRegistry {
        HandlerRegistry::new()
    }

    #[rstest]
    fn starts_empty(registry: HandlerRegistry) {
        assert!(!registry.has_handler());
        assert!(registry.registration().is_none());
        assert!(registry.signature().is_none());
        assert!(registry.target().is_none());
    }

    #[rstest]
    fn first_registration_is_classified(registry: HandlerRegistry) {
        registry
            .register("greeting", greeting())
            .expect("first registration succeeds");
        let registration = registry.registration().expect("registration stored");
        assert_eq!(registration.name(), "greeting");
        assert_eq!(registration.kind(), Ok(HandlerKind::NoArgs));
        assert!(registry.has_handler());
    }

    #[rstest]
    #[case("greeting", "farewell")]
    #[case("farewell", "greeting")]
    fn second_registration_always_fails(
        registry: HandlerRegistry,
        #[case] first: &str,
        #[case] second: &str,
    ) {
        registry.register(first, greeting()).expect("first registration succeeds");

        let error = registry
            .register(second, greeting())
            .expect_err("second registration must fail");
        assert_eq!(
            error,
            RegistrationError::MultipleHandlers {
                existing: first.to_owned(),
                rejected: second.to_owned(),
            }
        );
        assert_eq!(
            registry.registration().map(|registration| registration.name()),
            Some(first)
        );
    }
}
