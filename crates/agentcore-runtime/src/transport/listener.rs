//! TCP listener lifecycle for the HTTP surface.

use std::future::Future;
use std::net::SocketAddr;

use agentcore_config::ListenAddress;
use axum::Router;
use tokio::net::{TcpListener, lookup_host};
use tracing::info;

use super::TRANSPORT_TARGET;
use super::errors::ListenerError;

/// A bound TCP listener that has not started accepting connections yet.
#[derive(Debug)]
pub struct BoundListener {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl BoundListener {
    /// Resolves `address` and binds to the first resolved socket address.
    ///
    /// # Errors
    ///
    /// Returns an error when the host cannot be resolved, resolves to nothing,
    /// or the address cannot be bound.
    pub async fn bind(address: &ListenAddress) -> Result<Self, ListenerError> {
        let host = address.host();
        let port = address.port();
        let addr = lookup_host((host, port))
            .await
            .map_err(|source| ListenerError::Resolve {
                host: host.to_owned(),
                port,
                source,
            })?
            .next()
            .ok_or_else(|| ListenerError::ResolveEmpty {
                host: host.to_owned(),
                port,
            })?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ListenerError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ListenerError::LocalAddress { source })?;
        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Address the listener is bound to; reports the real port when binding
    /// to port 0.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serves `router` until `shutdown` resolves, then drains open
    /// connections.
    ///
    /// # Errors
    ///
    /// Returns an error when the server stops because of an I/O failure.
    pub async fn serve<F>(self, router: Router, shutdown: F) -> Result<(), ListenerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!(
            target: TRANSPORT_TARGET,
            address = %self.local_addr,
            "listening for HTTP requests"
        );
        axum::serve(
            self.listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|source| ListenerError::Serve { source })?;
        info!(target: TRANSPORT_TARGET, "HTTP listener stopped");
        Ok(())
    }
}
