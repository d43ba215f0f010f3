//! Message-bus connection and forwarding.
//!
//! [`BusConnection`] wraps the NATS client handle created once at startup
//! and shared by every session; async-nats multiplexes concurrent requests
//! over it, so no additional locking is added here. [`Forward`] is the
//! capability the session loop depends on: tests inject a fake implementing
//! the full trait rather than substituting individual methods.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Startup-time bus failures. Fatal: no automatic retry is attempted.
#[derive(Debug, Error)]
pub enum BusError {
    /// No bus server reachable at the configured URL.
    #[error("no bus servers available at {url}: {source}")]
    NoServers {
        /// The URL the connection was attempted against.
        url: String,
        /// Underlying client error.
        #[source]
        source: async_nats::ConnectError,
    },
}

/// Per-request forwarding failures. Recoverable: the session maps them to
/// an Error acknowledgement and continues.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// The request-reply round trip did not complete.
    #[error("bus request on {subject} failed")]
    Request {
        /// Subject the request was published on.
        subject: String,
        /// Underlying transport error (timeout, no responders, ...).
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Shared handle to the message bus.
///
/// Created once at startup and cloned into each forwarder; never a process
/// global.
#[derive(Clone, Debug)]
pub struct BusConnection {
    client: async_nats::Client,
}

impl BusConnection {
    /// Connect to the bus at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::NoServers`] if no server is reachable. The caller
    /// treats this as fatal to startup.
    pub async fn connect(url: &str) -> Result<Self, BusError> {
        let client = async_nats::connect(url)
            .await
            .map_err(|source| BusError::NoServers {
                url: url.to_owned(),
                source,
            })?;
        Ok(Self { client })
    }

    /// Borrow the underlying client.
    #[must_use]
    pub fn client(&self) -> &async_nats::Client { &self.client }
}

/// Capability for handing a serialized message to the bus.
///
/// Implementations perform exactly one outbound request-reply call per
/// invocation: no retries, no buffering, no payload transformation.
#[async_trait]
pub trait Forward: Send + Sync {
    /// Forward one serialized message and wait for the reply.
    ///
    /// # Errors
    ///
    /// Returns a [`ForwardError`] on any transport-level failure. The error
    /// never crosses the session boundary; the caller converts it into an
    /// Error acknowledgement.
    async fn forward(&self, message: &str) -> Result<(), ForwardError>;
}

/// [`Forward`] implementation issuing NATS request-reply calls.
pub struct NatsForwarder {
    connection: BusConnection,
    subject: String,
}

impl NatsForwarder {
    /// Build a forwarder publishing on `subject` over `connection`.
    #[must_use]
    pub fn new(connection: BusConnection, subject: impl Into<String>) -> Self {
        Self {
            connection,
            subject: subject.into(),
        }
    }

    /// Subject this forwarder publishes on.
    #[must_use]
    pub fn subject(&self) -> &str { &self.subject }
}

#[async_trait]
impl Forward for NatsForwarder {
    async fn forward(&self, message: &str) -> Result<(), ForwardError> {
        let payload = Bytes::copy_from_slice(message.as_bytes());
        self.connection
            .client()
            .request(self.subject.clone(), payload)
            .await
            .map(|_reply| ())
            .map_err(|source| ForwardError::Request {
                subject: self.subject.clone(),
                source: Box::new(source),
            })
    }
}
