//! Tokio-based MLLP listener.
//!
//! `BridgeServer` binds to the configured address, accepts connections until
//! shutdown, and spawns one independent session task per connection. Session
//! outcomes are logged, never propagated: one misbehaving peer must not
//! affect the accept loop or other connections.

use std::io;
use std::net::{SocketAddr, TcpListener as StdTcpListener, ToSocketAddrs};
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::time::{Duration, sleep};
use tracing::{debug, error, warn};

use crate::{bus::Forward, session::run_session};

/// Accepts MLLP connections and drives a session loop per connection.
pub struct BridgeServer {
    forwarder: Arc<dyn Forward>,
    listener: Option<TcpListener>,
}

impl BridgeServer {
    /// Create a server forwarding parsed messages through `forwarder`.
    ///
    /// The forwarder handle is shared by every session task.
    #[must_use]
    pub fn new(forwarder: Arc<dyn Forward>) -> Self {
        Self {
            forwarder,
            listener: None,
        }
    }

    /// Bind the server to the given address and create a listener.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] if resolution or binding fails; startup must
    /// surface this rather than swallow it.
    pub fn bind(mut self, addr: impl ToSocketAddrs) -> io::Result<Self> {
        let std_listener = StdTcpListener::bind(addr)?;
        std_listener.set_nonblocking(true)?;
        self.listener = Some(TcpListener::from_std(std_listener)?);
        Ok(self)
    }

    /// Address the server is bound to, if [`bind`][Self::bind] succeeded.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Run the server until a ctrl-c signal is received.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] if the listener was never bound.
    ///
    /// # Panics
    ///
    /// Panics if called before [`bind`][Self::bind].
    pub async fn run(self) -> io::Result<()> {
        self.run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
    }

    /// Run the server until the `shutdown` future resolves.
    ///
    /// Each accepted connection is handled on its own task, concurrently
    /// with all others. Accept errors are retried with a capped backoff.
    ///
    /// # Errors
    ///
    /// Currently infallible after a successful bind; the `io::Result` keeps
    /// room for listener-level failures.
    ///
    /// # Panics
    ///
    /// Panics if called before [`bind`][Self::bind].
    pub async fn run_until<S>(self, shutdown: S) -> io::Result<()>
    where
        S: Future<Output = ()>,
    {
        let listener = self.listener.expect("`bind` must be called before `run`");
        tokio::pin!(shutdown);

        let mut delay = Duration::from_millis(10);
        loop {
            tokio::select! {
                res = listener.accept() => match res {
                    Ok((stream, peer)) => {
                        delay = Duration::from_millis(10);
                        let forwarder = Arc::clone(&self.forwarder);
                        tokio::spawn(async move {
                            let peer = peer.to_string();
                            debug!(%peer, "connection accepted");
                            let (reader, writer) = stream.into_split();
                            match run_session(reader, writer, forwarder.as_ref(), &peer).await {
                                Ok(()) => debug!(%peer, "session closed"),
                                Err(e) if e.is_truncation() => {
                                    warn!(%peer, error = %e, "session aborted mid-frame");
                                }
                                Err(e) => error!(%peer, error = %e, "session failed"),
                            }
                        });
                    }
                    Err(e) => {
                        warn!(error = %e, "accept error");
                        sleep(delay).await;
                        delay = (delay * 2).min(Duration::from_secs(1));
                    }
                },
                () = &mut shutdown => break,
            }
        }
        Ok(())
    }
}
