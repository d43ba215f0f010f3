//! Per-connection session loop.
//!
//! Drives one accepted connection from accept to close: read a framed
//! message, parse it, forward it to the bus, and write back exactly one
//! acknowledgement before the next read. Per-frame failures (malformed
//! content, undeliverable messages) are absorbed into negative
//! acknowledgements; only a stream truncated mid-block or a transport fault
//! ends the session early.

use futures::{SinkExt, StreamExt};
use bytes::Bytes;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, warn};

use crate::{
    ack::code_for_outcome,
    bus::Forward,
    codec::{CodecError, EofError, MllpCodec},
    message::Hl7Message,
};

/// Session-fatal failures.
///
/// Everything else that can go wrong with a single frame is converted into
/// an acknowledgement and never surfaces here.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The peer disconnected mid-block. No acknowledgement was written
    /// because no well-formed envelope exists to address one to.
    #[error("stream ended mid-frame with {bytes_buffered} bytes pending")]
    TruncatedStream {
        /// Bytes buffered when the stream ended.
        bytes_buffered: usize,
    },

    /// Framing or I/O fault on the connection.
    #[error("transport error: {0}")]
    Transport(#[from] CodecError),
}

impl SessionError {
    /// Returns true if the session ended because the stream was truncated
    /// mid-frame, as opposed to a framing or I/O fault.
    #[must_use]
    pub fn is_truncation(&self) -> bool { matches!(self, Self::TruncatedStream { .. }) }
}

/// Drive one connection until its stream ends.
///
/// For each complete frame the loop performs at most one bus call and
/// exactly one acknowledgement write-back, flushed before the next read;
/// acknowledgements therefore leave in frame-arrival order. `peer` is used
/// for observability only.
///
/// # Errors
///
/// Returns [`SessionError::TruncatedStream`] when the peer disconnects
/// mid-block and [`SessionError::Transport`] on framing or I/O faults,
/// including failures to write an acknowledgement. A clean end-of-stream is
/// normal termination, not an error.
pub async fn run_session<R, W>(
    reader: R,
    writer: W,
    forwarder: &dyn Forward,
    peer: &str,
) -> Result<(), SessionError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut frames = FramedRead::new(reader, MllpCodec::default());
    let mut acks = FramedWrite::new(writer, MllpCodec::default());

    while let Some(next) = frames.next().await {
        let frame = match next {
            Ok(frame) => frame,
            Err(CodecError::Eof(EofError::MidFrame { bytes_buffered })) => {
                return Err(SessionError::TruncatedStream { bytes_buffered });
            }
            Err(e) => return Err(SessionError::Transport(e)),
        };

        let (message, parse_ok, forward_ok) = match Hl7Message::parse_frame(&frame) {
            Ok(message) => {
                let outcome = forwarder.forward(&message.to_string()).await;
                if let Err(e) = &outcome {
                    warn!(peer, error = %e, "forwarding failed");
                }
                let forwarded = outcome.is_ok();
                (message, true, Some(forwarded))
            }
            Err(e) => {
                warn!(peer, error = %e, "received unparseable frame");
                (Hl7Message::reject_stub(), false, None)
            }
        };

        let code = code_for_outcome(parse_ok, forward_ok);
        let ack = message.ack(code);
        // `send` flushes, so the acknowledgement is on the wire before the
        // next read is attempted.
        acks.send(Bytes::from(ack.to_string())).await?;
        debug!(peer, code = code.as_str(), "acknowledgement written");
    }

    debug!(peer, "stream ended cleanly");
    Ok(())
}
