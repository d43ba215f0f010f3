//! MLLP-to-NATS bridge for HL7 v2 messages.
//!
//! The bridge terminates inbound MLLP connections, parses each framed HL7
//! message, forwards it onto a NATS request-reply subject, and returns an
//! HL7 acknowledgement (AA/AR/AE) on the same connection. One task runs per
//! connection; within a connection frames are processed strictly in order.

pub mod ack;
pub mod bus;
pub mod codec;
pub mod config;
pub mod message;
pub mod server;
pub mod session;

pub use ack::{AckCode, code_for_outcome};
pub use bus::{BusConnection, BusError, Forward, ForwardError, NatsForwarder};
pub use codec::{CodecError, EofError, FramingError, MllpCodec};
pub use config::{ConfigError, Settings};
pub use message::{Hl7Message, ParseError};
pub use server::BridgeServer;
pub use session::{SessionError, run_session};
