//! Minimal HL7 v2 message model.
//!
//! A message is a sequence of segments separated by carriage returns, each
//! segment a sequence of pipe-separated fields. Only the MSH envelope is
//! interpreted here: it carries the addressing and control information needed
//! to build an acknowledgement. Everything else is carried opaquely.

use thiserror::Error;

use crate::ack::AckCode;

/// Segment separator on the wire.
const SEGMENT_SEPARATOR: char = '\r';
/// Standard field separator (MSH-1).
const FIELD_SEPARATOR: char = '|';
/// Standard encoding characters (MSH-2).
const ENCODING_CHARACTERS: &str = r"^~\&";

/// Errors raised while interpreting a structurally complete frame.
///
/// All variants are recoverable per-frame conditions: the session maps them
/// to a Reject acknowledgement and keeps the connection open.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// Frame payload is not valid UTF-8 text.
    #[error("frame payload is not valid UTF-8")]
    InvalidEncoding,

    /// Frame contained no segments at all.
    #[error("frame is empty")]
    Empty,

    /// First segment is not an MSH header with standard separators.
    #[error("first segment is not an MSH header: {found:?}")]
    NotHl7 {
        /// Leading characters of the offending segment.
        found: String,
    },

    /// MSH header lacks a field required to address a reply.
    #[error("MSH header is missing {field}")]
    MissingField {
        /// HL7 field name, for example `MSH-10`.
        field: &'static str,
    },
}

/// One parsed HL7 v2 message.
///
/// Exists only if parsing succeeded; owned by the session loop for a single
/// frame/acknowledgement cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hl7Message {
    segments: Vec<Vec<String>>,
}

impl Hl7Message {
    /// Parse a raw frame payload into a structured message.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the payload is not text, is empty, does
    /// not open with a standard MSH segment, or lacks the message type
    /// (MSH-9) or control ID (MSH-10) needed to address an acknowledgement.
    pub fn parse_frame(payload: &[u8]) -> Result<Self, ParseError> {
        let text = std::str::from_utf8(payload).map_err(|_| ParseError::InvalidEncoding)?;
        Self::parse(text)
    }

    /// Parse message text into a structured message.
    ///
    /// # Errors
    ///
    /// See [`parse_frame`][Self::parse_frame].
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let segments: Vec<Vec<String>> = text
            .split(SEGMENT_SEPARATOR)
            .map(|segment| segment.trim_matches('\n'))
            .filter(|segment| !segment.is_empty())
            .map(|segment| segment.split(FIELD_SEPARATOR).map(str::to_owned).collect())
            .collect();

        let Some(header) = segments.first() else {
            return Err(ParseError::Empty);
        };
        if header.first().map(String::as_str) != Some("MSH")
            || header.get(1).map(String::as_str) != Some(ENCODING_CHARACTERS)
        {
            let segment = header.join("|");
            return Err(ParseError::NotHl7 {
                found: segment.chars().take(8).collect(),
            });
        }

        let message = Self { segments };
        if message.message_type().is_none_or(str::is_empty) {
            return Err(ParseError::MissingField { field: "MSH-9" });
        }
        if message.control_id().is_none_or(str::is_empty) {
            return Err(ParseError::MissingField { field: "MSH-10" });
        }
        Ok(message)
    }

    /// Build a minimal envelope for acknowledging an unparseable frame.
    ///
    /// When nothing is recoverable from the inbound bytes there is no sender
    /// to swap into the reply and no control ID to echo. Rather than drop the
    /// frame silently, the reject acknowledgement is addressed with an empty
    /// envelope so the peer still receives a negative response.
    #[must_use]
    pub fn reject_stub() -> Self {
        let mut header = vec![String::from("MSH"), ENCODING_CHARACTERS.to_owned()];
        header.resize(10, String::new());
        Self {
            segments: vec![header],
        }
    }

    /// Message type and trigger event (MSH-9), for example `ADT^A01`.
    #[must_use]
    pub fn message_type(&self) -> Option<&str> { self.msh_field(8) }

    /// Message control ID (MSH-10).
    #[must_use]
    pub fn control_id(&self) -> Option<&str> { self.msh_field(9) }

    /// Sending application (MSH-3).
    #[must_use]
    pub fn sending_application(&self) -> Option<&str> { self.msh_field(2) }

    /// Sending facility (MSH-4).
    #[must_use]
    pub fn sending_facility(&self) -> Option<&str> { self.msh_field(3) }

    /// Receiving application (MSH-5).
    #[must_use]
    pub fn receiving_application(&self) -> Option<&str> { self.msh_field(4) }

    /// Receiving facility (MSH-6).
    #[must_use]
    pub fn receiving_facility(&self) -> Option<&str> { self.msh_field(5) }

    /// Version ID (MSH-12).
    #[must_use]
    pub fn version_id(&self) -> Option<&str> { self.msh_field(11) }

    /// Number of segments in the message.
    #[must_use]
    pub fn segment_count(&self) -> usize { self.segments.len() }

    /// Build the acknowledgement message for this message.
    ///
    /// The reply swaps the sender and receiver of the inbound envelope,
    /// echoes its processing ID and version, and carries an MSA segment with
    /// the given code and the inbound control ID.
    #[must_use]
    pub fn ack(&self, code: AckCode) -> Hl7Message {
        let field = |index: usize| self.msh_field(index).unwrap_or_default().to_owned();
        let control_id = field(9);

        let header = vec![
            String::from("MSH"),
            ENCODING_CHARACTERS.to_owned(),
            field(4), // receiving application becomes the sender
            field(5),
            field(2), // sending application becomes the receiver
            field(3),
            String::new(),
            String::new(),
            String::from("ACK"),
            format!("ACK{control_id}"),
            field(10),
            field(11),
        ];
        let msa = vec![String::from("MSA"), code.as_str().to_owned(), control_id];
        Hl7Message {
            segments: vec![header, msa],
        }
    }

    fn msh_field(&self, index: usize) -> Option<&str> {
        self.segments
            .first()
            .and_then(|header| header.get(index))
            .map(String::as_str)
    }
}

impl std::fmt::Display for Hl7Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("\r")?;
            }
            f.write_str(&segment.join("|"))?;
        }
        Ok(())
    }
}
