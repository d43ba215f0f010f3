//! Error types for the MLLP framing layer.
//!
//! The taxonomy distinguishes framing errors (wire-level block boundary
//! issues), EOF conditions (clean closure at a block boundary versus a
//! truncated block), and transport I/O errors. Truncation is the one
//! per-session fatal condition: no well-formed envelope exists to address an
//! acknowledgement to, so the session propagates it instead of replying.

use std::io;

use thiserror::Error;

/// Framing-level errors occurring during block boundary detection.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FramingError {
    /// Data arrived outside a start-of-block byte.
    #[error("expected start-of-block 0x0B, got {byte:#04x}")]
    MissingStartByte {
        /// Byte found where the start byte was expected.
        byte: u8,
    },

    /// End-of-block byte was not followed by the carriage-return trailer.
    #[error("expected trailer 0x0D after end-of-block, got {byte:#04x}")]
    MissingTrailer {
        /// Byte found where the trailer was expected.
        byte: u8,
    },

    /// Block payload exceeds the configured maximum.
    #[error("block exceeds max length: {size} > {max}")]
    OversizedFrame {
        /// Payload bytes buffered or declared so far.
        size: usize,
        /// Maximum allowed payload size.
        max: usize,
    },
}

/// EOF handling variants distinguishing normal from premature closure.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum EofError {
    /// Clean EOF at a block boundary. No data was lost.
    #[error("connection closed cleanly at block boundary")]
    CleanClose,

    /// EOF received mid-block. The peer disconnected while a block was
    /// being read; the partial payload cannot be acknowledged.
    #[error("premature EOF: {bytes_buffered} bytes of an unterminated block buffered")]
    MidFrame {
        /// Bytes buffered when the stream ended.
        bytes_buffered: usize,
    },
}

/// Top-level codec error taxonomy.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Wire-level block boundary issue.
    #[error("framing error: {0}")]
    Framing(#[from] FramingError),

    /// End-of-stream handling.
    #[error("EOF: {0}")]
    Eof(#[from] EofError),

    /// Transport layer I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CodecError {
    /// Returns true if this error represents a clean connection close.
    #[must_use]
    pub fn is_clean_close(&self) -> bool { matches!(self, Self::Eof(EofError::CleanClose)) }

    /// Returns true if the stream ended mid-block.
    #[must_use]
    pub fn is_truncation(&self) -> bool { matches!(self, Self::Eof(EofError::MidFrame { .. })) }

    /// Returns the error category as a string for logging.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Framing(_) => "framing",
            Self::Eof(_) => "eof",
            Self::Io(_) => "io",
        }
    }
}

impl From<CodecError> for io::Error {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Io(e) => e,
            CodecError::Framing(e) => io::Error::new(io::ErrorKind::InvalidData, e),
            CodecError::Eof(e) => io::Error::new(io::ErrorKind::UnexpectedEof, e),
        }
    }
}
