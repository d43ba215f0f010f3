//! MLLP block framing codec.
//!
//! MLLP wraps each HL7 message in a start-of-block byte (`0x0B`), an
//! end-of-block byte (`0x1C`), and a carriage-return trailer. The codec
//! splits the inbound byte stream into message payloads and wraps outgoing
//! acknowledgements in the same envelope.
//!
//! `decode_eof` distinguishes a clean close (empty buffer at a block
//! boundary) from a truncated block; the latter surfaces as
//! [`EofError::MidFrame`] and terminates the session without an
//! acknowledgement.

use bytes::{BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

pub mod error;

pub use error::{CodecError, EofError, FramingError};

/// Start-of-block byte (`<VT>`).
pub const START_OF_BLOCK: u8 = 0x0B;
/// End-of-block byte (`<FS>`).
pub const END_OF_BLOCK: u8 = 0x1C;
/// Trailer byte following the end-of-block (`<CR>`).
pub const CARRIAGE_RETURN: u8 = 0x0D;

/// Minimum accepted payload length bound in bytes.
///
/// Maximum payload lengths passed to [`MllpCodec::new`] are clamped to at
/// least this value.
pub const MIN_FRAME_LENGTH: usize = 64;

/// Maximum accepted payload length bound in bytes (16 MiB).
pub const MAX_FRAME_LENGTH: usize = 16 * 1024 * 1024;

/// Default maximum payload length (1 MiB).
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 1024 * 1024;

pub(crate) fn clamp_frame_length(value: usize) -> usize {
    value.clamp(MIN_FRAME_LENGTH, MAX_FRAME_LENGTH)
}

/// Codec implementing MLLP block framing over a byte stream.
#[derive(Clone, Debug)]
pub struct MllpCodec {
    max_frame_length: usize,
}

impl MllpCodec {
    /// Construct a codec with a maximum payload length, clamped to
    /// [`MIN_FRAME_LENGTH`]..=[`MAX_FRAME_LENGTH`].
    #[must_use]
    pub fn new(max_frame_length: usize) -> Self {
        Self {
            max_frame_length: clamp_frame_length(max_frame_length),
        }
    }

    /// Return the maximum payload length accepted by this codec.
    #[must_use]
    pub fn max_frame_length(&self) -> usize { self.max_frame_length }
}

impl Default for MllpCodec {
    fn default() -> Self {
        Self {
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
        }
    }
}

impl Decoder for MllpCodec {
    type Item = Bytes;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(&first) = src.first() else {
            return Ok(None);
        };
        // Bytes outside a block mean framing state is lost; resynchronising
        // on a later start byte could splice two messages together.
        if first != START_OF_BLOCK {
            return Err(FramingError::MissingStartByte { byte: first }.into());
        }

        let Some(offset) = src[1..].iter().position(|&b| b == END_OF_BLOCK) else {
            let buffered = src.len() - 1;
            if buffered > self.max_frame_length {
                return Err(FramingError::OversizedFrame {
                    size: buffered,
                    max: self.max_frame_length,
                }
                .into());
            }
            return Ok(None);
        };

        let end = offset + 1; // index of the end-of-block byte
        let Some(&trailer) = src.get(end + 1) else {
            return Ok(None); // trailer not yet received
        };
        if trailer != CARRIAGE_RETURN {
            return Err(FramingError::MissingTrailer { byte: trailer }.into());
        }

        let payload_len = end - 1;
        if payload_len > self.max_frame_length {
            return Err(FramingError::OversizedFrame {
                size: payload_len,
                max: self.max_frame_length,
            }
            .into());
        }

        let block = src.split_to(end + 2).freeze();
        Ok(Some(block.slice(1..end)))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // Clean close: no data remaining at a block boundary.
        if src.is_empty() {
            return Ok(None);
        }

        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            // Data remains but no complete block can be formed: the peer
            // disconnected mid-block.
            None => Err(EofError::MidFrame {
                bytes_buffered: src.len(),
            }
            .into()),
        }
    }
}

impl Encoder<Bytes> for MllpCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if item.len() > self.max_frame_length {
            return Err(FramingError::OversizedFrame {
                size: item.len(),
                max: self.max_frame_length,
            }
            .into());
        }
        dst.reserve(item.len() + 3);
        dst.put_u8(START_OF_BLOCK);
        dst.put_slice(&item);
        dst.put_u8(END_OF_BLOCK);
        dst.put_u8(CARRIAGE_RETURN);
        Ok(())
    }
}

#[cfg(test)]
mod tests;
