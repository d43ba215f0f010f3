//! Unit tests for the MLLP block codec.
//!
//! Covers block extraction, delimiter violations, oversized payload
//! rejection, and EOF handling behaviour.

use bytes::{Bytes, BytesMut};
use rstest::rstest;

use super::{
    CARRIAGE_RETURN,
    CodecError,
    END_OF_BLOCK,
    EofError,
    FramingError,
    MAX_FRAME_LENGTH,
    MIN_FRAME_LENGTH,
    MllpCodec,
    START_OF_BLOCK,
};
use tokio_util::codec::{Decoder, Encoder};

fn block(payload: &[u8]) -> BytesMut {
    let mut buf = BytesMut::new();
    buf.extend_from_slice(&[START_OF_BLOCK]);
    buf.extend_from_slice(payload);
    buf.extend_from_slice(&[END_OF_BLOCK, CARRIAGE_RETURN]);
    buf
}

#[test]
fn clamps_max_frame_length() {
    let codec = MllpCodec::new(MAX_FRAME_LENGTH.saturating_add(1));
    assert_eq!(codec.max_frame_length(), MAX_FRAME_LENGTH);
    let codec = MllpCodec::new(0);
    assert_eq!(codec.max_frame_length(), MIN_FRAME_LENGTH);
}

#[test]
fn decodes_a_complete_block() {
    let mut codec = MllpCodec::default();
    let mut buf = block(b"MSH|^~\\&|A|B");

    let frame = codec
        .decode(&mut buf)
        .expect("decode should succeed")
        .expect("expected a frame");
    assert_eq!(frame.as_ref(), b"MSH|^~\\&|A|B");
    assert!(buf.is_empty());
}

#[test]
fn decodes_back_to_back_blocks_in_order() {
    let mut codec = MllpCodec::default();
    let mut buf = block(b"one");
    buf.extend_from_slice(&block(b"two"));

    let first = codec.decode(&mut buf).expect("decode").expect("frame");
    let second = codec.decode(&mut buf).expect("decode").expect("frame");
    assert_eq!(first.as_ref(), b"one");
    assert_eq!(second.as_ref(), b"two");
    assert_eq!(codec.decode(&mut buf).expect("decode"), None);
}

#[test]
fn waits_for_more_data_on_partial_block() {
    let mut codec = MllpCodec::default();

    let mut buf = BytesMut::from(&[START_OF_BLOCK, b'M', b'S'][..]);
    assert_eq!(codec.decode(&mut buf).expect("decode"), None);

    // End-of-block present but trailer still outstanding.
    buf.extend_from_slice(&[b'H', END_OF_BLOCK]);
    assert_eq!(codec.decode(&mut buf).expect("decode"), None);

    buf.extend_from_slice(&[CARRIAGE_RETURN]);
    let frame = codec.decode(&mut buf).expect("decode").expect("frame");
    assert_eq!(frame.as_ref(), b"MSH");
}

#[test]
fn rejects_data_outside_a_block() {
    let mut codec = MllpCodec::default();
    let mut buf = BytesMut::from(&b"MSH|no start byte"[..]);

    let err = codec.decode(&mut buf).expect_err("decode should fail");
    assert!(matches!(
        err,
        CodecError::Framing(FramingError::MissingStartByte { byte: b'M' })
    ));
}

#[test]
fn rejects_missing_trailer() {
    let mut codec = MllpCodec::default();
    let mut buf = BytesMut::from(&[START_OF_BLOCK, b'X', END_OF_BLOCK, b'Y'][..]);

    let err = codec.decode(&mut buf).expect_err("decode should fail");
    assert!(matches!(
        err,
        CodecError::Framing(FramingError::MissingTrailer { byte: b'Y' })
    ));
}

#[rstest]
#[case::terminated(true)]
#[case::unterminated(false)]
fn rejects_oversized_payloads(#[case] terminated: bool) {
    let mut codec = MllpCodec::new(MIN_FRAME_LENGTH);
    let payload = vec![b'x'; MIN_FRAME_LENGTH + 1];
    let mut buf = if terminated {
        block(&payload)
    } else {
        let mut buf = BytesMut::from(&[START_OF_BLOCK][..]);
        buf.extend_from_slice(&payload);
        buf
    };

    let err = codec.decode(&mut buf).expect_err("decode should fail");
    assert!(matches!(
        err,
        CodecError::Framing(FramingError::OversizedFrame { .. })
    ));
}

#[test]
fn eof_on_empty_buffer_is_clean() {
    let mut codec = MllpCodec::default();
    let mut buf = BytesMut::new();
    assert_eq!(codec.decode_eof(&mut buf).expect("decode_eof"), None);
}

#[test]
fn eof_mid_block_reports_truncation() {
    let mut codec = MllpCodec::default();
    let mut buf = BytesMut::from(&[START_OF_BLOCK, b'M', b'S', b'H'][..]);

    let err = codec.decode_eof(&mut buf).expect_err("decode_eof should fail");
    assert!(matches!(
        err,
        CodecError::Eof(EofError::MidFrame { bytes_buffered: 4 })
    ));
    assert!(err.is_truncation());
}

#[test]
fn eof_with_final_complete_block_yields_the_block() {
    let mut codec = MllpCodec::default();
    let mut buf = block(b"final");

    let frame = codec
        .decode_eof(&mut buf)
        .expect("decode_eof should succeed")
        .expect("expected a frame");
    assert_eq!(frame.as_ref(), b"final");
    assert_eq!(codec.decode_eof(&mut buf).expect("decode_eof"), None);
}

#[test]
fn encodes_with_delimiters() {
    let mut codec = MllpCodec::default();
    let mut buf = BytesMut::new();

    codec
        .encode(Bytes::from_static(b"MSA|AA|1"), &mut buf)
        .expect("encode should succeed");
    assert_eq!(buf.first(), Some(&START_OF_BLOCK));
    assert_eq!(&buf[1..buf.len() - 2], b"MSA|AA|1");
    assert_eq!(&buf[buf.len() - 2..], &[END_OF_BLOCK, CARRIAGE_RETURN]);
}

#[test]
fn encode_rejects_oversized_payloads() {
    let mut codec = MllpCodec::new(MIN_FRAME_LENGTH);
    let mut buf = BytesMut::new();

    let payload = Bytes::from(vec![0_u8; MIN_FRAME_LENGTH + 1]);
    let err = codec.encode(payload, &mut buf).expect_err("encode should fail");
    assert!(matches!(
        err,
        CodecError::Framing(FramingError::OversizedFrame { .. })
    ));
    assert!(buf.is_empty());
}
