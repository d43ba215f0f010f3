//! Shared test support: fake forwarders and MLLP helpers.

use std::io;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::time::Duration;

use hl7_bridge::{
    Forward,
    ForwardError,
    codec::{CARRIAGE_RETURN, END_OF_BLOCK, START_OF_BLOCK},
};

/// Sample ADT^A01 admission message with control ID `MSG00001`.
pub const ADT_A01: &str = include_str!("../fixtures/adt_a01.hl7");

/// Wrap a payload in the MLLP block envelope.
#[must_use]
pub fn mllp(payload: &str) -> Vec<u8> {
    let mut block = Vec::with_capacity(payload.len() + 3);
    block.push(START_OF_BLOCK);
    block.extend_from_slice(payload.as_bytes());
    block.push(END_OF_BLOCK);
    block.push(CARRIAGE_RETURN);
    block
}

/// Split a byte stream of MLLP blocks back into payload strings.
///
/// Panics on malformed framing so tests fail loudly.
#[must_use]
pub fn unwrap_blocks(mut bytes: &[u8]) -> Vec<String> {
    let mut payloads = Vec::new();
    while !bytes.is_empty() {
        assert_eq!(bytes[0], START_OF_BLOCK, "block does not start with <VT>");
        let end = bytes
            .iter()
            .position(|&b| b == END_OF_BLOCK)
            .expect("block is missing <FS>");
        assert_eq!(bytes.get(end + 1), Some(&CARRIAGE_RETURN), "missing <CR>");
        payloads.push(String::from_utf8(bytes[1..end].to_vec()).expect("payload is UTF-8"));
        bytes = &bytes[end + 2..];
    }
    payloads
}

enum Behaviour {
    Accept,
    Fail,
    /// Accept after sleeping; one duration per call, reused when exhausted.
    Delay(Vec<Duration>),
}

/// Full-interface [`Forward`] fake recording every forwarded message.
pub struct RecordingForwarder {
    sent: Mutex<Vec<String>>,
    behaviour: Behaviour,
}

impl RecordingForwarder {
    /// Forwarder that accepts every message.
    #[must_use]
    pub fn accepting() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            behaviour: Behaviour::Accept,
        }
    }

    /// Forwarder that fails every request with a transport error.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            behaviour: Behaviour::Fail,
        }
    }

    /// Forwarder that accepts after a per-call delay, to simulate bus
    /// latency.
    #[must_use]
    pub fn delayed(delays: Vec<Duration>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            behaviour: Behaviour::Delay(delays),
        }
    }

    /// Messages forwarded so far, in call order.
    #[must_use]
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().expect("forwarder lock poisoned").clone()
    }

    /// Number of forward calls made so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.sent.lock().expect("forwarder lock poisoned").len()
    }
}

#[async_trait]
impl Forward for RecordingForwarder {
    async fn forward(&self, message: &str) -> Result<(), ForwardError> {
        let call_index = {
            let mut sent = self.sent.lock().expect("forwarder lock poisoned");
            sent.push(message.to_owned());
            sent.len() - 1
        };
        match &self.behaviour {
            Behaviour::Accept => Ok(()),
            Behaviour::Fail => Err(ForwardError::Request {
                subject: "hl7.tenant1.inbound".to_owned(),
                source: Box::new(io::Error::other("no responders")),
            }),
            Behaviour::Delay(delays) => {
                let delay = delays
                    .get(call_index)
                    .or_else(|| delays.last())
                    .copied()
                    .unwrap_or_default();
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }
}
