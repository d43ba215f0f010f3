//! Acknowledgement codes and the outcome-to-code policy.
//!
//! Every processed frame yields exactly one [`AckCode`]. The mapping from a
//! frame's processing outcome to its code is a pure function with no access
//! to the connection or the bus, so it can be tested in isolation.

/// Three-valued HL7 acknowledgement code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AckCode {
    /// Application Accept (`AA`): parsed and forwarded successfully.
    #[default]
    Accept,
    /// Application Reject (`AR`): the frame could not be parsed.
    Reject,
    /// Application Error (`AE`): parsed, but downstream delivery failed.
    Error,
}

impl AckCode {
    /// Return the two-letter wire representation used in the MSA segment.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "AA",
            Self::Reject => "AR",
            Self::Error => "AE",
        }
    }
}

impl std::fmt::Display for AckCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a frame's processing outcome to its acknowledgement code.
///
/// `forward_ok` is `None` when forwarding was never attempted, which only
/// happens when parsing failed. A parse failure always wins over the
/// forwarding outcome.
#[must_use]
pub fn code_for_outcome(parse_ok: bool, forward_ok: Option<bool>) -> AckCode {
    match (parse_ok, forward_ok) {
        (false, _) => AckCode::Reject,
        (true, Some(false)) => AckCode::Error,
        (true, _) => AckCode::Accept,
    }
}
