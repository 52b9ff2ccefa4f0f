use crate::icmp::v4::{SequenceNumber, Ttl};
use std::fmt;
use std::net::Ipv4Addr;
use std::time::Instant;

#[derive(Clone, Debug, PartialEq)]
pub enum ProbeOutcome {
    Success { rtt_ms: f64, bytes: usize, ttl: Ttl },
    /// No correlated reply within the timeout. Counted as loss.
    Timeout,
    Error(String),
}

/// Result of one echo request.
#[derive(Clone, Debug, PartialEq)]
pub struct ProbeAttempt {
    pub sequence_number: SequenceNumber,
    pub ip_addr: Ipv4Addr,
    pub sent_at: Instant,
    pub outcome: ProbeOutcome,
}

impl ProbeAttempt {
    #[must_use]
    pub fn rtt_ms(&self) -> Option<f64> {
        match self.outcome {
            ProbeOutcome::Success { rtt_ms, .. } => Some(rtt_ms),
            ProbeOutcome::Timeout | ProbeOutcome::Error(_) => None,
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::Error(_))
    }
}

impl fmt::Display for ProbeAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            ProbeOutcome::Success { rtt_ms, bytes, ttl } => {
                write!(f, "Reply from {}: bytes={bytes} time={:.0}ms TTL={ttl}", self.ip_addr, rtt_ms.trunc())
            }
            ProbeOutcome::Timeout => write!(f, "Request timed out for {}", self.ip_addr),
            ProbeOutcome::Error(reason) => write!(f, "Request to {} failed: {reason}", self.ip_addr),
        }
    }
}
