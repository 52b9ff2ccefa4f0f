use crate::ProbeAttempt;
use std::fmt;

/// Round-trip statistics over a sequence of attempts, in milliseconds.
#[derive(Clone, Debug, PartialEq)]
pub struct ProbeSummary {
    pub sent: usize,
    pub received: usize,
    pub loss_pct: f64,
    /// `None` when nothing was received.
    pub min_rtt: Option<f64>,
    /// `None` when nothing was received.
    pub max_rtt: Option<f64>,
    /// 0 when nothing was received.
    pub avg_rtt: f64,
}

impl ProbeSummary {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_attempts(attempts: &[ProbeAttempt]) -> Self {
        let rtts: Vec<f64> = attempts.iter().filter_map(ProbeAttempt::rtt_ms).collect();
        let sent = attempts.len();
        let received = rtts.len();

        let loss_pct = if sent == 0 { 0.0 } else { (sent - received) as f64 / sent as f64 * 100.0 };
        let avg_rtt = if received == 0 { 0.0 } else { rtts.iter().sum::<f64>() / received as f64 };

        ProbeSummary {
            sent,
            received,
            loss_pct,
            min_rtt: rtts.iter().copied().reduce(f64::min),
            max_rtt: rtts.iter().copied().reduce(f64::max),
            avg_rtt,
        }
    }

    #[must_use]
    pub fn lost(&self) -> usize {
        self.sent - self.received
    }
}

impl fmt::Display for ProbeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Packets: Sent = {}, Received = {}, Lost = {} ({:.1}% loss)",
            self.sent,
            self.received,
            self.lost(),
            self.loss_pct
        )?;
        writeln!(f, "Approximate round trip times in milli-seconds:")?;
        write!(
            f,
            "Minimum = {:.0}ms, Maximum = {:.0}ms, Average = {:.0}ms",
            self.min_rtt.unwrap_or_default(),
            self.max_rtt.unwrap_or_default(),
            self.avg_rtt
        )
    }
}
