#![warn(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

//! Host diagnostics: ICMP echo probing with round-trip statistics, plus name
//! resolution, WHOIS lookup and a TCP port sweep to run after the probe.
//!
//! Probing uses raw ICMP sockets and needs root or `CAP_NET_RAW`.

pub use icmp::v4::{SequenceNumber, Ttl};
pub use ping_error::{GenericError, PingError, PingResult};
pub use port_sweep::{PortProbe, PortProbes, PortState, PortSweep, SweepConfig};
pub use probe_attempt::{ProbeAttempt, ProbeOutcome};
pub use probe_config::ProbeConfig;
pub use probe_session::{ProbeAbort, ProbeSession};
pub use probe_summary::ProbeSummary;
pub use resolver::Resolution;
pub use whois::{whois_lookup, WhoisConfig};

mod clock;
mod echo_transport;
pub mod icmp;
mod ping_error;
mod port_sweep;
mod probe_attempt;
mod probe_config;
mod probe_session;
mod probe_summary;
pub mod resolver;
mod whois;
