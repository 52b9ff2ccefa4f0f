use crate::clock::Clock;
use crate::icmp::v4::echo_codec::{decode, EchoRequest, MIN_DATAGRAM_LEN};
use crate::icmp::v4::socket::{SocketFactory, TSocket};
use crate::icmp::v4::{SequenceNumber, Ttl};
use crate::{PingError, PingResult, ProbeAttempt, ProbeOutcome};
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

const RECV_BUFFER_MIN_SIZE: usize = 1024;

/// Sends single echo requests and waits for the correlated reply.
pub(crate) struct EchoTransport<F, C> {
    socket_factory: F,
    clock: C,
    identifier: u16,
}

impl<F, C> EchoTransport<F, C>
where
    F: SocketFactory,
    C: Clock,
{
    pub(crate) fn new(socket_factory: F, clock: C) -> Self {
        Self::with_identifier(socket_factory, clock, process_identifier())
    }

    pub(crate) fn with_identifier(socket_factory: F, clock: C, identifier: u16) -> Self {
        EchoTransport { socket_factory, clock, identifier }
    }

    pub(crate) fn clock(&self) -> &C {
        &self.clock
    }

    /// Runs one echo attempt on a socket opened for this call only.
    ///
    /// Only a socket that can not be opened is an `Err`; timeouts and
    /// send/receive faults are reported through the attempt's outcome.
    pub(crate) fn send_echo(
        &self,
        ipv4: Ipv4Addr,
        timeout: Duration,
        sequence_number: SequenceNumber,
        payload_size: usize,
        ttl: Option<Ttl>,
    ) -> PingResult<ProbeAttempt> {
        let socket = self
            .socket_factory
            .open(ttl)
            .map_err(|e| PingError::with_source("could not open raw ICMP socket", e))?;

        let request = EchoRequest::with_filler(self.identifier, sequence_number, payload_size);
        let packet = request.encode().ok_or_else(|| PingError::new("could not create ICMP package"))?;
        let addr: socket2::SockAddr = SocketAddr::new(IpAddr::V4(ipv4), 0).into();

        let sent_at = self.clock.now();
        let outcome = match socket.send_to(&packet, &addr) {
            Err(e) => {
                tracing::warn!("could not send echo request {} to {}: {}", sequence_number, ipv4, e);
                ProbeOutcome::Error(e.to_string())
            }
            Ok(_) => {
                tracing::trace!("icmpv4 sent");
                let mut buf = vec![0u8; RECV_BUFFER_MIN_SIZE.max(MIN_DATAGRAM_LEN + payload_size)];
                self.await_reply(&socket, &mut buf, sent_at, sent_at.checked_add(timeout), sequence_number)
            }
        };

        Ok(ProbeAttempt { sequence_number, ip_addr: ipv4, sent_at, outcome })
    }

    fn await_reply(
        &self,
        socket: &F::Socket,
        buf: &mut [u8],
        sent_at: Instant,
        deadline: Option<Instant>,
        sequence_number: SequenceNumber,
    ) -> ProbeOutcome {
        loop {
            // No deadline when the timeout reaches past what `Instant` can represent.
            let remaining = match deadline {
                Some(deadline) => deadline.saturating_duration_since(self.clock.now()),
                None => Duration::MAX,
            };
            if remaining.is_zero() {
                return ProbeOutcome::Timeout;
            }

            let n = match socket.recv_datagram(buf, remaining) {
                Ok(n) => n,
                Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                    return ProbeOutcome::Timeout;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!("receiving echo reply {} failed: {}", sequence_number, e);
                    return ProbeOutcome::Error(e.to_string());
                }
            };
            let received_at = self.clock.now();

            let reply = match decode(&buf[..n]) {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::debug!("discarding datagram: {}", e);
                    continue;
                }
            };

            if reply.answers(self.identifier, sequence_number) {
                tracing::trace!("icmpv4 received");
                let rtt = received_at.saturating_duration_since(sent_at);
                return ProbeOutcome::Success {
                    rtt_ms: rtt.as_secs_f64() * 1000.0,
                    bytes: reply.payload.len(),
                    ttl: reply.ttl,
                };
            }
            if reply.quoted_request() == Some((self.identifier, sequence_number)) {
                if let Some(reason) = reply.error_reason() {
                    return ProbeOutcome::Error(reason);
                }
            }
            tracing::trace!(
                "discarding ICMP type {} (identifier {}, sequence number {})",
                reply.icmp_type.0,
                reply.identifier,
                reply.sequence_number
            );
        }
    }
}

/// Identifier shared by every request this process sends.
#[allow(clippy::cast_possible_truncation)]
fn process_identifier() -> u16 {
    (std::process::id() & 0xFFFF) as u16
}
