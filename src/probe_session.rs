use crate::clock::{Clock, MonotonicClock};
use crate::echo_transport::EchoTransport;
use crate::icmp::v4::socket::raw_socket::RawSocketFactory;
use crate::icmp::v4::socket::SocketFactory;
use crate::icmp::v4::SequenceNumber;
use crate::{resolver, PingError, PingResult, ProbeAttempt, ProbeConfig, ProbeOutcome, ProbeSummary};
use std::error::Error;
use std::fmt;
use std::net::Ipv4Addr;

/// A session that ended on a fatal fault, with the statistics of the attempts
/// made before it.
#[derive(Debug)]
pub struct ProbeAbort {
    pub error: PingError,
    pub summary: ProbeSummary,
}

impl fmt::Display for ProbeAbort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "probe session aborted after {} attempt(s): {}", self.summary.sent, self.error)
    }
}

impl Error for ProbeAbort {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}

/// Sequential echo probing of one host over raw ICMP sockets.
pub struct ProbeSession(Session<RawSocketFactory, MonotonicClock>);

impl ProbeSession {
    /// Validates `config` and resolves its host. Nothing is sent yet.
    pub fn new(config: ProbeConfig) -> PingResult<Self> {
        config.validate()?;
        let destination = resolver::lookup_host_v4(&config.host)?;
        tracing::debug!("resolved {} to {}", config.host, destination);
        let transport = EchoTransport::new(RawSocketFactory, MonotonicClock);
        Ok(ProbeSession(Session::new(config, destination, transport)))
    }

    #[must_use]
    pub fn destination(&self) -> Ipv4Addr {
        self.0.destination
    }

    #[must_use]
    pub fn config(&self) -> &ProbeConfig {
        &self.0.config
    }

    /// Sends `count` echo requests one after the other, handing every attempt
    /// to `on_attempt` as soon as it completes.
    pub fn run(&mut self, on_attempt: impl FnMut(&ProbeAttempt)) -> Result<ProbeSummary, ProbeAbort> {
        self.0.run(on_attempt)
    }

    #[must_use]
    pub fn attempts(&self) -> &[ProbeAttempt] {
        &self.0.attempts
    }

    #[must_use]
    pub fn summary(&self) -> ProbeSummary {
        self.0.summary()
    }
}

pub(crate) struct Session<F, C> {
    config: ProbeConfig,
    destination: Ipv4Addr,
    transport: EchoTransport<F, C>,
    attempts: Vec<ProbeAttempt>,
}

impl<F, C> Session<F, C>
where
    F: SocketFactory,
    C: Clock,
{
    pub(crate) fn new(config: ProbeConfig, destination: Ipv4Addr, transport: EchoTransport<F, C>) -> Self {
        Session { config, destination, transport, attempts: vec![] }
    }

    pub(crate) fn run<O>(&mut self, mut on_attempt: O) -> Result<ProbeSummary, ProbeAbort>
    where
        O: FnMut(&ProbeAttempt),
    {
        self.attempts.clear();
        let mut sequence_number = SequenceNumber::start_value();

        for index in 0..self.config.count {
            if index > 0 {
                self.transport.clock().sleep(self.config.interval);
            }

            let attempt = match self.transport.send_echo(
                self.destination,
                self.config.timeout,
                sequence_number,
                self.config.payload_size,
                self.config.ttl,
            ) {
                Ok(attempt) => attempt,
                Err(error) => {
                    tracing::error!("probing {} aborted: {}", self.destination, error);
                    return Err(self.abort(error));
                }
            };
            tracing::debug!("attempt {} to {}: {:?}", sequence_number, self.destination, attempt.outcome);

            on_attempt(&attempt);
            let fault = match &attempt.outcome {
                ProbeOutcome::Error(reason) => Some(reason.clone()),
                ProbeOutcome::Success { .. } | ProbeOutcome::Timeout => None,
            };
            self.attempts.push(attempt);

            if let Some(reason) = fault {
                tracing::error!("probing {} aborted: {}", self.destination, reason);
                return Err(self.abort(PingError::new(format!("echo request {sequence_number} failed: {reason}"))));
            }
            sequence_number = sequence_number.next();
        }

        Ok(self.summary())
    }

    pub(crate) fn summary(&self) -> ProbeSummary {
        ProbeSummary::from_attempts(&self.attempts)
    }

    fn abort(&self, error: PingError) -> ProbeAbort {
        ProbeAbort { error, summary: self.summary() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::tests::ManualClock;
    use crate::icmp::v4::socket::tests::{OnOpen, OnReceive, OnSend, SocketFactoryMock};
    use more_asserts as ma;
    use std::time::Duration;

    fn reply(rtt_ms: u64) -> OnReceive {
        OnReceive::Reply { rtt: Duration::from_millis(rtt_ms), ttl: 64 }
    }

    fn config(count: u16, interval: Duration) -> ProbeConfig {
        ProbeConfig { count, interval, ..ProbeConfig::new("127.0.0.1") }
    }

    fn session(
        config: ProbeConfig,
        socket_factory: &SocketFactoryMock,
        clock: &ManualClock,
    ) -> Session<SocketFactoryMock, ManualClock> {
        let transport = EchoTransport::new(socket_factory.clone(), clock.clone());
        Session::new(config, Ipv4Addr::LOCALHOST, transport)
    }

    #[test]
    fn every_sequence_number_is_attempted_once_in_order() {
        let clock = ManualClock::new();
        let socket_factory = SocketFactoryMock::replying(&[reply(5), OnReceive::ReturnWouldBlock, reply(7), reply(9)])
            .with_clock(&clock);
        let mut session = session(config(4, Duration::from_secs(1)), &socket_factory, &clock);

        let mut reported = vec![];
        let summary = session.run(|attempt| reported.push(attempt.sequence_number)).unwrap();

        assert_eq!(4, summary.sent);
        assert_eq!(3, summary.received);
        ma::assert_le!(summary.received, summary.sent);
        assert!((summary.loss_pct - 25.0).abs() < f64::EPSILON);
        let expected: Vec<SequenceNumber> = (1..=4u16).map(SequenceNumber::from).collect();
        assert_eq!(expected, reported);
        assert_eq!(expected, session.attempts.iter().map(|a| a.sequence_number).collect::<Vec<_>>());
        socket_factory
            .should_open_number_of_sockets(4)
            .should_close_every_socket()
            .should_send_number_of_messages(4)
            .should_send_to_address(&std::net::IpAddr::V4(Ipv4Addr::LOCALHOST));
    }

    #[test]
    fn rtt_statistics() {
        let clock = ManualClock::new();
        let socket_factory = SocketFactoryMock::replying(&[reply(10), reply(30), reply(20)]).with_clock(&clock);
        let mut session = session(config(3, Duration::from_millis(100)), &socket_factory, &clock);

        let summary = session.run(|_| {}).unwrap();

        assert!((summary.min_rtt.unwrap() - 10.0).abs() < 1e-6);
        assert!((summary.max_rtt.unwrap() - 30.0).abs() < 1e-6);
        assert!((summary.avg_rtt - 20.0).abs() < 1e-6);
    }

    #[test]
    fn all_attempts_time_out() {
        let clock = ManualClock::new();
        let socket_factory = SocketFactoryMock::replying(&[]);
        let mut session = session(config(4, Duration::from_secs(1)), &socket_factory, &clock);

        let summary = session.run(|_| {}).unwrap();

        assert_eq!(4, summary.sent);
        assert_eq!(0, summary.received);
        assert!((summary.loss_pct - 100.0).abs() < f64::EPSILON);
        assert_eq!(None, summary.min_rtt);
        assert_eq!(None, summary.max_rtt);
        assert!(summary.avg_rtt.abs() < f64::EPSILON);
    }

    #[test]
    fn interval_separates_attempts() {
        let clock = ManualClock::new();
        let socket_factory = SocketFactoryMock::replying(&[reply(1), reply(1), reply(1)]).with_clock(&clock);
        let mut session = session(config(3, Duration::from_secs(1)), &socket_factory, &clock);

        session.run(|_| {}).unwrap();

        // No pause after the final attempt.
        assert_eq!(vec![Duration::from_secs(1); 2], clock.sleeps());
        let first = session.attempts[0].sent_at;
        let third = session.attempts[2].sent_at;
        ma::assert_ge!(third - first, Duration::from_secs(2));
    }

    #[test]
    fn interval_separates_attempts_in_wall_clock_time() {
        let interval = Duration::from_millis(20);
        let socket_factory = SocketFactoryMock::replying(&[reply(0), reply(0), reply(0)]);
        let transport = EchoTransport::new(socket_factory.clone(), MonotonicClock);
        let mut session = Session::new(config(3, interval), Ipv4Addr::LOCALHOST, transport);

        session.run(|_| {}).unwrap();

        let send_times = socket_factory.send_times();
        assert_eq!(3, send_times.len());
        ma::assert_ge!(send_times[2] - send_times[0], interval * 2);
    }

    #[test]
    fn denied_socket_aborts_before_the_first_attempt() {
        let clock = ManualClock::new();
        let socket_factory = SocketFactoryMock::new(OnOpen::ReturnPermissionDenied, OnSend::ReturnDefault, &[]);
        let mut session = session(config(4, Duration::from_secs(1)), &socket_factory, &clock);

        let mut reported = 0;
        let abort = session.run(|_| reported += 1).unwrap_err();

        assert_eq!(0, reported);
        assert_eq!(0, abort.summary.sent);
        assert!(abort.error.source.is_some());
        assert!(clock.sleeps().is_empty());
        socket_factory.should_send_number_of_messages(0);
    }

    #[test]
    fn unreachable_destination_aborts_with_partial_summary() {
        let clock = ManualClock::new();
        let socket_factory =
            SocketFactoryMock::replying(&[reply(4), OnReceive::Unreachable, reply(4)]).with_clock(&clock);
        let mut session = session(config(4, Duration::from_secs(1)), &socket_factory, &clock);

        let mut reported = vec![];
        let abort = session.run(|attempt| reported.push(attempt.clone())).unwrap_err();

        assert_eq!(2, reported.len());
        assert!(reported[1].is_error());
        assert_eq!(2, abort.summary.sent);
        assert_eq!(1, abort.summary.received);
        assert_eq!(abort.summary, session.summary());
        assert!(abort.to_string().contains("destination unreachable"));
        socket_factory.should_send_number_of_messages(2).should_have_pending_receives(1);
    }

    #[test]
    fn timeout_beyond_instant_range_does_not_overflow() {
        let clock = ManualClock::new();
        let socket_factory = SocketFactoryMock::replying(&[reply(1)]).with_clock(&clock);
        let config = ProbeConfig { count: 1, timeout: Duration::MAX, ..ProbeConfig::new("127.0.0.1") };
        assert!(config.validate().is_ok());
        let mut session = session(config, &socket_factory, &clock);

        let summary = session.run(|_| {}).unwrap();

        assert_eq!(1, summary.received);
    }

    #[test]
    fn zero_count_sends_nothing() {
        let clock = ManualClock::new();
        let socket_factory = SocketFactoryMock::replying(&[]);
        let mut session = session(config(0, Duration::from_secs(1)), &socket_factory, &clock);

        let summary = session.run(|_| {}).unwrap();

        assert_eq!(0, summary.sent);
        assert!(summary.loss_pct.abs() < f64::EPSILON);
        socket_factory.should_open_number_of_sockets(0);
    }

    #[test]
    fn rerun_starts_over() {
        let clock = ManualClock::new();
        let socket_factory = SocketFactoryMock::replying(&[reply(1), reply(1)]).with_clock(&clock);
        let mut session = session(config(2, Duration::from_millis(10)), &socket_factory, &clock);

        session.run(|_| {}).unwrap();
        let summary = session.run(|_| {}).unwrap();

        assert_eq!(2, summary.sent);
        assert_eq!(0, summary.received);
        assert_eq!(SequenceNumber::start_value(), session.attempts[0].sequence_number);
    }

    #[test]
    fn new_session_resolves_literal_address() {
        let session = ProbeSession::new(ProbeConfig::new("127.0.0.1")).unwrap();

        assert_eq!(Ipv4Addr::LOCALHOST, session.destination());
        assert!(session.attempts().is_empty());
        assert_eq!(0, session.summary().sent);
    }

    #[test]
    fn new_session_rejects_invalid_config() {
        let config = ProbeConfig { timeout: Duration::ZERO, ..ProbeConfig::new("127.0.0.1") };
        assert!(ProbeSession::new(config).is_err());
    }
}
