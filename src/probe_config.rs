use crate::icmp::v4::echo_codec::MAX_PAYLOAD_SIZE;
use crate::icmp::v4::Ttl;
use crate::{PingError, PingResult};
use std::time::Duration;

#[allow(clippy::module_name_repetitions)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Host name or literal IPv4 address.
    pub host: String,
    pub count: u16,
    /// How long each attempt waits for its reply.
    pub timeout: Duration,
    pub payload_size: usize,
    /// `None` keeps the system default.
    pub ttl: Option<Ttl>,
    /// Pause between two attempts.
    pub interval: Duration,
}

impl ProbeConfig {
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        ProbeConfig { host: host.into(), ..ProbeConfig::default() }
    }

    pub(crate) fn validate(&self) -> PingResult<()> {
        if self.timeout.is_zero() {
            return Err(PingError::new("timeout must be greater than zero"));
        }
        if self.payload_size > MAX_PAYLOAD_SIZE {
            return Err(PingError::new(format!(
                "payload size {} exceeds the maximum of {MAX_PAYLOAD_SIZE} bytes",
                self.payload_size
            )));
        }
        Ok(())
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            host: String::new(),
            count: 4,
            timeout: Duration::from_secs(1),
            payload_size: 32,
            ttl: None,
            interval: Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ProbeConfig::new("example.com");

        assert_eq!("example.com", config.host);
        assert_eq!(4, config.count);
        assert_eq!(Duration::from_secs(1), config.timeout);
        assert_eq!(32, config.payload_size);
        assert_eq!(None, config.ttl);
        assert_eq!(Duration::from_secs(1), config.interval);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = ProbeConfig { timeout: Duration::ZERO, ..ProbeConfig::new("127.0.0.1") };
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let mut config = ProbeConfig::new("127.0.0.1");
        config.payload_size = MAX_PAYLOAD_SIZE;
        assert!(config.validate().is_ok());
        config.payload_size = MAX_PAYLOAD_SIZE + 1;
        assert!(config.validate().is_err());
    }
}
