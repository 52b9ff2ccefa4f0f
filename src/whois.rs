use crate::{resolver, PingError, PingResult};
use std::io::{Read, Write};
use std::net::{IpAddr, SocketAddr, TcpStream};
use std::time::Duration;

#[allow(clippy::module_name_repetitions)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WhoisConfig {
    pub server: String,
    pub port: u16,
    /// Bounds the connect and every read or write on the connection.
    pub timeout: Duration,
}

impl Default for WhoisConfig {
    fn default() -> Self {
        WhoisConfig { server: "whois.iana.org".to_owned(), port: 43, timeout: Duration::from_secs(10) }
    }
}

/// Queries the WHOIS server for `host` and returns the raw response text.
pub fn whois_lookup(config: &WhoisConfig, host: &str) -> PingResult<String> {
    let server = resolver::resolve(&config.server)?;
    let server_ip: IpAddr = server
        .ipv4
        .first()
        .map(|ip| IpAddr::V4(*ip))
        .or_else(|| server.ipv6.first().map(|ip| IpAddr::V6(*ip)))
        .ok_or_else(|| PingError::new(format!("no address for WHOIS server {}", config.server)))?;
    let addr = SocketAddr::new(server_ip, config.port);

    tracing::debug!("WHOIS query for {} to {}", host, addr);
    let mut stream = TcpStream::connect_timeout(&addr, config.timeout)
        .map_err(|e| PingError::with_source(format!("could not connect to WHOIS server {addr}"), e))?;
    stream.set_read_timeout(Some(config.timeout))?;
    stream.set_write_timeout(Some(config.timeout))?;

    stream.write_all(format!("{host}\r\n").as_bytes())?;
    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .map_err(|e| PingError::with_source(format!("reading WHOIS response from {addr} failed"), e))?;
    tracing::trace!("WHOIS response of {} bytes", response.len());

    Ok(String::from_utf8_lossy(&response).into_owned())
}
