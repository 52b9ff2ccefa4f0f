use crate::{PingError, PingResult};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// All addresses a host name resolves to, in resolver order, without
/// duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    pub host: String,
    pub ipv4: Vec<Ipv4Addr>,
    pub ipv6: Vec<Ipv6Addr>,
}

impl Resolution {
    fn from_addrs(host: &str, addrs: impl IntoIterator<Item = IpAddr>) -> Self {
        let mut resolution = Resolution { host: host.to_owned(), ..Resolution::default() };
        for addr in addrs {
            match addr {
                IpAddr::V4(ipv4) if !resolution.ipv4.contains(&ipv4) => resolution.ipv4.push(ipv4),
                IpAddr::V6(ipv6) if !resolution.ipv6.contains(&ipv6) => resolution.ipv6.push(ipv6),
                _ => {}
            }
        }
        resolution
    }

    #[must_use]
    pub fn primary_ipv4(&self) -> Option<Ipv4Addr> {
        self.ipv4.first().copied()
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IP Addresses for {}:", self.host)?;
        if !self.ipv4.is_empty() {
            write!(f, "\nIPv4 Addresses:")?;
            for ipv4 in &self.ipv4 {
                write!(f, "\n{ipv4}")?;
            }
        }
        if !self.ipv6.is_empty() {
            write!(f, "\nIPv6 Addresses:")?;
            for ipv6 in &self.ipv6 {
                write!(f, "\n{ipv6}")?;
            }
        }
        Ok(())
    }
}

/// Resolves `host` through the platform resolver. Literal addresses are
/// returned as they are.
pub fn resolve(host: &str) -> PingResult<Resolution> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(Resolution::from_addrs(host, [ip]));
    }
    let ips: Vec<IpAddr> = dns_lookup::lookup_host(host)
        .map_err(|e| PingError::with_source(format!("could not resolve host {host}"), e))?;
    tracing::trace!("{} resolved to {} address(es)", host, ips.len());
    Ok(Resolution::from_addrs(host, ips))
}

/// First IPv4 address of `host`.
pub fn lookup_host_v4(host: &str) -> PingResult<Ipv4Addr> {
    resolve(host)?
        .primary_ipv4()
        .ok_or_else(|| PingError::new(format!("could not resolve host {host} to IPv4")))
}

/// Reverse lookup of `ip`.
pub fn lookup_addr(ip: IpAddr) -> PingResult<String> {
    let hostname = dns_lookup::lookup_addr(&ip)
        .map_err(|e| PingError::with_source(format!("could not look up name of {ip}"), e))?;
    Ok(hostname)
}
