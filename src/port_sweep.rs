use crate::{PingError, PingResult};
use std::fmt;
use std::net::{IpAddr, SocketAddr, TcpStream};
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SweepConfig {
    pub start_port: u16,
    pub end_port: u16,
    /// Per-port TCP connect timeout.
    pub connect_timeout: Duration,
    /// Number of ports probed at the same time by `PortSweep::run`.
    pub workers: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig { start_port: 1, end_port: u16::MAX, connect_timeout: Duration::from_secs(1), workers: 32 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortState {
    Open,
    Closed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortProbe {
    pub port: u16,
    pub state: PortState,
}

impl fmt::Display for PortProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state {
            PortState::Open => write!(f, "Port {}: Open", self.port),
            PortState::Closed => write!(f, "Port {}: Closed", self.port),
        }
    }
}

/// TCP connect sweep over a port range of one address.
#[derive(Clone, Debug)]
pub struct PortSweep {
    addr: IpAddr,
    ports: RangeInclusive<u16>,
    connect_timeout: Duration,
    workers: usize,
}

impl PortSweep {
    pub fn new(addr: IpAddr, config: &SweepConfig) -> PingResult<Self> {
        if config.start_port > config.end_port {
            return Err(PingError::new(format!(
                "start port {} is greater than end port {}",
                config.start_port, config.end_port
            )));
        }
        if config.workers == 0 {
            return Err(PingError::new("port sweep needs at least one worker"));
        }
        Ok(PortSweep {
            addr,
            ports: config.start_port..=config.end_port,
            connect_timeout: config.connect_timeout,
            workers: config.workers,
        })
    }

    /// Probes the ports one at a time, in ascending order, as the iterator is
    /// advanced. Every call starts over at the first port.
    #[must_use]
    pub fn probes(&self) -> PortProbes {
        PortProbes { addr: self.addr, ports: self.ports.clone(), connect_timeout: self.connect_timeout }
    }

    /// Probes every port with up to `workers` concurrent connects. The result
    /// is sorted by port.
    #[must_use]
    pub fn run(&self) -> Vec<PortProbe> {
        let next_port = AtomicU32::new(u32::from(*self.ports.start()));
        let end_port = u32::from(*self.ports.end());
        let port_count = usize::from(*self.ports.end() - *self.ports.start()) + 1;
        let workers = self.workers.min(port_count);
        tracing::debug!("sweeping {} port(s) of {} with {} worker(s)", port_count, self.addr, workers);

        let (tx, rx) = mpsc::channel::<PortProbe>();
        let mut probes: Vec<PortProbe> = std::thread::scope(|scope| {
            for _ in 0..workers {
                let tx = tx.clone();
                let next_port = &next_port;
                scope.spawn(move || loop {
                    let port = next_port.fetch_add(1, Ordering::Relaxed);
                    if port > end_port {
                        break;
                    }
                    let Ok(port) = u16::try_from(port) else { break };
                    if tx.send(probe_port(self.addr, port, self.connect_timeout)).is_err() {
                        break;
                    }
                });
            }
            drop(tx);
            rx.iter().collect()
        });

        probes.sort_by_key(|probe| probe.port);
        probes
    }

    #[must_use]
    pub fn open_ports(&self) -> Vec<u16> {
        self.run().into_iter().filter(|probe| probe.state == PortState::Open).map(|probe| probe.port).collect()
    }
}

pub struct PortProbes {
    addr: IpAddr,
    ports: RangeInclusive<u16>,
    connect_timeout: Duration,
}

impl Iterator for PortProbes {
    type Item = PortProbe;

    fn next(&mut self) -> Option<PortProbe> {
        let port = self.ports.next()?;
        Some(probe_port(self.addr, port, self.connect_timeout))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ports.size_hint()
    }
}

fn probe_port(addr: IpAddr, port: u16, connect_timeout: Duration) -> PortProbe {
    let state = match TcpStream::connect_timeout(&SocketAddr::new(addr, port), connect_timeout) {
        Ok(_) => PortState::Open,
        Err(e) => {
            tracing::trace!("port {} of {} closed: {}", port, addr, e);
            PortState::Closed
        }
    };
    PortProbe { port, state }
}
