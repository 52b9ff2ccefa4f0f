use super::{SocketFactory, TSocket};
use crate::icmp::v4::Ttl;
use socket2::{Domain, Protocol, Type};
use std::io::{self, Read};
use std::time::Duration;

/// Shortest read timeout handed to the socket. socket2 truncates to whole
/// microseconds, and a zero `timeval` disables the timeout altogether.
const MIN_READ_TIMEOUT: Duration = Duration::from_micros(1);

/// Raw ICMPv4 socket. Reads return the whole IPv4 datagram, header included.
///
/// Opening one requires root or `CAP_NET_RAW`.
pub(crate) struct RawSocket {
    socket: socket2::Socket,
}

impl RawSocket {
    pub(crate) fn new(ttl: Option<Ttl>) -> Result<Self, io::Error> {
        tracing::trace!("creating RawSocket");
        let socket = socket2::Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4))?;
        if let Some(ttl) = ttl {
            socket.set_ttl(ttl.into())?;
        }
        Ok(RawSocket { socket })
    }
}

impl TSocket for RawSocket {
    fn send_to(&self, buf: &[u8], addr: &socket2::SockAddr) -> io::Result<usize> {
        self.socket.send_to(buf, addr)
    }

    fn recv_datagram(&self, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
        self.socket.set_read_timeout(Some(read_timeout(timeout)))?;
        (&self.socket).read(buf)
    }
}

fn read_timeout(timeout: Duration) -> Duration {
    timeout.max(MIN_READ_TIMEOUT)
}

impl Drop for RawSocket {
    fn drop(&mut self) {
        tracing::trace!("closing RawSocket");
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct RawSocketFactory;

impl SocketFactory for RawSocketFactory {
    type Socket = RawSocket;

    fn open(&self, ttl: Option<Ttl>) -> io::Result<RawSocket> {
        RawSocket::new(ttl)
    }
}
