use crate::icmp::v4::Ttl;
use std::{io, time::Duration};

pub(crate) mod raw_socket;

pub(crate) trait TSocket {
    fn send_to(&self, buf: &[u8], addr: &socket2::SockAddr) -> io::Result<usize>;
    /// Reads one datagram, blocking for at most `timeout`. A timeout surfaces
    /// as `WouldBlock` or `TimedOut` depending on the platform.
    fn recv_datagram(&self, buf: &mut [u8], timeout: Duration) -> io::Result<usize>;
}

/// Opens one socket per echo attempt.
pub(crate) trait SocketFactory {
    type Socket: TSocket;

    fn open(&self, ttl: Option<Ttl>) -> io::Result<Self::Socket>;
}
