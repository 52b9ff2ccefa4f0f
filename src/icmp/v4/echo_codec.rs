use super::checksum::checksum;
use super::{SequenceNumber, Ttl};
use pnet_packet::icmp::echo_reply::EchoReplyPacket;
use pnet_packet::icmp::echo_request::{EchoRequestPacket, MutableEchoRequestPacket};
use pnet_packet::icmp::{IcmpCode, IcmpType, IcmpTypes};
use pnet_packet::ipv4::Ipv4Packet;
use pnet_packet::Packet;
use rand::Rng;
use std::fmt;

/// Length of an IPv4 header without options.
pub const IPV4_HEADER_LEN: usize = 20;
pub const ICMP_HEADER_LEN: usize = 8;
/// Smallest datagram `decode` accepts.
pub const MIN_DATAGRAM_LEN: usize = IPV4_HEADER_LEN + ICMP_HEADER_LEN;
/// Largest payload an echo request can carry inside one IPv4 datagram.
pub const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize - MIN_DATAGRAM_LEN;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EchoRequest {
    pub identifier: u16,
    pub sequence_number: SequenceNumber,
    pub payload: Vec<u8>,
}

impl EchoRequest {
    /// Request carrying `payload_size` bytes of random filler.
    #[must_use]
    pub fn with_filler(identifier: u16, sequence_number: SequenceNumber, payload_size: usize) -> Self {
        let mut payload = vec![0u8; payload_size];
        rand::thread_rng().fill(&mut payload[..]);
        EchoRequest { identifier, sequence_number, payload }
    }

    #[must_use]
    pub fn encode(&self) -> Option<Vec<u8>> {
        encode(self.identifier, self.sequence_number, &self.payload)
    }
}

/// Serializes an echo request: type 8, code 0, checksum, identifier and
/// sequence number (all big-endian) followed by the payload.
#[must_use]
pub fn encode(identifier: u16, sequence_number: SequenceNumber, payload: &[u8]) -> Option<Vec<u8>> {
    let buf = vec![0u8; EchoRequestPacket::minimum_packet_size() + payload.len()];
    let mut package = MutableEchoRequestPacket::owned(buf)?;
    package.set_icmp_type(IcmpTypes::EchoRequest);
    package.set_icmp_code(IcmpCode(0));
    package.set_identifier(identifier);
    package.set_sequence_number(sequence_number.into());
    package.set_payload(payload);

    package.set_checksum(0_u16);
    let checksum = checksum(package.packet());
    package.set_checksum(checksum);
    Some(package.packet().to_vec())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    Truncated { len: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Truncated { len } => {
                write!(f, "datagram of {len} bytes is shorter than {MIN_DATAGRAM_LEN} bytes")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// An inbound ICMP message as read from a raw socket.
///
/// Besides echo replies a raw ICMP socket also delivers every other ICMP
/// message addressed to the host, so `icmp_type` is not necessarily
/// `EchoReply`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EchoReply {
    pub icmp_type: IcmpType,
    pub icmp_code: IcmpCode,
    pub checksum: u16,
    pub identifier: u16,
    pub sequence_number: SequenceNumber,
    pub ttl: Ttl,
    pub payload: Vec<u8>,
}

impl EchoReply {
    /// True for an echo reply to the request tagged with `identifier` and
    /// `sequence_number`.
    #[must_use]
    pub fn answers(&self, identifier: u16, sequence_number: SequenceNumber) -> bool {
        self.icmp_type == IcmpTypes::EchoReply
            && self.icmp_code == IcmpCode(0)
            && self.identifier == identifier
            && self.sequence_number == sequence_number
    }

    /// Identifier and sequence number of the echo request quoted by an ICMP
    /// error report (destination unreachable, time exceeded).
    #[must_use]
    pub fn quoted_request(&self) -> Option<(u16, SequenceNumber)> {
        if self.icmp_type != IcmpTypes::DestinationUnreachable && self.icmp_type != IcmpTypes::TimeExceeded {
            return None;
        }
        let quoted_ip = Ipv4Packet::new(&self.payload)?;
        let quoted_header_len = usize::from(quoted_ip.get_header_length()) * 4;
        let quoted_icmp = EchoRequestPacket::new(self.payload.get(quoted_header_len..)?)?;
        if quoted_icmp.get_icmp_type() != IcmpTypes::EchoRequest {
            return None;
        }
        Some((quoted_icmp.get_identifier(), quoted_icmp.get_sequence_number().into()))
    }

    /// Human-readable reason for an ICMP error report.
    #[must_use]
    pub fn error_reason(&self) -> Option<String> {
        if self.icmp_type == IcmpTypes::DestinationUnreachable {
            Some(format!("destination unreachable (code {})", self.icmp_code.0))
        } else if self.icmp_type == IcmpTypes::TimeExceeded {
            Some("time to live exceeded in transit".to_owned())
        } else {
            None
        }
    }
}

/// Parses a raw IPv4 datagram carrying an ICMP message. The IP header is
/// taken to be exactly 20 bytes long.
pub fn decode(datagram: &[u8]) -> Result<EchoReply, DecodeError> {
    let truncated = DecodeError::Truncated { len: datagram.len() };
    if datagram.len() < MIN_DATAGRAM_LEN {
        return Err(truncated);
    }
    let ttl = Ttl(Ipv4Packet::new(datagram).ok_or(truncated)?.get_ttl());
    let icmp = EchoReplyPacket::new(&datagram[IPV4_HEADER_LEN..]).ok_or(truncated)?;

    Ok(EchoReply {
        icmp_type: icmp.get_icmp_type(),
        icmp_code: icmp.get_icmp_code(),
        checksum: icmp.get_checksum(),
        identifier: icmp.get_identifier(),
        sequence_number: icmp.get_sequence_number().into(),
        ttl,
        payload: icmp.payload().to_vec(),
    })
}
