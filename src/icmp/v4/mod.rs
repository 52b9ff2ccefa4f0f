pub mod checksum;
pub mod echo_codec;
mod sequence_number;
pub(crate) mod socket;
mod ttl;

pub use echo_codec::{DecodeError, EchoReply, EchoRequest};
pub use sequence_number::SequenceNumber;
pub use ttl::Ttl;
