//! Wire format of the Java Edition protocol, as far as the handshake,
//! status and login phases need it.

/// Protocol number of the supported game version.
pub const PROTOCOL_VERSION: i32 = 763;
/// Version string reported in the server list.
pub const VERSION_NAME: &str = "1.20.1";

mod decoder;
mod encoder;
pub mod frame;
pub mod nbt;
pub mod packet;
pub mod var_int;

pub use decoder::{Decode, DecodeError, Decoder, Discriminated};
pub use encoder::{Encode, Encoder};

/// Limit to avoid out-of-memory DOS.
const BUFFER_LIMIT: usize = 1024 * 1024; // 1 MiB

/// Encodes a packet body (ID included) into a fresh buffer.
pub fn encode_to_vec(packet: &impl Encode) -> Vec<u8> {
    let mut buffer = Vec::new();
    packet.encode(&mut Encoder::new(&mut buffer));
    buffer
}
