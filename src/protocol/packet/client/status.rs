use minecraft_offline_server_macros::{Decode, Encode};

#[derive(Debug, Clone, Encode, Decode, strum::AsRefStr)]
#[encoding(discriminant = "varint")]
pub enum Packet {
    #[encoding(id = 0x00)]
    StatusRequest(StatusRequest),
    #[encoding(id = 0x01)]
    PingRequest(PingRequest),
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct StatusRequest;

#[derive(Debug, Clone, Encode, Decode)]
pub struct PingRequest {
    /// Opaque to the server; echoed back unchanged.
    pub payload: i64,
}
