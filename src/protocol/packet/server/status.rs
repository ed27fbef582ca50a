use minecraft_offline_server_macros::{Decode, Encode, FromVariants};

#[derive(Debug, Clone, Encode, Decode, FromVariants, strum::AsRefStr)]
#[encoding(discriminant = "varint")]
pub enum Packet {
    #[encoding(id = 0x00)]
    StatusResponse(StatusResponse),
    #[encoding(id = 0x01)]
    PingResponse(PingResponse),
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct StatusResponse {
    /// Server list JSON document.
    pub json: String,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct PingResponse {
    pub payload: i64,
}
