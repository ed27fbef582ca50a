use minecraft_offline_server_macros::{Decode, Encode, FromVariants};
use uuid::Uuid;

pub use crate::protocol::packet::client::login::LoginPluginResponse;

#[derive(Debug, Clone, Encode, Decode, FromVariants, strum::AsRefStr)]
#[encoding(discriminant = "varint")]
pub enum Packet {
    #[encoding(id = 0x02)]
    LoginSuccess(LoginSuccess),
    #[encoding(id = 0x06)]
    LoginPluginResponse(LoginPluginResponse),
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct LoginSuccess {
    pub uuid: Uuid,
    pub username: String,
}
