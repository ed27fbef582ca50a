use crate::protocol::{Decode, DecodeError, Decoder, Encode, Encoder};
use minecraft_offline_server_macros::{Decode, Encode};

#[derive(Debug, Clone, Encode, Decode, strum::AsRefStr)]
#[encoding(discriminant = "varint")]
pub enum Packet {
    #[encoding(id = 0x00)]
    LoginStart(LoginStart),
    #[encoding(id = 0x01)]
    LoginPluginRequest(LoginPluginRequest),
    #[encoding(id = 0x06)]
    LoginPluginResponse(LoginPluginResponse),
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct LoginStart {
    pub name: String,
    /// Whatever newer clients append after the name (e.g. a profile
    /// UUID). Kept opaque; the identity is always derived offline.
    #[encoding(length_prefix = "inferred")]
    pub profile_data: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct LoginPluginRequest {
    #[encoding(varint)]
    pub transaction_id: i32,
}

/// Answer to a plugin transaction. Sent in both directions with the
/// same layout; the message follows only when `success` is false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPluginResponse {
    pub transaction_id: i32,
    pub success: bool,
    pub failure_message: Option<String>,
}

impl LoginPluginResponse {
    pub fn accepted(transaction_id: i32) -> Self {
        Self {
            transaction_id,
            success: true,
            failure_message: None,
        }
    }
}

impl Encode for LoginPluginResponse {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_var_int(self.transaction_id);
        encoder.write_bool(self.success);
        if !self.success {
            encoder.write_string(self.failure_message.as_deref().unwrap_or_default());
        }
    }
}

impl Decode for LoginPluginResponse {
    fn decode(decoder: &mut Decoder) -> Result<Self, DecodeError> {
        let transaction_id = decoder.read_var_int()?;
        let success = decoder.read_bool()?;
        let failure_message = if success {
            None
        } else {
            Some(decoder.read_string()?.to_owned())
        };
        Ok(Self {
            transaction_id,
            success,
            failure_message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::encode_to_vec;

    #[test]
    fn login_start_tolerates_trailing_profile_data() {
        let mut bytes = vec![0x00, 0x05];
        bytes.extend_from_slice(b"Steve");
        bytes.extend_from_slice(&[0x01; 17]);

        let Packet::LoginStart(start) = Packet::decode(&mut Decoder::new(&bytes)).unwrap() else {
            panic!("expected LoginStart");
        };
        assert_eq!(start.name, "Steve");
        assert_eq!(start.profile_data.len(), 17);
    }

    #[test]
    fn plugin_response_carries_message_only_on_failure() {
        let accepted = encode_to_vec(&Packet::LoginPluginResponse(
            LoginPluginResponse::accepted(300),
        ));
        assert_eq!(accepted, [0x06, 0xac, 0x02, 0x01]);

        let failed = [0x06, 0x07, 0x00, 0x03, b'n', b'a', b'y'];
        let Packet::LoginPluginResponse(response) =
            Packet::decode(&mut Decoder::new(&failed)).unwrap()
        else {
            panic!("expected LoginPluginResponse");
        };
        assert_eq!(response.transaction_id, 7);
        assert!(!response.success);
        assert_eq!(response.failure_message.as_deref(), Some("nay"));
    }

    #[test]
    fn unknown_packet_id_is_reported() {
        assert!(matches!(
            Packet::decode(&mut Decoder::new(&[0x03])),
            Err(DecodeError::UnknownDiscriminant(3))
        ));
    }
}
