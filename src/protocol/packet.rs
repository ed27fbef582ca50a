//! The packet table. Each protocol state has one enum per direction,
//! whose variants carry the packet ID used on the wire.
//!
//! `client` holds serverbound packets (sent by the client) and `server`
//! holds clientbound packets (sent by this server).

use crate::protocol::{Decode, Discriminated, Encode};
use std::fmt::Debug;

pub mod client;
pub mod server;

/// Type encoding for a protocol state.
pub trait ProtocolState: Send + Sync + 'static {
    /// Packet type sent by the server in this state.
    type ServerPacket: Encode + Decode + Debug + AsRef<str> + Send + 'static;
    /// Packet type sent by the client in this state.
    type ClientPacket: Encode + Decode + Discriminated + Debug + AsRef<str> + Send + 'static;
}

pub mod state {
    use super::*;
    use minecraft_offline_server_macros::{Decode, Encode};

    #[derive(Debug, Copy, Clone)]
    pub struct Handshake;
    impl ProtocolState for Handshake {
        type ServerPacket = EmptyPacket;
        type ClientPacket = client::handshake::Packet;
    }

    /// Placeholder for a direction in which no packets are exchanged.
    #[derive(Encode, Decode, Debug, Clone)]
    pub struct EmptyPacket;

    /// Every incoming ID is unknown where no packets are expected.
    impl Discriminated for EmptyPacket {
        fn has_discriminant(_: i64) -> bool {
            false
        }
    }

    impl AsRef<str> for EmptyPacket {
        fn as_ref(&self) -> &str {
            ""
        }
    }

    #[derive(Debug, Copy, Clone)]
    pub struct Status;
    impl ProtocolState for Status {
        type ServerPacket = server::status::Packet;
        type ClientPacket = client::status::Packet;
    }

    #[derive(Debug, Copy, Clone)]
    pub struct Login;
    impl ProtocolState for Login {
        type ServerPacket = server::login::Packet;
        type ClientPacket = client::login::Packet;
    }

    /// Entered after a successful login. Only the initial join packet is
    /// sent; nothing from the client is read.
    #[derive(Debug, Copy, Clone)]
    pub struct Play;
    impl ProtocolState for Play {
        type ServerPacket = server::play::Packet;
        type ClientPacket = EmptyPacket;
    }
}
