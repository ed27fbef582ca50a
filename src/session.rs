//! Drives one client connection from the handshake until it is served
//! (status) or joined (login).
//!
//! ```text
//! Handshake --next_state=1--> Status --ping/pong--> closed
//!           --next_state=2--> Login  --LoginStart--> LoginSuccess, JoinGame, closed
//! ```
//!
//! Anything unexpected ends the session with a [`SessionError`]; the caller
//! drops the stream afterwards, which closes the socket.

use crate::{
    config::ServerConfig,
    connection::{Connection, Received},
    error::SessionError,
    identity::offline_uuid,
    protocol::{
        packet::{
            client, client::handshake::NextState, server, server::play::GameMode, state,
        },
        PROTOCOL_VERSION, VERSION_NAME,
    },
    registry,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    time::timeout,
};
use uuid::Uuid;

/// Longest player name accepted at login, in characters.
pub const MAX_NAME_LENGTH: usize = 16;

/// How a session ended when it ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Server list information was served.
    Status,
    /// A player logged in and was sent into the world.
    Joined { username: String, uuid: Uuid },
}

pub struct Session<Io> {
    state: State<Io>,
    config: Arc<ServerConfig>,
}

impl<Io> Session<Io>
where
    Io: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(io: Io, config: Arc<ServerConfig>) -> Self {
        Self {
            state: State::Handshake(HandshakeState {
                connection: Connection::new(io),
            }),
            config,
        }
    }

    pub async fn run(mut self) -> Result<Outcome, SessionError> {
        loop {
            self.state = match self.state {
                State::Handshake(handshake) => handshake.until_next_state().await?,
                State::Status(status) => {
                    status.serve(&self.config).await?;
                    return Ok(Outcome::Status);
                }
                State::Login(login) => return login.login(&self.config).await,
            };
        }
    }
}

enum State<Io> {
    Handshake(HandshakeState<Io>),
    Status(StatusState<Io>),
    Login(LoginState<Io>),
}

struct HandshakeState<Io> {
    connection: Connection<Io, state::Handshake>,
}

impl<Io> HandshakeState<Io>
where
    Io: AsyncRead + AsyncWrite + Unpin,
{
    async fn until_next_state(mut self) -> Result<State<Io>, SessionError> {
        let handshake = match self.connection.recv_packet().await {
            Ok(Received::Packet(client::handshake::Packet::Handshake(handshake))) => handshake,
            Ok(Received::Unknown { id }) => {
                return Err(SessionError::ProtocolViolation(format!(
                    "expected handshake, got packet {id:#04x}"
                )))
            }
            Err(SessionError::Decode(e)) => {
                return Err(SessionError::ProtocolViolation(format!(
                    "invalid handshake: {e}"
                )))
            }
            Err(e) => return Err(e),
        };

        tracing::debug!(
            protocol_version = handshake.protocol_version,
            server_address = %handshake.server_address,
            server_port = handshake.server_port,
            next_state = ?handshake.next_state,
            "Received handshake"
        );
        if handshake.protocol_version != PROTOCOL_VERSION {
            tracing::debug!(
                "Client speaks protocol {}, expected {PROTOCOL_VERSION}",
                handshake.protocol_version
            );
        }

        match handshake.next_state {
            NextState::Status => {
                tracing::debug!("Transition to Status state");
                Ok(State::Status(StatusState {
                    connection: self.connection.switch_state(),
                }))
            }
            NextState::Login => {
                tracing::debug!("Transition to Login state");
                Ok(State::Login(LoginState {
                    connection: self.connection.switch_state(),
                }))
            }
        }
    }
}

struct StatusState<Io> {
    connection: Connection<Io, state::Status>,
}

impl<Io> StatusState<Io>
where
    Io: AsyncRead + AsyncWrite + Unpin,
{
    /// Sends the server list entry, answers one ping, and returns.
    async fn serve(mut self, config: &ServerConfig) -> Result<(), SessionError> {
        self.connection
            .send_packet(server::status::StatusResponse {
                json: status_json(config),
            })
            .await?;

        let mut saw_request = false;
        loop {
            match self.connection.recv_packet().await? {
                Received::Packet(client::status::Packet::StatusRequest(_)) if !saw_request => {
                    saw_request = true;
                }
                Received::Packet(client::status::Packet::PingRequest(ping)) => {
                    self.connection
                        .send_packet(server::status::PingResponse {
                            payload: ping.payload,
                        })
                        .await?;
                    return Ok(());
                }
                Received::Packet(packet) => {
                    return Err(SessionError::ProtocolViolation(format!(
                        "unexpected {} in status",
                        packet.as_ref()
                    )))
                }
                Received::Unknown { id } => {
                    return Err(SessionError::ProtocolViolation(format!(
                        "unknown packet {id:#04x} in status"
                    )))
                }
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ServerListEntry<'a> {
    version: VersionInfo<'a>,
    players: PlayerCounts,
    description: Description<'a>,
}

#[derive(Debug, Serialize)]
struct VersionInfo<'a> {
    name: &'a str,
    protocol: i32,
}

#[derive(Debug, Serialize)]
struct PlayerCounts {
    max: i32,
    online: i32,
}

#[derive(Debug, Serialize)]
struct Description<'a> {
    text: &'a str,
}

/// The JSON document shown in the client's server list.
pub fn status_json(config: &ServerConfig) -> String {
    let entry = ServerListEntry {
        version: VersionInfo {
            name: VERSION_NAME,
            protocol: PROTOCOL_VERSION,
        },
        players: PlayerCounts {
            max: config.max_players,
            online: 0,
        },
        description: Description { text: &config.motd },
    };
    // Only strings and integers; serialization cannot fail.
    serde_json::to_string(&entry).unwrap_or_default()
}

struct LoginState<Io> {
    connection: Connection<Io, state::Login>,
}

impl<Io> LoginState<Io>
where
    Io: AsyncRead + AsyncWrite + Unpin,
{
    /// Waits for `LoginStart`, answering plugin traffic meanwhile, then
    /// admits the player.
    ///
    /// Each read gets the full login timeout, so the deadline restarts
    /// whenever a packet arrives.
    async fn login(mut self, config: &ServerConfig) -> Result<Outcome, SessionError> {
        let start = loop {
            let received = timeout(config.login_timeout(), self.connection.recv_packet())
                .await
                .map_err(|_| SessionError::LoginTimeout)??;

            match received {
                Received::Packet(client::login::Packet::LoginStart(start)) => break start,
                Received::Packet(client::login::Packet::LoginPluginRequest(request)) => {
                    tracing::debug!(
                        transaction_id = request.transaction_id,
                        "Answering login plugin request"
                    );
                    self.connection
                        .send_packet(server::login::LoginPluginResponse::accepted(
                            request.transaction_id,
                        ))
                        .await?;
                }
                Received::Packet(client::login::Packet::LoginPluginResponse(response)) => {
                    tracing::debug!(
                        transaction_id = response.transaction_id,
                        success = response.success,
                        message = response.failure_message.as_deref(),
                        "Received login plugin response"
                    );
                }
                Received::Unknown { id } => {
                    tracing::debug!("Ignoring unknown login packet {id:#04x}");
                }
            }
        };

        if start.name.chars().count() > MAX_NAME_LENGTH {
            return Err(SessionError::ProtocolViolation(format!(
                "player name {:?} is longer than {MAX_NAME_LENGTH} characters",
                start.name
            )));
        }

        let uuid = offline_uuid(&start.name);
        tracing::info!("{} logging in with UUID {uuid}", start.name);

        self.connection
            .send_packet(server::login::LoginSuccess {
                uuid,
                username: start.name.clone(),
            })
            .await?;

        tracing::debug!("Transition to Play state");
        let mut connection = self.connection.switch_state::<state::Play>();
        connection.send_packet(join_game(config)).await?;

        Ok(Outcome::Joined {
            username: start.name,
            uuid,
        })
    }
}

/// The join packet describing the single overworld every player spawns in.
pub fn join_game(config: &ServerConfig) -> server::play::JoinGame {
    server::play::JoinGame {
        entity_id: 0,
        is_hardcore: false,
        game_mode: GameMode::Survival,
        previous_game_mode: -1,
        dimension_names: vec![registry::OVERWORLD.to_owned()],
        registry_codec: registry::dimension_codec(),
        dimension: registry::OVERWORLD.to_owned(),
        hashed_seed: 0,
        max_players: config.max_players,
        view_distance: config.view_distance,
        simulation_distance: config.simulation_distance,
        reduced_debug_info: false,
        enable_respawn_screen: true,
        is_debug: false,
        is_flat: false,
        death_location: None,
        portal_cooldown: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::encode_to_vec;

    #[test]
    fn status_json_reports_version_and_capacity() {
        let json: serde_json::Value =
            serde_json::from_str(&status_json(&ServerConfig::default())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "version": { "name": "1.20.1", "protocol": 763 },
                "players": { "max": 20, "online": 0 },
                "description": { "text": "A Minecraft Server" },
            })
        );
    }

    #[test]
    fn motd_is_escaped() {
        let config = ServerConfig {
            motd: "say \"hi\"".to_owned(),
            ..ServerConfig::default()
        };
        let json: serde_json::Value = serde_json::from_str(&status_json(&config)).unwrap();
        assert_eq!(json["description"]["text"], "say \"hi\"");
    }

    #[test]
    fn join_game_layout() {
        let packet = encode_to_vec(&server::play::Packet::JoinGame(join_game(
            &ServerConfig::default(),
        )));
        // ID, entity ID, hardcore, game mode, previous game mode, one dimension name
        assert_eq!(&packet[..9], [0x26, 0, 0, 0, 0, 0, 0, 0xff, 0x01]);
        assert_eq!(packet[9] as usize, registry::OVERWORLD.len());

        let codec = encode_to_vec(&registry::dimension_codec());
        let codec_start = 10 + registry::OVERWORLD.len();
        assert_eq!(&packet[codec_start..codec_start + codec.len()], codec);

        let mut tail = vec![registry::OVERWORLD.len() as u8];
        tail.extend_from_slice(registry::OVERWORLD.as_bytes());
        tail.extend_from_slice(&[0; 8]); // hashed seed
        tail.extend_from_slice(&[20, 10, 10]); // max players, view and simulation distance
        tail.extend_from_slice(&[0, 1, 0, 0, 0]); // flags, no death location
        tail.push(0); // portal cooldown
        assert_eq!(&packet[codec_start + codec.len()..], tail);
    }
}
