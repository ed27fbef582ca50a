use crate::protocol::nbt::Nbt;
use minecraft_offline_server_macros::{Decode, Encode, FromVariants};

#[derive(Debug, Clone, Encode, Decode, FromVariants, strum::AsRefStr)]
#[encoding(discriminant = "varint")]
pub enum Packet {
    #[encoding(id = 0x26)]
    JoinGame(JoinGame),
}

/// First packet of the play phase, describing the world the player joins.
#[derive(Debug, Clone, Encode, Decode)]
pub struct JoinGame {
    pub entity_id: i32,
    pub is_hardcore: bool,
    pub game_mode: GameMode,
    /// `-1` when there is no previous game mode.
    pub previous_game_mode: i8,
    #[encoding(length_prefix = "varint")]
    pub dimension_names: Vec<String>,
    /// Dimension type and biome registries.
    pub registry_codec: Nbt,
    pub dimension: String,
    /// First 8 bytes of the SHA-256 of the world seed; zero when unknown.
    pub hashed_seed: i64,
    /// Ignored by current clients.
    #[encoding(varint)]
    pub max_players: i32,
    #[encoding(varint)]
    pub view_distance: i32,
    #[encoding(varint)]
    pub simulation_distance: i32,
    pub reduced_debug_info: bool,
    pub enable_respawn_screen: bool,
    pub is_debug: bool,
    pub is_flat: bool,
    #[encoding(bool_prefixed)]
    pub death_location: Option<DeathLocation>,
    #[encoding(varint)]
    pub portal_cooldown: i32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Encode, Decode)]
#[encoding(discriminant = "byte")]
pub enum GameMode {
    #[encoding(id = 0)]
    Survival,
    #[encoding(id = 1)]
    Creative,
    #[encoding(id = 2)]
    Adventure,
    #[encoding(id = 3)]
    Spectator,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct DeathLocation {
    pub dimension_name: String,
    /// Packed block position.
    pub position: i64,
}
