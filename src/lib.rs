//! A minimal offline-mode Minecraft: Java Edition server.
//!
//! It speaks just enough of the 1.20.1 protocol to appear in a client's
//! server list and to let a player log in without account verification:
//!
//! * **Status.** The server list entry (version, player counts, MOTD) is
//!   sent as JSON and the client's ping is echoed back.
//! * **Login.** The player name is mapped to a deterministic offline UUID,
//!   login success is acknowledged, and the initial join packet with the
//!   dimension registry is sent. Nothing beyond that is simulated.
//!
//! Every accepted TCP connection runs its own [`session::Session`] on a
//! separate task; sessions share no state. [`server::Server`] owns the
//! listener and a cancellation token used for shutdown.

pub mod config;
pub mod connection;
pub mod error;
pub mod identity;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod session;

pub use config::ServerConfig;
pub use error::SessionError;
pub use server::Server;
