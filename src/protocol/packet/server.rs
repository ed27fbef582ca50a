//! Clientbound packets.

pub mod login;
pub mod play;
pub mod status;
