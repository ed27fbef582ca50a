use crate::protocol::{frame::FrameError, var_int::VarIntError, DecodeError};
use std::io;

/// Reasons a session ends early. Each one tears down only its own
/// connection.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("malformed VarInt")]
    MalformedVarInt,
    /// The peer went away. `mid_frame` is set when it left a frame unfinished.
    #[error("connection closed by peer (mid_frame: {mid_frame})")]
    ConnectionClosed { mid_frame: bool },
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
    #[error("login timed out waiting for the next packet")]
    LoginTimeout,
    #[error("failed to send packet: {0}")]
    SendFailed(#[source] io::Error),
    #[error("malformed packet: {0}")]
    Decode(#[source] DecodeError),
}

impl SessionError {
    /// Whether the session ended because the peer simply disconnected.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, SessionError::ConnectionClosed { .. })
    }
}

impl From<DecodeError> for SessionError {
    fn from(error: DecodeError) -> Self {
        match error {
            DecodeError::MalformedVarInt(_) => SessionError::MalformedVarInt,
            other => SessionError::Decode(other),
        }
    }
}

impl From<VarIntError> for SessionError {
    fn from(_: VarIntError) -> Self {
        SessionError::MalformedVarInt
    }
}

/// Maps a failure while reading a frame.
impl From<FrameError> for SessionError {
    fn from(error: FrameError) -> Self {
        match error {
            FrameError::MalformedLength
            | FrameError::NegativeLength(_)
            | FrameError::TooLarge(_) => SessionError::MalformedVarInt,
            FrameError::ClosedMidFrame { .. } => SessionError::ConnectionClosed { mid_frame: true },
            FrameError::Io(e) => {
                tracing::debug!("Read failed: {e}");
                SessionError::ConnectionClosed { mid_frame: false }
            }
        }
    }
}
