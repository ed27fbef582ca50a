//! Typed packet I/O over a framed byte stream.

use crate::{
    error::SessionError,
    protocol::{
        encode_to_vec,
        frame::{FrameCodec, FrameError},
        packet::ProtocolState,
        var_int, Decode, Decoder, Discriminated,
    },
};
use futures::{SinkExt, StreamExt};
use std::{io, marker::PhantomData};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;

/// A packet read from the peer.
#[derive(Debug)]
pub enum Received<P> {
    Packet(P),
    /// A well-framed packet whose ID has no entry in the current state's table.
    Unknown { id: i32 },
}

/// Sends and receives the packets of one protocol state.
///
/// The state is a type parameter, so only packets valid in the current
/// phase can be exchanged. Use [`Connection::switch_state`] on a phase
/// transition; buffered bytes carry over to the new state.
pub struct Connection<Io, State> {
    framed: Framed<Io, FrameCodec>,
    _state: PhantomData<State>,
}

impl<Io, State> Connection<Io, State>
where
    Io: AsyncRead + AsyncWrite + Unpin,
    State: ProtocolState,
{
    pub fn new(io: Io) -> Self {
        Self {
            framed: Framed::new(io, FrameCodec::new()),
            _state: PhantomData,
        }
    }

    /// Writes one packet and flushes it.
    pub async fn send_packet(
        &mut self,
        packet: impl Into<State::ServerPacket>,
    ) -> Result<(), SessionError> {
        let packet = packet.into();
        tracing::trace!("Sending {}", packet.as_ref());
        self.framed
            .send(encode_to_vec(&packet))
            .await
            .map_err(|e| match e {
                FrameError::Io(e) => SessionError::SendFailed(e),
                other => {
                    SessionError::SendFailed(io::Error::new(io::ErrorKind::InvalidInput, other))
                }
            })
    }

    /// Waits for the next whole packet.
    ///
    /// Returns [`SessionError::ConnectionClosed`] once the peer has shut
    /// its side of the stream.
    pub async fn recv_packet(&mut self) -> Result<Received<State::ClientPacket>, SessionError> {
        let frame = self
            .framed
            .next()
            .await
            .ok_or(SessionError::ConnectionClosed { mid_frame: false })??;

        let (id, _) = var_int::decode(&frame[..])?;
        if !State::ClientPacket::has_discriminant(id.into()) {
            return Ok(Received::Unknown { id });
        }

        let packet = State::ClientPacket::decode(&mut Decoder::new(&frame))?;
        tracing::trace!("Received {}", packet.as_ref());
        Ok(Received::Packet(packet))
    }

    pub fn switch_state<NewState: ProtocolState>(self) -> Connection<Io, NewState> {
        Connection {
            framed: self.framed,
            _state: PhantomData,
        }
    }
}
