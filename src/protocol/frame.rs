//! Packet framing: every frame is `VarInt(length) || payload`.
//!
//! [`FrameCodec`] plugs into `tokio_util::codec::Framed`. Incoming bytes
//! are buffered until a whole payload has arrived, so a partially
//! received frame is never handed to the caller.

use super::{var_int, BUFFER_LIMIT};
use bytes::{Buf, BytesMut};
use std::io;
use tokio_util::codec;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("frame length prefix is not a valid VarInt")]
    MalformedLength,
    #[error("negative frame length {0}")]
    NegativeLength(i32),
    #[error("frame length of {0} exceeds maximum allowed")]
    TooLarge(usize),
    /// The peer closed the stream with `buffered` bytes of an unfinished frame.
    #[error("stream closed with {buffered} bytes of an incomplete frame")]
    ClosedMidFrame { buffered: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Splits a byte stream into payloads and prefixes outgoing payloads with their length.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    max_length: usize,
}

impl FrameCodec {
    pub fn new() -> Self {
        Self::with_max_length(BUFFER_LIMIT)
    }

    pub fn with_max_length(max_length: usize) -> Self {
        Self { max_length }
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl codec::Decoder for FrameCodec {
    type Item = BytesMut;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let (length, prefix_size) = match var_int::decode(&src[..]) {
            Ok(decoded) => decoded,
            Err(var_int::VarIntError::Incomplete) => return Ok(None),
            Err(var_int::VarIntError::TooLong) => return Err(FrameError::MalformedLength),
        };
        let length = usize::try_from(length).map_err(|_| FrameError::NegativeLength(length))?;
        if length > self.max_length {
            return Err(FrameError::TooLarge(length));
        }

        let total = prefix_size + length;
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }

        src.advance(prefix_size);
        Ok(Some(src.split_to(length)))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None if src.is_empty() => Ok(None),
            None => Err(FrameError::ClosedMidFrame {
                buffered: src.len(),
            }),
        }
    }
}

impl codec::Encoder<Vec<u8>> for FrameCodec {
    type Error = FrameError;

    fn encode(&mut self, payload: Vec<u8>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if payload.len() > self.max_length {
            return Err(FrameError::TooLarge(payload.len()));
        }
        let length = i32::try_from(payload.len()).map_err(|_| FrameError::TooLarge(payload.len()))?;

        let mut prefix = Vec::with_capacity(var_int::MAX_SIZE);
        var_int::encode(length, &mut prefix);

        dst.reserve(prefix.len() + payload.len());
        dst.extend_from_slice(&prefix);
        dst.extend_from_slice(&payload);
        Ok(())
    }
}
