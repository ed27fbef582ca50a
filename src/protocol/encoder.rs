use crate::protocol::var_int;
use uuid::Uuid;

/// Appends protocol-encoded values to a byte buffer.
#[derive(Debug)]
pub struct Encoder<'a> {
    buffer: &'a mut Vec<u8>,
}

impl<'a> Encoder<'a> {
    /// Creates an encoder that will append to the provided
    /// byte buffer.
    ///
    /// Any existing contents of `buffer` are left untouched.
    pub fn new(buffer: &'a mut Vec<u8>) -> Self {
        Self { buffer }
    }

    pub fn write_u8(&mut self, x: u8) {
        self.buffer.push(x);
    }

    pub fn write_i8(&mut self, x: i8) {
        self.write_u8(bytemuck::cast(x));
    }

    pub fn write_u16(&mut self, x: u16) {
        self.buffer.extend(x.to_be_bytes());
    }

    pub fn write_i32(&mut self, x: i32) {
        self.buffer.extend(x.to_be_bytes());
    }

    pub fn write_i64(&mut self, x: i64) {
        self.buffer.extend(x.to_be_bytes());
    }

    pub fn write_f32(&mut self, x: f32) {
        self.buffer.extend(x.to_be_bytes());
    }

    pub fn write_bool(&mut self, x: bool) {
        self.write_u8(if x { 0x01 } else { 0x00 });
    }

    /// Writes a series of bytes to the stream. Does not write
    /// any sort of length prefix.
    pub fn write_slice(&mut self, slice: &[u8]) {
        self.buffer.extend_from_slice(slice);
    }

    /// Writes a VarInt to the stream. Returns the number of bytes written.
    pub fn write_var_int(&mut self, x: i32) -> usize {
        var_int::encode(x, self.buffer)
    }

    /// Writes a varint-prefixed string to the stream.
    pub fn write_string(&mut self, x: &str) {
        self.write_var_int(x.len().try_into().unwrap_or(i32::MAX));
        self.buffer.extend_from_slice(x.as_bytes());
    }
}

/// A type that can be written to an [`Encoder`].
pub trait Encode {
    fn encode(&self, encoder: &mut Encoder);
}

impl Encode for u8 {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_u8(*self);
    }
}

impl Encode for i8 {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_i8(*self);
    }
}

impl Encode for u16 {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_u16(*self);
    }
}

impl Encode for i32 {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_i32(*self);
    }
}

impl Encode for i64 {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_i64(*self);
    }
}

impl Encode for f32 {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_f32(*self);
    }
}

impl Encode for bool {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_bool(*self);
    }
}

impl Encode for String {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_string(self);
    }
}

/// UUIDs go on the wire as their 16 raw bytes, most significant first.
impl Encode for Uuid {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_slice(self.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_are_var_int_prefixed() {
        let mut buf = Vec::new();
        Encoder::new(&mut buf).write_string("Steve");
        assert_eq!(buf, [0x05, b'S', b't', b'e', b'v', b'e']);
    }

    #[test]
    fn appends_to_existing_contents() {
        let mut buf = vec![0xaa];
        let mut encoder = Encoder::new(&mut buf);
        encoder.write_u16(25565);
        encoder.write_i8(-1);
        encoder.write_f32(1.0);
        assert_eq!(buf, [0xaa, 0x63, 0xdd, 0xff, 0x3f, 0x80, 0x00, 0x00]);
    }
}
