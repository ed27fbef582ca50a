//! Named Binary Tag trees, limited to the tag types the registry data needs.
//!
//! Trees are built declaratively from [`Tag`] values and written by a
//! single serializer. Compounds keep their insertion order, so the byte
//! output is fully determined by the order the tree was built in.
//!
//! Layout of a named entry: tag byte, `u16` name length, name bytes,
//! payload. Compounds end with a `TAG_End` byte; lists carry an element
//! tag byte and an `i32` count followed by unnamed payloads.

use crate::protocol::{Decode, DecodeError, Decoder, Encode, Encoder};

/// Nesting limit when reading untrusted data.
const MAX_DEPTH: usize = 512;

/// One-byte type code preceding every tag.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TagKind {
    End = 0,
    Byte = 1,
    Int = 3,
    Long = 4,
    Float = 5,
    String = 8,
    List = 9,
    Compound = 10,
}

impl TagKind {
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Some(match id {
            0 => Self::End,
            1 => Self::Byte,
            3 => Self::Int,
            4 => Self::Long,
            5 => Self::Float,
            8 => Self::String,
            9 => Self::List,
            10 => Self::Compound,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    Byte(i8),
    Int(i32),
    Long(i64),
    Float(f32),
    String(String),
    List(List),
    Compound(Compound),
}

impl Tag {
    pub fn kind(&self) -> TagKind {
        match self {
            Tag::Byte(_) => TagKind::Byte,
            Tag::Int(_) => TagKind::Int,
            Tag::Long(_) => TagKind::Long,
            Tag::Float(_) => TagKind::Float,
            Tag::String(_) => TagKind::String,
            Tag::List(_) => TagKind::List,
            Tag::Compound(_) => TagKind::Compound,
        }
    }
}

/// Booleans are stored as a byte, `1` or `0`.
impl From<bool> for Tag {
    fn from(value: bool) -> Self {
        Tag::Byte(value.into())
    }
}

impl From<i8> for Tag {
    fn from(value: i8) -> Self {
        Tag::Byte(value)
    }
}

impl From<i32> for Tag {
    fn from(value: i32) -> Self {
        Tag::Int(value)
    }
}

impl From<i64> for Tag {
    fn from(value: i64) -> Self {
        Tag::Long(value)
    }
}

impl From<f32> for Tag {
    fn from(value: f32) -> Self {
        Tag::Float(value)
    }
}

impl From<&str> for Tag {
    fn from(value: &str) -> Self {
        Tag::String(value.to_owned())
    }
}

impl From<String> for Tag {
    fn from(value: String) -> Self {
        Tag::String(value)
    }
}

impl From<List> for Tag {
    fn from(value: List) -> Self {
        Tag::List(value)
    }
}

impl From<Compound> for Tag {
    fn from(value: Compound) -> Self {
        Tag::Compound(value)
    }
}

/// A homogeneous list. The element kind is kept even when the list is
/// empty, since it is part of the encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    element: TagKind,
    items: Vec<Tag>,
}

impl List {
    /// Returns `None` if some item is not of kind `element`.
    pub fn new(element: TagKind, items: Vec<Tag>) -> Option<Self> {
        items
            .iter()
            .all(|item| item.kind() == element)
            .then_some(Self { element, items })
    }

    pub fn empty(element: TagKind) -> Self {
        Self {
            element,
            items: Vec::new(),
        }
    }

    pub fn compounds(items: impl IntoIterator<Item = Compound>) -> Self {
        Self {
            element: TagKind::Compound,
            items: items.into_iter().map(Tag::Compound).collect(),
        }
    }

    pub fn element(&self) -> TagKind {
        self.element
    }

    pub fn items(&self) -> &[Tag] {
        &self.items
    }
}

/// Ordered map of named tags.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Compound {
    entries: Vec<(String, Tag)>,
}

impl Compound {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert. A repeated name replaces the earlier value in place.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Tag>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Tag>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Tag> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, tag)| tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tag)> {
        self.entries.iter().map(|(name, tag)| (name.as_str(), tag))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A complete document: a root compound with a name (usually empty).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Nbt {
    pub name: String,
    pub root: Compound,
}

impl Nbt {
    pub fn new(name: impl Into<String>, root: Compound) -> Self {
        Self {
            name: name.into(),
            root,
        }
    }
}

fn write_name(encoder: &mut Encoder, name: &str) {
    let bytes = &name.as_bytes()[..name.len().min(u16::MAX as usize)];
    encoder.write_u16(bytes.len() as u16);
    encoder.write_slice(bytes);
}

fn write_payload(encoder: &mut Encoder, tag: &Tag) {
    match tag {
        Tag::Byte(value) => encoder.write_i8(*value),
        Tag::Int(value) => encoder.write_i32(*value),
        Tag::Long(value) => encoder.write_i64(*value),
        Tag::Float(value) => encoder.write_f32(*value),
        Tag::String(value) => write_name(encoder, value),
        Tag::List(list) => {
            encoder.write_u8(list.element.id());
            encoder.write_i32(list.items.len().try_into().unwrap_or(i32::MAX));
            for item in &list.items {
                write_payload(encoder, item);
            }
        }
        Tag::Compound(compound) => write_compound(encoder, compound),
    }
}

fn write_compound(encoder: &mut Encoder, compound: &Compound) {
    for (name, tag) in &compound.entries {
        encoder.write_u8(tag.kind().id());
        write_name(encoder, name);
        write_payload(encoder, tag);
    }
    encoder.write_u8(TagKind::End.id());
}

impl Encode for Nbt {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_u8(TagKind::Compound.id());
        write_name(encoder, &self.name);
        write_compound(encoder, &self.root);
    }
}

fn read_name(decoder: &mut Decoder) -> Result<String, DecodeError> {
    let length = usize::from(decoder.read_u16()?);
    let bytes = decoder.consume_slice(length)?;
    Ok(std::str::from_utf8(bytes)?.to_owned())
}

fn read_kind(decoder: &mut Decoder) -> Result<TagKind, DecodeError> {
    let id = decoder.read_u8()?;
    TagKind::from_id(id).ok_or(DecodeError::InvalidNbtTag(id))
}

fn read_payload(decoder: &mut Decoder, kind: TagKind, depth: usize) -> Result<Tag, DecodeError> {
    if depth > MAX_DEPTH {
        return Err(DecodeError::NbtTooDeep);
    }
    Ok(match kind {
        TagKind::End => return Err(DecodeError::InvalidNbtTag(TagKind::End.id())),
        TagKind::Byte => Tag::Byte(decoder.read_i8()?),
        TagKind::Int => Tag::Int(decoder.read_i32()?),
        TagKind::Long => Tag::Long(decoder.read_i64()?),
        TagKind::Float => Tag::Float(decoder.read_f32()?),
        TagKind::String => Tag::String(read_name(decoder)?),
        TagKind::List => {
            let element = read_kind(decoder)?;
            let count = usize::try_from(decoder.read_i32()?)?;
            let mut items = Vec::with_capacity(count.min(decoder.buffer().len()));
            if element != TagKind::End {
                for _ in 0..count {
                    items.push(read_payload(decoder, element, depth + 1)?);
                }
            } else if count != 0 {
                return Err(DecodeError::InvalidNbtTag(TagKind::End.id()));
            }
            Tag::List(List { element, items })
        }
        TagKind::Compound => Tag::Compound(read_compound(decoder, depth + 1)?),
    })
}

fn read_compound(decoder: &mut Decoder, depth: usize) -> Result<Compound, DecodeError> {
    let mut compound = Compound::new();
    loop {
        let kind = read_kind(decoder)?;
        if kind == TagKind::End {
            break Ok(compound);
        }
        let name = read_name(decoder)?;
        let tag = read_payload(decoder, kind, depth)?;
        compound.entries.push((name, tag));
    }
}

impl Decode for Nbt {
    fn decode(decoder: &mut Decoder) -> Result<Self, DecodeError> {
        let kind = read_kind(decoder)?;
        if kind != TagKind::Compound {
            return Err(DecodeError::InvalidNbtTag(kind.id()));
        }
        let name = read_name(decoder)?;
        let root = read_compound(decoder, 0)?;
        Ok(Self { name, root })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::encode_to_vec;

    #[test]
    fn empty_root_compound() {
        assert_eq!(encode_to_vec(&Nbt::default()), [0x0a, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn scalar_entries_are_tagged_and_named() {
        let nbt = Nbt::new(
            "",
            Compound::new()
                .with("b", true)
                .with("i", 384)
                .with("l", 1i64)
                .with("f", 1.0f32)
                .with("s", "hi"),
        );
        #[rustfmt::skip]
        let expected = [
            0x0a, 0x00, 0x00,
            0x01, 0x00, 0x01, b'b', 0x01,
            0x03, 0x00, 0x01, b'i', 0x00, 0x00, 0x01, 0x80,
            0x04, 0x00, 0x01, b'l', 0, 0, 0, 0, 0, 0, 0, 0x01,
            0x05, 0x00, 0x01, b'f', 0x3f, 0x80, 0x00, 0x00,
            0x08, 0x00, 0x01, b's', 0x00, 0x02, b'h', b'i',
            0x00,
        ];
        assert_eq!(encode_to_vec(&nbt), expected);
    }

    #[test]
    fn empty_list_keeps_element_kind() {
        let nbt = Nbt::new("", Compound::new().with("value", List::empty(TagKind::Compound)));
        #[rustfmt::skip]
        let expected = [
            0x0a, 0x00, 0x00,
            0x09, 0x00, 0x05, b'v', b'a', b'l', b'u', b'e', 0x0a, 0x00, 0x00, 0x00, 0x00,
            0x00,
        ];
        assert_eq!(encode_to_vec(&nbt), expected);
    }

    #[test]
    fn list_elements_are_unnamed() {
        let list = List::compounds([Compound::new().with("x", 1i8)]);
        let nbt = Nbt::new("", Compound::new().with("l", list));
        #[rustfmt::skip]
        let expected = [
            0x0a, 0x00, 0x00,
            0x09, 0x00, 0x01, b'l', 0x0a, 0x00, 0x00, 0x00, 0x01,
            0x01, 0x00, 0x01, b'x', 0x01, 0x00,
            0x00,
        ];
        assert_eq!(encode_to_vec(&nbt), expected);
    }

    #[test]
    fn insertion_order_is_preserved_and_names_replace() {
        let compound = Compound::new()
            .with("z", 1)
            .with("a", 2)
            .with("z", 3);
        let names: Vec<_> = compound.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["z", "a"]);
        assert_eq!(compound.get("z"), Some(&Tag::Int(3)));
    }

    #[test]
    fn mixed_lists_are_refused() {
        assert!(List::new(TagKind::Int, vec![Tag::Int(1), Tag::Byte(1)]).is_none());
        assert!(List::new(TagKind::Int, vec![Tag::Int(1), Tag::Int(2)]).is_some());
    }

    #[test]
    fn reads_back_written_tree() {
        let nbt = Nbt::new(
            "root",
            Compound::new()
                .with("nested", Compound::new().with("deep", "value"))
                .with("list", List::compounds([Compound::new(), Compound::new()])),
        );
        let bytes = encode_to_vec(&nbt);
        let mut decoder = Decoder::new(&bytes);
        assert_eq!(Nbt::decode(&mut decoder).unwrap(), nbt);
        assert!(decoder.is_finished());
    }

    #[test]
    fn unsupported_tag_is_rejected() {
        let bytes = [0x0a, 0x00, 0x00, 0x02, 0x00, 0x01, b's', 0x00, 0x01, 0x00];
        assert!(matches!(
            Nbt::decode(&mut Decoder::new(&bytes)),
            Err(DecodeError::InvalidNbtTag(2))
        ));
    }
}
