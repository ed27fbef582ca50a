//! Registry data sent to a joining client: the dimension types and
//! biomes it may encounter.
//!
//! The client parses this blob field by field; a missing or mistyped
//! entry is not reported back, it just leaves the world unrenderable.
//! Keep the field order of [`DimensionType::to_compound`] stable.

use crate::protocol::nbt::{Compound, List, Nbt};

pub const OVERWORLD: &str = "minecraft:overworld";
pub const DIMENSION_TYPE_REGISTRY: &str = "minecraft:dimension_type";
pub const BIOME_REGISTRY: &str = "minecraft:worldgen/biome";

/// Properties of one dimension type.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionType {
    pub piglin_safe: bool,
    pub natural: bool,
    pub ambient_light: f32,
    pub infiniburn: String,
    pub respawn_anchor_works: bool,
    pub has_skylight: bool,
    pub bed_works: bool,
    pub effects: String,
    pub has_raids: bool,
    pub logical_height: i32,
    pub coordinate_scale: f32,
    pub ultrawarm: bool,
    pub has_ceiling: bool,
    pub height: i32,
    pub min_y: i32,
    pub raid_capable: bool,
    pub monster_spawn_light_level: i32,
    pub monster_spawn_block_light_limit: i32,
    pub natural_regeneration: bool,
}

impl DimensionType {
    pub fn overworld() -> Self {
        Self {
            piglin_safe: false,
            natural: true,
            ambient_light: 0.0,
            infiniburn: "#minecraft:infiniburn_overworld".to_owned(),
            respawn_anchor_works: false,
            has_skylight: true,
            bed_works: true,
            effects: OVERWORLD.to_owned(),
            has_raids: true,
            logical_height: 384,
            coordinate_scale: 1.0,
            ultrawarm: false,
            has_ceiling: false,
            height: 384,
            min_y: 0,
            raid_capable: true,
            monster_spawn_light_level: 7,
            monster_spawn_block_light_limit: 0,
            natural_regeneration: true,
        }
    }

    pub fn to_compound(&self) -> Compound {
        Compound::new()
            .with("piglin_safe", self.piglin_safe)
            .with("natural", self.natural)
            .with("ambient_light", self.ambient_light)
            .with("infiniburn", self.infiniburn.as_str())
            .with("respawn_anchor_works", self.respawn_anchor_works)
            .with("has_skylight", self.has_skylight)
            .with("bed_works", self.bed_works)
            .with("effects", self.effects.as_str())
            .with("has_raids", self.has_raids)
            .with("logical_height", self.logical_height)
            .with("coordinate_scale", self.coordinate_scale)
            .with("ultrawarm", self.ultrawarm)
            .with("has_ceiling", self.has_ceiling)
            .with("height", self.height)
            .with("min_y", self.min_y)
            .with("raid_capable", self.raid_capable)
            .with("monster_spawn_light_level", self.monster_spawn_light_level)
            .with(
                "monster_spawn_block_light_limit",
                self.monster_spawn_block_light_limit,
            )
            .with("natural_regeneration", self.natural_regeneration)
    }
}

/// A `{ type, value: [entries] }` registry compound.
fn registry(kind: &str, entries: impl IntoIterator<Item = Compound>) -> Compound {
    Compound::new()
        .with("type", kind)
        .with("value", List::compounds(entries))
}

fn registry_entry(name: &str, id: i32, element: Compound) -> Compound {
    Compound::new()
        .with("name", name)
        .with("id", id)
        .with("element", element)
}

/// Builds the registry codec carried by the join packet: the overworld
/// dimension type and an empty biome registry.
pub fn dimension_codec() -> Nbt {
    let overworld = registry_entry(OVERWORLD, 0, DimensionType::overworld().to_compound());
    Nbt::new(
        "",
        Compound::new()
            .with(
                DIMENSION_TYPE_REGISTRY,
                registry(DIMENSION_TYPE_REGISTRY, [overworld]),
            )
            .with(BIOME_REGISTRY, registry(BIOME_REGISTRY, [])),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{
        encode_to_vec,
        nbt::{Tag, TagKind},
        Decode, Decoder,
    };

    fn compound<'a>(parent: &'a Compound, name: &str) -> &'a Compound {
        match parent.get(name) {
            Some(Tag::Compound(compound)) => compound,
            other => panic!("expected compound at {name}, got {other:?}"),
        }
    }

    fn list<'a>(parent: &'a Compound, name: &str) -> &'a List {
        match parent.get(name) {
            Some(Tag::List(list)) => list,
            other => panic!("expected list at {name}, got {other:?}"),
        }
    }

    #[test]
    fn starts_with_anonymous_root_and_dimension_registry() {
        let bytes = encode_to_vec(&dimension_codec());
        let mut expected = vec![0x0a, 0x00, 0x00, 0x0a, 0x00, 0x18];
        expected.extend_from_slice(DIMENSION_TYPE_REGISTRY.as_bytes());
        expected.extend_from_slice(&[0x08, 0x00, 0x04]);
        expected.extend_from_slice(b"type");
        assert_eq!(&bytes[..expected.len()], expected);
    }

    #[test]
    fn ends_with_empty_compound_biome_list() {
        let bytes = encode_to_vec(&dimension_codec());
        let mut expected = vec![0x09, 0x00, 0x05];
        expected.extend_from_slice(b"value");
        // element kind, zero count, biome compound end, root end
        expected.extend_from_slice(&[0x0a, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
        assert!(bytes.ends_with(&expected));
    }

    #[test]
    fn is_built_fresh_and_identically() {
        assert_eq!(
            encode_to_vec(&dimension_codec()),
            encode_to_vec(&dimension_codec())
        );
    }

    #[test]
    fn overworld_element_has_expected_fields_in_order() {
        let bytes = encode_to_vec(&dimension_codec());
        let codec = Nbt::decode(&mut Decoder::new(&bytes)).unwrap();
        assert_eq!(codec.name, "");

        let dimensions = compound(&codec.root, DIMENSION_TYPE_REGISTRY);
        assert_eq!(
            dimensions.get("type"),
            Some(&Tag::String(DIMENSION_TYPE_REGISTRY.to_owned()))
        );
        let entries = list(dimensions, "value");
        assert_eq!(entries.element(), TagKind::Compound);
        assert_eq!(entries.items().len(), 1);

        let Tag::Compound(overworld) = &entries.items()[0] else {
            panic!("registry entry is not a compound");
        };
        assert_eq!(overworld.get("name"), Some(&Tag::String(OVERWORLD.to_owned())));
        assert_eq!(overworld.get("id"), Some(&Tag::Int(0)));

        let element = compound(overworld, "element");
        let fields: Vec<_> = element.iter().map(|(name, tag)| (name, tag.kind())).collect();
        assert_eq!(
            fields,
            [
                ("piglin_safe", TagKind::Byte),
                ("natural", TagKind::Byte),
                ("ambient_light", TagKind::Float),
                ("infiniburn", TagKind::String),
                ("respawn_anchor_works", TagKind::Byte),
                ("has_skylight", TagKind::Byte),
                ("bed_works", TagKind::Byte),
                ("effects", TagKind::String),
                ("has_raids", TagKind::Byte),
                ("logical_height", TagKind::Int),
                ("coordinate_scale", TagKind::Float),
                ("ultrawarm", TagKind::Byte),
                ("has_ceiling", TagKind::Byte),
                ("height", TagKind::Int),
                ("min_y", TagKind::Int),
                ("raid_capable", TagKind::Byte),
                ("monster_spawn_light_level", TagKind::Int),
                ("monster_spawn_block_light_limit", TagKind::Int),
                ("natural_regeneration", TagKind::Byte),
            ]
        );
        assert_eq!(element.get("height"), Some(&Tag::Int(384)));
        assert_eq!(element.get("logical_height"), Some(&Tag::Int(384)));
        assert_eq!(element.get("has_skylight"), Some(&Tag::Byte(1)));

        let biomes = compound(&codec.root, BIOME_REGISTRY);
        assert_eq!(biomes.get("type"), Some(&Tag::String(BIOME_REGISTRY.to_owned())));
        let biome_entries = list(biomes, "value");
        assert_eq!(biome_entries.element(), TagKind::Compound);
        assert!(biome_entries.items().is_empty());
    }
}
