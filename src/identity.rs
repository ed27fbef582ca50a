//! Offline-mode player identities.

use md5::{Digest, Md5};
use uuid::{Builder, Uuid};

/// Computes the identity an offline-mode server assigns to `name`:
/// a version 3 UUID over the MD5 of `"OfflinePlayer:" + name`.
///
/// The same name always yields the same UUID, so players keep their
/// data across sessions without an account lookup.
pub fn offline_uuid(name: &str) -> Uuid {
    let digest: [u8; 16] = Md5::new()
        .chain_update(b"OfflinePlayer:")
        .chain_update(name.as_bytes())
        .finalize()
        .into();
    Builder::from_md5_bytes(digest).into_uuid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use uuid::{Variant, Version};

    #[test]
    fn matches_known_offline_identities() {
        assert_eq!(
            offline_uuid("Steve").to_string(),
            "5627dd98-e6be-3c21-b8a8-e92344183641"
        );
        assert_eq!(
            offline_uuid("Notch").to_string(),
            "b50ad385-829d-3141-a216-7e7d7539ba7f"
        );
    }

    #[test]
    fn is_deterministic_and_case_sensitive() {
        assert_eq!(offline_uuid("Alex"), offline_uuid("Alex"));
        assert_ne!(offline_uuid("Alex"), offline_uuid("alex"));
    }

    #[test]
    fn empty_name_still_produces_an_identity() {
        assert_eq!(
            offline_uuid("").to_string(),
            "fc5bc365-aedf-30a8-8b89-04e462e29bde"
        );
    }

    proptest! {
        #[test]
        fn sets_version_and_variant_bits(name in "\\PC{0,16}") {
            let uuid = offline_uuid(&name);
            prop_assert_eq!(uuid.get_version(), Some(Version::Md5));
            prop_assert_eq!(uuid.get_variant(), Variant::RFC4122);
            let bytes = uuid.as_bytes();
            prop_assert_eq!(bytes[6] >> 4, 3);
            prop_assert_eq!(bytes[8] >> 6, 0b10);
            prop_assert_eq!(uuid, offline_uuid(&name));
        }
    }
}
