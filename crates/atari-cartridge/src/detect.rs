//! Mapper detection.
//!
//! Three stages, in order: a table of image hashes for schemes whose
//! control addresses look like ordinary code, a size rule for sizes only
//! one scheme uses, and finally the first access to a size class's
//! control window.

use md5::{Digest, Md5};

use crate::{CartridgeError, MapperKind};

const HASHES_E0: &[&str] = &[
    "27c6a2ca16ad7d814626ceea62fa8fb4", // Frogger II
    "fb91dfc36cddaa54b09924ae8fd96199", // Frogger II (PAL)
    "b311ab95e85bc0162308390728a7361d", // Gyruss
    "e600f5e98a20fafa47676198efe6834d", // Gyruss (PAL)
    "e51030251e440cffaab1ac63438b44ae", // James Bond 007
    "e24d7d879281ffec0641e9c3f52e505a", // Lord of the Rings (proto)
    "3347a6dd59049b15a38394aa2dafa585", // Montezuma's Revenge
    "9f59eddf9ba91a7d93bce7ee4b7693bc", // Montezuma's Revenge (PAL)
    "b7a7e34e304e4b7bc565ec01ba33ea27", // Mr. Do's Castle
    "c7f13ef38f61ee2367ada94fdcc6d206", // Popeye
    "e9cb18770a41a16de63b124c1e8bd493", // Popeye (PAL)
    "72b8dc752befbfb3ffda120eb98b2dd0", // Q*bert's Qubes
    "517592e6e0c71731019c0cebc2ce044f", // Q*bert's Qubes [a1]
    "5336f86f6b982cc925532f2e80aa1e17", // Death Star Battle
    "cb9b2e9806a7fbab3d819cfe15f0f05a", // Death Star Battle (PAL)
    "c246e05b52f68ab2e9aee40f278cd158", // Ewok Adventure (proto)
    "6dfad2dd2c7c16ac0fa257b6ce0be2f0", // Ewok Adventure (proto, PAL)
    "6339d28c9a7f92054e70029eb0375837", // Star Wars Arcade
    "6cf054cd23a02e09298d2c6f787eb21d", // Star Wars Arcade (PAL)
    "6651e2791d38edc02c5a5fd7b47a1627", // Star Wars Arcade (proto)
    "c29f8db680990cb45ef7fef6ab57a2c2", // Super Cobra
    "d326db524d93fa2897ab69c42d6fb698", // Super Cobra (PAL)
    "fa2be8125c3c60ab83e1c0fe56922fcb", // Tooth Protectors
    "085322bae40d904f53bdcc56df0593fc", // Tutankham
    "66c2380c71709efa7b166621e5bb4558", // Tutankham (PAL)
];

const HASHES_E7: &[&str] = &[
    "76f53abbbf39a0063f24036d6ee0968a", // Bump 'n' Jump
    "4dbf47c7f5ac767a3b07843a530d29a5", // Breaking News
    "0443cfa9872cdb49069186413275fa21", // BurgerTime
    "3b76242691730b2dd22ec0ceab351bc6", // Masters of the Universe
];

const HASHES_FE: &[&str] = &[
    "ac7c2260378975614192ca2bc3d20e0b", // Decathlon
    "883258dcd68cefc6cd4d40b1185116dc", // Decathlon (PAL)
    "4f618c2429138e0280969193ed6c107e", // Robot Tank
    "f687ec4b69611a7f78bd69b8a567937a", // Robot Tank (PAL)
    "fbb0151ea2108e33b2dbaae14a1831dd", // Robot Tank TV
    "c032c2bd7017fdfbba9a105ec50f800e", // Thwocker (proto)
];

const HASHES_DPC: &[&str] = &[
    "448c2a175afc8df174d6ff4cce12c794", // Pitfall II
    "e34c236630c945089fcdef088c4b6e06", // Pitfall II (PAL)
    "39a6a5a2e1f6297cceaa48bb03af02e9", // Pitfall II (hack)
];

/// Lower-case hex MD5 of the image.
#[must_use]
pub fn md5_hex(rom: &[u8]) -> String {
    Md5::digest(rom).iter().map(|b| format!("{b:02x}")).collect()
}

/// Known titles whose scheme can't be told from access patterns.
#[must_use]
pub fn from_hash(rom: &[u8]) -> Option<MapperKind> {
    let hash = md5_hex(rom);
    let tables = [
        (HASHES_E0, MapperKind::E0),
        (HASHES_E7, MapperKind::E7),
        (HASHES_FE, MapperKind::Fe),
        (HASHES_DPC, MapperKind::Dpc),
    ];
    tables
        .into_iter()
        .find(|(table, _)| table.contains(&hash.as_str()))
        .map(|(_, kind)| kind)
}

/// Sizes that only one scheme uses.
#[must_use]
pub fn from_size(size: usize) -> Option<MapperKind> {
    match size {
        0x3000 => Some(MapperKind::Fa),
        10_240 | 10_495 => Some(MapperKind::Dpc),
        0x2100 => Some(MapperKind::Supercharger),
        _ => None,
    }
}

/// Pick a scheme from the first access to a control address.
///
/// Returns `Ok(None)` while the access says nothing; images too small to
/// bank switch stay flat. A larger image of a size no scheme uses is an
/// error.
pub fn from_access(
    size: usize,
    addr: u16,
    is_write: bool,
    last_write: u16,
) -> Result<Option<MapperKind>, CartridgeError> {
    let addr = addr & 0x1FFF;
    let tigervision =
        is_write && addr == 0x003F && (last_write & 0x1FFF) != 0x003E && (last_write & 0x1FFF) != 0x0040;

    let kind = match size {
        0x0800 | 0x1000 => (is_write && (0x1400..=0x17FF).contains(&addr)).then_some(MapperKind::CommaVid),
        0x2000 if matches!(addr, 0x1FF8 | 0x1FF9) => Some(MapperKind::F8),
        0x4000 if (0x1FF6..=0x1FF9).contains(&addr) => Some(MapperKind::F6),
        0x8000 if (0x1FF4..=0x1FFB).contains(&addr) => Some(MapperKind::F4),
        0x1_0000 if addr == 0x1FF0 => Some(MapperKind::F0),
        0x2000 | 0x4000 | 0x8000 | 0x1_0000 => tigervision.then_some(MapperKind::Tigervision),
        _ => match from_size(size) {
            Some(kind) => Some(kind),
            None if size < 0x1000 => None,
            None => return Err(CartridgeError::UnknownSize { size }),
        },
    };
    Ok(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn md5_of_empty_input() {
        assert_eq!(md5_hex(&[]), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn plain_image_has_no_hash_match() {
        assert_eq!(from_hash(&[0u8; 4096]), None);
    }

    #[test]
    fn control_windows_by_size() {
        assert_eq!(from_access(0x2000, 0x1FF9, false, 0).ok().flatten(), Some(MapperKind::F8));
        assert_eq!(from_access(0x4000, 0x1FF6, true, 0).ok().flatten(), Some(MapperKind::F6));
        assert_eq!(from_access(0x4000, 0x1FF5, true, 0).ok().flatten(), None);
        assert_eq!(from_access(0x8000, 0x1FFB, false, 0).ok().flatten(), Some(MapperKind::F4));
        assert_eq!(from_access(0x1_0000, 0x1FF0, false, 0).ok().flatten(), Some(MapperKind::F0));
        // Mirrors above A12 decode the same.
        assert_eq!(from_access(0x2000, 0xFFF8, false, 0).ok().flatten(), Some(MapperKind::F8));
    }

    #[test]
    fn tigervision_needs_a_write() {
        assert_eq!(from_access(0x2000, 0x003F, false, 0x80).ok().flatten(), None);
        assert_eq!(
            from_access(0x8000, 0x003F, true, 0x80).ok().flatten(),
            Some(MapperKind::Tigervision)
        );
    }

    #[test]
    fn small_images_stay_flat() {
        assert_eq!(from_access(0x0800, 0x1000, true, 0).ok().flatten(), None);
        assert_eq!(from_access(0x0400, 0x1400, true, 0).ok().flatten(), None);
    }

    #[test]
    fn unusual_size_is_an_error() {
        assert!(from_access(0x1800, 0x1FF8, false, 0).is_err());
    }
}
