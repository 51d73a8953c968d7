//! Colour palettes.
//!
//! The TIA drives a 7-bit colour value (hue in bits 7-4, luminance in bits
//! 3-1). Each entry is packed `0xRRGGBB`, indexed by `colour >> 1`.

/// NTSC palette: 16 hues x 8 luminances.
pub const NTSC: [u32; 128] = [
    0x000000, 0x1A1A1A, 0x393939, 0x5B5B5B, 0x7E7E7E, 0xA2A2A2, 0xC7C7C7, 0xEDEDED,
    0x190200, 0x3A1F00, 0x5D4100, 0x826400, 0xA78800, 0xCCAD00, 0xF2D219, 0xFEFA40,
    0x370000, 0x5E0800, 0x832700, 0xA94900, 0xCF6C00, 0xF58F17, 0xFEB438, 0xFEDF6F,
    0x470000, 0x730000, 0x981300, 0xBE3216, 0xE45335, 0xFE7657, 0xFE9C81, 0xFEC6BB,
    0x440008, 0x6F001F, 0x960640, 0xBB2462, 0xE14585, 0xFE67AA, 0xFE8CD6, 0xFEB7F6,
    0x2D004A, 0x570067, 0x7D058C, 0xA122B1, 0xC743D7, 0xED65FE, 0xFE8AF6, 0xFEB5F7,
    0x0D0082, 0x3300A2, 0x550FC9, 0x782DF0, 0x9C4EFE, 0xC372FE, 0xEB98FE, 0xFEC0F9,
    0x000091, 0x0A05BD, 0x2822E4, 0x4842FE, 0x6B64FE, 0x908AFE, 0xB7B0FE, 0xDFD8FE,
    0x000072, 0x001CAB, 0x033CD6, 0x205EFD, 0x4081FE, 0x64A6FE, 0x89CEFE, 0xB0F6FE,
    0x00103A, 0x00316E, 0x0055A2, 0x0579C8, 0x239DEE, 0x44C2FE, 0x68E9FE, 0x8FFEFE,
    0x001F02, 0x004326, 0x006957, 0x008D7A, 0x1BB19E, 0x3BD7C3, 0x5DFEE9, 0x86FEFE,
    0x002403, 0x004A05, 0x00700C, 0x09952B, 0x28BA4C, 0x49E06E, 0x6CFE92, 0x97FEB5,
    0x002102, 0x004604, 0x086B00, 0x289000, 0x49B509, 0x6BDB28, 0x8FFE49, 0xBBFE69,
    0x001501, 0x103600, 0x305900, 0x537E00, 0x76A300, 0x9AC800, 0xBFEE1E, 0xE8FE3E,
    0x1A0200, 0x3B1F00, 0x5E4100, 0x836400, 0xA88800, 0xCEAD00, 0xF4D218, 0xFEFA40,
    0x380000, 0x5F0800, 0x842700, 0xAA4900, 0xD06B00, 0xF68F18, 0xFEB439, 0xFEDF70,
];

/// PAL palette. Hues 0, 1, 14 and 15 are greys.
pub const PAL: [u32; 128] = [
    0x000000, 0x1A1A1A, 0x393939, 0x5B5B5B, 0x7E7E7E, 0xA2A2A2, 0xC7C7C7, 0xEDEDED,
    0x000000, 0x1A1A1A, 0x393939, 0x5B5B5B, 0x7E7E7E, 0xA2A2A2, 0xC7C7C7, 0xEDEDED,
    0x1E0000, 0x3F1C00, 0x633D00, 0x886000, 0xAD8300, 0xD2A806, 0xF9CD26, 0xFEF64A,
    0x002100, 0x004600, 0x0D6A00, 0x2D9000, 0x4FB500, 0x71DA06, 0x95FE26, 0xC0FE4D,
    0x3A0000, 0x620600, 0x882500, 0xAD4500, 0xD2671B, 0xF98B3B, 0xFEB05E, 0xFEDB87,
    0x002500, 0x004B00, 0x007200, 0x0D9600, 0x2CBB1C, 0x4EE13D, 0x70FE5F, 0x9CFE8A,
    0x470000, 0x720007, 0x970F25, 0xBD2E45, 0xE34F68, 0xFE728B, 0xFE98B2, 0xFEC2DD,
    0x002100, 0x004505, 0x006C26, 0x009046, 0x1CB569, 0x3DDB8C, 0x5FFEB1, 0x88FEDD,
    0x410026, 0x6C004F, 0x920473, 0xB82298, 0xDE43BD, 0xFE65E3, 0xFE8AFE, 0xFEB6FE,
    0x00112A, 0x00344F, 0x005975, 0x047C9A, 0x22A0BF, 0x43C5E5, 0x65EBFE, 0x8CFEFE,
    0x2A0065, 0x530092, 0x7804B9, 0x9C22E0, 0xC242FE, 0xE865FE, 0xFE8AFE, 0xFEB6FE,
    0x00006B, 0x001F94, 0x0040BC, 0x1D62E2, 0x3D85FE, 0x5FA9FE, 0x84D1FE, 0xABF9FE,
    0x08008E, 0x2D00BC, 0x4E10E4, 0x712FFE, 0x9550FE, 0xBB75FE, 0xE39BFE, 0xFEC2FE,
    0x000090, 0x0608BD, 0x2425E4, 0x4445FE, 0x6667FE, 0x8B8DFE, 0xB2B3FE, 0xDADBFE,
    0x000000, 0x1A1A1A, 0x393939, 0x5B5B5B, 0x7E7E7E, 0xA2A2A2, 0xC7C7C7, 0xEDEDED,
    0x000000, 0x1A1A1A, 0x393939, 0x5B5B5B, 0x7E7E7E, 0xA2A2A2, 0xC7C7C7, 0xEDEDED,
];

/// Unpack a palette entry into RGB bytes.
#[must_use]
pub const fn rgb(packed: u32) -> [u8; 3] {
    [(packed >> 16) as u8, (packed >> 8) as u8, packed as u8]
}
