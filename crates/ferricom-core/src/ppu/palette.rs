//! NES master palette and color composition.
//!
//! Palette RAM holds 6-bit indices into the fixed 64-entry master palette;
//! greyscale and the emphasis bits of PPUMASK post-process the final color.
//! The output format is 0xAARRGGBB in native endianness.

use crate::ppu::registers::Mask;

/// The 64-color NES master palette, RGB.
const MASTER_PALETTE: [[u8; 3]; 64] = [
    // 0x00-0x0F
    [0x80, 0x80, 0x80], [0x00, 0x3D, 0xA6], [0x00, 0x12, 0xB0], [0x44, 0x00, 0x96],
    [0xA1, 0x00, 0x5E], [0xC7, 0x00, 0x28], [0xBA, 0x06, 0x00], [0x8C, 0x17, 0x00],
    [0x5C, 0x2F, 0x00], [0x10, 0x45, 0x00], [0x05, 0x4A, 0x00], [0x00, 0x47, 0x2E],
    [0x00, 0x41, 0x66], [0x00, 0x00, 0x00], [0x05, 0x05, 0x05], [0x05, 0x05, 0x05],
    // 0x10-0x1F
    [0xC7, 0xC7, 0xC7], [0x00, 0x77, 0xFF], [0x21, 0x55, 0xFF], [0x82, 0x37, 0xFA],
    [0xEB, 0x2F, 0xB5], [0xFF, 0x29, 0x50], [0xFF, 0x22, 0x00], [0xD6, 0x32, 0x00],
    [0xC4, 0x62, 0x00], [0x35, 0x80, 0x00], [0x05, 0x8F, 0x00], [0x00, 0x8A, 0x55],
    [0x00, 0x99, 0xCC], [0x21, 0x21, 0x21], [0x09, 0x09, 0x09], [0x09, 0x09, 0x09],
    // 0x20-0x2F
    [0xFF, 0xFF, 0xFF], [0x0F, 0xD7, 0xFF], [0x69, 0xA2, 0xFF], [0xD4, 0x80, 0xFF],
    [0xFF, 0x45, 0xF3], [0xFF, 0x61, 0x8B], [0xFF, 0x88, 0x33], [0xFF, 0x9C, 0x12],
    [0xFA, 0xBC, 0x20], [0x9F, 0xE3, 0x0E], [0x2B, 0xF0, 0x35], [0x0C, 0xF0, 0xA4],
    [0x05, 0xFB, 0xFF], [0x5E, 0x5E, 0x5E], [0x0D, 0x0D, 0x0D], [0x0D, 0x0D, 0x0D],
    // 0x30-0x3F
    [0xFF, 0xFF, 0xFF], [0xA6, 0xFC, 0xFF], [0xB3, 0xEC, 0xFF], [0xDA, 0xAB, 0xEB],
    [0xFF, 0xA8, 0xF9], [0xFF, 0xAB, 0xB3], [0xFF, 0xD2, 0xB0], [0xFF, 0xEF, 0xA6],
    [0xFF, 0xF7, 0x9C], [0xD7, 0xFF, 0xB3], [0xC6, 0xFF, 0xDE], [0xC4, 0xFF, 0xF6],
    [0xC4, 0xF0, 0xFF], [0xCC, 0xCC, 0xCC], [0x3C, 0x3C, 0x3C], [0x3C, 0x3C, 0x3C],
];

/// Redirects the sprite backdrop mirrors ($3F10/$3F14/$3F18/$3F1C) onto
/// their background counterparts. `index` is the palette RAM offset (0..32).
pub(crate) fn mirror_palette_index(index: u8) -> u8 {
    let index = index & 0x1F;
    match index {
        0x10 | 0x14 | 0x18 | 0x1C => index - 0x10,
        _ => index,
    }
}

/// Converts a 6-bit palette entry to 0xAARRGGBB, applying greyscale and the
/// emphasis bits from PPUMASK.
pub(crate) fn compose(palette_entry: u8, mask: Mask) -> u32 {
    let mut entry = palette_entry & 0x3F;
    if mask.contains(Mask::GREYSCALE) {
        entry &= 0x30;
    }

    let [mut r, mut g, mut b] = MASTER_PALETTE[entry as usize];

    // De-emphasize the channels whose emphasis bit is clear, the same
    // attenuation scheme the PPU's analog stage approximates.
    let emphasis = mask.emphasis();
    if emphasis != 0 {
        if emphasis & 0b001 == 0 {
            r = attenuate(r);
        }
        if emphasis & 0b010 == 0 {
            g = attenuate(g);
        }
        if emphasis & 0b100 == 0 {
            b = attenuate(b);
        }
    }

    0xFF00_0000 | u32::from(r) << 16 | u32::from(g) << 8 | u32::from(b)
}

fn attenuate(channel: u8) -> u8 {
    (channel as u16 * 3 / 4) as u8
}
