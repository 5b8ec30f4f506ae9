use bitflags::bitflags;

bitflags! {
    /// Attribute bits stored in sprite byte 2.
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// V H P . . . p p
    /// ```
    /// - `V`: vertical flip
    /// - `H`: horizontal flip
    /// - `P`: priority (behind background when set)
    /// - `p`: sprite palette select (0..=3)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub(crate) struct SpriteAttributes: u8 {
        const PALETTE                    = 0b0000_0011;
        const PRIORITY_BEHIND_BACKGROUND = 0b0010_0000;
        const FLIP_HORIZONTAL            = 0b0100_0000;
        const FLIP_VERTICAL              = 0b1000_0000;
    }
}

impl SpriteAttributes {
    pub(crate) fn palette(self) -> u8 {
        self.bits() & Self::PALETTE.bits()
    }
}

/// A sprite selected into secondary OAM for the upcoming scanline, with its
/// pattern row already fetched. Horizontal flip is applied at fetch time by
/// reversing the pattern bits.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LineSprite {
    pub x: u8,
    pub attributes: SpriteAttributes,
    pub pattern_lo: u8,
    pub pattern_hi: u8,
    /// Index in primary OAM, kept so sprite-0 hits can be attributed.
    pub oam_index: u8,
}

impl LineSprite {
    /// 2-bit color index of this sprite at screen column `x`, or 0 when the
    /// column misses the sprite or hits a transparent pixel.
    pub(crate) fn pixel_at(&self, x: usize) -> u8 {
        let offset = x as isize - self.x as isize;
        if !(0..8).contains(&offset) {
            return 0;
        }
        let bit = 7 - offset as u32;
        ((self.pattern_hi >> bit) & 1) << 1 | ((self.pattern_lo >> bit) & 1)
    }
}
