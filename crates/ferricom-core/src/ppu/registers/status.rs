use bitflags::bitflags;

bitflags! {
    /// PPU status register (`$2002`). Reading it clears the vblank flag and
    /// resets the `w` write toggle; that side effect lives in the PPU.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub(crate) struct Status: u8 {
        /// More than 8 sprites were found on a scanline.
        const SPRITE_OVERFLOW = 0b0010_0000;
        /// An opaque sprite-0 pixel overlapped an opaque background pixel.
        const SPRITE_ZERO_HIT = 0b0100_0000;
        /// Vertical blank is in progress.
        const VBLANK          = 0b1000_0000;
    }
}
