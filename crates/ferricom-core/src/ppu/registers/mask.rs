use bitflags::bitflags;

bitflags! {
    /// PPU mask register (`$2001`): rendering enables and color controls.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub(crate) struct Mask: u8 {
        /// Render the palette in greyscale (palette index masked with $30).
        const GREYSCALE            = 0b0000_0001;
        /// Show the background in the leftmost 8 pixels.
        const SHOW_BACKGROUND_LEFT = 0b0000_0010;
        /// Show sprites in the leftmost 8 pixels.
        const SHOW_SPRITES_LEFT    = 0b0000_0100;
        const SHOW_BACKGROUND      = 0b0000_1000;
        const SHOW_SPRITES         = 0b0001_0000;
        const EMPHASIZE_RED        = 0b0010_0000;
        const EMPHASIZE_GREEN      = 0b0100_0000;
        const EMPHASIZE_BLUE       = 0b1000_0000;
    }
}

impl Mask {
    /// True when either background or sprite rendering is on; drives the
    /// scroll-register copy schedule and A12 notifications.
    pub(crate) fn rendering_enabled(self) -> bool {
        self.intersects(Mask::SHOW_BACKGROUND | Mask::SHOW_SPRITES)
    }

    /// Emphasis bits (PPUMASK bits 5-7) as a 3-bit value.
    pub(crate) fn emphasis(self) -> u8 {
        self.bits() >> 5
    }
}
