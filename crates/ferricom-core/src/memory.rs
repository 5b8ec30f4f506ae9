//! Shared definitions for the NES memory map.
//!
//! Centralizing address-related constants keeps the hardware layout in one
//! location, prevents magic numbers from sneaking into other modules, and
//! makes it easier to reference the original console documentation while
//! reading the code base.

/// CPU memory map details.
pub mod cpu {
    /// First address of internal RAM.
    pub const INTERNAL_RAM_START: u16 = 0x0000;
    /// Last address (inclusive) of the mirrored internal RAM region.
    pub const INTERNAL_RAM_MIRROR_END: u16 = 0x1FFF;
    /// Physical internal RAM size (2 KiB, mirrored every `$0800`).
    pub const INTERNAL_RAM_SIZE: usize = 0x0800;
    /// Mask for folding mirrored RAM addresses onto the physical array.
    pub const INTERNAL_RAM_MASK: u16 = 0x07FF;

    /// First address of the hardware stack page.
    pub const STACK_PAGE_START: u16 = 0x0100;

    /// First CPU-visible PPU register address.
    pub const PPU_REGISTER_BASE: u16 = 0x2000;
    /// Last address of the mirrored PPU register region.
    pub const PPU_REGISTER_MIRROR_END: u16 = 0x3FFF;

    /// First CPU-mapped APU channel register.
    pub const APU_REGISTER_BASE: u16 = 0x4000;
    /// Last APU channel register before the DMA/status bridge.
    pub const APU_CHANNEL_END: u16 = 0x4013;
    /// OAM DMA trigger register (`$4014`).
    pub const OAM_DMA: u16 = 0x4014;
    /// APU status register (`$4015`).
    pub const APU_STATUS: u16 = 0x4015;
    /// Controller port 1 (`$4016`).
    pub const CONTROLLER_PORT_1: u16 = 0x4016;
    /// Controller port 2 / APU frame counter (`$4017`).
    pub const CONTROLLER_PORT_2: u16 = 0x4017;
    /// CPU test-mode registers (unused on a retail console).
    pub const TEST_MODE_BASE: u16 = 0x4018;
    pub const TEST_MODE_END: u16 = 0x401F;

    /// First address routed to the cartridge/mapper.
    pub const CARTRIDGE_SPACE_BASE: u16 = 0x4020;
    /// PRG-RAM window.
    pub const PRG_RAM_START: u16 = 0x6000;
    pub const PRG_RAM_END: u16 = 0x7FFF;
    /// PRG-ROM window.
    pub const PRG_ROM_START: u16 = 0x8000;
    /// Last CPU address.
    pub const CPU_ADDR_END: u16 = 0xFFFF;

    /// Interrupt vectors (low byte address; high byte follows).
    pub const NMI_VECTOR: u16 = 0xFFFA;
    pub const RESET_VECTOR: u16 = 0xFFFC;
    pub const IRQ_VECTOR: u16 = 0xFFFE;
}

/// PPU register layout, VRAM mirror rules, and frame geometry.
pub mod ppu {
    /// Mask for decoding register mirrors (`addr & 0x0007`).
    pub const REGISTER_SELECT_MASK: u16 = 0x0007;

    /// Address mask applied to every PPU bus access (14-bit bus).
    pub const VRAM_ADDR_MASK: u16 = 0x3FFF;

    /// Pattern table base addresses.
    pub const PATTERN_TABLE_0: u16 = 0x0000;
    pub const PATTERN_TABLE_1: u16 = 0x1000;
    /// Last pattern table address.
    pub const PATTERN_TABLE_END: u16 = 0x1FFF;

    /// Base address of nametable 0.
    pub const NAMETABLE_BASE: u16 = 0x2000;
    /// Size of a single nametable in bytes.
    pub const NAMETABLE_SIZE: u16 = 0x0400;
    /// Physical nametable VRAM (4 KiB; mirroring folds it to 2 KiB except
    /// for four-screen cartridges, which use all of it).
    pub const NAMETABLE_RAM_SIZE: usize = 0x1000;

    /// Palette RAM base address (`$3F00`).
    pub const PALETTE_BASE: u16 = 0x3F00;
    /// Palette RAM byte count (mirrored every 32 bytes).
    pub const PALETTE_RAM_SIZE: usize = 0x20;

    /// Primary OAM byte count (64 sprites of 4 bytes).
    pub const OAM_RAM_SIZE: usize = 256;
    /// Sprites selectable per scanline.
    pub const SECONDARY_OAM_SPRITES: usize = 8;

    /// Frame geometry.
    pub const DOTS_PER_SCANLINE: u16 = 341;
    pub const SCANLINES_PER_FRAME: u16 = 262;
    pub const DOTS_PER_FRAME: u32 = DOTS_PER_SCANLINE as u32 * SCANLINES_PER_FRAME as u32;
    pub const VISIBLE_WIDTH: usize = 256;
    pub const VISIBLE_HEIGHT: usize = 240;
    pub const FRAME_PIXELS: usize = VISIBLE_WIDTH * VISIBLE_HEIGHT;

    /// Scanline roles.
    pub const LAST_VISIBLE_SCANLINE: u16 = 239;
    pub const POST_RENDER_SCANLINE: u16 = 240;
    pub const VBLANK_START_SCANLINE: u16 = 241;
    pub const PRE_RENDER_SCANLINE: u16 = 261;

    /// CPU-visible PPU register identifiers.
    #[repr(u16)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Register {
        /// `$2000` - PPUCTRL
        Control = 0x2000,
        /// `$2001` - PPUMASK
        Mask = 0x2001,
        /// `$2002` - PPUSTATUS
        Status = 0x2002,
        /// `$2003` - OAMADDR
        OamAddr = 0x2003,
        /// `$2004` - OAMDATA
        OamData = 0x2004,
        /// `$2005` - PPUSCROLL
        Scroll = 0x2005,
        /// `$2006` - PPUADDR
        Addr = 0x2006,
        /// `$2007` - PPUDATA
        Data = 0x2007,
    }

    impl Register {
        /// Raw address backing the register.
        pub const fn addr(self) -> u16 {
            self as u16
        }

        /// Resolves the canonical register for a CPU address in `$2000-$3FFF`.
        pub const fn from_cpu_addr(addr: u16) -> Self {
            match addr & REGISTER_SELECT_MASK {
                0 => Self::Control,
                1 => Self::Mask,
                2 => Self::Status,
                3 => Self::OamAddr,
                4 => Self::OamData,
                5 => Self::Scroll,
                6 => Self::Addr,
                _ => Self::Data,
            }
        }
    }
}
