//! CPU-visible PPU register state and internal VRAM address latches.
//!
//! This module mirrors the `$2000-$2007` register set and the internal
//! `v`/`t`/`x`/`w` latches. The concrete bit layouts live in submodules.

mod control;
mod mask;
mod status;
mod vram_addr;

pub(crate) use control::Control;
pub(crate) use mask::Mask;
pub(crate) use status::Status;
pub(crate) use vram_addr::VramAddr;

use crate::ram::ppu::OamRam;

/// Aggregates the state of all CPU-visible PPU registers.
#[derive(Debug, Clone)]
pub(crate) struct Registers {
    /// Mirror of the control register (`$2000`).
    pub(crate) control: Control,
    /// Mirror of the mask register (`$2001`).
    pub(crate) mask: Mask,
    /// Status register (`$2002`).
    pub(crate) status: Status,
    /// Current OAM pointer driven by `$2003`/`$2004`.
    pub(crate) oam_addr: u8,
    /// Primary sprite memory accessible through `$2004`.
    pub(crate) oam: OamRam,
    /// Current VRAM address (`v`).
    pub(crate) v: VramAddr,
    /// Temporary VRAM address (`t`), the staging latch for `$2005`/`$2006`.
    pub(crate) t: VramAddr,
    /// Fine-X scroll (3 bits).
    pub(crate) x: u8,
    /// Shared write toggle for `$2005`/`$2006`.
    pub(crate) w: bool,
    /// Internal buffer implementing the delayed `$2007` read behavior.
    pub(crate) read_buffer: u8,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    pub(crate) fn new() -> Self {
        Self {
            control: Control::default(),
            mask: Mask::default(),
            status: Status::default(),
            oam_addr: 0,
            oam: OamRam::new(),
            v: VramAddr::default(),
            t: VramAddr::default(),
            x: 0,
            w: false,
            read_buffer: 0,
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Registers::new();
    }

    /// Updates control, syncing the nametable bits into `t`.
    pub(crate) fn write_control(&mut self, value: u8) {
        self.control = Control::from_bits_retain(value);
        self.t.set_nametable(self.control.nametable_index());
    }
}
