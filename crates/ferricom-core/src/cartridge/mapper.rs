//! Cartridge mapper dispatch and shared banking helpers.
//!
//! Mappers are modelled as a tagged enum with one variant per supported
//! board. That keeps the cartridge flat in memory, avoids virtual dispatch on
//! the CPU/PPU hot paths, and lets the compiler check that every mapper
//! answers every bus operation.

mod cnrom;
mod mmc1;
mod mmc3;
mod nrom;
mod uxrom;

pub use cnrom::CnRom;
pub use mmc1::Mmc1;
pub use mmc3::Mmc3;
pub use nrom::Nrom;
pub use uxrom::UxRom;

use crate::{
    cartridge::header::{Header, Mirroring},
    error::Error,
    memory::cpu as cpu_mem,
};

/// CHR memory behind the PPU pattern tables: either ROM (writes ignored) or
/// RAM (writes land).
#[derive(Debug, Clone)]
pub(crate) enum ChrStorage {
    Rom(Box<[u8]>),
    Ram(Box<[u8]>),
}

impl ChrStorage {
    /// Selects ROM when the header shipped CHR-ROM, otherwise allocates the
    /// CHR-RAM the header resolution decided on.
    pub(crate) fn from_header(header: &Header, chr_rom: Vec<u8>) -> Self {
        if header.chr_rom_size > 0 {
            Self::Rom(chr_rom.into_boxed_slice())
        } else {
            Self::Ram(vec![0; header.chr_ram_size].into_boxed_slice())
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Rom(bytes) | Self::Ram(bytes) => bytes.len(),
        }
    }

    /// Linear read with the 8 KiB window folded onto the available storage.
    pub(crate) fn read(&self, addr: u16) -> u8 {
        let bytes = match self {
            Self::Rom(bytes) | Self::Ram(bytes) => bytes,
        };
        if bytes.is_empty() {
            return 0;
        }
        bytes[(addr & 0x1FFF) as usize % bytes.len()]
    }

    /// Linear write; ignored for ROM.
    pub(crate) fn write(&mut self, addr: u16, value: u8) {
        if let Self::Ram(bytes) = self {
            if !bytes.is_empty() {
                let len = bytes.len();
                bytes[(addr & 0x1FFF) as usize % len] = value;
            }
        }
    }

    /// Banked read: `base` is a bank's byte offset, `offset` the position
    /// within the bank.
    pub(crate) fn read_indexed(&self, base: usize, offset: usize) -> u8 {
        let bytes = match self {
            Self::Rom(bytes) | Self::Ram(bytes) => bytes,
        };
        if bytes.is_empty() {
            return 0;
        }
        bytes[(base + offset) % bytes.len()]
    }

    /// Banked write; ignored for ROM.
    pub(crate) fn write_indexed(&mut self, base: usize, offset: usize, value: u8) {
        if let Self::Ram(bytes) = self {
            if !bytes.is_empty() {
                let len = bytes.len();
                bytes[(base + offset) % len] = value;
            }
        }
    }
}

/// Allocates PRG-RAM per the header and seeds it with the trainer when one is
/// present (trainers load at `$7000`, 4 KiB into the PRG-RAM window).
pub(crate) fn allocate_prg_ram_with_trainer(
    header: &Header,
    trainer: Option<[u8; 512]>,
) -> Box<[u8]> {
    let mut prg_ram = vec![0u8; header.prg_ram_size].into_boxed_slice();
    if let Some(trainer) = trainer {
        let start = 0x1000;
        if prg_ram.len() >= start + trainer.len() {
            prg_ram[start..start + trainer.len()].copy_from_slice(&trainer);
        }
    }
    prg_ram
}

/// Offset of a PRG-RAM address within the `$6000-$7FFF` window, folded onto
/// the actual allocation.
pub(crate) fn prg_ram_index(addr: u16, len: usize) -> usize {
    (addr - cpu_mem::PRG_RAM_START) as usize % len
}

/// Runtime-selected mapper.
#[derive(Debug, Clone)]
pub enum Mapper {
    Nrom(Nrom),
    Mmc1(Mmc1),
    UxRom(UxRom),
    CnRom(CnRom),
    Mmc3(Mmc3),
}

impl Mapper {
    /// Builds the mapper named by the header, or reports it as unsupported.
    pub(crate) fn new(
        header: &Header,
        prg_rom: Vec<u8>,
        chr_rom: Vec<u8>,
        trainer: Option<[u8; 512]>,
    ) -> Result<Self, Error> {
        let mapper = match header.mapper {
            0 => Self::Nrom(Nrom::new(header, prg_rom, chr_rom, trainer)),
            1 => Self::Mmc1(Mmc1::new(header, prg_rom, chr_rom, trainer)),
            2 => Self::UxRom(UxRom::new(header, prg_rom, chr_rom, trainer)),
            3 => Self::CnRom(CnRom::new(header, prg_rom, chr_rom, trainer)),
            4 => Self::Mmc3(Mmc3::new(header, prg_rom, chr_rom, trainer)),
            other => return Err(Error::UnsupportedMapper { mapper: other }),
        };
        Ok(mapper)
    }

    /// CPU read in `$4020-$FFFF`. Unmapped regions return 0 (open bus).
    pub fn read_prg(&self, addr: u16) -> u8 {
        match self {
            Self::Nrom(m) => m.read_prg(addr),
            Self::Mmc1(m) => m.read_prg(addr),
            Self::UxRom(m) => m.read_prg(addr),
            Self::CnRom(m) => m.read_prg(addr),
            Self::Mmc3(m) => m.read_prg(addr),
        }
    }

    /// CPU write in `$4020-$FFFF`. `cpu_cycle` feeds mappers with serial
    /// write timing rules (MMC1).
    pub fn write_prg(&mut self, addr: u16, value: u8, cpu_cycle: u64) {
        match self {
            Self::Nrom(m) => m.write_prg(addr, value),
            Self::Mmc1(m) => m.write_prg(addr, value, cpu_cycle),
            Self::UxRom(m) => m.write_prg(addr, value),
            Self::CnRom(m) => m.write_prg(addr, value),
            Self::Mmc3(m) => m.write_prg(addr, value),
        }
    }

    /// PPU read in `$0000-$1FFF`.
    pub fn read_chr(&self, addr: u16) -> u8 {
        match self {
            Self::Nrom(m) => m.read_chr(addr),
            Self::Mmc1(m) => m.read_chr(addr),
            Self::UxRom(m) => m.read_chr(addr),
            Self::CnRom(m) => m.read_chr(addr),
            Self::Mmc3(m) => m.read_chr(addr),
        }
    }

    /// PPU write in `$0000-$1FFF`.
    pub fn write_chr(&mut self, addr: u16, value: u8) {
        match self {
            Self::Nrom(m) => m.write_chr(addr, value),
            Self::Mmc1(m) => m.write_chr(addr, value),
            Self::UxRom(m) => m.write_chr(addr, value),
            Self::CnRom(m) => m.write_chr(addr, value),
            Self::Mmc3(m) => m.write_chr(addr, value),
        }
    }

    /// Current nametable arrangement (may change at runtime for MMC1/MMC3).
    pub fn mirroring(&self) -> Mirroring {
        match self {
            Self::Nrom(m) => m.mirroring(),
            Self::Mmc1(m) => m.mirroring(),
            Self::UxRom(m) => m.mirroring(),
            Self::CnRom(m) => m.mirroring(),
            Self::Mmc3(m) => m.mirroring(),
        }
    }

    /// Level of the mapper IRQ line.
    pub fn irq_pending(&self) -> bool {
        match self {
            Self::Mmc3(m) => m.irq_pending(),
            _ => false,
        }
    }

    /// Drops the IRQ line without touching other mapper state.
    pub fn acknowledge_irq(&mut self) {
        if let Self::Mmc3(m) = self {
            m.acknowledge_irq();
        }
    }

    /// PPU A12 observation for edge-sensitive mappers. `frame_dot` is the dot
    /// index within the current frame, used for debouncing.
    pub fn notify_ppu_a12(&mut self, addr: u16, frame_dot: u32) {
        if let Self::Mmc3(m) = self {
            m.notify_ppu_a12(addr, frame_dot);
        }
    }

    /// Per-CPU-cycle hook for mappers that count CPU time. None of the boards
    /// in scope use it; it exists so new mappers can slot in without touching
    /// the harness.
    pub fn tick(&mut self) {}

    /// View of PRG-RAM for battery persistence, when the board has any.
    pub fn prg_ram(&self) -> Option<&[u8]> {
        match self {
            Self::Nrom(m) => m.prg_ram(),
            Self::Mmc1(m) => m.prg_ram(),
            Self::UxRom(_) | Self::CnRom(_) => None,
            Self::Mmc3(m) => m.prg_ram(),
        }
    }

    /// Mutable view of PRG-RAM, for host-side save restoration.
    pub fn prg_ram_mut(&mut self) -> Option<&mut [u8]> {
        match self {
            Self::Nrom(m) => m.prg_ram_mut(),
            Self::Mmc1(m) => m.prg_ram_mut(),
            Self::UxRom(_) | Self::CnRom(_) => None,
            Self::Mmc3(m) => m.prg_ram_mut(),
        }
    }

    /// Board name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nrom(_) => "NROM",
            Self::Mmc1(_) => "MMC1",
            Self::UxRom(_) => "UxROM",
            Self::CnRom(_) => "CNROM",
            Self::Mmc3(_) => "MMC3",
        }
    }
}
