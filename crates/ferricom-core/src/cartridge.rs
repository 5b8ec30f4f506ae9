//! Cartridge loading and the CPU/PPU-facing cartridge interface.

use std::{fs, path::Path};

use tracing::info;

use crate::{
    cartridge::{
        header::{Header, Mirroring, NES_HEADER_LEN},
        mapper::Mapper,
    },
    error::Error,
};

pub(crate) mod a12_watcher;
pub mod header;
pub mod mapper;

/// A parsed, inserted cartridge: header metadata plus live mapper state.
#[derive(Debug, Clone)]
pub struct Cartridge {
    header: Header,
    mapper: Mapper,
    /// Set whenever the CPU writes into the PRG-RAM window; hosts persisting
    /// battery saves poll and clear it.
    prg_ram_dirty: bool,
}

impl Cartridge {
    /// Parses a cartridge from an in-memory iNES image.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let header_bytes = bytes.get(..NES_HEADER_LEN).ok_or(Error::TooShort {
            actual: bytes.len(),
        })?;
        let header = Header::parse(header_bytes)?;

        let mut cursor = NES_HEADER_LEN;
        let trainer = if header.trainer_present {
            let slice = section(bytes, &mut cursor, header.trainer_len(), "trainer")?;
            let mut trainer = [0u8; 512];
            trainer.copy_from_slice(&slice);
            Some(trainer)
        } else {
            None
        };

        let prg_rom = section(bytes, &mut cursor, header.prg_rom_size, "PRG ROM")?;
        let chr_rom = section(bytes, &mut cursor, header.chr_rom_size, "CHR ROM")?;

        let mapper = Mapper::new(&header, prg_rom, chr_rom, trainer)?;
        info!(
            mapper = mapper.name(),
            prg_rom = header.prg_rom_size,
            chr_rom = header.chr_rom_size,
            battery = header.battery_backed_ram,
            "cartridge loaded"
        );

        Ok(Self {
            header,
            mapper,
            prg_ram_dirty: false,
        })
    }

    /// Loads and parses a cartridge directly from disk.
    pub fn from_file<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    pub fn mapper_mut(&mut self) -> &mut Mapper {
        &mut self.mapper
    }

    /// CPU read in `$4020-$FFFF`.
    pub fn read_prg(&self, addr: u16) -> u8 {
        self.mapper.read_prg(addr)
    }

    /// CPU write in `$4020-$FFFF`.
    pub fn write_prg(&mut self, addr: u16, value: u8, cpu_cycle: u64) {
        if self.header.battery_backed_ram
            && (crate::memory::cpu::PRG_RAM_START..=crate::memory::cpu::PRG_RAM_END)
                .contains(&addr)
        {
            self.prg_ram_dirty = true;
        }
        self.mapper.write_prg(addr, value, cpu_cycle);
    }

    /// PPU read in `$0000-$1FFF`.
    pub fn read_chr(&self, addr: u16) -> u8 {
        self.mapper.read_chr(addr)
    }

    /// PPU write in `$0000-$1FFF`.
    pub fn write_chr(&mut self, addr: u16, value: u8) {
        self.mapper.write_chr(addr, value);
    }

    /// Current nametable arrangement.
    pub fn mirroring(&self) -> Mirroring {
        self.mapper.mirroring()
    }

    /// Level of the mapper IRQ line.
    pub fn irq_pending(&self) -> bool {
        self.mapper.irq_pending()
    }

    /// Drops the mapper IRQ line.
    pub fn acknowledge_irq(&mut self) {
        self.mapper.acknowledge_irq();
    }

    /// Forwards a PPU A12 observation to edge-sensitive mappers.
    pub fn notify_ppu_a12(&mut self, addr: u16, frame_dot: u32) {
        self.mapper.notify_ppu_a12(addr, frame_dot);
    }

    /// Per-CPU-cycle mapper hook (unused by mappers 0-4).
    pub fn tick(&mut self) {
        self.mapper.tick();
    }

    /// Whether the board declares battery-backed PRG-RAM.
    pub fn battery_backed(&self) -> bool {
        self.header.battery_backed_ram
    }

    /// PRG-RAM contents for battery persistence.
    pub fn prg_ram(&self) -> Option<&[u8]> {
        self.mapper.prg_ram()
    }

    /// Mutable PRG-RAM, for restoring a battery save before running.
    pub fn prg_ram_mut(&mut self) -> Option<&mut [u8]> {
        self.mapper.prg_ram_mut()
    }

    /// Returns and clears the battery-save dirty flag.
    pub fn take_prg_ram_dirty(&mut self) -> bool {
        std::mem::take(&mut self.prg_ram_dirty)
    }
}

fn section(
    bytes: &[u8],
    cursor: &mut usize,
    len: usize,
    name: &'static str,
) -> Result<Vec<u8>, Error> {
    if len == 0 {
        return Ok(Vec::new());
    }

    let end = cursor.checked_add(len).ok_or(Error::SectionTooShort {
        section: name,
        expected: len,
        actual: bytes.len().saturating_sub(*cursor),
    })?;

    let slice = bytes.get(*cursor..end).ok_or(Error::SectionTooShort {
        section: name,
        expected: len,
        actual: bytes.len().saturating_sub(*cursor),
    })?;

    *cursor = end;
    Ok(slice.to_vec())
}
