//! CPU-visible bus.
//!
//! `CpuBus` is a short-lived view over the console's devices, borrowed from
//! the harness for the duration of one CPU instruction. Routing follows the
//! hardware memory map; reads from write-only or unmapped addresses return 0
//! as the open-bus stand-in. Address masking happens here, so device code
//! never sees an out-of-range index.

use crate::{
    apu::Apu,
    cartridge::Cartridge,
    controller::ControllerPorts,
    memory::cpu as cpu_mem,
    ppu::Ppu,
    ram::cpu as cpu_ram,
};

pub(crate) struct CpuBus<'a> {
    pub ram: &'a mut cpu_ram::Ram,
    pub ppu: &'a mut Ppu,
    pub apu: &'a mut Apu,
    pub cartridge: &'a mut Cartridge,
    pub controllers: &'a mut ControllerPorts,
    /// CPU cycle count at the start of the current instruction; forwarded to
    /// the mapper so serial-write timing rules can apply.
    pub cpu_cycle: u64,
    /// Set when a write to `$4014` ran an OAM DMA this instruction.
    oam_dma_triggered: bool,
}

impl<'a> CpuBus<'a> {
    pub(crate) fn new(
        ram: &'a mut cpu_ram::Ram,
        ppu: &'a mut Ppu,
        apu: &'a mut Apu,
        cartridge: &'a mut Cartridge,
        controllers: &'a mut ControllerPorts,
        cpu_cycle: u64,
    ) -> Self {
        Self {
            ram,
            ppu,
            apu,
            cartridge,
            controllers,
            cpu_cycle,
            oam_dma_triggered: false,
        }
    }

    pub(crate) fn read(&mut self, addr: u16) -> u8 {
        match addr {
            cpu_mem::INTERNAL_RAM_START..=cpu_mem::INTERNAL_RAM_MIRROR_END => {
                self.ram[(addr & cpu_mem::INTERNAL_RAM_MASK) as usize]
            }
            cpu_mem::PPU_REGISTER_BASE..=cpu_mem::PPU_REGISTER_MIRROR_END => {
                self.ppu.cpu_read(addr, self.cartridge)
            }
            // The channel registers and the DMA port are write-only.
            cpu_mem::APU_REGISTER_BASE..=cpu_mem::APU_CHANNEL_END | cpu_mem::OAM_DMA => 0,
            cpu_mem::APU_STATUS => self.apu.read_status(),
            cpu_mem::CONTROLLER_PORT_1 => self.controllers.read(0),
            cpu_mem::CONTROLLER_PORT_2 => self.controllers.read(1),
            cpu_mem::TEST_MODE_BASE..=cpu_mem::TEST_MODE_END => 0,
            cpu_mem::CARTRIDGE_SPACE_BASE..=cpu_mem::CPU_ADDR_END => {
                self.cartridge.read_prg(addr)
            }
        }
    }

    pub(crate) fn write(&mut self, addr: u16, value: u8) {
        match addr {
            cpu_mem::INTERNAL_RAM_START..=cpu_mem::INTERNAL_RAM_MIRROR_END => {
                self.ram[(addr & cpu_mem::INTERNAL_RAM_MASK) as usize] = value;
            }
            cpu_mem::PPU_REGISTER_BASE..=cpu_mem::PPU_REGISTER_MIRROR_END => {
                self.ppu.cpu_write(addr, value, self.cartridge);
            }
            cpu_mem::APU_REGISTER_BASE..=cpu_mem::APU_CHANNEL_END | cpu_mem::APU_STATUS => {
                self.apu.write_register(addr, value);
            }
            cpu_mem::OAM_DMA => self.oam_dma(value),
            cpu_mem::CONTROLLER_PORT_1 => self.controllers.write_strobe(value),
            // $4017 writes configure the APU frame counter; controller 2 is
            // read-only at this address.
            cpu_mem::CONTROLLER_PORT_2 => self.apu.write_register(addr, value),
            cpu_mem::TEST_MODE_BASE..=cpu_mem::TEST_MODE_END => {}
            cpu_mem::CARTRIDGE_SPACE_BASE..=cpu_mem::CPU_ADDR_END => {
                self.cartridge.write_prg(addr, value, self.cpu_cycle);
            }
        }
    }

    /// Copies one CPU page into PPU OAM via the `$2004` path. The CPU stall
    /// (513/514 cycles) is accounted by the caller through
    /// [`Self::take_oam_dma_triggered`].
    fn oam_dma(&mut self, page: u8) {
        let base = u16::from(page) << 8;
        for offset in 0..256u16 {
            let value = self.read(base.wrapping_add(offset));
            self.ppu.write_oam_dma_byte(value);
        }
        self.oam_dma_triggered = true;
    }

    /// Whether the instruction that just executed triggered an OAM DMA.
    pub(crate) fn take_oam_dma_triggered(&mut self) -> bool {
        std::mem::take(&mut self.oam_dma_triggered)
    }
}
