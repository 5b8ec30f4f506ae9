//! 6502 (2A03) CPU core.
//!
//! Instruction-accurate: each `step` fetches, decodes via the 256-entry
//! lookup table, executes, and returns the cycle count including page-cross
//! penalties and any OAM DMA stall triggered by the instruction. Memory
//! accesses go through the borrowed [`CpuBus`], so dummy reads on page
//! crossings hit memory-mapped registers exactly as on hardware.

use crate::{
    bus::CpuBus,
    cpu::{
        addressing::AddressingMode,
        lookup::{Instruction, LOOKUP_TABLE},
        mnemonic::Mnemonic,
        status::Status,
    },
    memory::cpu as cpu_mem,
};

pub(crate) mod addressing;
pub(crate) mod lookup;
pub(crate) mod mnemonic;
pub(crate) mod status;

/// Lightweight CPU register snapshot used for tracing/debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuSnapshot {
    pub pc: u16,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub s: u8,
    pub p: u8,
}

impl std::fmt::Display for CpuSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "A:{:02X} X:{:02X} Y:{:02X} S:{:02X} P:{:02X} PC:{:04X}",
            self.a, self.x, self.y, self.s, self.p, self.pc
        )
    }
}

/// Minimal opcode metadata for debugging / disassembly helpers.
#[derive(Debug, Clone, Copy)]
pub struct OpcodeMeta {
    pub mnemonic: &'static str,
    pub length: u16,
    pub base_cycles: u8,
}

/// Returns the mnemonic and shape of a raw opcode.
pub fn opcode_meta(opcode: u8) -> OpcodeMeta {
    let instr = &LOOKUP_TABLE[opcode as usize];
    OpcodeMeta {
        mnemonic: instr.mnemonic.name(),
        length: instr.mode.length(),
        base_cycles: instr.cycles,
    }
}

#[derive(Debug, Clone)]
pub struct Cpu {
    pub(crate) a: u8,
    pub(crate) x: u8,
    pub(crate) y: u8,
    pub(crate) s: u8,
    pub(crate) p: Status,
    pub(crate) pc: u16,

    /// Edge-latched NMI input; cleared when the interrupt is serviced.
    nmi_pending: bool,
    /// Level-sensitive IRQ input, re-sampled by the harness every step.
    irq_line: bool,

    /// Total CPU cycles since reset.
    pub(crate) cycles: u64,
}

impl Cpu {
    pub(crate) fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            s: 0xFD,
            p: Status::power_on(),
            pc: 0,
            nmi_pending: false,
            irq_line: false,
            cycles: 0,
        }
    }

    /// Reset sequence: clear registers, restore the power-on status, and load
    /// PC from the reset vector.
    pub(crate) fn reset(&mut self, bus: &mut CpuBus<'_>) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.s = 0xFD;
        self.p = Status::power_on();
        self.pc = self.read16(bus, cpu_mem::RESET_VECTOR);
        self.nmi_pending = false;
        self.irq_line = false;
        self.cycles = 0;
    }

    /// Latches an NMI edge.
    pub(crate) fn nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Drives the level-sensitive IRQ input.
    pub(crate) fn set_irq_line(&mut self, level: bool) {
        self.irq_line = level;
    }

    pub(crate) fn snapshot(&self) -> CpuSnapshot {
        CpuSnapshot {
            pc: self.pc,
            a: self.a,
            x: self.x,
            y: self.y,
            s: self.s,
            p: self.p.bits(),
        }
    }

    /// Services a pending interrupt if any, otherwise executes one
    /// instruction. Returns the cycles consumed, including an OAM DMA stall
    /// when the instruction triggered one.
    pub(crate) fn step(&mut self, bus: &mut CpuBus<'_>) -> u32 {
        if self.nmi_pending {
            self.nmi_pending = false;
            let cycles = self.service_interrupt(bus, cpu_mem::NMI_VECTOR);
            self.cycles += cycles as u64;
            return cycles;
        }
        if self.irq_line && !self.p.contains(Status::INTERRUPT) {
            let cycles = self.service_interrupt(bus, cpu_mem::IRQ_VECTOR);
            self.cycles += cycles as u64;
            return cycles;
        }

        let opcode = self.fetch(bus);
        let instr = &LOOKUP_TABLE[opcode as usize];
        let mut cycles = instr.cycles as u32 + self.execute(bus, instr);

        // A write to $4014 stalls the CPU for 513 cycles, 514 when the
        // trigger lands on an odd cycle.
        if bus.take_oam_dma_triggered() {
            let odd = (self.cycles + cycles as u64) & 1 != 0;
            cycles += 513 + u32::from(odd);
        }

        self.cycles += cycles as u64;
        cycles
    }

    /// Interrupt entry: push PC and status (B clear for hardware interrupts),
    /// set I, load the vector. 7 cycles.
    fn service_interrupt(&mut self, bus: &mut CpuBus<'_>, vector: u16) -> u32 {
        self.push16(bus, self.pc);
        let pushed = (self.p | Status::UNUSED) & !Status::BREAK;
        self.push(bus, pushed.bits());
        self.p.insert(Status::INTERRUPT);
        self.pc = self.read16(bus, vector);
        7
    }

    #[inline]
    fn fetch(&mut self, bus: &mut CpuBus<'_>) -> u8 {
        let value = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    fn fetch16(&mut self, bus: &mut CpuBus<'_>) -> u16 {
        let lo = self.fetch(bus) as u16;
        let hi = self.fetch(bus) as u16;
        hi << 8 | lo
    }

    fn read16(&mut self, bus: &mut CpuBus<'_>, addr: u16) -> u16 {
        let lo = bus.read(addr) as u16;
        let hi = bus.read(addr.wrapping_add(1)) as u16;
        hi << 8 | lo
    }

    fn push(&mut self, bus: &mut CpuBus<'_>, value: u8) {
        bus.write(cpu_mem::STACK_PAGE_START | self.s as u16, value);
        self.s = self.s.wrapping_sub(1);
    }

    fn pull(&mut self, bus: &mut CpuBus<'_>) -> u8 {
        self.s = self.s.wrapping_add(1);
        bus.read(cpu_mem::STACK_PAGE_START | self.s as u16)
    }

    fn push16(&mut self, bus: &mut CpuBus<'_>, value: u16) {
        self.push(bus, (value >> 8) as u8);
        self.push(bus, value as u8);
    }

    fn pull16(&mut self, bus: &mut CpuBus<'_>) -> u16 {
        let lo = self.pull(bus) as u16;
        let hi = self.pull(bus) as u16;
        hi << 8 | lo
    }

    /// Resolves the operand address for `mode`, reporting whether an indexed
    /// access crossed a page. On a crossing, the wrong-page address is read
    /// first (the observable dummy read).
    fn operand_address(&mut self, bus: &mut CpuBus<'_>, mode: AddressingMode) -> (u16, bool) {
        match mode {
            AddressingMode::Immediate => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                (addr, false)
            }
            AddressingMode::ZeroPage => (self.fetch(bus) as u16, false),
            AddressingMode::ZeroPageX => {
                let base = self.fetch(bus);
                (base.wrapping_add(self.x) as u16, false)
            }
            AddressingMode::ZeroPageY => {
                let base = self.fetch(bus);
                (base.wrapping_add(self.y) as u16, false)
            }
            AddressingMode::Absolute => (self.fetch16(bus), false),
            AddressingMode::AbsoluteX => {
                let base = self.fetch16(bus);
                self.indexed(bus, base, self.x)
            }
            AddressingMode::AbsoluteY => {
                let base = self.fetch16(bus);
                self.indexed(bus, base, self.y)
            }
            AddressingMode::Indirect => {
                let ptr = self.fetch16(bus);
                let lo = bus.read(ptr) as u16;
                // The 6502 bug: the high byte comes from the same page.
                let hi_addr = (ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF);
                let hi = bus.read(hi_addr) as u16;
                (hi << 8 | lo, false)
            }
            AddressingMode::IndexedIndirect => {
                let zp = self.fetch(bus).wrapping_add(self.x);
                let lo = bus.read(zp as u16) as u16;
                let hi = bus.read(zp.wrapping_add(1) as u16) as u16;
                (hi << 8 | lo, false)
            }
            AddressingMode::IndirectIndexed => {
                let zp = self.fetch(bus);
                let lo = bus.read(zp as u16) as u16;
                let hi = bus.read(zp.wrapping_add(1) as u16) as u16;
                let base = hi << 8 | lo;
                self.indexed(bus, base, self.y)
            }
            AddressingMode::Implied | AddressingMode::Accumulator | AddressingMode::Relative => {
                unreachable!("mode without an operand address")
            }
        }
    }

    /// Index addition with page-cross detection and the dummy read from the
    /// partially-carried address.
    fn indexed(&mut self, bus: &mut CpuBus<'_>, base: u16, index: u8) -> (u16, bool) {
        let addr = base.wrapping_add(index as u16);
        let crossed = base & 0xFF00 != addr & 0xFF00;
        if crossed {
            let wrong = (base & 0xFF00) | (addr & 0x00FF);
            bus.read(wrong);
        }
        (addr, crossed)
    }

    /// Reads the operand value for a read-type instruction. Adds the page
    /// penalty to `extra` when it applies.
    fn load_operand(
        &mut self,
        bus: &mut CpuBus<'_>,
        instr: &Instruction,
        extra: &mut u32,
    ) -> u8 {
        match instr.mode {
            AddressingMode::Accumulator => self.a,
            _ => {
                let (addr, crossed) = self.operand_address(bus, instr.mode);
                if crossed && instr.page_penalty {
                    *extra += 1;
                }
                bus.read(addr)
            }
        }
    }

    /// Executes one decoded instruction; returns extra cycles beyond the base
    /// count (page penalties, branch costs).
    fn execute(&mut self, bus: &mut CpuBus<'_>, instr: &Instruction) -> u32 {
        use Mnemonic::*;

        let mut extra = 0u32;
        match instr.mnemonic {
            // Loads and stores -------------------------------------------------
            Lda => {
                let value = self.load_operand(bus, instr, &mut extra);
                self.a = value;
                self.p.set_zn(value);
            }
            Ldx => {
                let value = self.load_operand(bus, instr, &mut extra);
                self.x = value;
                self.p.set_zn(value);
            }
            Ldy => {
                let value = self.load_operand(bus, instr, &mut extra);
                self.y = value;
                self.p.set_zn(value);
            }
            Sta => {
                let (addr, _) = self.operand_address(bus, instr.mode);
                bus.write(addr, self.a);
            }
            Stx => {
                let (addr, _) = self.operand_address(bus, instr.mode);
                bus.write(addr, self.x);
            }
            Sty => {
                let (addr, _) = self.operand_address(bus, instr.mode);
                bus.write(addr, self.y);
            }

            // Arithmetic -------------------------------------------------------
            Adc => {
                let value = self.load_operand(bus, instr, &mut extra);
                self.adc(value);
            }
            Sbc => {
                let value = self.load_operand(bus, instr, &mut extra);
                self.adc(!value);
            }
            Cmp => {
                let value = self.load_operand(bus, instr, &mut extra);
                self.compare(self.a, value);
            }
            Cpx => {
                let value = self.load_operand(bus, instr, &mut extra);
                self.compare(self.x, value);
            }
            Cpy => {
                let value = self.load_operand(bus, instr, &mut extra);
                self.compare(self.y, value);
            }

            // Logic ------------------------------------------------------------
            And => {
                let value = self.load_operand(bus, instr, &mut extra);
                self.a &= value;
                self.p.set_zn(self.a);
            }
            Ora => {
                let value = self.load_operand(bus, instr, &mut extra);
                self.a |= value;
                self.p.set_zn(self.a);
            }
            Eor => {
                let value = self.load_operand(bus, instr, &mut extra);
                self.a ^= value;
                self.p.set_zn(self.a);
            }
            Bit => {
                let value = self.load_operand(bus, instr, &mut extra);
                self.p.set(Status::ZERO, self.a & value == 0);
                self.p.set(Status::NEGATIVE, value & 0x80 != 0);
                self.p.set_v(value & 0x40 != 0);
            }

            // Shifts and rotates -----------------------------------------------
            Asl => {
                self.read_modify_write(bus, instr, Self::asl_value);
            }
            Lsr => {
                self.read_modify_write(bus, instr, Self::lsr_value);
            }
            Rol => {
                self.read_modify_write(bus, instr, Self::rol_value);
            }
            Ror => {
                self.read_modify_write(bus, instr, Self::ror_value);
            }

            // Increments and decrements ----------------------------------------
            Inc => {
                self.read_modify_write(bus, instr, |cpu, v| {
                    let r = v.wrapping_add(1);
                    cpu.p.set_zn(r);
                    r
                });
            }
            Dec => {
                self.read_modify_write(bus, instr, |cpu, v| {
                    let r = v.wrapping_sub(1);
                    cpu.p.set_zn(r);
                    r
                });
            }
            Inx => {
                self.x = self.x.wrapping_add(1);
                self.p.set_zn(self.x);
            }
            Iny => {
                self.y = self.y.wrapping_add(1);
                self.p.set_zn(self.y);
            }
            Dex => {
                self.x = self.x.wrapping_sub(1);
                self.p.set_zn(self.x);
            }
            Dey => {
                self.y = self.y.wrapping_sub(1);
                self.p.set_zn(self.y);
            }

            // Control flow -----------------------------------------------------
            Jmp => {
                let (addr, _) = self.operand_address(bus, instr.mode);
                self.pc = addr;
            }
            Jsr => {
                let target = self.fetch16(bus);
                self.push16(bus, self.pc.wrapping_sub(1));
                self.pc = target;
            }
            Rts => {
                self.pc = self.pull16(bus).wrapping_add(1);
            }
            Rti => {
                let status = self.pull(bus);
                self.p = (Status::from_bits_truncate(status) | Status::UNUSED) & !Status::BREAK;
                self.pc = self.pull16(bus);
            }
            Brk => {
                // BRK skips one padding byte; the pushed address points past it.
                let ret = self.pc.wrapping_add(1);
                self.push16(bus, ret);
                self.push(bus, (self.p | Status::UNUSED | Status::BREAK).bits());
                self.p.insert(Status::INTERRUPT);
                self.pc = self.read16(bus, cpu_mem::IRQ_VECTOR);
            }

            Bcc => extra += self.branch(bus, !self.p.c()),
            Bcs => extra += self.branch(bus, self.p.c()),
            Bne => extra += self.branch(bus, !self.p.z()),
            Beq => extra += self.branch(bus, self.p.z()),
            Bpl => extra += self.branch(bus, !self.p.n()),
            Bmi => extra += self.branch(bus, self.p.n()),
            Bvc => extra += self.branch(bus, !self.p.v()),
            Bvs => extra += self.branch(bus, self.p.v()),

            // Stack and status -------------------------------------------------
            Pha => self.push(bus, self.a),
            Php => {
                let pushed = self.p | Status::UNUSED | Status::BREAK;
                self.push(bus, pushed.bits());
            }
            Pla => {
                self.a = self.pull(bus);
                self.p.set_zn(self.a);
            }
            Plp => {
                let status = self.pull(bus);
                self.p = (Status::from_bits_truncate(status) | Status::UNUSED) & !Status::BREAK;
            }

            Clc => self.p.remove(Status::CARRY),
            Sec => self.p.insert(Status::CARRY),
            Cli => self.p.remove(Status::INTERRUPT),
            Sei => self.p.insert(Status::INTERRUPT),
            Clv => self.p.remove(Status::OVERFLOW),
            Cld => self.p.remove(Status::DECIMAL),
            Sed => self.p.insert(Status::DECIMAL),

            // Transfers --------------------------------------------------------
            Tax => {
                self.x = self.a;
                self.p.set_zn(self.x);
            }
            Tay => {
                self.y = self.a;
                self.p.set_zn(self.y);
            }
            Txa => {
                self.a = self.x;
                self.p.set_zn(self.a);
            }
            Tya => {
                self.a = self.y;
                self.p.set_zn(self.a);
            }
            Tsx => {
                self.x = self.s;
                self.p.set_zn(self.x);
            }
            Txs => self.s = self.x,

            // No-ops and halts -------------------------------------------------
            Nop => {
                // Undocumented NOP variants still perform their operand
                // fetches; the reads are observable on the bus.
                match instr.mode {
                    AddressingMode::Implied | AddressingMode::Accumulator => {}
                    _ => {
                        let _ = self.load_operand(bus, instr, &mut extra);
                    }
                }
            }
            Jam => {}

            // Undocumented operations ------------------------------------------
            Lax => {
                let value = self.load_operand(bus, instr, &mut extra);
                self.a = value;
                self.x = value;
                self.p.set_zn(value);
            }
            Sax => {
                let (addr, _) = self.operand_address(bus, instr.mode);
                bus.write(addr, self.a & self.x);
            }
            Dcp => {
                let result = self.read_modify_write(bus, instr, |_, v| v.wrapping_sub(1));
                self.compare(self.a, result);
            }
            Isb => {
                let result = self.read_modify_write(bus, instr, |_, v| v.wrapping_add(1));
                self.adc(!result);
            }
            Slo => {
                let result = self.read_modify_write(bus, instr, Self::asl_value);
                self.a |= result;
                self.p.set_zn(self.a);
            }
            Rla => {
                let result = self.read_modify_write(bus, instr, Self::rol_value);
                self.a &= result;
                self.p.set_zn(self.a);
            }
            Sre => {
                let result = self.read_modify_write(bus, instr, Self::lsr_value);
                self.a ^= result;
                self.p.set_zn(self.a);
            }
            Rra => {
                let result = self.read_modify_write(bus, instr, Self::ror_value);
                self.adc(result);
            }
            Anc => {
                let value = self.load_operand(bus, instr, &mut extra);
                self.a &= value;
                self.p.set_zn(self.a);
                self.p.set_c(self.a & 0x80 != 0);
            }
            Asr => {
                let value = self.load_operand(bus, instr, &mut extra);
                self.a &= value;
                self.p.set_c(self.a & 0x01 != 0);
                self.a >>= 1;
                self.p.set_zn(self.a);
            }
            Arr => {
                let value = self.load_operand(bus, instr, &mut extra);
                let carry_in = u8::from(self.p.c()) << 7;
                self.a = (self.a & value) >> 1 | carry_in;
                self.p.set_zn(self.a);
                self.p.set_c(self.a & 0x40 != 0);
                self.p.set_v(((self.a >> 6) ^ (self.a >> 5)) & 1 != 0);
            }
            Lxa => {
                let value = self.load_operand(bus, instr, &mut extra);
                self.a = value;
                self.x = value;
                self.p.set_zn(value);
            }
            Axs => {
                let value = self.load_operand(bus, instr, &mut extra);
                let masked = self.a & self.x;
                self.p.set_c(masked >= value);
                self.x = masked.wrapping_sub(value);
                self.p.set_zn(self.x);
            }
        }

        extra
    }

    /// Read-modify-write helper; applies `f` to the operand in place and
    /// returns the result. Accumulator-mode instructions operate on A.
    fn read_modify_write(
        &mut self,
        bus: &mut CpuBus<'_>,
        instr: &Instruction,
        f: impl FnOnce(&mut Self, u8) -> u8,
    ) -> u8 {
        if instr.mode == AddressingMode::Accumulator {
            let result = f(self, self.a);
            self.a = result;
            result
        } else {
            let (addr, _) = self.operand_address(bus, instr.mode);
            let value = bus.read(addr);
            let result = f(self, value);
            bus.write(addr, result);
            result
        }
    }

    fn adc(&mut self, value: u8) {
        let sum = self.a as u16 + value as u16 + u16::from(self.p.c());
        let result = sum as u8;
        self.p.set_c(sum > 0xFF);
        self.p
            .set_v((!(self.a ^ value) & (self.a ^ result)) & 0x80 != 0);
        self.a = result;
        self.p.set_zn(result);
    }

    fn compare(&mut self, register: u8, value: u8) {
        self.p.set_c(register >= value);
        self.p.set_zn(register.wrapping_sub(value));
    }

    fn asl_value(&mut self, value: u8) -> u8 {
        self.p.set_c(value & 0x80 != 0);
        let result = value << 1;
        self.p.set_zn(result);
        result
    }

    fn lsr_value(&mut self, value: u8) -> u8 {
        self.p.set_c(value & 0x01 != 0);
        let result = value >> 1;
        self.p.set_zn(result);
        result
    }

    fn rol_value(&mut self, value: u8) -> u8 {
        let carry_in = u8::from(self.p.c());
        self.p.set_c(value & 0x80 != 0);
        let result = value << 1 | carry_in;
        self.p.set_zn(result);
        result
    }

    fn ror_value(&mut self, value: u8) -> u8 {
        let carry_in = u8::from(self.p.c()) << 7;
        self.p.set_c(value & 0x01 != 0);
        let result = value >> 1 | carry_in;
        self.p.set_zn(result);
        result
    }

    /// Branch helper: fetches the offset, then adds 1 cycle when taken and
    /// another when the target lies on a different page.
    fn branch(&mut self, bus: &mut CpuBus<'_>, taken: bool) -> u32 {
        let offset = self.fetch(bus) as i8;
        if !taken {
            return 0;
        }
        let target = self.pc.wrapping_add(offset as u16);
        let crossed = self.pc & 0xFF00 != target & 0xFF00;
        self.pc = target;
        1 + u32::from(crossed)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_util::nes_with_program;
    use crate::Nes;

    /// Runs `count` instructions and returns the console for inspection.
    fn run(program: &[u8], count: usize) -> Nes {
        let mut nes = nes_with_program(program);
        for _ in 0..count {
            nes.step();
        }
        nes
    }

    fn flags(nes: &Nes) -> u8 {
        nes.cpu_snapshot().p
    }

    const C: u8 = 0x01;
    const Z: u8 = 0x02;
    const I: u8 = 0x04;
    const V: u8 = 0x40;
    const N: u8 = 0x80;

    // Loads, stores, transfers -------------------------------------------

    #[test]
    fn lda_sets_zero_and_negative() {
        let nes = run(&[0xA9, 0x00], 1);
        assert_eq!(nes.cpu_snapshot().a, 0);
        assert_ne!(flags(&nes) & Z, 0);

        let nes = run(&[0xA9, 0x80], 1);
        assert_ne!(flags(&nes) & N, 0);
        assert_eq!(flags(&nes) & Z, 0);
    }

    #[test]
    fn load_store_round_trip_all_registers() {
        // LDA/STA, LDX/STX, LDY/STY through zero page.
        let mut nes = run(
            &[
                0xA9, 0x11, 0x85, 0x20, // LDA #$11 / STA $20
                0xA2, 0x22, 0x86, 0x21, // LDX #$22 / STX $21
                0xA0, 0x33, 0x84, 0x22, // LDY #$33 / STY $22
            ],
            6,
        );
        assert_eq!(nes.cpu_read(0x0020), 0x11);
        assert_eq!(nes.cpu_read(0x0021), 0x22);
        assert_eq!(nes.cpu_read(0x0022), 0x33);
    }

    #[test]
    fn transfers_copy_and_set_flags() {
        let nes = run(&[0xA9, 0x00, 0xAA], 2); // LDA #0 / TAX
        assert_eq!(nes.cpu_snapshot().x, 0);
        assert_ne!(flags(&nes) & Z, 0);

        let nes = run(&[0xA2, 0x80, 0x8A], 2); // LDX #$80 / TXA
        assert_eq!(nes.cpu_snapshot().a, 0x80);
        assert_ne!(flags(&nes) & N, 0);

        // TXS does not touch flags.
        let nes = run(&[0xA2, 0x00, 0x9A], 2);
        assert_eq!(nes.cpu_snapshot().s, 0x00);
        assert_ne!(flags(&nes) & Z, 0, "Z from LDX survives TXS");
    }

    // Arithmetic ----------------------------------------------------------

    #[test]
    fn adc_signed_overflow_cases() {
        // 0x50 + 0x50 = 0xA0: V set (positive + positive = negative).
        let nes = run(&[0xA9, 0x50, 0x69, 0x50], 2);
        assert_eq!(nes.cpu_snapshot().a, 0xA0);
        assert_ne!(flags(&nes) & V, 0);
        assert_eq!(flags(&nes) & C, 0);

        // 0xD0 + 0x90 = 0x160: carry out, V set (negative + negative = positive).
        let nes = run(&[0xA9, 0xD0, 0x69, 0x90], 2);
        assert_eq!(nes.cpu_snapshot().a, 0x60);
        assert_ne!(flags(&nes) & V, 0);
        assert_ne!(flags(&nes) & C, 0);

        // 0x50 + 0x10: no overflow, no carry.
        let nes = run(&[0xA9, 0x50, 0x69, 0x10], 2);
        assert_eq!(flags(&nes) & (V | C), 0);
    }

    #[test]
    fn adc_consumes_carry_in() {
        // SEC / LDA #$01 / ADC #$01 -> 3.
        let nes = run(&[0x38, 0xA9, 0x01, 0x69, 0x01], 3);
        assert_eq!(nes.cpu_snapshot().a, 0x03);
    }

    #[test]
    fn sbc_borrow_semantics() {
        // SEC / LDA #$05 / SBC #$03 -> 2, carry stays set (no borrow).
        let nes = run(&[0x38, 0xA9, 0x05, 0xE9, 0x03], 3);
        assert_eq!(nes.cpu_snapshot().a, 0x02);
        assert_ne!(flags(&nes) & C, 0);

        // SEC / LDA #$03 / SBC #$05 -> $FE with borrow (carry clear).
        let nes = run(&[0x38, 0xA9, 0x03, 0xE9, 0x05], 3);
        assert_eq!(nes.cpu_snapshot().a, 0xFE);
        assert_eq!(flags(&nes) & C, 0);
        assert_ne!(flags(&nes) & N, 0);
    }

    #[test]
    fn sbc_alias_eb_matches_official() {
        let official = run(&[0x38, 0xA9, 0x40, 0xE9, 0x10], 3);
        let alias = run(&[0x38, 0xA9, 0x40, 0xEB, 0x10], 3);
        assert_eq!(official.cpu_snapshot().a, alias.cpu_snapshot().a);
        assert_eq!(official.cpu_snapshot().p, alias.cpu_snapshot().p);
    }

    #[test]
    fn decimal_flag_has_no_arithmetic_effect() {
        // SED / SEC / LDA #$09 / ADC #$01: binary result $0B, not BCD $10.
        let nes = run(&[0xF8, 0x38, 0xA9, 0x09, 0x69, 0x01], 4);
        assert_eq!(nes.cpu_snapshot().a, 0x0B);
        assert_ne!(flags(&nes) & 0x08, 0, "D flag itself is stored");
    }

    #[test]
    fn compare_family_sets_carry_on_greater_or_equal() {
        let nes = run(&[0xA9, 0x30, 0xC9, 0x20], 2); // CMP smaller
        assert_eq!(flags(&nes) & (C | Z), C);

        let nes = run(&[0xA9, 0x30, 0xC9, 0x30], 2); // CMP equal
        assert_eq!(flags(&nes) & (C | Z), C | Z);

        let nes = run(&[0xA9, 0x30, 0xC9, 0x40], 2); // CMP larger
        assert_eq!(flags(&nes) & C, 0);
        assert_ne!(flags(&nes) & N, 0);

        let nes = run(&[0xA2, 0x10, 0xE0, 0x10], 2); // CPX equal
        assert_eq!(flags(&nes) & (C | Z), C | Z);

        let nes = run(&[0xA0, 0x10, 0xC0, 0x20], 2); // CPY against a larger operand
        assert_eq!(flags(&nes) & C, 0);
    }

    // Logic ---------------------------------------------------------------

    #[test]
    fn and_ora_eor_results() {
        let nes = run(&[0xA9, 0xF0, 0x29, 0x0F], 2); // AND -> 0
        assert_ne!(flags(&nes) & Z, 0);

        let nes = run(&[0xA9, 0xF0, 0x09, 0x0F], 2); // ORA -> $FF
        assert_eq!(nes.cpu_snapshot().a, 0xFF);
        assert_ne!(flags(&nes) & N, 0);

        let nes = run(&[0xA9, 0xFF, 0x49, 0xFF], 2); // EOR -> 0
        assert_ne!(flags(&nes) & Z, 0);
    }

    #[test]
    fn bit_copies_memory_bits_into_n_and_v() {
        let mut nes = nes_with_program(&[0xA9, 0xFF, 0x24, 0x40]);
        nes.cpu_write(0x0040, 0xC0);
        nes.step();
        nes.step();
        assert_ne!(flags(&nes) & N, 0);
        assert_ne!(flags(&nes) & V, 0);
        assert_eq!(flags(&nes) & Z, 0);

        // A AND M == 0 sets Z even when M has high bits.
        let mut nes = nes_with_program(&[0xA9, 0x01, 0x24, 0x40]);
        nes.cpu_write(0x0040, 0xC0);
        nes.step();
        nes.step();
        assert_ne!(flags(&nes) & Z, 0);
    }

    // Shifts and rotates --------------------------------------------------

    #[test]
    fn shifts_move_bits_through_carry() {
        // ASL A: $81 -> $02, C=1.
        let nes = run(&[0xA9, 0x81, 0x0A], 2);
        assert_eq!(nes.cpu_snapshot().a, 0x02);
        assert_ne!(flags(&nes) & C, 0);

        // LSR A: $01 -> $00, C=1, Z=1.
        let nes = run(&[0xA9, 0x01, 0x4A], 2);
        assert_eq!(nes.cpu_snapshot().a, 0x00);
        assert_eq!(flags(&nes) & (C | Z), C | Z);

        // ROL A with carry in: $80 -> $01 (carry recycled).
        let nes = run(&[0x38, 0xA9, 0x80, 0x2A], 3);
        assert_eq!(nes.cpu_snapshot().a, 0x01);
        assert_ne!(flags(&nes) & C, 0);

        // ROR A with carry in: $01 -> $80.
        let nes = run(&[0x38, 0xA9, 0x01, 0x6A], 3);
        assert_eq!(nes.cpu_snapshot().a, 0x80);
        assert_ne!(flags(&nes) & C, 0);
        assert_ne!(flags(&nes) & N, 0);
    }

    #[test]
    fn memory_rmw_shift_writes_back() {
        let mut nes = nes_with_program(&[0x06, 0x40]); // ASL $40
        nes.cpu_write(0x0040, 0x41);
        nes.step();
        assert_eq!(nes.cpu_read(0x0040), 0x82);
    }

    // Increments / decrements --------------------------------------------

    #[test]
    fn inc_dec_wrap_and_flag() {
        let mut nes = nes_with_program(&[0xE6, 0x40]); // INC $40
        nes.cpu_write(0x0040, 0xFF);
        nes.step();
        assert_eq!(nes.cpu_read(0x0040), 0x00);
        assert_ne!(flags(&nes) & Z, 0);

        let nes = run(&[0xA2, 0x00, 0xCA], 2); // DEX from 0
        assert_eq!(nes.cpu_snapshot().x, 0xFF);
        assert_ne!(flags(&nes) & N, 0);
    }

    // Subroutines and interrupts -----------------------------------------

    #[test]
    fn jsr_rts_round_trip() {
        // JSR $0280 / (unreached) ... $0280: RTS. After RTS the PC is back
        // at the instruction following the JSR.
        let mut nes = nes_with_program(&[0x20, 0x80, 0x02]);
        nes.cpu_write(0x0280, 0x60);
        let jsr_cycles = nes.step();
        assert_eq!(jsr_cycles, 6);
        assert_eq!(nes.cpu_snapshot().pc, 0x0280);
        let rts_cycles = nes.step();
        assert_eq!(rts_cycles, 6);
        assert_eq!(nes.cpu_snapshot().pc, 0x0203);
    }

    #[test]
    fn brk_vectors_with_b_set_and_rti_returns() {
        // BRK at $0200 vectors through $FFFE to $0400 (the staged handler).
        let mut nes = nes_with_program(&[0x00, 0xEA, 0xEA]);
        let cycles = nes.step();
        assert_eq!(cycles, 7);
        assert_eq!(nes.cpu_snapshot().pc, 0x0400);
        assert_ne!(flags(&nes) & I, 0);

        // The pushed status byte has B and U set.
        let pushed = nes.cpu_read(0x0100 | u16::from(nes.cpu_snapshot().s) + 1);
        assert_eq!(pushed & 0x30, 0x30);

        // RTI (the staged handler) resumes after the BRK padding byte.
        nes.step();
        assert_eq!(nes.cpu_snapshot().pc, 0x0202);
    }

    #[test]
    fn nmi_takes_priority_over_irq() {
        // With both lines raised, the NMI vector ($0300) wins.
        let mut nes = nes_with_program(&[0x58, 0xEA, 0xEA, 0xEA]);
        nes.step(); // CLI
        // Raise both interrupt inputs directly.
        // (The APU/mapper would normally drive the IRQ line.)
        // NMI wins; the handler address comes from $FFFA.
        // Note: accessing the CPU internals is fine inside the crate.
        {
            let nes_ref = &mut nes;
            nes_ref.cpu_mut_for_tests().nmi();
            nes_ref.cpu_mut_for_tests().set_irq_line(true);
        }
        nes.step();
        assert_eq!(nes.cpu_snapshot().pc, 0x0300);
    }

    // Undocumented opcodes ------------------------------------------------

    #[test]
    fn slo_shifts_then_ors() {
        let mut nes = nes_with_program(&[0xA9, 0x01, 0x07, 0x40]); // SLO $40
        nes.cpu_write(0x0040, 0x81);
        nes.step();
        nes.step();
        assert_eq!(nes.cpu_read(0x0040), 0x02);
        assert_eq!(nes.cpu_snapshot().a, 0x03);
        assert_ne!(flags(&nes) & C, 0);
    }

    #[test]
    fn rla_rotates_then_ands() {
        let mut nes = nes_with_program(&[0x38, 0xA9, 0xFF, 0x27, 0x40]); // RLA $40
        nes.cpu_write(0x0040, 0x40);
        for _ in 0..3 {
            nes.step();
        }
        assert_eq!(nes.cpu_read(0x0040), 0x81);
        assert_eq!(nes.cpu_snapshot().a, 0x81);
    }

    #[test]
    fn sre_shifts_right_then_eors() {
        let mut nes = nes_with_program(&[0xA9, 0x00, 0x47, 0x40]); // SRE $40
        nes.cpu_write(0x0040, 0x03);
        nes.step();
        nes.step();
        assert_eq!(nes.cpu_read(0x0040), 0x01);
        assert_eq!(nes.cpu_snapshot().a, 0x01);
        assert_ne!(flags(&nes) & C, 0);
    }

    #[test]
    fn rra_rotates_then_adds() {
        // RRA $40 with M=$02: ROR -> $01 (C out 0), then ADC.
        let mut nes = nes_with_program(&[0xA9, 0x10, 0x67, 0x40]);
        nes.cpu_write(0x0040, 0x02);
        nes.step();
        nes.step();
        assert_eq!(nes.cpu_read(0x0040), 0x01);
        assert_eq!(nes.cpu_snapshot().a, 0x11);
    }

    #[test]
    fn isb_increments_then_subtracts() {
        // ISB $40 with M=$0F, A=$20, carry set: M -> $10, A -> $10.
        let mut nes = nes_with_program(&[0x38, 0xA9, 0x20, 0xE7, 0x40]);
        nes.cpu_write(0x0040, 0x0F);
        for _ in 0..3 {
            nes.step();
        }
        assert_eq!(nes.cpu_read(0x0040), 0x10);
        assert_eq!(nes.cpu_snapshot().a, 0x10);
    }

    #[test]
    fn sax_stores_a_and_x() {
        let mut nes = nes_with_program(&[0xA9, 0xF0, 0xA2, 0x3C, 0x87, 0x40]); // SAX $40
        for _ in 0..3 {
            nes.step();
        }
        assert_eq!(nes.cpu_read(0x0040), 0x30);
    }

    #[test]
    fn anc_sets_carry_from_bit7() {
        let nes = run(&[0xA9, 0xFF, 0x0B, 0x80], 2);
        assert_eq!(nes.cpu_snapshot().a, 0x80);
        assert_ne!(flags(&nes) & C, 0);

        let nes = run(&[0xA9, 0xFF, 0x0B, 0x7F], 2);
        assert_eq!(flags(&nes) & C, 0);
    }

    #[test]
    fn asr_ands_then_shifts_right() {
        let nes = run(&[0xA9, 0xFF, 0x4B, 0x03], 2); // ASR #$03
        assert_eq!(nes.cpu_snapshot().a, 0x01);
        assert_ne!(flags(&nes) & C, 0);
    }

    #[test]
    fn arr_rotates_with_bit6_carry() {
        // SEC / LDA #$FF / ARR #$FF: A = $FF ror with carry -> $FF, C from
        // bit 6 (set), V from bit6 ^ bit5 (clear).
        let nes = run(&[0x38, 0xA9, 0xFF, 0x6B, 0xFF], 3);
        assert_eq!(nes.cpu_snapshot().a, 0xFF);
        assert_ne!(flags(&nes) & C, 0);
        assert_eq!(flags(&nes) & V, 0);
    }

    #[test]
    fn lxa_loads_both_registers() {
        let nes = run(&[0xAB, 0x5A], 1);
        assert_eq!(nes.cpu_snapshot().a, 0x5A);
        assert_eq!(nes.cpu_snapshot().x, 0x5A);
    }

    #[test]
    fn axs_subtracts_from_a_and_x() {
        // A=$F0, X=$3C: (A & X) = $30; AXS #$10 -> X = $20, carry set.
        let nes = run(&[0xA9, 0xF0, 0xA2, 0x3C, 0xCB, 0x10], 3);
        assert_eq!(nes.cpu_snapshot().x, 0x20);
        assert_ne!(flags(&nes) & C, 0);
    }

    #[test]
    fn undocumented_nops_consume_their_operands() {
        // NOP zp ($04), NOP abs ($0C), NOP zp,X ($14): each advances PC past
        // its operand bytes without touching registers.
        let nes = run(&[0x04, 0x40, 0x0C, 0x00, 0x03, 0x14, 0x40], 3);
        assert_eq!(nes.cpu_snapshot().pc, 0x0207);
        assert_eq!(nes.cpu_snapshot().a, 0);
    }

    #[test]
    fn opcode_meta_describes_known_opcodes() {
        let meta = super::opcode_meta(0xA9);
        assert_eq!(meta.mnemonic, "LDA");
        assert_eq!(meta.length, 2);
        assert_eq!(meta.base_cycles, 2);

        let meta = super::opcode_meta(0x6C);
        assert_eq!(meta.mnemonic, "JMP");
        assert_eq!(meta.length, 3);
        assert_eq!(meta.base_cycles, 5);
    }
}
