//! The 256-entry opcode decode table.
//!
//! Each entry names the operation, its addressing mode, the base cycle count
//! from the canonical timing table, and whether an indexed read crossing a
//! page boundary costs an extra cycle. Read-modify-write and store variants
//! carry the upper cycle count directly and never take the penalty.
//!
//! Undocumented opcodes are decoded like official ones. The halt opcodes and
//! the unstable high-register stores (`SHA`/`SHX`/`SHY`/`TAS`/`XAA`/`LAS`)
//! decode as `Jam`/`Nop` so nothing can wedge the emulator.

use crate::cpu::{addressing::AddressingMode, mnemonic::Mnemonic};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Instruction {
    pub mnemonic: Mnemonic,
    pub mode: AddressingMode,
    pub cycles: u8,
    /// +1 cycle when an indexed read crosses a page boundary.
    pub page_penalty: bool,
}

const fn op(mnemonic: Mnemonic, mode: AddressingMode, cycles: u8) -> Instruction {
    Instruction {
        mnemonic,
        mode,
        cycles,
        page_penalty: false,
    }
}

/// Same as [`op`] but with the page-cross penalty.
const fn pp(mnemonic: Mnemonic, mode: AddressingMode, cycles: u8) -> Instruction {
    Instruction {
        mnemonic,
        mode,
        cycles,
        page_penalty: true,
    }
}

use AddressingMode::*;
use Mnemonic::*;

#[rustfmt::skip]
pub(crate) static LOOKUP_TABLE: [Instruction; 256] = [
    // 0x00
    op(Brk, Implied, 7),        op(Ora, IndexedIndirect, 6), op(Jam, Implied, 2), op(Slo, IndexedIndirect, 8),
    op(Nop, ZeroPage, 3),       op(Ora, ZeroPage, 3),        op(Asl, ZeroPage, 5), op(Slo, ZeroPage, 5),
    op(Php, Implied, 3),        op(Ora, Immediate, 2),       op(Asl, Accumulator, 2), op(Anc, Immediate, 2),
    op(Nop, Absolute, 4),       op(Ora, Absolute, 4),        op(Asl, Absolute, 6), op(Slo, Absolute, 6),
    // 0x10
    op(Bpl, Relative, 2),       pp(Ora, IndirectIndexed, 5), op(Jam, Implied, 2), op(Slo, IndirectIndexed, 8),
    op(Nop, ZeroPageX, 4),      op(Ora, ZeroPageX, 4),       op(Asl, ZeroPageX, 6), op(Slo, ZeroPageX, 6),
    op(Clc, Implied, 2),        pp(Ora, AbsoluteY, 4),       op(Nop, Implied, 2), op(Slo, AbsoluteY, 7),
    pp(Nop, AbsoluteX, 4),      pp(Ora, AbsoluteX, 4),       op(Asl, AbsoluteX, 7), op(Slo, AbsoluteX, 7),
    // 0x20
    op(Jsr, Absolute, 6),       op(And, IndexedIndirect, 6), op(Jam, Implied, 2), op(Rla, IndexedIndirect, 8),
    op(Bit, ZeroPage, 3),       op(And, ZeroPage, 3),        op(Rol, ZeroPage, 5), op(Rla, ZeroPage, 5),
    op(Plp, Implied, 4),        op(And, Immediate, 2),       op(Rol, Accumulator, 2), op(Anc, Immediate, 2),
    op(Bit, Absolute, 4),       op(And, Absolute, 4),        op(Rol, Absolute, 6), op(Rla, Absolute, 6),
    // 0x30
    op(Bmi, Relative, 2),       pp(And, IndirectIndexed, 5), op(Jam, Implied, 2), op(Rla, IndirectIndexed, 8),
    op(Nop, ZeroPageX, 4),      op(And, ZeroPageX, 4),       op(Rol, ZeroPageX, 6), op(Rla, ZeroPageX, 6),
    op(Sec, Implied, 2),        pp(And, AbsoluteY, 4),       op(Nop, Implied, 2), op(Rla, AbsoluteY, 7),
    pp(Nop, AbsoluteX, 4),      pp(And, AbsoluteX, 4),       op(Rol, AbsoluteX, 7), op(Rla, AbsoluteX, 7),
    // 0x40
    op(Rti, Implied, 6),        op(Eor, IndexedIndirect, 6), op(Jam, Implied, 2), op(Sre, IndexedIndirect, 8),
    op(Nop, ZeroPage, 3),       op(Eor, ZeroPage, 3),        op(Lsr, ZeroPage, 5), op(Sre, ZeroPage, 5),
    op(Pha, Implied, 3),        op(Eor, Immediate, 2),       op(Lsr, Accumulator, 2), op(Asr, Immediate, 2),
    op(Jmp, Absolute, 3),       op(Eor, Absolute, 4),        op(Lsr, Absolute, 6), op(Sre, Absolute, 6),
    // 0x50
    op(Bvc, Relative, 2),       pp(Eor, IndirectIndexed, 5), op(Jam, Implied, 2), op(Sre, IndirectIndexed, 8),
    op(Nop, ZeroPageX, 4),      op(Eor, ZeroPageX, 4),       op(Lsr, ZeroPageX, 6), op(Sre, ZeroPageX, 6),
    op(Cli, Implied, 2),        pp(Eor, AbsoluteY, 4),       op(Nop, Implied, 2), op(Sre, AbsoluteY, 7),
    pp(Nop, AbsoluteX, 4),      pp(Eor, AbsoluteX, 4),       op(Lsr, AbsoluteX, 7), op(Sre, AbsoluteX, 7),
    // 0x60
    op(Rts, Implied, 6),        op(Adc, IndexedIndirect, 6), op(Jam, Implied, 2), op(Rra, IndexedIndirect, 8),
    op(Nop, ZeroPage, 3),       op(Adc, ZeroPage, 3),        op(Ror, ZeroPage, 5), op(Rra, ZeroPage, 5),
    op(Pla, Implied, 4),        op(Adc, Immediate, 2),       op(Ror, Accumulator, 2), op(Arr, Immediate, 2),
    op(Jmp, Indirect, 5),       op(Adc, Absolute, 4),        op(Ror, Absolute, 6), op(Rra, Absolute, 6),
    // 0x70
    op(Bvs, Relative, 2),       pp(Adc, IndirectIndexed, 5), op(Jam, Implied, 2), op(Rra, IndirectIndexed, 8),
    op(Nop, ZeroPageX, 4),      op(Adc, ZeroPageX, 4),       op(Ror, ZeroPageX, 6), op(Rra, ZeroPageX, 6),
    op(Sei, Implied, 2),        pp(Adc, AbsoluteY, 4),       op(Nop, Implied, 2), op(Rra, AbsoluteY, 7),
    pp(Nop, AbsoluteX, 4),      pp(Adc, AbsoluteX, 4),       op(Ror, AbsoluteX, 7), op(Rra, AbsoluteX, 7),
    // 0x80
    op(Nop, Immediate, 2),      op(Sta, IndexedIndirect, 6), op(Nop, Immediate, 2), op(Sax, IndexedIndirect, 6),
    op(Sty, ZeroPage, 3),       op(Sta, ZeroPage, 3),        op(Stx, ZeroPage, 3), op(Sax, ZeroPage, 3),
    op(Dey, Implied, 2),        op(Nop, Immediate, 2),       op(Txa, Implied, 2), op(Nop, Immediate, 2),
    op(Sty, Absolute, 4),       op(Sta, Absolute, 4),        op(Stx, Absolute, 4), op(Sax, Absolute, 4),
    // 0x90
    op(Bcc, Relative, 2),       op(Sta, IndirectIndexed, 6), op(Jam, Implied, 2), op(Nop, IndirectIndexed, 6),
    op(Sty, ZeroPageX, 4),      op(Sta, ZeroPageX, 4),       op(Stx, ZeroPageY, 4), op(Sax, ZeroPageY, 4),
    op(Tya, Implied, 2),        op(Sta, AbsoluteY, 5),       op(Txs, Implied, 2), op(Nop, AbsoluteY, 5),
    op(Nop, AbsoluteX, 5),      op(Sta, AbsoluteX, 5),       op(Nop, AbsoluteY, 5), op(Nop, AbsoluteY, 5),
    // 0xA0
    op(Ldy, Immediate, 2),      op(Lda, IndexedIndirect, 6), op(Ldx, Immediate, 2), op(Lax, IndexedIndirect, 6),
    op(Ldy, ZeroPage, 3),       op(Lda, ZeroPage, 3),        op(Ldx, ZeroPage, 3), op(Lax, ZeroPage, 3),
    op(Tay, Implied, 2),        op(Lda, Immediate, 2),       op(Tax, Implied, 2), op(Lxa, Immediate, 2),
    op(Ldy, Absolute, 4),       op(Lda, Absolute, 4),        op(Ldx, Absolute, 4), op(Lax, Absolute, 4),
    // 0xB0
    op(Bcs, Relative, 2),       pp(Lda, IndirectIndexed, 5), op(Jam, Implied, 2), pp(Lax, IndirectIndexed, 5),
    op(Ldy, ZeroPageX, 4),      op(Lda, ZeroPageX, 4),       op(Ldx, ZeroPageY, 4), op(Lax, ZeroPageY, 4),
    op(Clv, Implied, 2),        pp(Lda, AbsoluteY, 4),       op(Tsx, Implied, 2), pp(Nop, AbsoluteY, 4),
    pp(Ldy, AbsoluteX, 4),      pp(Lda, AbsoluteX, 4),       pp(Ldx, AbsoluteY, 4), pp(Lax, AbsoluteY, 4),
    // 0xC0
    op(Cpy, Immediate, 2),      op(Cmp, IndexedIndirect, 6), op(Nop, Immediate, 2), op(Dcp, IndexedIndirect, 8),
    op(Cpy, ZeroPage, 3),       op(Cmp, ZeroPage, 3),        op(Dec, ZeroPage, 5), op(Dcp, ZeroPage, 5),
    op(Iny, Implied, 2),        op(Cmp, Immediate, 2),       op(Dex, Implied, 2), op(Axs, Immediate, 2),
    op(Cpy, Absolute, 4),       op(Cmp, Absolute, 4),        op(Dec, Absolute, 6), op(Dcp, Absolute, 6),
    // 0xD0
    op(Bne, Relative, 2),       pp(Cmp, IndirectIndexed, 5), op(Jam, Implied, 2), op(Dcp, IndirectIndexed, 8),
    op(Nop, ZeroPageX, 4),      op(Cmp, ZeroPageX, 4),       op(Dec, ZeroPageX, 6), op(Dcp, ZeroPageX, 6),
    op(Cld, Implied, 2),        pp(Cmp, AbsoluteY, 4),       op(Nop, Implied, 2), op(Dcp, AbsoluteY, 7),
    pp(Nop, AbsoluteX, 4),      pp(Cmp, AbsoluteX, 4),       op(Dec, AbsoluteX, 7), op(Dcp, AbsoluteX, 7),
    // 0xE0
    op(Cpx, Immediate, 2),      op(Sbc, IndexedIndirect, 6), op(Nop, Immediate, 2), op(Isb, IndexedIndirect, 8),
    op(Cpx, ZeroPage, 3),       op(Sbc, ZeroPage, 3),        op(Inc, ZeroPage, 5), op(Isb, ZeroPage, 5),
    op(Inx, Implied, 2),        op(Sbc, Immediate, 2),       op(Nop, Implied, 2), op(Sbc, Immediate, 2),
    op(Cpx, Absolute, 4),       op(Sbc, Absolute, 4),        op(Inc, Absolute, 6), op(Isb, Absolute, 6),
    // 0xF0
    op(Beq, Relative, 2),       pp(Sbc, IndirectIndexed, 5), op(Jam, Implied, 2), op(Isb, IndirectIndexed, 8),
    op(Nop, ZeroPageX, 4),      op(Sbc, ZeroPageX, 4),       op(Inc, ZeroPageX, 6), op(Isb, ZeroPageX, 6),
    op(Sed, Implied, 2),        pp(Sbc, AbsoluteY, 4),       op(Nop, Implied, 2), op(Isb, AbsoluteY, 7),
    pp(Nop, AbsoluteX, 4),      pp(Sbc, AbsoluteX, 4),       op(Inc, AbsoluteX, 7), op(Isb, AbsoluteX, 7),
];
