use bitflags::bitflags;

bitflags! {
    /// The 8-bit processor status register (P).
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// N V U B D I Z C
    /// ```
    /// The unused bit (U) always reads as 1 in pushed status bytes. Decimal
    /// mode (D) is writable but has no arithmetic effect on the 2A03.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) struct Status: u8 {
        /// Carry flag (C).
        const CARRY     = 0b0000_0001;
        /// Zero flag (Z).
        const ZERO      = 0b0000_0010;
        /// Interrupt disable flag (I); masks IRQ while set.
        const INTERRUPT = 0b0000_0100;
        /// Decimal mode flag (D); storage only on the 2A03.
        const DECIMAL   = 0b0000_1000;
        /// Break flag (B); set in bytes pushed by PHP/BRK, clear for
        /// hardware interrupts. Not a real flip-flop in the CPU.
        const BREAK     = 0b0001_0000;
        /// Unused bit; observed as 1 whenever P is pushed.
        const UNUSED    = 0b0010_0000;
        /// Overflow flag (V).
        const OVERFLOW  = 0b0100_0000;
        /// Negative flag (N); mirrors bit 7 of the last result.
        const NEGATIVE  = 0b1000_0000;
    }
}

impl Status {
    /// Power-on state: I and U set.
    pub fn power_on() -> Self {
        Status::INTERRUPT | Status::UNUSED
    }

    /// Set Z and N from an 8-bit result.
    #[inline]
    pub fn set_zn(&mut self, value: u8) {
        self.set(Status::ZERO, value == 0);
        self.set(Status::NEGATIVE, value & 0x80 != 0);
    }

    #[inline]
    pub fn set_c(&mut self, value: bool) {
        self.set(Status::CARRY, value);
    }

    #[inline]
    pub fn set_v(&mut self, value: bool) {
        self.set(Status::OVERFLOW, value);
    }

    #[inline]
    pub fn c(&self) -> bool {
        self.contains(Status::CARRY)
    }

    #[inline]
    pub fn z(&self) -> bool {
        self.contains(Status::ZERO)
    }

    #[inline]
    pub fn n(&self) -> bool {
        self.contains(Status::NEGATIVE)
    }

    #[inline]
    pub fn v(&self) -> bool {
        self.contains(Status::OVERFLOW)
    }
}
