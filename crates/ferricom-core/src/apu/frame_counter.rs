/// APU frame sequencer.
///
/// Ticks at CPU rate and divides time into quarter- and half-frame clocks at
/// the canonical NTSC cycle marks. The 4-step mode raises the frame IRQ on
/// its last step unless inhibited; the 5-step mode never raises it and
/// immediately clocks a quarter+half frame when selected via `$4017`.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FrameCounter {
    five_step: bool,
    irq_inhibit: bool,
    cycle: u32,
}

/// Clocks produced by one frame-counter tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct FrameClock {
    pub quarter: bool,
    pub half: bool,
    pub irq: bool,
}

const STEP_1: u32 = 7_457;
const STEP_2: u32 = 14_913;
const STEP_3: u32 = 22_371;
const STEP_4: u32 = 29_829;
const FOUR_STEP_PERIOD: u32 = 29_830;
const STEP_5: u32 = 37_281;
const FIVE_STEP_PERIOD: u32 = 37_282;

impl FrameCounter {
    /// `$4017` write. Returns an immediate quarter+half clock in 5-step mode.
    pub fn write_control(&mut self, value: u8) -> FrameClock {
        self.five_step = value & 0x80 != 0;
        self.irq_inhibit = value & 0x40 != 0;
        self.cycle = 0;

        if self.five_step {
            FrameClock {
                quarter: true,
                half: true,
                irq: false,
            }
        } else {
            FrameClock::default()
        }
    }

    pub fn irq_inhibited(&self) -> bool {
        self.irq_inhibit
    }

    /// One CPU-cycle tick.
    pub fn tick(&mut self) -> FrameClock {
        self.cycle += 1;
        let mut clock = FrameClock::default();

        if self.five_step {
            match self.cycle {
                STEP_1 | STEP_3 => clock.quarter = true,
                STEP_2 => {
                    clock.quarter = true;
                    clock.half = true;
                }
                STEP_5 => {
                    clock.quarter = true;
                    clock.half = true;
                }
                _ => {}
            }
            if self.cycle >= FIVE_STEP_PERIOD {
                self.cycle = 0;
            }
        } else {
            match self.cycle {
                STEP_1 | STEP_3 => clock.quarter = true,
                STEP_2 => {
                    clock.quarter = true;
                    clock.half = true;
                }
                STEP_4 => {
                    clock.quarter = true;
                    clock.half = true;
                    clock.irq = !self.irq_inhibit;
                }
                _ => {}
            }
            if self.cycle >= FOUR_STEP_PERIOD {
                self.cycle = 0;
            }
        }

        clock
    }
}
