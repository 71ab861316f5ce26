/// Oscillator shape. The discriminants are the waveform ids used by patches.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine = 0,
    Square = 1,
    Triangle = 2,
    Sawtooth = 3,
    Noise = 4,
}

impl TryFrom<u8> for Waveform {
    type Error = u8;

    fn try_from(id: u8) -> Result<Self, u8> {
        Ok(match id {
            0 => Waveform::Sine,
            1 => Waveform::Square,
            2 => Waveform::Triangle,
            3 => Waveform::Sawtooth,
            4 => Waveform::Noise,
            other => return Err(other),
        })
    }
}

/// First half of a sine cycle in 16 steps; the second half is its negation.
const SINE_TABLE: [i16; 17] = [
    0, 6392, 12539, 18204, 23169, 27244, 30272, 32137, 32767, 32137, 30272, 27244, 23169, 18204, 12539, 6392, 0,
];
const INTERP_BITS: u32 = 11;
const INTERP_MASK: i32 = (1 << INTERP_BITS) - 1;

#[inline(always)]
pub fn sine(phase: u16) -> i16 {
    let idx = ((phase >> INTERP_BITS) & 0x0F) as usize;
    let frac = phase as i32 & INTERP_MASK;
    let a = SINE_TABLE[idx] as i32;
    let b = SINE_TABLE[idx + 1] as i32;
    let v = a + (((b - a) * frac) >> INTERP_BITS);
    if phase & 0x8000 != 0 { -v as i16 } else { v as i16 }
}

#[inline(always)]
pub fn square(phase: u16) -> i16 {
    if phase & 0x8000 == 0 { i16::MAX } else { i16::MIN }
}

#[inline(always)]
pub fn triangle(phase: u16) -> i16 {
    let sub = ((phase & 0x3FFF) << 1) as i32;
    let v = match phase >> 14 {
        0 => sub,
        1 => 32767 - sub,
        2 => -sub,
        _ => -32768 + sub,
    };
    v as i16
}

#[inline(always)]
pub fn sawtooth(phase: u16) -> i16 {
    (phase as i32 - 32768) as i16
}

/// 16-bit Galois LFSR, taps 16 14 13 11.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lfsr(u16);

impl Lfsr {
    pub const SEED: u16 = 0xACE1;

    pub const fn new() -> Self {
        Lfsr(Self::SEED)
    }

    #[inline(always)]
    pub fn step(&mut self) {
        let lsb = self.0 & 1;
        self.0 >>= 1;
        if lsb != 0 {
            self.0 ^= 0xB400;
        }
    }

    #[inline(always)]
    pub fn value(&self) -> i16 {
        if self.0 & 1 != 0 { i16::MAX } else { -i16::MAX }
    }
}

impl Default for Lfsr {
    fn default() -> Self {
        Self::new()
    }
}

/// 16.16 phase accumulator; a full `u32` wrap is one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Oscillator {
    pub waveform: Waveform,
    phase: u32,
    noise: Lfsr,
}

impl Oscillator {
    pub const fn new() -> Self {
        Self { waveform: Waveform::Sine, phase: 0, noise: Lfsr::new() }
    }

    pub fn phase(&self) -> u32 {
        self.phase
    }

    /// Waveform value at the current phase.
    #[inline(always)]
    pub fn value(&self) -> i16 {
        let phase = (self.phase >> 16) as u16;
        match self.waveform {
            Waveform::Sine => sine(phase),
            Waveform::Square => square(phase),
            Waveform::Triangle => triangle(phase),
            Waveform::Sawtooth => sawtooth(phase),
            Waveform::Noise => self.noise.value(),
        }
    }

    /// Moves one sample forward. The noise register steps every sample
    /// whatever the increment.
    #[inline(always)]
    pub fn advance(&mut self, increment: u32) {
        self.phase = self.phase.wrapping_add(increment);
        self.noise.step();
    }
}
