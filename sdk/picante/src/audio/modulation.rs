//! Cross-voice FM.
//!
//! Voice `i` is modulated by voice `(i + 1) % VOICE_COUNT`. The modulator's raw
//! oscillator output, scaled by `depth / 255`, bends the carrier's phase
//! increment each sample.

use super::FULL_SCALE;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModulationKind {
    #[default]
    None = 0,
    /// Adds up to ±100% of the base increment.
    Linear = 1,
    /// Scales the base increment by 2^x, x in ±1 octave.
    Exponential = 2,
}

impl TryFrom<u8> for ModulationKind {
    type Error = u8;

    fn try_from(id: u8) -> Result<Self, u8> {
        Ok(match id {
            0 => ModulationKind::None,
            1 => ModulationKind::Linear,
            2 => ModulationKind::Exponential,
            other => return Err(other),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modulation {
    pub kind: ModulationKind,
    /// Modulator pitch relative to the carrier, Q4 (16 = same pitch).
    pub multiplier_q4: u16,
    /// 0..=255.
    pub depth: u8,
}

impl Modulation {
    pub const OFF: Modulation = Modulation { kind: ModulationKind::None, multiplier_q4: 16, depth: 0 };

    pub const fn new(kind: ModulationKind, multiplier_q4: u16, depth: u8) -> Self {
        Self { kind, multiplier_q4, depth }
    }

    /// Modulator increment that tracks a carrier playing at `carrier`.
    pub const fn modulator_increment(&self, carrier: u32) -> u32 {
        let inc = (carrier as u64 * self.multiplier_q4 as u64) >> 4;
        if inc > u32::MAX as u64 { u32::MAX } else { inc as u32 }
    }

    /// Carrier increment for this sample given the modulator's output.
    #[inline(always)]
    pub fn apply(&self, base: u32, modulator: i16) -> u32 {
        // x in Q15, -32767..=32767 at full depth
        let x = modulator as i32 * self.depth as i32 / 255;
        match self.kind {
            ModulationKind::None => base,
            ModulationKind::Linear => {
                let offset = base as i64 * x as i64 / FULL_SCALE as i64;
                (base as i64 + offset).clamp(0, u32::MAX as i64) as u32
            }
            ModulationKind::Exponential => {
                let scaled = (base as u64 * exp2_q15(x) as u64) >> 16;
                scaled.min(u32::MAX as u64) as u32
            }
        }
    }
}

impl Default for Modulation {
    fn default() -> Self {
        Self::OFF
    }
}

/// 2^x for x in Q15 (`-32768..=32767` ≈ -1..1), result in Q16.
///
/// Uses 2^f ≈ 1 + f(0.6565 + 0.3435f) on the fractional part, within 0.3%.
pub fn exp2_q15(x: i32) -> u32 {
    let (f, halve) = if x < 0 { (x + 32768, true) } else { (x, false) };
    let f = f as i64;
    // 0.6565 and 0.3435 in Q15
    let poly = 21_512 + ((11_256 * f) >> 15);
    let frac = (f * poly) >> 15;
    let v = (1u32 << 16) + (frac as u32) * 2;
    if halve { v >> 1 } else { v }
}
