//! Note names to phase increments.
//!
//! Names use scientific pitch: a letter `A`–`G`, an optional `#` or `b`, and
//! an octave digit, so `"A4"` is 440 Hz and `"C4"` is middle C. Octaves roll
//! over at C while the ratio table is anchored at A, so A, A# and B sit one
//! octave higher than the C–G# notes sharing their octave digit.

use thiserror::Error;

use super::SAMPLE_RATE;

/// A1, in Q16 Hz.
pub const A1_HZ_Q16: u32 = 55 << 16;

/// 2^(k/12) in Q16, k = semitones above A.
pub const SEMITONE_RATIO_Q16: [u32; 12] = [
    65_536, 69_433, 73_562, 77_936, 82_570, 87_480, 92_682, 98_193, 104_032, 110_218, 116_772, 123_715,
];

/// Semitone index of C in [`SEMITONE_RATIO_Q16`]; octave numbers change here.
const C_INDEX: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NoteError {
    #[error("unrecognized pitch in note name")]
    UnknownPitch,
    #[error("note name has no octave digit")]
    MissingOctave,
}

/// A parsed note: semitone above A plus octave number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    pub semitone: u8,
    pub octave: u8,
}

impl Note {
    pub fn parse(name: &str) -> Result<Note, NoteError> {
        let (pitch, octave) = match name.as_bytes() {
            [pitch @ .., octave] if octave.is_ascii_digit() => (pitch, octave - b'0'),
            _ => return Err(NoteError::MissingOctave),
        };

        let semitone = match pitch {
            b"A" => 0,
            b"A#" | b"Bb" => 1,
            b"B" => 2,
            b"C" => 3,
            b"C#" | b"Db" => 4,
            b"D" => 5,
            b"D#" | b"Eb" => 6,
            b"E" => 7,
            b"F" => 8,
            b"F#" | b"Gb" => 9,
            b"G" => 10,
            b"G#" | b"Ab" => 11,
            _ => return Err(NoteError::UnknownPitch),
        };

        Ok(Note { semitone, octave })
    }

    /// Frequency in Q16 Hz: `ratio × 55 × 2^(octave − 2)` for C–G#, one
    /// octave up for A–B.
    pub const fn frequency_q16(self) -> u32 {
        let semitone = self.semitone as usize % 12;
        let base = (SEMITONE_RATIO_Q16[semitone] as u64 * A1_HZ_Q16 as u64) >> 16;
        let shift = self.octave as i32 - 2 + if semitone < C_INDEX { 1 } else { 0 };
        if shift >= 0 {
            (base << shift) as u32
        } else {
            (base >> -shift) as u32
        }
    }

    pub const fn increment(self) -> u32 {
        hz_to_increment(self.frequency_q16(), SAMPLE_RATE)
    }
}

/// 16.16 phase advance per sample for a Q16 frequency.
///
/// One cycle is the full `u32` range, so `inc = hz × 65536 × 65536 / rate`.
#[inline(always)]
pub const fn hz_to_increment(hz_q16: u32, sample_rate: u32) -> u32 {
    let inc = ((hz_q16 as u64) << 16) / sample_rate as u64;
    if inc > u32::MAX as u64 { u32::MAX } else { inc as u32 }
}

/// Q16 Hz that an increment plays at, rounded.
#[inline(always)]
pub const fn increment_to_hz_q16(inc: u32, sample_rate: u32) -> u32 {
    ((inc as u64 * sample_rate as u64 + (1 << 15)) >> 16) as u32
}

/// Looks up a note name and returns its phase increment at [`SAMPLE_RATE`].
pub fn note_increment(name: &str) -> Result<u32, NoteError> {
    Note::parse(name).map(Note::increment)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hz(name: &str) -> u32 {
        Note::parse(name).unwrap().frequency_q16()
    }

    #[test]
    fn a1_is_55hz() {
        assert_eq!(hz("A1"), 55 << 16);
        assert_eq!(hz("A2"), 110 << 16);
        assert_eq!(hz("A4"), 440 << 16);
    }

    #[test]
    fn c4_is_middle_c() {
        let expected = ((SEMITONE_RATIO_Q16[C_INDEX] as u64 * (55 << 16)) >> 16) << 2;
        assert_eq!(hz("C4") as u64, expected);
        // ≈ 261.63 Hz
        assert_eq!(hz("C4") >> 16, 261);
    }

    #[test]
    fn octave_rolls_over_at_c() {
        assert!(hz("B3") < hz("C4"));
        assert!(hz("G#3") < hz("A3"));
        assert!(hz("B2") < hz("C3"));
    }

    #[test]
    fn enharmonics_match() {
        assert_eq!(hz("C#4"), hz("Db4"));
        assert_eq!(hz("A#2"), hz("Bb2"));
        assert_eq!(hz("G#5"), hz("Ab5"));
    }

    #[test]
    fn unknown_names() {
        assert_eq!(Note::parse("H4"), Err(NoteError::UnknownPitch));
        assert_eq!(Note::parse("Cb4"), Err(NoteError::UnknownPitch));
        assert_eq!(Note::parse("C"), Err(NoteError::MissingOctave));
        assert_eq!(Note::parse(""), Err(NoteError::MissingOctave));
        assert_eq!(note_increment("X#1"), Err(NoteError::UnknownPitch));
    }

    #[test]
    fn increment_matches_rate() {
        // 1 Hz at 16 kHz advances 65536 * 65536 / 16000 per sample
        assert_eq!(hz_to_increment(1 << 16, 16_000), 268_435);
        let inc = note_increment("A4").unwrap();
        assert_eq!(increment_to_hz_q16(inc, SAMPLE_RATE) >> 16, 440);
    }
}
