use crate::{
    HeaderError,
    reader::{ReadResult, Reader},
    time::{Time, round_half_even},
};

/// The division word of the header: ticks per quarter note.
///
/// SMPTE based divisions (leading bit set) cannot be expressed in whole notes
/// and are rejected when reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resolution(u16);

impl Resolution {
    /// 96 ticks per quarter note, 384 per whole note
    pub const DEFAULT: Self = Self(96);

    /// Returns `None` for zero or values with the leading bit set.
    pub const fn new(ticks_per_quarter_note: u16) -> Option<Self> {
        if ticks_per_quarter_note == 0 || ticks_per_quarter_note > 0x7FFF {
            return None;
        }
        Some(Self(ticks_per_quarter_note))
    }

    pub(crate) fn read(reader: &mut Reader<'_>) -> ReadResult<Self> {
        let raw = u16::from_be_bytes(reader.read_exact_size()?);
        if raw & 0x8000 != 0 {
            return Err(reader.invalid(HeaderError::SmpteTiming));
        }
        Self::new(raw).ok_or_else(|| reader.invalid(HeaderError::ZeroResolution))
    }

    /// Ticks per quarter note
    pub const fn ticks_per_quarter_note(&self) -> u16 {
        self.0
    }

    /// Ticks per whole note
    pub const fn ticks_per_whole_note(&self) -> i64 {
        self.0 as i64 * 4
    }

    /// Convert ticks to whole notes, exactly.
    pub fn to_time(&self, ticks: u64) -> Time {
        Time::new(ticks as i64, self.ticks_per_whole_note())
    }

    /// Convert whole notes to ticks, rounding halves to even.
    pub fn to_ticks(&self, time: Time) -> i64 {
        round_half_even(time * Time::from_integer(self.ticks_per_whole_note()))
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::DEFAULT
    }
}
