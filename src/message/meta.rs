use alloc::{string::String, vec::Vec};

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::{ParseError, vlq};

/// The meta event type bytes this crate understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub(crate) enum MetaType {
    TrackName = 0x03,
    EndOfTrack = 0x2F,
    Tempo = 0x51,
    TimeSignature = 0x58,
    KeySignature = 0x59,
}

#[doc = r#"
A meta event found in a track chunk.

Meta events carry no channel. On the wire each one is framed as
`FF <type> <VLQ length> <data>`.
"#]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MetaMessage {
    /// `FF 03`: the name of the track
    TrackName(String),
    /// `FF 51 03`: microseconds per quarter note
    Tempo(Tempo),
    /// `FF 58 04`
    TimeSignature(TimeSignature),
    /// `FF 59 02`
    KeySignature(KeySignature),
    /// `FF 2F 00`: the mandatory last event of a track
    EndOfTrack,
}

impl MetaMessage {
    /// Interpret the data of a meta event.
    ///
    /// Returns `Ok(None)` for meta types this crate does not model, and for a
    /// tempo of zero microseconds, which has no meaning.
    ///
    /// # Errors
    /// if a known meta type carries the wrong number of bytes
    pub fn parse(kind: u8, data: &[u8]) -> Result<Option<Self>, ParseError> {
        let Ok(meta_type) = MetaType::try_from(kind) else {
            return Ok(None);
        };
        let bad_len = || ParseError::MetaLength {
            kind,
            len: data.len(),
        };
        let message = match meta_type {
            MetaType::TrackName => {
                MetaMessage::TrackName(String::from_utf8_lossy(data).into_owned())
            }
            MetaType::EndOfTrack => MetaMessage::EndOfTrack,
            MetaType::Tempo => {
                let &[a, b, c] = data else {
                    return Err(bad_len());
                };
                let Some(tempo) = Tempo::from_micros(u32::from_be_bytes([0, a, b, c])) else {
                    return Ok(None);
                };
                MetaMessage::Tempo(tempo)
            }
            MetaType::TimeSignature => {
                let &[numerator, denominator_pow, clocks, thirty_seconds] = data else {
                    return Err(bad_len());
                };
                MetaMessage::TimeSignature(TimeSignature {
                    numerator,
                    denominator_pow,
                    clocks_per_click: clocks,
                    thirty_seconds_per_quarter: thirty_seconds,
                })
            }
            MetaType::KeySignature => {
                let &[accidentals, mode] = data else {
                    return Err(bad_len());
                };
                MetaMessage::KeySignature(KeySignature {
                    accidentals: accidentals as i8,
                    minor: mode != 0,
                })
            }
        };
        Ok(Some(message))
    }

    pub(crate) fn meta_type(&self) -> MetaType {
        match self {
            MetaMessage::TrackName(_) => MetaType::TrackName,
            MetaMessage::Tempo(_) => MetaType::Tempo,
            MetaMessage::TimeSignature(_) => MetaType::TimeSignature,
            MetaMessage::KeySignature(_) => MetaType::KeySignature,
            MetaMessage::EndOfTrack => MetaType::EndOfTrack,
        }
    }

    pub(crate) fn write_to(&self, buf: &mut Vec<u8>) {
        buf.push(0xFF);
        buf.push(self.meta_type().into());
        match self {
            MetaMessage::TrackName(name) => {
                vlq::encode_into(name.len() as u32, buf);
                buf.extend_from_slice(name.as_bytes());
            }
            MetaMessage::Tempo(tempo) => {
                buf.push(3);
                buf.extend_from_slice(&tempo.to_be_bytes());
            }
            MetaMessage::TimeSignature(ts) => {
                buf.extend_from_slice(&[
                    4,
                    ts.numerator,
                    ts.denominator_pow,
                    ts.clocks_per_click,
                    ts.thirty_seconds_per_quarter,
                ]);
            }
            MetaMessage::KeySignature(ks) => {
                buf.extend_from_slice(&[2, ks.accidentals as u8, ks.minor as u8]);
            }
            MetaMessage::EndOfTrack => buf.push(0),
        }
    }
}

#[doc = r#"
The length of a quarter note in microseconds, stored in 24 bits.

```rust
# use musemidi::prelude::*;
let tempo = Tempo::from_bpm(120).unwrap();
assert_eq!(tempo.micros_per_quarter(), 500_000);
assert_eq!(tempo.bpm(), 120);

// three beats a minute needs more than 24 bits
assert!(Tempo::from_bpm(3).is_none());
```
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tempo {
    micros_per_quarter: u32,
}

impl Tempo {
    const MAX_MICROS: u32 = 0x00FF_FFFF;
    const MICROS_PER_MINUTE: u64 = 60_000_000;

    /// Create a tempo from microseconds per quarter note.
    ///
    /// Returns `None` for zero or values wider than 24 bits.
    pub const fn from_micros(micros_per_quarter: u32) -> Option<Self> {
        if micros_per_quarter == 0 || micros_per_quarter > Self::MAX_MICROS {
            return None;
        }
        Some(Self { micros_per_quarter })
    }

    /// Create a tempo from beats (quarter notes) per minute, rounding to the
    /// nearest microsecond.
    pub const fn from_bpm(bpm: u32) -> Option<Self> {
        if bpm == 0 {
            return None;
        }
        let bpm = bpm as u64;
        let micros = (Self::MICROS_PER_MINUTE + bpm / 2) / bpm;
        if micros > Self::MAX_MICROS as u64 {
            return None;
        }
        Self::from_micros(micros as u32)
    }

    const fn to_be_bytes(self) -> [u8; 3] {
        let [_, a, b, c] = self.micros_per_quarter.to_be_bytes();
        [a, b, c]
    }

    /// Microseconds per quarter note
    pub const fn micros_per_quarter(&self) -> u32 {
        self.micros_per_quarter
    }

    /// Beats per minute, rounded to the nearest whole beat.
    ///
    /// A zero tempo, only reachable through deserialization, reports zero.
    pub const fn bpm(&self) -> u32 {
        if self.micros_per_quarter == 0 {
            return 0;
        }
        let micros = self.micros_per_quarter as u64;
        ((Self::MICROS_PER_MINUTE + micros / 2) / micros) as u32
    }
}

impl Default for Tempo {
    /// 120 beats per minute
    fn default() -> Self {
        Self {
            micros_per_quarter: 500_000,
        }
    }
}

#[doc = r#"
A time signature as stored in the file.

The denominator is kept as a power of two, so 6/8 is stored as
`numerator: 6, denominator_pow: 3`.
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeSignature {
    /// Beats per bar
    pub numerator: u8,
    /// The beat unit as a power of two
    pub denominator_pow: u8,
    /// MIDI clocks per metronome click
    pub clocks_per_click: u8,
    /// Notated 32nd notes per quarter note
    pub thirty_seconds_per_quarter: u8,
}

impl TimeSignature {
    /// Build a time signature with the usual 24 clocks per click and 8
    /// thirty-seconds per quarter.
    ///
    /// Returns `None` unless the denominator is a power of two.
    pub const fn new(numerator: u8, denominator: u8) -> Option<Self> {
        if !denominator.is_power_of_two() {
            return None;
        }
        Some(Self {
            numerator,
            denominator_pow: denominator.trailing_zeros() as u8,
            clocks_per_click: 24,
            thirty_seconds_per_quarter: 8,
        })
    }

    /// The beat unit, e.g. 8 for 6/8. Saturates for corrupt exponents.
    pub const fn denominator(&self) -> u32 {
        match 1u32.checked_shl(self.denominator_pow as u32) {
            Some(d) => d,
            None => u32::MAX,
        }
    }
}

impl Default for TimeSignature {
    /// 4/4
    fn default() -> Self {
        Self {
            numerator: 4,
            denominator_pow: 2,
            clocks_per_click: 24,
            thirty_seconds_per_quarter: 8,
        }
    }
}

/// Number of sharps (positive) or flats (negative) and the mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeySignature {
    /// -7 (seven flats) to 7 (seven sharps)
    pub accidentals: i8,
    /// Minor rather than major
    pub minor: bool,
}

impl KeySignature {
    /// Create a key signature, returning `None` outside -7..=7 accidentals
    pub const fn new(accidentals: i8, minor: bool) -> Option<Self> {
        if accidentals < -7 || accidentals > 7 {
            return None;
        }
        Some(Self { accidentals, minor })
    }
}

#[test]
fn tempo_bytes() {
    let tempo = Tempo::from_bpm(90).unwrap();
    assert_eq!(tempo.micros_per_quarter(), 666_667);
    assert_eq!(tempo.bpm(), 90);

    let mut buf = Vec::new();
    MetaMessage::Tempo(tempo).write_to(&mut buf);
    assert_eq!(buf, [0xFF, 0x51, 0x03, 0x0A, 0x2C, 0x2B]);

    let parsed = MetaMessage::parse(0x51, &buf[3..]).unwrap();
    assert_eq!(parsed, Some(MetaMessage::Tempo(tempo)));
}

#[test]
fn zero_tempo_is_ignored() {
    assert_eq!(MetaMessage::parse(0x51, &[0x00, 0x00, 0x00]), Ok(None));
    assert_eq!(
        MetaMessage::parse(0x51, &[0x00, 0x00, 0x01]),
        Ok(Some(MetaMessage::Tempo(Tempo::from_micros(1).unwrap())))
    );
}

#[test]
fn time_signature_bytes() {
    let six_eight = TimeSignature::new(6, 8).unwrap();
    assert_eq!(six_eight.denominator_pow, 3);
    assert_eq!(six_eight.denominator(), 8);
    assert!(TimeSignature::new(3, 6).is_none());

    let mut buf = Vec::new();
    MetaMessage::TimeSignature(six_eight).write_to(&mut buf);
    assert_eq!(buf, [0xFF, 0x58, 0x04, 6, 3, 24, 8]);
}

#[test]
fn key_signature_bytes() {
    let e_flat_minor = KeySignature::new(-6, true).unwrap();
    let mut buf = Vec::new();
    MetaMessage::KeySignature(e_flat_minor).write_to(&mut buf);
    assert_eq!(buf, [0xFF, 0x59, 0x02, 0xFA, 0x01]);

    assert_eq!(
        MetaMessage::parse(0x59, &[0xFA, 0x01]).unwrap(),
        Some(MetaMessage::KeySignature(e_flat_minor))
    );
    assert!(KeySignature::new(8, false).is_none());
}

#[test]
fn unknown_and_malformed_meta() {
    // copyright notice
    assert_eq!(MetaMessage::parse(0x02, b"(c)").unwrap(), None);
    assert_eq!(
        MetaMessage::parse(0x51, &[1, 2]),
        Err(ParseError::MetaLength { kind: 0x51, len: 2 })
    );
}

#[test]
fn track_name_bytes() {
    let mut buf = Vec::new();
    MetaMessage::TrackName("Bass".into()).write_to(&mut buf);
    assert_eq!(buf, [0xFF, 0x03, 0x04, b'B', b'a', b's', b's']);
}
