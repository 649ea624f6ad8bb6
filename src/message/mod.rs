#![doc = r#"
The messages that live inside track chunks.

A track is a list of [`Ticked`] [`TrackMessage`]s: every message is preceded
by the number of ticks since the previous one.
"#]

mod channel;
pub use channel::*;

mod meta;
pub use meta::*;

use alloc::vec::Vec;

use crate::{ParseError, vlq};

/// A single byte whose leading bit is zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataByte(u8);

impl DataByte {
    /// Check that the byte fits in seven bits.
    ///
    /// # Errors
    /// if the leading bit is set
    pub const fn new(byte: u8) -> Result<Self, ParseError> {
        if byte > 0x7F {
            return Err(ParseError::DataByte(byte));
        }
        Ok(Self(byte))
    }

    /// Convert a tree level value, returning `None` outside `0..=127`
    pub fn from_i32(value: i32) -> Option<Self> {
        u8::try_from(value).ok().filter(|v| *v <= 0x7F).map(Self)
    }

    /// The caller guarantees `byte <= 0x7F`; the leading bit is masked off regardless.
    pub(crate) const fn new_unchecked(byte: u8) -> Self {
        Self(byte & 0x7F)
    }

    /// The byte
    pub const fn value(&self) -> u8 {
        self.0
    }
}

/// A message in a track chunk
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrackMessage {
    /// A note or program message for one channel
    ChannelVoice(ChannelVoiceMessage),
    /// A meta event
    Meta(MetaMessage),
}

impl TrackMessage {
    /// The voice message, if this is one
    pub fn channel_voice(&self) -> Option<&ChannelVoiceMessage> {
        match self {
            TrackMessage::ChannelVoice(c) => Some(c),
            TrackMessage::Meta(_) => None,
        }
    }

    /// Append the message bytes, without a delta time.
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        match self {
            TrackMessage::ChannelVoice(c) => c.write_to(buf),
            TrackMessage::Meta(m) => m.write_to(buf),
        }
    }
}

impl From<ChannelVoiceMessage> for TrackMessage {
    fn from(value: ChannelVoiceMessage) -> Self {
        Self::ChannelVoice(value)
    }
}

impl From<MetaMessage> for TrackMessage {
    fn from(value: MetaMessage) -> Self {
        Self::Meta(value)
    }
}

/// An event preceded by the ticks elapsed since the previous event of its track
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ticked<T> {
    /// Ticks since the previous event
    pub delta_ticks: u32,
    /// The event
    pub event: T,
}

impl<T> Ticked<T> {
    /// Pair an event with its delta time
    pub const fn new(delta_ticks: u32, event: T) -> Self {
        Self { delta_ticks, event }
    }
}

impl Ticked<TrackMessage> {
    /// Append `<VLQ delta><message>`.
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        vlq::encode_into(self.delta_ticks, buf);
        self.event.write_to(buf);
    }
}

#[test]
fn data_byte_bounds() {
    assert_eq!(DataByte::new(127).map(|b| b.value()), Ok(127));
    assert_eq!(DataByte::new(128), Err(ParseError::DataByte(128)));
    assert_eq!(DataByte::from_i32(-1), None);
    assert_eq!(DataByte::from_i32(128), None);
    assert_eq!(DataByte::from_i32(64).map(|b| b.value()), Some(64));
}

#[test]
fn ticked_messages_lead_with_their_delta() {
    let mut buf = Vec::new();
    Ticked::new(200, TrackMessage::Meta(MetaMessage::EndOfTrack)).write_to(&mut buf);
    assert_eq!(buf, [0x81, 0x48, 0xFF, 0x2F, 0x00]);
}
