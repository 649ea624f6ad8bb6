#![doc = r#"
Channel voice messages

# Hierarchy
```text
                   |---------------|
                   | Track Message |
                   |---------------|
                    /             \
|-----------------------|   |--------------|
| Channel Voice Message |   | Meta Message |
|-----------------------|   |--------------|
    |  NoteOn           |
    |  NoteOff          |
    |  ProgramChange    |
    |-------------------|
```

Only the three voice events that carry notes and instruments are modelled.
Aftertouch, control change, channel pressure and pitch bend are skipped
while reading.
"#]

use alloc::vec::Vec;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::message::DataByte;

#[doc = r#"
One of the sixteen MIDI channels.

The numeric value is the zero based index carried in the low nibble of a
status byte, so `Channel::Ten` (index 9) is the General MIDI percussion
channel.
"#]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TryFromPrimitive, IntoPrimitive,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Channel {
    One = 0,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Eleven,
    Twelve,
    Thirteen,
    Fourteen,
    Fifteen,
    Sixteen,
}

impl Channel {
    /// The General MIDI percussion channel (index 9)
    pub const PERCUSSION: Self = Self::Ten;

    /// Identify the channel from the low nibble of a status byte
    pub const fn from_status(status: u8) -> Self {
        use Channel::*;
        match status & 0x0F {
            0 => One,
            1 => Two,
            2 => Three,
            3 => Four,
            4 => Five,
            5 => Six,
            6 => Seven,
            7 => Eight,
            8 => Nine,
            9 => Ten,
            10 => Eleven,
            11 => Twelve,
            12 => Thirteen,
            13 => Fourteen,
            14 => Fifteen,
            _ => Sixteen,
        }
    }

    /// The zero based channel index
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// True for the percussion channel
    pub const fn is_percussion(self) -> bool {
        matches!(self, Self::Ten)
    }
}

/// The voice events understood by this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VoiceEvent {
    /// A key was pressed
    NoteOn {
        /// The key
        key: DataByte,
        /// How hard
        velocity: DataByte,
    },
    /// A key was released
    NoteOff {
        /// The key
        key: DataByte,
        /// Release velocity
        velocity: DataByte,
    },
    /// The channel's instrument changed
    ProgramChange {
        /// The new patch
        program: DataByte,
    },
}

impl VoiceEvent {
    /// The status nibble of this event, before the channel is added
    pub const fn status_nibble(&self) -> u8 {
        match self {
            VoiceEvent::NoteOff { .. } => 0x80,
            VoiceEvent::NoteOn { .. } => 0x90,
            VoiceEvent::ProgramChange { .. } => 0xC0,
        }
    }

    /// The key of a note event
    pub const fn key(&self) -> Option<DataByte> {
        match self {
            VoiceEvent::NoteOn { key, .. } | VoiceEvent::NoteOff { key, .. } => Some(*key),
            VoiceEvent::ProgramChange { .. } => None,
        }
    }
}

/// A voice event addressed to a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelVoiceMessage {
    channel: Channel,
    event: VoiceEvent,
}

impl ChannelVoiceMessage {
    /// Address an event to a channel
    pub const fn new(channel: Channel, event: VoiceEvent) -> Self {
        Self { channel, event }
    }

    /// The channel of the message
    pub const fn channel(&self) -> Channel {
        self.channel
    }

    /// The event of the message
    pub const fn event(&self) -> &VoiceEvent {
        &self.event
    }

    /// The full status byte
    pub const fn status(&self) -> u8 {
        self.event.status_nibble() | self.channel.index()
    }

    pub(crate) fn write_to(&self, buf: &mut Vec<u8>) {
        buf.push(self.status());
        match self.event {
            VoiceEvent::NoteOn { key, velocity } | VoiceEvent::NoteOff { key, velocity } => {
                buf.extend_from_slice(&[key.value(), velocity.value()]);
            }
            VoiceEvent::ProgramChange { program } => buf.push(program.value()),
        }
    }
}

#[test]
fn channel_round_trips_through_status() {
    for index in 0..16u8 {
        let channel = Channel::try_from(index).unwrap();
        assert_eq!(Channel::from_status(0x90 | index), channel);
        assert_eq!(u8::from(channel), index);
    }
    assert!(Channel::try_from(16).is_err());
    assert!(Channel::PERCUSSION.is_percussion());
    assert_eq!(Channel::PERCUSSION.index(), 9);
}

#[test]
fn voice_messages_frame_their_data() {
    let mut buf = Vec::new();
    let on = ChannelVoiceMessage::new(
        Channel::Three,
        VoiceEvent::NoteOn {
            key: DataByte::new_unchecked(60),
            velocity: DataByte::new_unchecked(100),
        },
    );
    on.write_to(&mut buf);
    let program = ChannelVoiceMessage::new(
        Channel::Ten,
        VoiceEvent::ProgramChange {
            program: DataByte::new_unchecked(5),
        },
    );
    program.write_to(&mut buf);
    assert_eq!(buf, [0x92, 60, 100, 0xC9, 5]);
}
