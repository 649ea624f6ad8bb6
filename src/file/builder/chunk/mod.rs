#![doc = r#"
Contains types for MIDI file chunks

# Overview

MIDI files are organized into chunks, each identified by a 4-character ASCII type identifier
followed by a 32-bit length field and then the chunk data. The Standard MIDI File (SMF)
standard defines two chunk types, though files may contain additional proprietary chunks.

## [`Header`]

The header chunk (identified by "MThd") must be the first chunk in a MIDI file. It holds
the [`FormatType`](crate::file::FormatType), the number of tracks and the
[`Resolution`](crate::file::Resolution). Only its first six bytes are defined; longer
headers are accepted and the extra bytes skipped.

## Track Chunks

Track chunks (identified by "MTrk") hold `<VLQ delta><event>` pairs. A [`RawTrackChunk`]
keeps the undecoded body until [`RawTrackChunk::read_track`] turns it into a
[`Track`], dropping the events this crate does not model.

## [`UnknownChunk`]

Any other chunk is skipped. Only its type identifier and length are kept, for logging.

# Example Structure

```text
[Header Chunk: "MThd"]
[Track Chunk 1: "MTrk"]
...
[Track Chunk N: "MTrk"]
[Optional Unknown Chunks]
```
"#]

use alloc::vec::Vec;

use crate::{
    ParseError,
    file::{Header, Track},
    message::{
        Channel, ChannelVoiceMessage, DataByte, MetaMessage, Ticked, TrackMessage, VoiceEvent,
    },
    reader::{ReadResult, Reader},
};

/// A chunk as found in the file
#[derive(Debug, Clone)]
pub enum ChunkEvent<'slc> {
    /// `MThd`
    Header(Header),
    /// `MTrk`
    Track(RawTrackChunk<'slc>),
    /// Anything else
    Unknown(UnknownChunk),
}

/// A chunk type this crate skips
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownChunk {
    kind: [u8; 4],
    length: u32,
}

impl UnknownChunk {
    pub(crate) const fn new(kind: [u8; 4], length: u32) -> Self {
        Self { kind, length }
    }

    /// The four byte type identifier
    pub const fn kind(&self) -> [u8; 4] {
        self.kind
    }

    /// The declared body length
    #[allow(clippy::len_without_is_empty)]
    pub const fn len(&self) -> u32 {
        self.length
    }
}

/// The undecoded body of a track chunk
#[derive(Debug, Clone)]
pub struct RawTrackChunk<'slc> {
    body: Reader<'slc>,
}

/// What the track loop does after one event
enum Step {
    Keep(TrackMessage),
    Skip,
    End,
}

impl<'slc> RawTrackChunk<'slc> {
    pub(crate) const fn new(body: Reader<'slc>) -> Self {
        Self { body }
    }

    #[doc = r#"
Decode the events of the chunk.

Note-ons with a velocity of zero become note-offs. Running status is honoured
for channel messages and cleared by meta and SysEx events. Aftertouch,
control change, channel pressure, pitch bend, SysEx and unknown meta events
are skipped; their delta times are carried over to the next kept event so
absolute times are preserved. Reading stops at the end-of-track event.
"#]
    pub fn read_track(self) -> ReadResult<Track> {
        let mut reader = self.body;
        let mut events = Vec::new();
        let mut skipped = 0;
        let mut running_status: Option<u8> = None;
        let mut pending_ticks: u32 = 0;

        while !reader.is_at_end() {
            pending_ticks = pending_ticks.saturating_add(reader.read_vlq()?);
            let step = read_event(&mut reader, &mut running_status)?;
            match step {
                Step::Keep(message) => {
                    events.push(Ticked::new(pending_ticks, message));
                    pending_ticks = 0;
                }
                Step::Skip => skipped += 1,
                Step::End => {
                    events.push(Ticked::new(pending_ticks, MetaMessage::EndOfTrack.into()));
                    break;
                }
            }
        }

        if skipped > 0 {
            #[cfg(feature = "tracing")]
            tracing::warn!("Skipped {skipped} unsupported events in track");
        }
        Ok(Track::with_skipped(events, skipped))
    }
}

fn read_event(reader: &mut Reader<'_>, running_status: &mut Option<u8>) -> ReadResult<Step> {
    let status = match reader.peek_u8()? {
        byte if byte >= 0x80 => {
            reader.read_u8()?;
            byte
        }
        data => running_status.ok_or_else(|| reader.invalid(ParseError::MissingStatus(data)))?,
    };

    match status {
        0x80..=0xEF => {
            *running_status = Some(status);
            read_channel_event(reader, status)
        }
        0xF0 | 0xF7 => {
            *running_status = None;
            let len = reader.read_vlq()?;
            reader.skip(len as usize)?;
            Ok(Step::Skip)
        }
        0xFF => {
            *running_status = None;
            let kind = reader.read_u8()?;
            let len = reader.read_vlq()?;
            let data = reader.read_slice(len as usize)?;
            match MetaMessage::parse(kind, data).map_err(|e| reader.invalid(e))? {
                Some(MetaMessage::EndOfTrack) => Ok(Step::End),
                Some(meta) => Ok(Step::Keep(meta.into())),
                None => Ok(Step::Skip),
            }
        }
        other => Err(reader.invalid(ParseError::SystemStatus(other))),
    }
}

fn read_channel_event(reader: &mut Reader<'_>, status: u8) -> ReadResult<Step> {
    let channel = Channel::from_status(status);
    let event = match status & 0xF0 {
        0x80 => VoiceEvent::NoteOff {
            key: reader.read_data_byte()?,
            velocity: reader.read_data_byte()?,
        },
        0x90 => {
            let key = reader.read_data_byte()?;
            let velocity = reader.read_data_byte()?;
            if velocity.value() == 0 {
                VoiceEvent::NoteOff {
                    key,
                    velocity: DataByte::default(),
                }
            } else {
                VoiceEvent::NoteOn { key, velocity }
            }
        }
        0xC0 => VoiceEvent::ProgramChange {
            program: reader.read_data_byte()?,
        },
        // aftertouch, control change, pitch bend
        0xA0 | 0xB0 | 0xE0 => {
            reader.read_data_byte()?;
            reader.read_data_byte()?;
            return Ok(Step::Skip);
        }
        // channel pressure
        _ => {
            reader.read_data_byte()?;
            return Ok(Step::Skip);
        }
    };
    Ok(Step::Keep(ChannelVoiceMessage::new(channel, event).into()))
}
