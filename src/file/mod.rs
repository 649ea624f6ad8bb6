#![doc = r#"
Rusty representation of a [`MidiFile`]

```rust
# use musemidi::prelude::*;
let bytes = [
    b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 0, 0, 1, 0, 96,
    b'M', b'T', b'r', b'k', 0, 0, 0, 12,
    0x00, 0x90, 60, 100,
    0x60, 0x80, 60, 100,
    0x00, 0xFF, 0x2F, 0x00,
];
let file = MidiFile::parse(&bytes).unwrap();

assert_eq!(file.tracks().len(), 1);
assert_eq!(file.resolution(), Resolution::DEFAULT);
assert_eq!(file.to_bytes(), bytes);
```
"#]

/// Contains the [`MidiFileBuilder`](builder::MidiFileBuilder) and the
/// chunk types it consumes.
pub mod builder;
pub use builder::FormatType;

mod header;
pub use header::*;

mod track;
pub use track::*;

mod timed_event_iter;
pub use timed_event_iter::*;

mod timing;
pub use timing::*;

use crate::{
    event::MEvent,
    file::builder::MidiFileBuilder,
    message::{KeySignature, Tempo, TimeSignature},
    reader::{ReadResult, Reader},
    writer,
};
use alloc::vec::Vec;

#[doc = r#"
A parsed Standard MIDI File: its format, its resolution and its tracks.
"#]
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MidiFile {
    format: FormatType,
    resolution: Resolution,
    tracks: Vec<Track>,
}

impl MidiFile {
    /// Assemble a file from its parts
    pub fn new(format: FormatType, resolution: Resolution, tracks: Vec<Track>) -> Self {
        Self {
            format,
            resolution,
            tracks,
        }
    }

    /// Parse a set of bytes into a file struct
    pub fn parse(bytes: &[u8]) -> ReadResult<Self> {
        let mut reader = Reader::from_byte_slice(bytes);
        let mut builder = MidiFileBuilder::default();

        loop {
            let position = reader.buffer_position();
            let Some(chunk) = reader.read_chunk()? else {
                break;
            };
            builder.handle_chunk(chunk, position)?;
        }

        builder.build().map_err(|k| reader.invalid(k))
    }

    /// Serialize the file
    pub fn to_bytes(&self) -> Vec<u8> {
        writer::write_file(self)
    }

    /// The header for this file
    pub fn header(&self) -> Header {
        Header::new(
            self.format,
            self.tracks.len().try_into().unwrap_or(u16::MAX),
            self.resolution,
        )
    }

    /// Ticks per quarter note
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Returns the format type for the file.
    pub fn format_type(&self) -> FormatType {
        self.format
    }

    /// Returns a track list
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Consume the file, returning its tracks
    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks
    }

    /// The first tempo found, searching tracks in order
    pub fn tempo(&self) -> Option<Tempo> {
        self.tracks.iter().find_map(Track::tempo)
    }

    /// The first time signature found, searching tracks in order
    pub fn time_signature(&self) -> Option<TimeSignature> {
        self.tracks.iter().find_map(Track::time_signature)
    }

    /// The first key signature found, searching tracks in order
    pub fn key_signature(&self) -> Option<KeySignature> {
        self.tracks.iter().find_map(Track::key_signature)
    }

    /// The note events of each track. See [`Track::to_mevents`].
    pub fn track_events(&self) -> Vec<Vec<MEvent>> {
        self.tracks
            .iter()
            .map(|t| t.to_mevents(self.resolution))
            .collect()
    }
}
