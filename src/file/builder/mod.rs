mod format;
pub use format::*;

pub mod chunk;

use super::{Header, MidiFile, Track};
use crate::{
    ChunkError, FileError,
    file::builder::chunk::ChunkEvent,
    reader::{ReadResult, ReaderError},
};
use alloc::vec::Vec;

#[derive(Default)]
enum FormatStage {
    #[default]
    Unknown,
    Known(Header),
}

/// A builder used to create a new [`MidiFile`] one chunk at a time.
#[derive(Default)]
pub struct MidiFileBuilder {
    format: FormatStage,
    tracks: Vec<Track>,
    unknown_chunks: usize,
}

impl MidiFileBuilder {
    /// Handles a chunk of a midi file.
    ///
    /// Track chunks are decoded immediately; `position` is used for errors
    /// that concern the chunk as a whole.
    pub fn handle_chunk(&mut self, chunk: ChunkEvent<'_>, position: usize) -> ReadResult<()> {
        match chunk {
            ChunkEvent::Header(header) => match self.format {
                FormatStage::Unknown => {
                    if !self.tracks.is_empty() {
                        #[cfg(feature = "tracing")]
                        tracing::warn!("Header chunk found after {} tracks", self.tracks.len());
                    }
                    self.format = FormatStage::Known(header);
                }
                FormatStage::Known(_) => {
                    return Err(ReaderError::invalid(position, ChunkError::DuplicateHeader));
                }
            },
            ChunkEvent::Track(raw) => self.tracks.push(raw.read_track()?),
            ChunkEvent::Unknown(_unknown) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    "Skipping unknown chunk {:?} of {} bytes",
                    alloc::string::String::from_utf8_lossy(&_unknown.kind()),
                    _unknown.len()
                );
                self.unknown_chunks += 1;
            }
        }
        Ok(())
    }

    /// The number of chunks skipped so far
    pub fn unknown_chunks(&self) -> usize {
        self.unknown_chunks
    }

    /// Attempts to finish the midifile from the provided chunks.
    pub fn build(self) -> Result<MidiFile, FileError> {
        let FormatStage::Known(header) = self.format else {
            return Err(FileError::NoHeader);
        };
        if usize::from(header.num_tracks()) != self.tracks.len() {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                "Header announces {} tracks but {} were found",
                header.num_tracks(),
                self.tracks.len()
            );
        }
        Ok(MidiFile::new(
            header.format_type(),
            header.resolution(),
            self.tracks,
        ))
    }
}
