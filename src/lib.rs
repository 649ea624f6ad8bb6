#![doc = r#"
Convert between hierarchical music trees and Standard MIDI Files.

# Overview

A piece of music is described as a [`Tree`](tree::Tree) of notes and rests
composed with sequential ([`Tree::Seq`](tree::Tree::Seq)) and parallel
([`Tree::Par`](tree::Tree::Par)) nodes, with instruments attached through
[`Part`](tree::Part) nodes and global tempo stored on a [`Music`](tree::Music)
root.

Writing a file happens in three steps:

1. [`materialize`](event::materialize_music) flattens the tree into absolute
   time [`MEvent`](event::MEvent)s,
2. the [`encode`] module assigns channels to instruments and turns events into
   paired note-on/note-off messages,
3. the [`writer`] frames those messages into the binary file.

Reading a file runs the same path backwards. The [`reader`] parses chunks
into a [`MidiFile`](file::MidiFile), each [`Track`](file::Track) pairs its
note-ons with their terminating note-offs, and the [`recover`] module infers
chords, melodic runs and rests to build a tree again.

# Example
```rust
# use musemidi::prelude::*;
let melody = Tree::seq([
    Tree::note(60, QN),
    Tree::note(64, QN),
    Tree::note(67, HN),
]);
let music = Music::new([Tree::part(melody, Some(Instrument::new(0).unwrap()))]);

let bytes = music_to_midi(&music, &EncodeOptions::default()).unwrap();
let decoded = midi_to_music(&bytes, &DecodeOptions::default()).unwrap();

assert_eq!(decoded.trees.len(), 1);
```
"#]
#![no_std]
#![warn(missing_docs)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod error;
pub use error::*;

pub mod time;

pub mod tree;

pub mod event;

pub mod message;

pub mod vlq;

pub mod reader;

pub mod writer;

pub mod file;

pub mod encode;

pub mod recover;

mod convert;
pub use convert::*;

/// Re-exports of the commonly used types and functions.
pub mod prelude {
    pub use crate::{
        ConvertError, DecodeOptions, ParseError, midi_to_music, music_to_midi, restructure,
        encode::{EncodeError, EncodeOptions, TrackLayout},
        event::{MEvent, materialize, materialize_music},
        file::{MidiFile, Resolution, Track},
        message::*,
        recover::recover,
        time::*,
        tree::*,
    };

    #[cfg(feature = "std")]
    pub use crate::{read_midi_file, write_midi_file};
}
