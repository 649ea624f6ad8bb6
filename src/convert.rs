use alloc::vec::Vec;
use thiserror::Error;

use crate::{
    encode::{EncodeError, EncodeOptions, encode},
    event::{MEvent, materialize_music, split_by_instrument},
    file::{MidiFile, Track},
    reader::ReaderError,
    recover::recover,
    tree::{Instrument, Music, Tree},
};

/// Errors raised by the conversion functions
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The music could not be encoded
    #[error(transparent)]
    Encode(#[from] EncodeError),
    /// The bytes are not a readable MIDI file
    #[error(transparent)]
    Read(#[from] ReaderError),
    /// Reading or writing a file failed
    #[cfg(feature = "std")]
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[doc = r#"
Options for [`midi_to_music`].

```rust
# use musemidi::prelude::*;
let flat = DecodeOptions::default().with_restructure(false);
assert!(!flat.restructure);
assert!(!flat.preserve_tracks);
```
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecodeOptions {
    /// Infer chords, runs and rests. Otherwise every note is placed on its
    /// own after a rest as long as its onset.
    pub restructure: bool,
    /// Wrap every track in a [`Part`](crate::tree::Part), even one without
    /// an instrument
    pub preserve_tracks: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            restructure: true,
            preserve_tracks: false,
        }
    }
}

impl DecodeOptions {
    /// Turn structure inference on or off
    pub fn with_restructure(mut self, restructure: bool) -> Self {
        self.restructure = restructure;
        self
    }

    /// Turn part wrapping of uninstrumented tracks on or off
    pub fn with_preserve_tracks(mut self, preserve_tracks: bool) -> Self {
        self.preserve_tracks = preserve_tracks;
        self
    }
}

/// Encode music as the bytes of a Standard MIDI File.
pub fn music_to_midi(music: &Music, options: &EncodeOptions) -> Result<Vec<u8>, ConvertError> {
    Ok(encode(music, options)?.to_bytes())
}

#[doc = r#"
Decode the bytes of a Standard MIDI File into music.

Every track with at least one note becomes one top-level tree. A track whose
notes all share an instrument becomes a single [`Part`](crate::tree::Part)
for that instrument. A track mixing instruments becomes a `Par` of one part
per instrument. Uninstrumented notes are only wrapped in a part when
[`DecodeOptions::preserve_tracks`] is set.

The tempo, time signature and key signature are the first ones found in any
track. Without a tempo the music plays at [`Music::DEFAULT_BPM`].

```rust
# use musemidi::prelude::*;
let music = Music::new([Tree::seq([Tree::note(60, QN), Tree::note(62, QN)])]).with_bpm(90);
let bytes = music_to_midi(&music, &EncodeOptions::default()).unwrap();

let decoded = midi_to_music(&bytes, &DecodeOptions::default()).unwrap();
assert_eq!(decoded.bpm, 90);
assert_eq!(
    decoded.trees,
    [Tree::seq([
        Note::new(60, QN).with_onset(ZERO).into(),
        Note::new(62, QN).with_onset(QN).into(),
    ])]
);
```
"#]
pub fn midi_to_music(bytes: &[u8], options: &DecodeOptions) -> Result<Music, ConvertError> {
    let file = MidiFile::parse(bytes)?;
    Ok(file_to_music(&file, options))
}

fn file_to_music(file: &MidiFile, options: &DecodeOptions) -> Music {
    let trees = file
        .tracks()
        .iter()
        .filter_map(|track| track_to_tree(track, file, options))
        .collect();

    let mut music = Music {
        trees,
        bpm: file.tempo().map(|t| t.bpm()).unwrap_or(Music::DEFAULT_BPM),
        time_signature: file.time_signature(),
        key_signature: file.key_signature(),
    };
    music.remove_zeros();
    music
}

fn track_to_tree(track: &Track, file: &MidiFile, options: &DecodeOptions) -> Option<Tree> {
    let events = track.to_mevents(file.resolution());
    let mut parts: Vec<Tree> = split_by_instrument(&events)
        .into_iter()
        .filter_map(|(instrument, group)| {
            let tree = if options.restructure {
                recover(&group)?
            } else {
                flat(&group)?
            };
            Some(wrap(tree, instrument, options.preserve_tracks))
        })
        .collect();

    match parts.len() {
        0 => None,
        1 => parts.pop(),
        _ => Some(Tree::Par(parts)),
    }
}

fn flat(events: &[MEvent]) -> Option<Tree> {
    if events.is_empty() {
        return None;
    }
    Some(Tree::Par(
        events
            .iter()
            .map(|e| Tree::seq([Tree::rest(e.onset), e.to_note().into()]))
            .collect(),
    ))
}

fn wrap(tree: Tree, instrument: Option<Instrument>, always: bool) -> Tree {
    if instrument.is_some() || always {
        Tree::part(tree, instrument)
    } else {
        tree
    }
}

#[doc = r#"
Re-infer the structure of existing music.

The music is flattened, split by instrument, and each group is recovered on
its own. Groups with an instrument are wrapped in a
[`Part`](crate::tree::Part), as are uninstrumented ones when
`preserve_tracks` is set. Tempo and signatures are kept.

```rust
# use musemidi::prelude::*;
let music = Music::new([Tree::par([
    Tree::note(60, QN),
    Tree::note(64, QN),
])]);
let restructured = restructure(&music, false);

assert!(matches!(restructured.trees[0], Tree::Chord(_)));
```
"#]
pub fn restructure(music: &Music, preserve_tracks: bool) -> Music {
    let events = materialize_music(music);
    let mut out = music.clone();
    out.trees = split_by_instrument(&events)
        .into_iter()
        .filter_map(|(instrument, group)| {
            recover(&group).map(|tree| wrap(tree, instrument, preserve_tracks))
        })
        .collect();
    out.remove_zeros();
    out
}

/// Encode music and write it to `path`.
#[cfg(feature = "std")]
pub fn write_midi_file<P: AsRef<std::path::Path>>(
    path: P,
    music: &Music,
    options: &EncodeOptions,
) -> Result<(), ConvertError> {
    let bytes = music_to_midi(music, options)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Read the file at `path` and decode it into music.
#[cfg(feature = "std")]
pub fn read_midi_file<P: AsRef<std::path::Path>>(
    path: P,
    options: &DecodeOptions,
) -> Result<Music, ConvertError> {
    let bytes = std::fs::read(path)?;
    midi_to_music(&bytes, options)
}
