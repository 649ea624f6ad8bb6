use alloc::vec::Vec;

use super::{Note, RangePolicy, Tree, TreeError};
use crate::{
    message::{KeySignature, TimeSignature},
    time::{Time, ZERO},
};

#[doc = r#"
The root of a piece: top-level trees plus global meta information.

Each top-level tree is interpreted from time zero with no instrument, so a
typical piece is a list of [`Part`](super::Part)s.

# Example
```rust
# use musemidi::prelude::*;
let music = Music::new([
    Tree::part(Tree::note(60, WN), Some(Instrument::new(40).unwrap())),
    Tree::part(Tree::note(36, HN), Some(Instrument::DRUMS)),
])
.with_bpm(90);

assert_eq!(music.duration(), WN);
assert_eq!(music.bpm, 90);
```
"#]
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Music {
    /// Top-level trees, each starting at time zero
    pub trees: Vec<Tree>,
    /// Beats (quarter notes) per minute
    pub bpm: u32,
    /// Global time signature, if any
    pub time_signature: Option<TimeSignature>,
    /// Global key signature, if any
    pub key_signature: Option<KeySignature>,
}

impl Default for Music {
    fn default() -> Self {
        Self {
            trees: Vec::new(),
            bpm: Self::DEFAULT_BPM,
            time_signature: None,
            key_signature: None,
        }
    }
}

impl Music {
    /// Tempo used when none is given
    pub const DEFAULT_BPM: u32 = 120;

    /// Create a piece at the default tempo
    pub fn new<I: IntoIterator<Item = Tree>>(trees: I) -> Self {
        Self {
            trees: trees.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Set the tempo
    pub fn with_bpm(mut self, bpm: u32) -> Self {
        self.bpm = bpm;
        self
    }

    /// Set the time signature
    pub fn with_time_signature(mut self, time_signature: TimeSignature) -> Self {
        self.time_signature = Some(time_signature);
        self
    }

    /// Set the key signature
    pub fn with_key_signature(mut self, key_signature: KeySignature) -> Self {
        self.key_signature = Some(key_signature);
        self
    }

    /// Length of the longest top-level tree, in whole notes at this piece's tempo
    pub fn duration(&self) -> Time {
        self.trees.iter().map(Tree::duration).max().unwrap_or(ZERO)
    }

    /// Fill in missing onsets of every top-level tree from time zero, in place.
    pub fn derive_onsets(&mut self) {
        self.trees.iter_mut().for_each(|t| t.derive_onsets(ZERO));
    }

    /// A copy with missing onsets filled in.
    pub fn with_derived_onsets(&self) -> Self {
        let mut music = self.clone();
        music.derive_onsets();
        music
    }

    /// Check, or clamp, every pitch and volume to the MIDI range, in place.
    pub fn force_midi_compatible(&mut self, policy: RangePolicy) -> Result<(), TreeError> {
        self.trees
            .iter_mut()
            .try_for_each(|t| t.force_midi_compatible(policy))
    }

    /// A MIDI compatible copy. See [`Music::force_midi_compatible`].
    pub fn to_midi_compatible(&self, policy: RangePolicy) -> Result<Self, TreeError> {
        let mut music = self.clone();
        music.force_midi_compatible(policy)?;
        Ok(music)
    }

    /// Drop zero length sub-trees, in place. See [`Tree::remove_zeros`].
    pub fn remove_zeros(&mut self) {
        self.trees.iter_mut().for_each(Tree::remove_zeros);
    }

    /// Visit every note of every top-level tree in order.
    pub fn for_each_note<F: FnMut(&Note)>(&self, f: &mut F) {
        self.trees.iter().for_each(|t| t.for_each_note(f));
    }
}
