use alloc::{collections::BTreeMap, string::String};

use super::TreeError;
use crate::time::{Time, ZERO};

#[doc = r#"
How out-of-range pitches and volumes are treated when a tree is made MIDI
compatible.
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RangePolicy {
    /// Fail on the first value outside 0-127
    #[default]
    Strict,
    /// Bound every value to 0-127
    Clamp,
}

impl RangePolicy {
    fn apply(self, value: &mut i32, err: fn(i32) -> TreeError) -> Result<(), TreeError> {
        if (0..=127).contains(value) {
            return Ok(());
        }
        match self {
            RangePolicy::Strict => Err(err(*value)),
            RangePolicy::Clamp => {
                *value = (*value).clamp(0, 127);
                Ok(())
            }
        }
    }
}

#[doc = r#"
A single pitched sound.

The pitch and volume are plain integers so that operators working on the
tree may move them outside the MIDI range; they are validated with
[`Tree::force_midi_compatible`](super::Tree::force_midi_compatible) before
encoding.

# Example
```rust
# use musemidi::prelude::*;
let note = Note::new(60, QN).with_onset(HN).with_volume(80);

assert_eq!(note.end(), Some(DHN));
assert!(note.is_sounding());
```
"#]
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Note {
    /// MIDI key number
    pub pitch: i32,
    /// Length in whole notes
    pub duration: Time,
    /// Absolute start time, if known
    pub onset: Option<Time>,
    /// MIDI velocity
    pub volume: i32,
    /// Application specific parameters carried along untouched
    pub params: BTreeMap<String, String>,
}

impl Note {
    /// Volume given to notes unless set otherwise
    pub const DEFAULT_VOLUME: i32 = 100;

    /// Create a note without an onset at the default volume
    pub fn new(pitch: i32, duration: Time) -> Self {
        Self {
            pitch,
            duration,
            onset: None,
            volume: Self::DEFAULT_VOLUME,
            params: BTreeMap::new(),
        }
    }

    /// Set the absolute onset
    pub fn with_onset(mut self, onset: Time) -> Self {
        self.onset = Some(onset);
        self
    }

    /// Set the volume
    pub fn with_volume(mut self, volume: i32) -> Self {
        self.volume = volume;
        self
    }

    /// Attach an extension parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Onset plus duration, when the onset is known
    pub fn end(&self) -> Option<Time> {
        self.onset.map(|onset| onset + self.duration)
    }

    /// Notes without a positive duration produce no sound
    pub fn is_sounding(&self) -> bool {
        self.duration > ZERO
    }

    pub(crate) fn fit_midi_range(&mut self, policy: RangePolicy) -> Result<(), TreeError> {
        policy.apply(&mut self.pitch, TreeError::PitchOutOfRange)?;
        policy.apply(&mut self.volume, TreeError::VolumeOutOfRange)
    }
}

/// A silent placeholder of some length.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rest {
    /// Length in whole notes
    pub duration: Time,
    /// Absolute start time, if known
    pub onset: Option<Time>,
}

impl Rest {
    /// Create a rest without an onset
    pub fn new(duration: Time) -> Self {
        Self {
            duration,
            onset: None,
        }
    }

    /// Set the absolute onset
    pub fn with_onset(mut self, onset: Time) -> Self {
        self.onset = Some(onset);
        self
    }
}

#[test]
fn strict_policy_rejects_out_of_range() {
    let mut note = Note::new(128, crate::time::QN);
    assert_eq!(
        note.fit_midi_range(RangePolicy::Strict),
        Err(TreeError::PitchOutOfRange(128))
    );

    let mut note = Note::new(60, crate::time::QN).with_volume(-4);
    assert_eq!(
        note.fit_midi_range(RangePolicy::Strict),
        Err(TreeError::VolumeOutOfRange(-4))
    );
}

#[test]
fn clamp_policy_bounds_values() {
    let mut note = Note::new(-12, crate::time::QN).with_volume(300);
    note.fit_midi_range(RangePolicy::Clamp).unwrap();
    assert_eq!(note.pitch, 0);
    assert_eq!(note.volume, 127);
}
