use crate::{file::Resolution, tree::RangePolicy};

/// How tracks are laid out in an encoded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrackLayout {
    /// One track per channel, in ascending channel order
    #[default]
    ByInstrument,
    /// One track per top-level tree that contains a sounding note
    ByPart,
}

#[doc = r#"
Options for [`encode`](super::encode) and [`music_to_midi`](crate::music_to_midi).

```rust
# use musemidi::prelude::*;
let options = EncodeOptions::default()
    .with_resolution(Resolution::new(480).unwrap())
    .with_layout(TrackLayout::ByPart)
    .with_range_policy(RangePolicy::Clamp);
assert_eq!(options.resolution.ticks_per_quarter_note(), 480);
```
"#]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncodeOptions {
    /// Ticks per quarter note written to the header
    pub resolution: Resolution,
    /// Track layout
    pub layout: TrackLayout,
    /// What to do with pitches and volumes outside 0-127
    pub range_policy: RangePolicy,
}

impl EncodeOptions {
    /// Set the resolution
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set the track layout
    pub fn with_layout(mut self, layout: TrackLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Set the range policy
    pub fn with_range_policy(mut self, range_policy: RangePolicy) -> Self {
        self.range_policy = range_policy;
        self
    }
}
