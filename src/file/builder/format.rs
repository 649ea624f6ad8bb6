use num_enum::{IntoPrimitive, TryFromPrimitive};

#[doc = r#"
The format word of the header chunk.

Files written by this crate are format 0 when they hold a single track and
format 1 otherwise. Format 2 files are read like format 1: every track starts
at time zero.
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum FormatType {
    /// Format 0: one track holding every channel
    SingleMultiChannel = 0,
    /// Format 1: tracks played together
    Simultaneous = 1,
    /// Format 2: independent sequences
    SequentiallyIndependent = 2,
}

impl FormatType {
    /// The format to write for a file of `num_tracks` tracks
    pub const fn for_track_count(num_tracks: usize) -> Self {
        if num_tracks == 1 {
            Self::SingleMultiChannel
        } else {
            Self::Simultaneous
        }
    }
}

#[test]
fn format_words() {
    assert_eq!(FormatType::try_from(2u16), Ok(FormatType::SequentiallyIndependent));
    assert!(FormatType::try_from(3u16).is_err());
    assert_eq!(u16::from(FormatType::Simultaneous), 1);
    assert_eq!(FormatType::for_track_count(1), FormatType::SingleMultiChannel);
    assert_eq!(FormatType::for_track_count(4), FormatType::Simultaneous);
}
