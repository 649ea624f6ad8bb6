use thiserror::Error;

/// Errors raised while building or validating a music tree
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// A note's pitch does not fit the 0-127 MIDI range
    #[error("Pitch {0} is outside the MIDI range 0-127")]
    PitchOutOfRange(i32),
    /// A note's volume does not fit the 0-127 MIDI range
    #[error("Volume {0} is outside the MIDI range 0-127")]
    VolumeOutOfRange(i32),
    /// Instrument patches are 7-bit
    #[error("Patch {0} is outside the MIDI range 0-127")]
    PatchOutOfRange(u8),
    /// A chord was built without members
    #[error("A chord needs at least one member")]
    EmptyChord,
    /// A chord member starts or lasts differently from the first member
    #[error("Chord member {index} does not share the onset and duration of the first member")]
    ChordMismatch {
        /// Position of the offending member
        index: usize,
    },
}
