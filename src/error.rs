use thiserror::Error;

#[doc = r#"
The set of errors that can occur while interpreting the bytes of a MIDI file.

Unsupported but well-formed content (controller data, SysEx, unknown meta
events, unknown chunks) is never an error: it is skipped while reading.
"#]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A chunk was malformed or out of place
    #[error("Chunk: {0}")]
    Chunk(#[from] ChunkError),
    /// The header chunk could not be interpreted
    #[error("Header: {0}")]
    Header(#[from] HeaderError),
    /// The file as a whole is inconsistent
    #[error("File: {0}")]
    File(#[from] FileError),
    /// A byte where a data byte (leading 0 bit) was expected
    #[error("Invalid data byte {0:#04X}")]
    DataByte(u8),
    /// A variable-length quantity used more than four bytes
    #[error("Variable-length quantity is longer than four bytes")]
    VlqOverflow,
    /// The input ended inside a variable-length quantity
    #[error("Input ended inside a variable-length quantity")]
    VlqTruncated,
    /// A data byte was found where a status byte was expected, and no running status was set
    #[error("Data byte {0:#04X} found without a running status")]
    MissingStatus(u8),
    /// A system common or real-time status byte inside a track
    #[error("Status byte {0:#04X} cannot appear in a track")]
    SystemStatus(u8),
    /// A meta event had a length that does not match its type
    #[error("Meta event {kind:#04X} has invalid length {len}")]
    MetaLength {
        /// The meta event type byte
        kind: u8,
        /// The length found in the file
        len: usize,
    },
}

/// Errors relating to chunk layout
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChunkError {
    /// A second header chunk was found
    #[error("Found a second header chunk")]
    DuplicateHeader,
    /// A chunk's declared length runs past the end of the file
    #[error("Chunk declares {declared} bytes but only {available} remain")]
    Truncated {
        /// The length written in the chunk header
        declared: u32,
        /// The bytes left in the file
        available: usize,
    },
}

/// Errors found in the header chunk
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HeaderError {
    /// Header chunks carry at least six bytes
    #[error("Header length {0} is shorter than 6 bytes")]
    Length(u32),
    /// Only formats 0, 1 and 2 exist
    #[error("Unknown file format {0}")]
    Format(u16),
    /// SMPTE based timing cannot be expressed in whole notes
    #[error("SMPTE timing is not supported")]
    SmpteTiming,
    /// A resolution of zero ticks per quarter note
    #[error("Resolution must be at least one tick per quarter note")]
    ZeroResolution,
}

/// Errors found once every chunk has been read
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FileError {
    /// No header chunk was present
    #[error("The file has no header chunk")]
    NoHeader,
}
