use super::Reader;
use crate::ParseError;
use thiserror::Error;

#[doc = r#"
Failure to read a [`MidiFile`](crate::file::MidiFile) from bytes.

Decoding is lenient about events it does not model, so a `ReaderError` only
means the bytes cannot be framed at all: the input stopped early, or a chunk,
header or event was malformed. [`position`](ReaderError::position) is the
offset into the whole input where this was noticed.

```rust
# use musemidi::{ParseError, reader::Reader};
let mut reader = Reader::from_byte_slice(&[0x40, 0x90]);
reader.read_data_byte().unwrap();

let err = reader.read_data_byte().unwrap_err();
assert_eq!(err.position(), 1);
assert_eq!(err.parse_error(), Some(&ParseError::DataByte(0x90)));
```
"#]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("at byte {position}: {kind}")]
pub struct ReaderError {
    position: usize,
    kind: ReaderErrorKind,
}

/// What went wrong while reading
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReaderErrorKind {
    /// The bytes are there but do not form a valid file
    #[error("{0}")]
    Invalid(#[from] ParseError),
    /// The input ended inside a chunk header, an event or a variable-length quantity
    #[error("unexpected end of input")]
    UnexpectedEnd,
}

impl ReaderError {
    /// Create a reader error from a position and kind
    pub const fn new(position: usize, kind: ReaderErrorKind) -> Self {
        Self { position, kind }
    }

    pub(crate) fn invalid(position: usize, error: impl Into<ParseError>) -> Self {
        Self::new(position, ReaderErrorKind::Invalid(error.into()))
    }

    pub(crate) const fn unexpected_end(position: usize) -> Self {
        Self::new(position, ReaderErrorKind::UnexpectedEnd)
    }

    /// Byte offset into the input
    pub const fn position(&self) -> usize {
        self.position
    }

    /// What went wrong
    pub const fn kind(&self) -> &ReaderErrorKind {
        &self.kind
    }

    /// True if more bytes would have been needed
    pub const fn is_unexpected_end(&self) -> bool {
        matches!(self.kind, ReaderErrorKind::UnexpectedEnd)
    }

    /// The malformed structure, unless the input simply ran out
    pub const fn parse_error(&self) -> Option<&ParseError> {
        match &self.kind {
            ReaderErrorKind::Invalid(error) => Some(error),
            ReaderErrorKind::UnexpectedEnd => None,
        }
    }
}

/// Result of a read (see [`ReaderError`])
pub type ReadResult<T> = Result<T, ReaderError>;

impl Reader<'_> {
    /// An error for malformed data just before the current position
    pub(crate) fn invalid(&self, error: impl Into<ParseError>) -> ReaderError {
        ReaderError::invalid(self.buffer_position(), error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChunkError, HeaderError};
    use alloc::string::ToString;
    use pretty_assertions::assert_eq;

    #[test]
    fn messages_name_the_offset() {
        let err = ReaderError::invalid(14, ChunkError::DuplicateHeader);
        assert!(err.to_string().starts_with("at byte 14: "));
        assert_eq!(
            err.parse_error(),
            Some(&ParseError::Chunk(ChunkError::DuplicateHeader))
        );
        assert!(!err.is_unexpected_end());

        let end = ReaderError::unexpected_end(3);
        assert_eq!(end.to_string(), "at byte 3: unexpected end of input");
        assert_eq!(end.parse_error(), None);
    }

    #[test]
    fn errors_point_at_the_reader_position() {
        let bytes = [0x00, 0x60];
        let mut reader = Reader::from_byte_slice(&bytes);
        reader.skip(2).unwrap();
        let err = reader.invalid(HeaderError::ZeroResolution);
        assert_eq!(err.position(), 2);
        assert_eq!(
            err.kind(),
            &ReaderErrorKind::Invalid(ParseError::Header(HeaderError::ZeroResolution))
        );
    }
}
