#![doc = r#"
Byte level access to a MIDI file.

A [`Reader`] walks a byte slice, handing out fixed size reads, variable-length
quantities and whole chunks. Every failure carries the byte offset at which
it happened.

```rust
# use musemidi::reader::Reader;
let bytes = [0x81, 0x00, 0x2A];
let mut reader = Reader::from_byte_slice(&bytes);

assert_eq!(reader.read_vlq().unwrap(), 128);
assert_eq!(reader.read_u8().unwrap(), 0x2A);
assert!(reader.read_u8().unwrap_err().is_unexpected_end());
```
"#]

mod error;
pub use error::*;

use crate::{
    ChunkError, ParseError,
    file::{
        Header,
        builder::chunk::{ChunkEvent, RawTrackChunk, UnknownChunk},
    },
    message::DataByte,
    vlq,
};

/// A cursor over the bytes of a MIDI file
#[derive(Debug, Clone)]
pub struct Reader<'slc> {
    data: &'slc [u8],
    position: usize,
}

impl<'slc> Reader<'slc> {
    /// Start reading at the beginning of `data`
    pub const fn from_byte_slice(data: &'slc [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// A reader over `data` starting at `start`. Positions remain offsets into `data`.
    pub(crate) const fn bounded(data: &'slc [u8], start: usize) -> Self {
        Self {
            data,
            position: start,
        }
    }

    /// The offset of the next byte to be read
    pub const fn buffer_position(&self) -> usize {
        self.position
    }

    /// True once every byte has been read
    pub const fn is_at_end(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Bytes not yet read
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Look at the next byte without consuming it
    pub fn peek_u8(&self) -> ReadResult<u8> {
        self.data
            .get(self.position)
            .copied()
            .ok_or(ReaderError::unexpected_end(self.position))
    }

    /// Read one byte
    pub fn read_u8(&mut self) -> ReadResult<u8> {
        let byte = self.peek_u8()?;
        self.position += 1;
        Ok(byte)
    }

    /// Read one byte with its leading bit clear
    pub fn read_data_byte(&mut self) -> ReadResult<DataByte> {
        let byte = self.read_u8()?;
        DataByte::new(byte).map_err(|e| ReaderError::invalid(self.position - 1, e))
    }

    /// Read `len` bytes
    pub fn read_slice(&mut self, len: usize) -> ReadResult<&'slc [u8]> {
        let end = self
            .position
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(ReaderError::unexpected_end(self.position))?;
        let slice = &self.data[self.position..end];
        self.position = end;
        Ok(slice)
    }

    /// Read exactly `N` bytes
    pub fn read_exact_size<const N: usize>(&mut self) -> ReadResult<[u8; N]> {
        let mut bytes = [0; N];
        bytes.copy_from_slice(self.read_slice(N)?);
        Ok(bytes)
    }

    /// Skip `len` bytes
    pub fn skip(&mut self, len: usize) -> ReadResult<()> {
        self.read_slice(len).map(|_| ())
    }

    /// Read a variable-length quantity
    pub fn read_vlq(&mut self) -> ReadResult<u32> {
        let rest = self.data.get(self.position..).unwrap_or_default();
        match vlq::decode(rest) {
            Ok((value, len)) => {
                self.position += len;
                Ok(value)
            }
            Err(ParseError::VlqTruncated) => Err(ReaderError::unexpected_end(self.data.len())),
            Err(e) => Err(self.invalid(e)),
        }
    }

    /// Read the next chunk, or `None` at the end of the data.
    ///
    /// The chunk's body is not interpreted beyond the header chunk's fields.
    pub fn read_chunk(&mut self) -> ReadResult<Option<ChunkEvent<'slc>>> {
        if self.is_at_end() {
            return Ok(None);
        }
        let kind: [u8; 4] = self.read_exact_size()?;
        let declared = u32::from_be_bytes(self.read_exact_size()?);
        let start = self.position;
        let available = self.remaining();
        if declared as usize > available {
            return Err(self.invalid(ChunkError::Truncated {
                declared,
                available,
            }));
        }
        let end = start + declared as usize;
        self.position = end;

        let body = Reader::bounded(&self.data[..end], start);
        let chunk = match &kind {
            b"MThd" => ChunkEvent::Header(Header::read(body, declared)?),
            b"MTrk" => ChunkEvent::Track(RawTrackChunk::new(body)),
            _ => ChunkEvent::Unknown(UnknownChunk::new(kind, declared)),
        };
        Ok(Some(chunk))
    }
}

#[test]
fn reads_are_bounded() {
    let bytes = [1, 2, 3];
    let mut reader = Reader::from_byte_slice(&bytes);
    assert_eq!(reader.read_exact_size::<2>().unwrap(), [1, 2]);
    assert_eq!(reader.remaining(), 1);
    let err = reader.read_slice(2).unwrap_err();
    assert!(err.is_unexpected_end());
    assert_eq!(err.position(), 2);
    assert_eq!(reader.read_u8().unwrap(), 3);
    assert!(reader.is_at_end());
}

#[test]
fn data_bytes_reject_status_bytes() {
    let bytes = [0x40, 0x90];
    let mut reader = Reader::from_byte_slice(&bytes);
    assert_eq!(reader.read_data_byte().unwrap().value(), 0x40);
    let err = reader.read_data_byte().unwrap_err();
    assert_eq!(err.position(), 1);
    assert_eq!(
        err.kind(),
        &ReaderErrorKind::Invalid(ParseError::DataByte(0x90))
    );
}

#[test]
fn truncated_vlq_is_unexpected_end() {
    let bytes = [0x81, 0x80];
    let mut reader = Reader::from_byte_slice(&bytes);
    assert!(reader.read_vlq().unwrap_err().is_unexpected_end());
}

#[test]
fn chunks_are_framed_and_unknown_chunks_kept_aside() {
    let bytes = [
        b'J', b'U', b'N', b'K', 0, 0, 0, 2, 0xAA, 0xBB, //
        b'M', b'T', b'r', b'k', 0, 0, 0, 4, 0x00, 0xFF, 0x2F, 0x00,
    ];
    let mut reader = Reader::from_byte_slice(&bytes);
    let Some(ChunkEvent::Unknown(unknown)) = reader.read_chunk().unwrap() else {
        panic!("expected an unknown chunk");
    };
    assert_eq!(unknown.kind(), *b"JUNK");
    assert_eq!(unknown.len(), 2);
    assert!(matches!(
        reader.read_chunk().unwrap(),
        Some(ChunkEvent::Track(_))
    ));
    assert!(reader.read_chunk().unwrap().is_none());
}

#[test]
fn chunk_longer_than_file() {
    let bytes = [b'M', b'T', b'r', b'k', 0, 0, 0, 9, 0x00];
    let err = Reader::from_byte_slice(&bytes).read_chunk().unwrap_err();
    assert_eq!(
        err.kind(),
        &ReaderErrorKind::Invalid(ParseError::Chunk(ChunkError::Truncated {
            declared: 9,
            available: 1
        }))
    );
}
