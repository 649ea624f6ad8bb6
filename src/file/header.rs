use crate::{
    HeaderError,
    file::{FormatType, Resolution},
    reader::{ReadResult, Reader},
};

#[doc = r#"
The contents of the `MThd` chunk.

```text
MThd <length: u32 = 6> <format: u16> <tracks: u16> <division: u16>
```
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    format: FormatType,
    num_tracks: u16,
    resolution: Resolution,
}

impl Header {
    /// Create a header
    pub const fn new(format: FormatType, num_tracks: u16, resolution: Resolution) -> Self {
        Self {
            format,
            num_tracks,
            resolution,
        }
    }

    /// Interpret the body of a header chunk of the declared length.
    pub(crate) fn read(mut body: Reader<'_>, length: u32) -> ReadResult<Self> {
        if length < 6 {
            return Err(body.invalid(HeaderError::Length(length)));
        }
        let raw_format = u16::from_be_bytes(body.read_exact_size()?);
        let format = FormatType::try_from(raw_format)
            .map_err(|_| body.invalid(HeaderError::Format(raw_format)))?;
        let num_tracks = u16::from_be_bytes(body.read_exact_size()?);
        let resolution = Resolution::read(&mut body)?;
        Ok(Self {
            format,
            num_tracks,
            resolution,
        })
    }

    /// The file format
    pub const fn format_type(&self) -> FormatType {
        self.format
    }

    /// The number of track chunks the header announces
    pub const fn num_tracks(&self) -> u16 {
        self.num_tracks
    }

    /// Ticks per quarter note
    pub const fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// The fourteen bytes of the chunk, including its tag and length
    pub fn to_bytes(&self) -> [u8; 14] {
        let mut bytes = [0; 14];
        bytes[..4].copy_from_slice(b"MThd");
        bytes[4..8].copy_from_slice(&6u32.to_be_bytes());
        bytes[8..10].copy_from_slice(&u16::from(self.format).to_be_bytes());
        bytes[10..12].copy_from_slice(&self.num_tracks.to_be_bytes());
        bytes[12..].copy_from_slice(&self.resolution.ticks_per_quarter_note().to_be_bytes());
        bytes
    }
}
