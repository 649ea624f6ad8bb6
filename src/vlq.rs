#![doc = r#"
Variable-length quantities.

Delta times and meta event lengths are written seven bits at a time, most
significant group first, with the leading bit set on every byte but the last.
A quantity is at most four bytes long, so the largest value is `0x0FFF_FFFF`.

```rust
# use musemidi::vlq;
assert_eq!(vlq::encode(128), [0x81, 0x00]);
assert_eq!(vlq::decode(&[0x81, 0x00]), Ok((128, 2)));
```
"#]

use alloc::vec::Vec;

use crate::ParseError;

/// The largest value a four byte quantity can hold
pub const MAX: u32 = 0x0FFF_FFFF;

/// Encode a value into a fresh buffer. Values above [`MAX`] are truncated to 28 bits.
pub fn encode(value: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(4);
    encode_into(value, &mut buf);
    buf
}

/// Append the encoding of `value` to `buf`.
pub fn encode_into(value: u32, buf: &mut Vec<u8>) {
    let value = value & MAX;
    let mut shift = 21;
    while shift > 0 && value >> shift == 0 {
        shift -= 7;
    }
    while shift > 0 {
        buf.push(0x80 | ((value >> shift) & 0x7F) as u8);
        shift -= 7;
    }
    buf.push((value & 0x7F) as u8);
}

/// Decode a quantity from the front of `bytes`, returning the value and the
/// number of bytes consumed.
///
/// # Errors
/// - [`ParseError::VlqOverflow`] if the first four bytes all have the leading bit set
/// - [`ParseError::VlqTruncated`] if the input ends first
pub fn decode(bytes: &[u8]) -> Result<(u32, usize), ParseError> {
    let mut value = 0u32;
    for (i, &byte) in bytes.iter().take(4).enumerate() {
        value = (value << 7) | (byte & 0x7F) as u32;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    if bytes.len() < 4 {
        Err(ParseError::VlqTruncated)
    } else {
        Err(ParseError::VlqOverflow)
    }
}

#[test]
fn known_encodings() {
    let cases: [(u32, &[u8]); 6] = [
        (0, &[0x00]),
        (127, &[0x7F]),
        (128, &[0x81, 0x00]),
        (16_383, &[0xFF, 0x7F]),
        (16_384, &[0x81, 0x80, 0x00]),
        (2_097_151, &[0xFF, 0xFF, 0x7F]),
    ];
    for (value, bytes) in cases {
        assert_eq!(encode(value), bytes, "encoding {value}");
        assert_eq!(decode(bytes), Ok((value, bytes.len())), "decoding {value}");
    }
}

#[test]
fn largest_value_uses_four_bytes() {
    assert_eq!(encode(MAX), [0xFF, 0xFF, 0xFF, 0x7F]);
    assert_eq!(decode(&[0xFF, 0xFF, 0xFF, 0x7F, 0x12]), Ok((MAX, 4)));
}

#[test]
fn overlong_or_truncated_input_is_rejected() {
    assert_eq!(decode(&[0x80, 0x80, 0x80, 0x80, 0x00]), Err(ParseError::VlqOverflow));
    assert_eq!(decode(&[0x81]), Err(ParseError::VlqTruncated));
    assert_eq!(decode(&[]), Err(ParseError::VlqTruncated));
}
