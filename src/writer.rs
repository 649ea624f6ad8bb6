#![doc = r#"
Serializing a [`MidiFile`] into bytes.

The header chunk is followed by one `MTrk` chunk per track, each prefixed
with its big-endian body length. Every message is written with an explicit
status byte; running status is never used. A track that does not already
end with an end-of-track event gets one at delta zero.
"#]

use alloc::vec::Vec;

use crate::{
    file::{MidiFile, Track},
    message::{MetaMessage, Ticked, TrackMessage},
};

/// Serialize a whole file
pub fn write_file(file: &MidiFile) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&file.header().to_bytes());
    for track in file.tracks() {
        write_track(track, &mut buf);
    }
    buf
}

/// Append one `MTrk` chunk
pub fn write_track(track: &Track, buf: &mut Vec<u8>) {
    let body = track_body(track);
    buf.extend_from_slice(b"MTrk");
    buf.extend_from_slice(&(body.len() as u32).to_be_bytes());
    buf.extend_from_slice(&body);
}

fn track_body(track: &Track) -> Vec<u8> {
    let mut body = Vec::new();
    for event in track.events() {
        event.write_to(&mut body);
    }
    let terminated = matches!(
        track.events().last(),
        Some(Ticked {
            event: TrackMessage::Meta(MetaMessage::EndOfTrack),
            ..
        })
    );
    if !terminated {
        Ticked::new(0, TrackMessage::Meta(MetaMessage::EndOfTrack)).write_to(&mut body);
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        file::{FormatType, Resolution},
        message::*,
    };
    use alloc::vec;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_note_file() {
        let on = ChannelVoiceMessage::new(
            Channel::Two,
            VoiceEvent::NoteOn {
                key: DataByte::new(60).unwrap(),
                velocity: DataByte::new(100).unwrap(),
            },
        );
        let off = ChannelVoiceMessage::new(
            Channel::Two,
            VoiceEvent::NoteOff {
                key: DataByte::new(60).unwrap(),
                velocity: DataByte::new(100).unwrap(),
            },
        );
        let track = Track::new(vec![
            Ticked::new(0, on.into()),
            Ticked::new(96, off.into()),
            Ticked::new(96, MetaMessage::EndOfTrack.into()),
        ]);
        let file = MidiFile::new(FormatType::SingleMultiChannel, Resolution::DEFAULT, vec![track]);

        #[rustfmt::skip]
        let expected = [
            b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 0, 0, 1, 0, 96,
            b'M', b'T', b'r', b'k', 0, 0, 0, 12,
            0x00, 0x91, 60, 100,
            0x60, 0x81, 60, 100,
            0x60, 0xFF, 0x2F, 0x00,
        ];
        assert_eq!(write_file(&file), expected);
    }

    #[test]
    fn missing_end_of_track_is_added() {
        let mut buf = Vec::new();
        write_track(&Track::default(), &mut buf);
        assert_eq!(buf, [b'M', b'T', b'r', b'k', 0, 0, 0, 4, 0x00, 0xFF, 0x2F, 0x00]);
    }
}
