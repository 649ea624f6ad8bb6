use musemidi::{encode::encode, prelude::*};
use pretty_assertions::assert_eq;

fn piano() -> Option<Instrument> {
    Some(Instrument::new(0).unwrap())
}

#[test]
fn single_note_file_bytes() {
    let music = Music::new([Tree::part(Tree::note(60, QN), piano())]);
    let bytes = music_to_midi(&music, &EncodeOptions::default()).unwrap();

    #[rustfmt::skip]
    let expected = vec![
        // header: format 0, one track, 96 ticks per quarter note
        b'M', b'T', b'h', b'd', 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00, 0x01, 0x00, 0x60,
        b'M', b'T', b'r', b'k', 0x00, 0x00, 0x00, 0x0F,
        0x00, 0xC0, 0x00,
        0x00, 0x90, 0x3C, 0x64,
        0x60, 0x80, 0x3C, 0x64,
        0x60, 0xFF, 0x2F, 0x00,
    ];
    assert_eq!(bytes, expected);
}

#[test]
fn single_note_lasts_96_ticks() {
    let tree = Tree::note(60, QN);
    assert_eq!(materialize(&tree), vec![MEvent::new(ZERO, 60, QN, 100, None)]);

    let file = encode(&Music::new([tree]), &EncodeOptions::default()).unwrap();
    let timed: Vec<u64> = file.tracks()[0].timed_events().map(|t| t.tick).collect();
    assert_eq!(timed, vec![0, 96, 192]);
}

#[test]
fn tempo_and_signatures_lead_the_first_track() {
    let music = Music::new([Tree::note(60, QN)])
        .with_bpm(60)
        .with_time_signature(TimeSignature::new(6, 8).unwrap())
        .with_key_signature(KeySignature::new(3, false).unwrap());
    let bytes = music_to_midi(&music, &EncodeOptions::default()).unwrap();

    #[rustfmt::skip]
    let metas: [u8; 21] = [
        0x00, 0xFF, 0x51, 0x03, 0x0F, 0x42, 0x40,
        0x00, 0xFF, 0x58, 0x04, 0x06, 0x03, 0x18, 0x08,
        0x00, 0xFF, 0x59, 0x02, 0x03, 0x00,
    ];
    assert_eq!(&bytes[22..22 + metas.len()], &metas);
}

#[test]
fn silent_parts_produce_no_tracks() {
    let music = Music::new([
        Tree::part(Tree::note(60, QN), piano()),
        Tree::part(Tree::rest(WN), Some(Instrument::new(40).unwrap())),
        Tree::part(Tree::note(36, QN), Some(Instrument::DRUMS)),
    ]);

    for layout in [TrackLayout::ByInstrument, TrackLayout::ByPart] {
        let options = EncodeOptions::default().with_layout(layout);
        let bytes = music_to_midi(&music, &options).unwrap();
        // track count in the header
        assert_eq!(&bytes[10..12], &[0x00u8, 0x02]);
        assert_eq!(MidiFile::parse(&bytes).unwrap().tracks().len(), 2);
    }
}

#[test]
fn nothing_to_encode() {
    let music = Music::new([Tree::rest(WN)]);
    assert!(matches!(
        music_to_midi(&music, &EncodeOptions::default()),
        Err(ConvertError::Encode(EncodeError::NoTracks))
    ));
}

#[test]
fn channel_capacity() {
    let parts = |count: u8| {
        (0..count)
            .map(|p| Tree::part(Tree::note(60, QN), Some(Instrument::new(p).unwrap())))
            .chain([Tree::part(Tree::note(36, QN), Some(Instrument::DRUMS))])
            .collect::<Vec<_>>()
    };

    let file = encode(&Music::new(parts(15)), &EncodeOptions::default()).unwrap();
    assert_eq!(file.tracks().len(), 16);
    let mut channels: Vec<u8> = file
        .tracks()
        .iter()
        .flat_map(|t| t.channels())
        .map(|c| c.index())
        .collect();
    channels.sort();
    assert_eq!(channels, (0..16).collect::<Vec<u8>>());

    assert_eq!(
        encode(&Music::new(parts(16)), &EncodeOptions::default()),
        Err(EncodeError::TooManyInstruments { count: 16 })
    );
}

#[test]
fn percussion_shares_one_channel() {
    let music = Music::new([
        Tree::part(Tree::note(36, QN), Some(Instrument::DRUMS)),
        Tree::part(Tree::note(38, QN), Some(Instrument::percussion(8).unwrap())),
    ]);
    let file = encode(&music, &EncodeOptions::default()).unwrap();
    assert_eq!(file.tracks().len(), 1);
    assert_eq!(file.tracks()[0].channels(), vec![Channel::PERCUSSION]);
}

#[test]
fn strict_range_rejects_and_clamp_fits() {
    let music = Music::new([Tree::Note(Note::new(130, QN).with_volume(200))]);
    assert!(matches!(
        music_to_midi(&music, &EncodeOptions::default()),
        Err(ConvertError::Encode(EncodeError::Range(_)))
    ));

    let options = EncodeOptions::default().with_range_policy(RangePolicy::Clamp);
    let file = encode(&music, &options).unwrap();
    let on = file.tracks()[0].events()[0].event.channel_voice().unwrap();
    assert_eq!(
        on.event(),
        &VoiceEvent::NoteOn {
            key: DataByte::new(127).unwrap(),
            velocity: DataByte::new(127).unwrap(),
        }
    );
}
