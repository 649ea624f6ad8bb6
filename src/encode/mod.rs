#![doc = r#"
Turning note events into a [`MidiFile`].

# Overview

Encoding a [`Music`] value runs in four steps:

1. the tree is made MIDI compatible under the chosen [`RangePolicy`](crate::tree::RangePolicy) and
   flattened into [`MEvent`]s,
2. a [`ChannelMap`] gives every instrument a channel,
3. each event becomes a note-on at its onset and a note-off at its end,
   sorted per track and converted to delta ticks,
4. program changes, global meta events and the end-of-track marker are
   added around those messages.

Each message is placed at `round(time × resolution × 4)` ticks from the
start of its track, with halves rounded to even, and deltas are taken between
those rounded ticks. A message is never more than half a tick away from its
exact time, however long the track. Every
track ends one quarter note after its last message.

With [`TrackLayout::ByInstrument`] there is one track per channel in
ascending channel order. With [`TrackLayout::ByPart`] there is one track per
top-level tree that sounds; channels are still allocated across the whole
piece.

```rust
# use musemidi::prelude::*;
let music = Music::new([Tree::note(60, QN)]);
let file = musemidi::encode::encode(&music, &EncodeOptions::default()).unwrap();

// note on, note off, end of track
let track = &file.tracks()[0];
let deltas: Vec<u32> = track.events().iter().map(|e| e.delta_ticks).collect();
assert_eq!(deltas, [0, 96, 96]);
```
"#]

mod channel;
pub use channel::*;

mod options;
pub use options::*;

use alloc::vec::Vec;
use thiserror::Error;

use crate::{
    event::{MEvent, materialize_by_part, materialize_music},
    file::{FormatType, MidiFile, Resolution, Track},
    message::{
        Channel, ChannelVoiceMessage, DataByte, MetaMessage, Tempo, Ticked, TrackMessage,
        VoiceEvent,
    },
    time::{Time, ZERO},
    tree::{Music, TreeError},
    vlq,
};

/// Errors raised while encoding
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// More melodic instruments than channels
    #[error("{count} melodic instruments need channels but only 15 are available")]
    TooManyInstruments {
        /// Distinct non-percussion instruments requested
        count: usize,
    },
    /// Nothing sounds, so there is nothing to write
    #[error("No track contains a note")]
    NoTracks,
    /// A file holds at most sixteen tracks
    #[error("{0} tracks requested but at most 16 can be written")]
    TooManyTracks(usize),
    /// A message would happen before the start of its track
    #[error("Event at {0} lies before the start of the track")]
    NegativeTime(Time),
    /// A delta time does not fit in a variable-length quantity
    #[error("Delta of {0} ticks is too long to encode")]
    DeltaOverflow(i64),
    /// A pitch outside 0-127 reached the encoder
    #[error("Pitch {0} is outside the MIDI range 0-127")]
    PitchOutOfRange(i32),
    /// A volume outside 0-127 reached the encoder
    #[error("Volume {0} is outside the MIDI range 0-127")]
    VolumeOutOfRange(i32),
    /// The tempo cannot be written as microseconds per quarter note
    #[error("Tempo of {0} bpm cannot be encoded")]
    InvalidTempo(u32),
    /// The tree failed validation
    #[error(transparent)]
    Range(#[from] TreeError),
}

/// Encode a piece into a file.
///
/// # Errors
/// See [`EncodeError`].
pub fn encode(music: &Music, options: &EncodeOptions) -> Result<MidiFile, EncodeError> {
    let music = music.to_midi_compatible(options.range_policy)?;
    let groups = match options.layout {
        TrackLayout::ByInstrument => alloc::vec![materialize_music(&music)],
        TrackLayout::ByPart => materialize_by_part(&music),
    };
    let globals = global_meta(&music)?;
    assemble(groups, options, globals)
}

/// Encode already materialized events, one track per channel, without
/// global meta events.
///
/// # Errors
/// See [`EncodeError`].
pub fn encode_events(events: &[MEvent], options: &EncodeOptions) -> Result<MidiFile, EncodeError> {
    let mut events = events.to_vec();
    events.sort_by_key(|e| e.onset);
    let options = options.clone().with_layout(TrackLayout::ByInstrument);
    assemble(alloc::vec![events], &options, Vec::new())
}

fn global_meta(music: &Music) -> Result<Vec<MetaMessage>, EncodeError> {
    let mut metas = Vec::new();
    if music.bpm != Music::DEFAULT_BPM {
        let tempo = Tempo::from_bpm(music.bpm).ok_or(EncodeError::InvalidTempo(music.bpm))?;
        metas.push(MetaMessage::Tempo(tempo));
    }
    if let Some(ts) = music.time_signature {
        metas.push(MetaMessage::TimeSignature(ts));
    }
    if let Some(ks) = music.key_signature {
        metas.push(MetaMessage::KeySignature(ks));
    }
    Ok(metas)
}

/// Lay out `groups` of sorted events as tracks. With the instrument layout
/// a single group is split by channel.
fn assemble(
    groups: Vec<Vec<MEvent>>,
    options: &EncodeOptions,
    globals: Vec<MetaMessage>,
) -> Result<MidiFile, EncodeError> {
    let map = ChannelMap::assign(groups.iter().flatten().map(|e| e.instrument))?;

    let tracks: Vec<Vec<MEvent>> = match options.layout {
        TrackLayout::ByInstrument => {
            let events: Vec<&MEvent> = groups.iter().flatten().collect();
            map.channels()
                .into_iter()
                .map(|channel| {
                    events
                        .iter()
                        .filter(|e| map.channel(e.instrument) == Some(channel))
                        .map(|e| (*e).clone())
                        .collect()
                })
                .collect()
        }
        TrackLayout::ByPart => groups.into_iter().filter(|g| !g.is_empty()).collect(),
    };

    if tracks.is_empty() {
        return Err(EncodeError::NoTracks);
    }
    if tracks.len() > 16 {
        return Err(EncodeError::TooManyTracks(tracks.len()));
    }
    #[cfg(feature = "tracing")]
    tracing::debug!(
        "Encoding {} tracks over {} channels",
        tracks.len(),
        map.channels().len()
    );

    let mut encoded = Vec::with_capacity(tracks.len());
    for (i, events) in tracks.iter().enumerate() {
        let metas: &[MetaMessage] = if i == 0 { &globals } else { &[] };
        encoded.push(encode_track(events, &map, options.resolution, metas)?);
    }
    Ok(MidiFile::new(
        FormatType::for_track_count(encoded.len()),
        options.resolution,
        encoded,
    ))
}

#[derive(Debug, Clone, Copy)]
struct OnOff {
    time: Time,
    channel: Channel,
    event: VoiceEvent,
}

/// Expand each event into a note-on and a note-off, stable sorted by time.
fn expand(events: &[MEvent], map: &ChannelMap) -> Result<Vec<OnOff>, EncodeError> {
    let mut messages = Vec::with_capacity(events.len() * 2);
    for event in events {
        let key = DataByte::from_i32(event.pitch).ok_or(EncodeError::PitchOutOfRange(event.pitch))?;
        let velocity =
            DataByte::from_i32(event.volume).ok_or(EncodeError::VolumeOutOfRange(event.volume))?;
        let Some(channel) = map.channel(event.instrument) else {
            continue;
        };
        messages.push(OnOff {
            time: event.onset,
            channel,
            event: VoiceEvent::NoteOn { key, velocity },
        });
        messages.push(OnOff {
            time: event.end(),
            channel,
            event: VoiceEvent::NoteOff { key, velocity },
        });
    }
    messages.sort_by_key(|m| m.time);
    Ok(messages)
}

fn encode_track(
    events: &[MEvent],
    map: &ChannelMap,
    resolution: Resolution,
    metas: &[MetaMessage],
) -> Result<Track, EncodeError> {
    let messages = expand(events, map)?;
    let mut track: Vec<Ticked<TrackMessage>> = metas
        .iter()
        .map(|m| Ticked::new(0, m.clone().into()))
        .collect();

    let mut channels: Vec<Channel> = messages.iter().map(|m| m.channel).collect();
    channels.sort();
    channels.dedup();
    for channel in channels {
        if let Some(program) = map.program(channel) {
            let program = DataByte::new_unchecked(program);
            let message = ChannelVoiceMessage::new(channel, VoiceEvent::ProgramChange { program });
            track.push(Ticked::new(0, message.into()));
        }
    }

    let mut previous = 0;
    for message in messages {
        if message.time < ZERO {
            return Err(EncodeError::NegativeTime(message.time));
        }
        let tick = resolution.to_ticks(message.time);
        let voice = ChannelVoiceMessage::new(message.channel, message.event);
        track.push(Ticked::new(delta_ticks(tick - previous)?, voice.into()));
        previous = tick;
    }

    let tail = u32::from(resolution.ticks_per_quarter_note());
    track.push(Ticked::new(tail, MetaMessage::EndOfTrack.into()));
    Ok(Track::new(track))
}

fn delta_ticks(ticks: i64) -> Result<u32, EncodeError> {
    u32::try_from(ticks)
        .ok()
        .filter(|t| *t <= vlq::MAX)
        .ok_or(EncodeError::DeltaOverflow(ticks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        message::{KeySignature, TimeSignature},
        time::*,
        tree::{Instrument, Note, RangePolicy, Tree},
    };
    use alloc::vec;
    use pretty_assertions::assert_eq;

    fn deltas(track: &Track) -> Vec<u32> {
        track.events().iter().map(|e| e.delta_ticks).collect()
    }

    #[test]
    fn single_note_is_one_quarter() {
        let file = encode(&Music::new([Tree::note(60, QN)]), &EncodeOptions::default()).unwrap();
        assert_eq!(file.format_type(), FormatType::SingleMultiChannel);
        assert_eq!(deltas(&file.tracks()[0]), vec![0, 96, 96]);
    }

    #[test]
    fn program_changes_lead_each_track() {
        let music = Music::new([
            Tree::part(Tree::note(60, QN), Some(Instrument::new(40).unwrap())),
            Tree::part(Tree::note(36, QN), Some(Instrument::DRUMS)),
        ]);
        let file = encode(&music, &EncodeOptions::default()).unwrap();
        assert_eq!(file.tracks().len(), 2);
        assert_eq!(file.format_type(), FormatType::Simultaneous);

        let first = &file.tracks()[0].events()[0].event;
        let voice = first.channel_voice().unwrap();
        assert_eq!(voice.channel(), Channel::One);
        assert_eq!(
            voice.event(),
            &VoiceEvent::ProgramChange {
                program: DataByte::new(40).unwrap()
            }
        );
        let drums = file.tracks()[1].events()[0].event.channel_voice().unwrap();
        assert_eq!(drums.channel(), Channel::PERCUSSION);
        assert_eq!(drums.status(), 0xC9);
    }

    #[test]
    fn simultaneous_offs_come_before_following_ons() {
        let music = Music::new([Tree::seq([Tree::note(60, QN), Tree::note(60, QN)])]);
        let file = encode(&music, &EncodeOptions::default()).unwrap();
        let kinds: Vec<u8> = file.tracks()[0]
            .events()
            .iter()
            .filter_map(|e| e.event.channel_voice())
            .map(|v| v.status())
            .collect();
        assert_eq!(kinds, vec![0x90, 0x80, 0x90, 0x80]);
        assert_eq!(deltas(&file.tracks()[0]), vec![0, 96, 0, 96, 96]);
    }

    #[test]
    fn ticks_are_rounded_from_absolute_times() {
        // three triplet eighths: each delta is 32 ticks exactly
        let triplet = whole_notes(1, 12);
        let music = Music::new([Tree::seq([
            Tree::note(60, triplet),
            Tree::note(62, triplet),
            Tree::note(64, triplet),
        ])]);
        let file = encode(&music, &EncodeOptions::default()).unwrap();
        assert_eq!(deltas(&file.tracks()[0]), vec![0, 32, 0, 32, 0, 32, 96]);

        // a fifth of a whole note is 76.8 ticks
        let music = Music::new([Tree::note(60, whole_notes(1, 5))]);
        let file = encode(&music, &EncodeOptions::default()).unwrap();
        assert_eq!(deltas(&file.tracks()[0]), vec![0, 77, 96]);

        // 76.8, 153.6, 230.4 and 307.2 ticks do not accumulate rounding error
        let fifth = whole_notes(1, 5);
        let music = Music::new([Tree::seq((0..4).map(|i| Tree::note(60 + i, fifth)))]);
        let file = encode(&music, &EncodeOptions::default()).unwrap();
        assert_eq!(
            deltas(&file.tracks()[0]),
            vec![0, 77, 0, 77, 0, 76, 0, 77, 96]
        );
    }

    #[test]
    fn global_meta_goes_first() {
        let music = Music::new([Tree::note(60, QN), Tree::note(72, QN)])
            .with_bpm(90)
            .with_time_signature(TimeSignature::new(3, 4).unwrap())
            .with_key_signature(KeySignature::new(2, false).unwrap());
        let file = encode(&music, &EncodeOptions::default()).unwrap();
        let track = &file.tracks()[0];
        assert!(matches!(
            track.events()[0].event,
            TrackMessage::Meta(MetaMessage::Tempo(_))
        ));
        assert_eq!(track.tempo().map(|t| t.bpm()), Some(90));
        assert_eq!(track.time_signature().map(|t| t.numerator), Some(3));
        assert_eq!(track.key_signature().map(|k| k.accidentals), Some(2));
    }

    #[test]
    fn default_tempo_is_not_written() {
        let file = encode(&Music::new([Tree::note(60, QN)]), &EncodeOptions::default()).unwrap();
        assert_eq!(file.tempo(), None);
    }

    #[test]
    fn empty_music_has_no_tracks() {
        let music = Music::new([Tree::rest(WN), Tree::note(60, ZERO)]);
        assert_eq!(
            encode(&music, &EncodeOptions::default()),
            Err(EncodeError::NoTracks)
        );
    }

    #[test]
    fn empty_instruments_get_no_track() {
        let music = Music::new([
            Tree::part(Tree::note(60, QN), Some(Instrument::new(1).unwrap())),
            Tree::part(Tree::rest(QN), Some(Instrument::new(2).unwrap())),
            Tree::part(Tree::note(64, QN), Some(Instrument::new(3).unwrap())),
        ]);
        let file = encode(&music, &EncodeOptions::default()).unwrap();
        assert_eq!(file.tracks().len(), 2);
        assert_eq!(file.header().num_tracks(), 2);
    }

    #[test]
    fn range_policy_applies() {
        let music = Music::new([Tree::note(130, QN)]);
        assert_eq!(
            encode(&music, &EncodeOptions::default()),
            Err(EncodeError::Range(TreeError::PitchOutOfRange(130)))
        );
        let options = EncodeOptions::default().with_range_policy(RangePolicy::Clamp);
        let clamped = encode(&music, &options).unwrap();
        let key = clamped.tracks()[0].events()[0]
            .event
            .channel_voice()
            .and_then(|v| v.event().key());
        assert_eq!(key.map(|k| k.value()), Some(127));
    }

    #[test]
    fn raw_events_are_range_checked() {
        let events = [MEvent::new(ZERO, 60, QN, 200, None)];
        assert_eq!(
            encode_events(&events, &EncodeOptions::default()),
            Err(EncodeError::VolumeOutOfRange(200))
        );
    }

    #[test]
    fn negative_onsets_are_rejected() {
        let music = Music::new([Note::new(60, QN).with_onset(-QN).into()]);
        assert_eq!(
            encode(&music, &EncodeOptions::default()),
            Err(EncodeError::NegativeTime(-QN))
        );
    }

    #[test]
    fn part_layout_shares_channels() {
        let piano = Some(Instrument::new(0).unwrap());
        let music = Music::new([
            Tree::part(Tree::note(60, QN), piano),
            Tree::rest(QN),
            Tree::part(Tree::note(48, HN), piano),
        ]);
        let options = EncodeOptions::default().with_layout(TrackLayout::ByPart);
        let file = encode(&music, &options).unwrap();
        assert_eq!(file.tracks().len(), 2);
        for track in file.tracks() {
            assert_eq!(track.channels(), vec![Channel::One]);
        }
    }

    #[test]
    fn part_layout_limits_tracks() {
        let music = Music::new((0..17).map(|_| Tree::note(60, QN)));
        let options = EncodeOptions::default().with_layout(TrackLayout::ByPart);
        assert_eq!(encode(&music, &options), Err(EncodeError::TooManyTracks(17)));
    }

    #[test]
    fn custom_resolution() {
        let options = EncodeOptions::default().with_resolution(Resolution::new(480).unwrap());
        let file = encode(&Music::new([Tree::note(60, EN)]), &options).unwrap();
        assert_eq!(deltas(&file.tracks()[0]), vec![0, 240, 480]);
        assert_eq!(file.resolution().ticks_per_quarter_note(), 480);
    }
}
