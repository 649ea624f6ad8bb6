use alloc::vec::Vec;

use super::{Resolution, TimedEventIterator};
use crate::{
    event::MEvent,
    message::{
        Channel, KeySignature, MetaMessage, Tempo, Ticked, TimeSignature, TrackMessage,
        VoiceEvent,
    },
    tree::Instrument,
};

#[doc = r#"
The decoded events of one track chunk.

Only the messages this crate models are kept. [`Track::skipped`] reports how
many others the chunk contained.
"#]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Track {
    events: Vec<Ticked<TrackMessage>>,
    skipped: usize,
}

impl Track {
    /// Create a track from its events
    pub fn new(events: Vec<Ticked<TrackMessage>>) -> Self {
        Self { events, skipped: 0 }
    }

    pub(crate) fn with_skipped(events: Vec<Ticked<TrackMessage>>, skipped: usize) -> Self {
        Self { events, skipped }
    }

    /// The events of the track
    pub fn events(&self) -> &[Ticked<TrackMessage>] {
        &self.events
    }

    /// The number of unsupported events dropped while reading
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Iterate over the events with absolute tick times
    pub fn timed_events(&self) -> TimedEventIterator<'_> {
        TimedEventIterator::new(&self.events)
    }

    /// The length of the track in ticks, up to and including the end-of-track event
    pub fn len_ticks(&self) -> u64 {
        self.events.iter().map(|e| u64::from(e.delta_ticks)).sum()
    }

    fn metas(&self) -> impl Iterator<Item = &MetaMessage> {
        self.events.iter().filter_map(|e| match &e.event {
            TrackMessage::Meta(meta) => Some(meta),
            TrackMessage::ChannelVoice(_) => None,
        })
    }

    /// The first track name
    pub fn name(&self) -> Option<&str> {
        self.metas().find_map(|m| match m {
            MetaMessage::TrackName(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// The first tempo event
    pub fn tempo(&self) -> Option<Tempo> {
        self.metas().find_map(|m| match m {
            MetaMessage::Tempo(tempo) => Some(*tempo),
            _ => None,
        })
    }

    /// The first time signature event
    pub fn time_signature(&self) -> Option<TimeSignature> {
        self.metas().find_map(|m| match m {
            MetaMessage::TimeSignature(ts) => Some(*ts),
            _ => None,
        })
    }

    /// The first key signature event
    pub fn key_signature(&self) -> Option<KeySignature> {
        self.metas().find_map(|m| match m {
            MetaMessage::KeySignature(ks) => Some(*ks),
            _ => None,
        })
    }

    /// The channels carrying notes, in order of first appearance
    pub fn channels(&self) -> Vec<Channel> {
        let mut channels = Vec::new();
        for voice in self.events.iter().filter_map(|e| e.event.channel_voice()) {
            if voice.event().key().is_some() && !channels.contains(&voice.channel()) {
                channels.push(voice.channel());
            }
        }
        channels
    }

    #[doc = r#"
Pair every note-on with its terminator and convert the result to
[`MEvent`]s.

The terminator of a note is the next note-on or note-off for the same key on
the same channel. Without one the note lasts until the end of the track,
end-of-track delta included. Notes that end where they start are dropped.

The instrument of a note is the last program change seen on its channel.
Notes on the percussion channel are percussion (kit 0 when no program was
set); notes on other channels without a program have no instrument.
"#]
    pub fn to_mevents(&self, resolution: Resolution) -> Vec<MEvent> {
        let timed: Vec<_> = self.timed_events().collect();
        let end_tick = timed.last().map(|t| t.tick).unwrap_or(0);

        if self.channels().len() > 1 {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                "Track mixes notes from {} channels; each note keeps its own channel's program",
                self.channels().len()
            );
        }

        let mut programs: [Option<u8>; 16] = [None; 16];
        let mut events = Vec::new();

        for (i, timed_event) in timed.iter().enumerate() {
            let Some(voice) = timed_event.message.channel_voice() else {
                continue;
            };
            let channel = voice.channel();
            let (key, velocity) = match *voice.event() {
                VoiceEvent::ProgramChange { program } => {
                    programs[channel.index() as usize] = Some(program.value());
                    continue;
                }
                VoiceEvent::NoteOff { .. } => continue,
                VoiceEvent::NoteOn { key, velocity } => (key, velocity),
            };

            let end = timed[i + 1..]
                .iter()
                .find(|t| {
                    t.message
                        .channel_voice()
                        .is_some_and(|v| v.channel() == channel && v.event().key() == Some(key))
                })
                .map(|t| t.tick)
                .unwrap_or(end_tick);
            if end <= timed_event.tick {
                continue;
            }

            events.push(MEvent::new(
                resolution.to_time(timed_event.tick),
                i32::from(key.value()),
                resolution.to_time(end - timed_event.tick),
                i32::from(velocity.value()),
                instrument_for(channel, programs[channel.index() as usize]),
            ));
        }
        events
    }
}

fn instrument_for(channel: Channel, program: Option<u8>) -> Option<Instrument> {
    if channel.is_percussion() {
        Instrument::percussion(program.unwrap_or(0)).ok()
    } else {
        program.and_then(|p| Instrument::new(p).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{message::*, time::*};
    use alloc::vec;
    use pretty_assertions::assert_eq;

    fn voice(delta: u32, channel: Channel, event: VoiceEvent) -> Ticked<TrackMessage> {
        Ticked::new(delta, ChannelVoiceMessage::new(channel, event).into())
    }

    fn on(delta: u32, channel: Channel, key: u8) -> Ticked<TrackMessage> {
        voice(
            delta,
            channel,
            VoiceEvent::NoteOn {
                key: DataByte::new(key).unwrap(),
                velocity: DataByte::new(80).unwrap(),
            },
        )
    }

    fn off(delta: u32, channel: Channel, key: u8) -> Ticked<TrackMessage> {
        voice(
            delta,
            channel,
            VoiceEvent::NoteOff {
                key: DataByte::new(key).unwrap(),
                velocity: DataByte::new(0).unwrap(),
            },
        )
    }

    fn program(channel: Channel, program: u8) -> Ticked<TrackMessage> {
        voice(
            0,
            channel,
            VoiceEvent::ProgramChange {
                program: DataByte::new(program).unwrap(),
            },
        )
    }

    fn end(delta: u32) -> Ticked<TrackMessage> {
        Ticked::new(delta, MetaMessage::EndOfTrack.into())
    }

    #[test]
    fn notes_pair_with_their_note_off() {
        let track = Track::new(vec![
            program(Channel::One, 40),
            on(0, Channel::One, 60),
            on(0, Channel::One, 64),
            off(96, Channel::One, 60),
            off(96, Channel::One, 64),
            end(96),
        ]);
        let violin = Some(Instrument::new(40).unwrap());
        assert_eq!(
            track.to_mevents(Resolution::DEFAULT),
            vec![
                MEvent::new(ZERO, 60, QN, 80, violin),
                MEvent::new(ZERO, 64, HN, 80, violin),
            ]
        );
    }

    #[test]
    fn a_repeated_note_on_ends_the_previous_note() {
        let track = Track::new(vec![on(0, Channel::One, 60), on(48, Channel::One, 60), end(48)]);
        let durations: Vec<_> = track
            .to_mevents(Resolution::DEFAULT)
            .iter()
            .map(|e| (e.onset, e.duration))
            .collect();
        assert_eq!(durations, vec![(ZERO, EN), (EN, EN)]);
    }

    #[test]
    fn unterminated_notes_run_to_the_end_of_the_track() {
        let track = Track::new(vec![on(0, Channel::One, 60), end(192)]);
        assert_eq!(track.to_mevents(Resolution::DEFAULT)[0].duration, HN);
        assert_eq!(track.len_ticks(), 192);
    }

    #[test]
    fn terminators_must_share_the_channel() {
        let track = Track::new(vec![
            on(0, Channel::One, 60),
            off(96, Channel::Two, 60),
            off(96, Channel::One, 60),
            end(0),
        ]);
        assert_eq!(track.to_mevents(Resolution::DEFAULT)[0].duration, HN);
        assert_eq!(track.channels(), vec![Channel::One, Channel::Two]);
    }

    #[test]
    fn percussion_channel_defaults_to_kit_zero() {
        let track = Track::new(vec![
            on(0, Channel::PERCUSSION, 36),
            off(96, Channel::PERCUSSION, 36),
            on(0, Channel::Three, 60),
            off(96, Channel::Three, 60),
            end(0),
        ]);
        let instruments: Vec<_> = track
            .to_mevents(Resolution::DEFAULT)
            .iter()
            .map(|e| e.instrument)
            .collect();
        assert_eq!(instruments, vec![Some(Instrument::DRUMS), None]);
    }

    #[test]
    fn resolution_scales_time() {
        let track = Track::new(vec![on(480, Channel::One, 60), off(240, Channel::One, 60), end(0)]);
        let res = Resolution::new(480).unwrap();
        let event = &track.to_mevents(res)[0];
        assert_eq!((event.onset, event.duration), (QN, EN));
    }

    #[test]
    fn meta_lookups() {
        let track = Track::new(vec![
            Ticked::new(0, MetaMessage::TrackName("Lead".into()).into()),
            Ticked::new(0, MetaMessage::Tempo(Tempo::from_bpm(100).unwrap()).into()),
            end(0),
        ]);
        assert_eq!(track.name(), Some("Lead"));
        assert_eq!(track.tempo().map(|t| t.bpm()), Some(100));
        assert_eq!(track.time_signature(), None);
        assert!(track.to_mevents(Resolution::DEFAULT).is_empty());
    }
}
