use core::slice;

use crate::message::{Ticked, TrackMessage};

/// An event at an absolute tick, counted from the start of its track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timed<'a> {
    /// Ticks since the start of the track
    pub tick: u64,
    /// The event
    pub message: &'a TrackMessage,
}

/// An iterator over a [`Track`](super::Track) that accumulates delta times.
/// Returned by [`Track::timed_events`](super::Track::timed_events).
#[derive(Debug, Clone)]
pub struct TimedEventIterator<'a> {
    tick: u64,
    events: slice::Iter<'a, Ticked<TrackMessage>>,
}

impl<'a> TimedEventIterator<'a> {
    pub(super) fn new(events: &'a [Ticked<TrackMessage>]) -> Self {
        Self {
            tick: 0,
            events: events.iter(),
        }
    }

    /// The absolute tick of the last event returned
    pub fn current_tick(&self) -> u64 {
        self.tick
    }
}

impl<'a> Iterator for TimedEventIterator<'a> {
    type Item = Timed<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let event = self.events.next()?;
        self.tick += u64::from(event.delta_ticks);
        Some(Timed {
            tick: self.tick,
            message: &event.event,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.events.size_hint()
    }
}

impl ExactSizeIterator for TimedEventIterator<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::*;
    use alloc::{vec, vec::Vec};

    fn note_on(delta: u32, key: u8) -> Ticked<TrackMessage> {
        Ticked::new(
            delta,
            ChannelVoiceMessage::new(
                Channel::One,
                VoiceEvent::NoteOn {
                    key: DataByte::new(key).unwrap(),
                    velocity: DataByte::new(100).unwrap(),
                },
            )
            .into(),
        )
    }

    #[test]
    fn empty_track_yields_nothing() {
        let mut iter = TimedEventIterator::new(&[]);
        assert_eq!(iter.next(), None);
        assert_eq!(iter.current_tick(), 0);
    }

    #[test]
    fn deltas_accumulate() {
        let events = vec![
            note_on(0, 60),
            note_on(480, 62),
            note_on(240, 64),
            Ticked::new(0, MetaMessage::EndOfTrack.into()),
        ];
        let ticks: Vec<u64> = TimedEventIterator::new(&events).map(|t| t.tick).collect();
        assert_eq!(ticks, vec![0, 480, 720, 720]);
    }
}
