#![doc = r#"
Flattening trees into absolute time note events.

Every sounding [`Note`] becomes one [`MEvent`]. Rests and zero length notes
produce nothing. Each composite node sorts what its children produced by
onset, so the result of every function here is ordered by onset. Sorting is
stable: simultaneous events keep the order in which the tree lists them.

# Example
```rust
# use musemidi::prelude::*;
let tree = Tree::seq([
    Tree::note(60, QN),
    Tree::rest(QN),
    Tree::chord([Tree::note(64, HN), Tree::note(67, HN)]).unwrap(),
]);
let events = materialize(&tree);

assert_eq!(events.len(), 3);
assert_eq!(events[0].onset, ZERO);
assert_eq!(events[1].onset, HN);
assert_eq!(events[2].onset, HN);
```
"#]

use alloc::vec::Vec;

use crate::{
    time::{Time, ZERO},
    tree::{Instrument, Music, Note, Tree},
};

/// A note at an absolute time
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MEvent {
    /// When the note starts, in whole notes
    pub onset: Time,
    /// MIDI key number
    pub pitch: i32,
    /// How long the note sounds, in whole notes
    pub duration: Time,
    /// Note-on velocity
    pub volume: i32,
    /// The instrument of the enclosing part, if any
    pub instrument: Option<Instrument>,
}

impl MEvent {
    /// Create an event
    pub fn new(
        onset: Time,
        pitch: i32,
        duration: Time,
        volume: i32,
        instrument: Option<Instrument>,
    ) -> Self {
        Self {
            onset,
            pitch,
            duration,
            volume,
            instrument,
        }
    }

    /// `onset + duration`
    pub fn end(&self) -> Time {
        self.onset + self.duration
    }

    /// The note this event was made from, placed at its onset.
    pub fn to_note(&self) -> Note {
        Note::new(self.pitch, self.duration)
            .with_onset(self.onset)
            .with_volume(self.volume)
    }
}

/// Flatten a tree starting at time zero with no instrument.
pub fn materialize(tree: &Tree) -> Vec<MEvent> {
    materialize_at(tree, ZERO, None)
}

/// Flatten a tree from `start`, with `instrument` active until a [`Part`](crate::tree::Part)
/// replaces it.
pub fn materialize_at(tree: &Tree, start: Time, instrument: Option<Instrument>) -> Vec<MEvent> {
    let mut events = Vec::new();
    materialize_into(tree, start, instrument, &mut events);
    events
}

fn materialize_into(
    tree: &Tree,
    start: Time,
    instrument: Option<Instrument>,
    out: &mut Vec<MEvent>,
) {
    let from = out.len();
    match tree {
        Tree::Note(note) => {
            if note.is_sounding() {
                out.push(MEvent::new(
                    note.onset.unwrap_or(start),
                    note.pitch,
                    note.duration,
                    note.volume,
                    instrument,
                ));
            }
            return;
        }
        Tree::Rest(_) => return,
        Tree::Seq(trees) => {
            let mut current = start;
            for tree in trees {
                materialize_into(tree, current, instrument, out);
                current += tree.duration();
            }
        }
        Tree::Par(trees) => {
            for tree in trees {
                materialize_into(tree, start, instrument, out);
            }
        }
        Tree::Chord(chord) => {
            for tree in chord.members() {
                materialize_into(tree, start, instrument, out);
            }
        }
        Tree::Part(part) => materialize_into(&part.tree, start, part.instrument, out),
    }
    out[from..].sort_by_key(|e| e.onset);
}

/// Flatten every top-level tree from time zero into one sorted list.
pub fn materialize_music(music: &Music) -> Vec<MEvent> {
    let mut events = Vec::new();
    for tree in &music.trees {
        materialize_into(tree, ZERO, None, &mut events);
    }
    events.sort_by_key(|e| e.onset);
    events
}

/// One sorted list per top-level tree, in order. Trees without sounding
/// notes give empty lists.
pub fn materialize_by_part(music: &Music) -> Vec<Vec<MEvent>> {
    music.trees.iter().map(materialize).collect()
}

/// Group events by instrument, in the order each instrument first appears.
/// Events keep their relative order inside a group.
pub fn split_by_instrument(events: &[MEvent]) -> Vec<(Option<Instrument>, Vec<MEvent>)> {
    let mut groups: Vec<(Option<Instrument>, Vec<MEvent>)> = Vec::new();
    for event in events {
        match groups.iter_mut().find(|(i, _)| *i == event.instrument) {
            Some((_, group)) => group.push(event.clone()),
            None => groups.push((event.instrument, alloc::vec![event.clone()])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::*;
    use alloc::vec;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_note() {
        let events = materialize(&Tree::note(60, QN));
        assert_eq!(events, vec![MEvent::new(ZERO, 60, QN, 100, None)]);
    }

    #[test]
    fn rests_and_silent_notes_produce_nothing() {
        let tree = Tree::seq([Tree::rest(HN), Tree::note(60, ZERO), Tree::note(62, -QN)]);
        assert!(materialize(&tree).is_empty());
    }

    #[test]
    fn seq_advances_and_par_does_not() {
        let tree = Tree::seq([
            Tree::par([Tree::note(48, HN), Tree::note(55, QN)]),
            Tree::note(60, QN),
        ]);
        let onsets: Vec<_> = materialize(&tree).iter().map(|e| (e.pitch, e.onset)).collect();
        assert_eq!(onsets, vec![(48, ZERO), (55, ZERO), (60, HN)]);
    }

    #[test]
    fn explicit_onsets_are_sorted_into_place() {
        let tree = Tree::seq([
            Note::new(60, QN).with_onset(WN).into(),
            Tree::note(62, QN),
        ]);
        let pitches: Vec<_> = materialize(&tree).iter().map(|e| e.pitch).collect();
        assert_eq!(pitches, vec![62, 60]);
    }

    #[test]
    fn parts_set_the_instrument() {
        let violin = Instrument::new(40).unwrap();
        let music = Music::new([
            Tree::part(Tree::note(76, HN), Some(violin)),
            Tree::part(Tree::note(36, QN), Some(Instrument::DRUMS)),
            Tree::note(60, EN),
        ]);
        let events = materialize_music(&music);
        let instruments: Vec<_> = events.iter().map(|e| (e.pitch, e.instrument)).collect();
        assert_eq!(
            instruments,
            vec![
                (76, Some(violin)),
                (36, Some(Instrument::DRUMS)),
                (60, None)
            ]
        );
    }

    #[test]
    fn nested_part_overrides_outer() {
        let piano = Instrument::new(0).unwrap();
        let tree = Tree::part(
            Tree::seq([Tree::note(60, QN), Tree::part(Tree::note(62, QN), None)]),
            Some(piano),
        );
        let instruments: Vec<_> = materialize(&tree).iter().map(|e| e.instrument).collect();
        assert_eq!(instruments, vec![Some(piano), None]);
    }

    #[test]
    fn by_part_keeps_empty_lists() {
        let music = Music::new([Tree::note(60, QN), Tree::rest(QN)]);
        let parts = materialize_by_part(&music);
        assert_eq!(parts.len(), 2);
        assert!(parts[1].is_empty());
    }

    #[test]
    fn split_keeps_first_seen_order() {
        let piano = Some(Instrument::new(0).unwrap());
        let events = vec![
            MEvent::new(ZERO, 60, QN, 100, piano),
            MEvent::new(ZERO, 36, QN, 100, Some(Instrument::DRUMS)),
            MEvent::new(QN, 62, QN, 100, piano),
        ];
        let groups = split_by_instrument(&events);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, piano);
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].1[0].pitch, 36);
    }
}
