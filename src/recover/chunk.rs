use alloc::vec::Vec;

use crate::{
    event::MEvent,
    time::{Time, ZERO},
    tree::{Chord, Rest, Tree},
};

/// What a [`Chunk`] holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkKind {
    /// Silence between two chunks of a sequence
    Rest,
    /// A single note
    Event(MEvent),
    /// Chunks played back to back
    Seq(Vec<Chunk>),
    /// Chunks sharing onset and duration
    Chord(Vec<Chunk>),
    /// Chunks that may overlap
    Par(Vec<Chunk>),
}

#[doc = r#"
A node of the structure being recovered, with its time span cached.

| kind    | onset            | end                          |
|---------|------------------|------------------------------|
| `Seq`   | first member's   | last member's onset + duration |
| `Chord` | first member's   | first member's               |
| `Par`   | earliest member's | latest member's             |

A `Seq`'s duration is the sum of its members' durations. Groups without
members span nothing at time zero.
"#]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    kind: ChunkKind,
    onset: Time,
    duration: Time,
    end: Time,
}

impl Chunk {
    /// Silence from `onset` lasting `duration`
    pub fn rest(onset: Time, duration: Time) -> Self {
        Self {
            kind: ChunkKind::Rest,
            onset,
            duration,
            end: onset + duration,
        }
    }

    /// A single event
    pub fn event(event: MEvent) -> Self {
        Self {
            onset: event.onset,
            duration: event.duration,
            end: event.end(),
            kind: ChunkKind::Event(event),
        }
    }

    /// A back to back sequence
    pub fn seq(members: Vec<Chunk>) -> Self {
        let (onset, duration, end) = match (members.first(), members.last()) {
            (Some(first), Some(last)) => (
                first.onset,
                members.iter().map(|c| c.duration).fold(ZERO, |a, b| a + b),
                last.onset + last.duration,
            ),
            _ => (ZERO, ZERO, ZERO),
        };
        Self {
            kind: ChunkKind::Seq(members),
            onset,
            duration,
            end,
        }
    }

    /// A group of members with equal onsets and durations
    pub fn chord(members: Vec<Chunk>) -> Self {
        let (onset, duration, end) = members
            .first()
            .map(|c| (c.onset, c.duration, c.end))
            .unwrap_or((ZERO, ZERO, ZERO));
        Self {
            kind: ChunkKind::Chord(members),
            onset,
            duration,
            end,
        }
    }

    /// A group of possibly overlapping members
    pub fn par(members: Vec<Chunk>) -> Self {
        let onset = members.iter().map(|c| c.onset).min().unwrap_or(ZERO);
        let end = members.iter().map(|c| c.end).max().unwrap_or(ZERO);
        Self {
            kind: ChunkKind::Par(members),
            onset,
            duration: end - onset,
            end,
        }
    }

    /// The contents
    pub fn kind(&self) -> &ChunkKind {
        &self.kind
    }

    /// Where the chunk starts
    pub fn onset(&self) -> Time {
        self.onset
    }

    /// How long the chunk lasts
    pub fn duration(&self) -> Time {
        self.duration
    }

    /// Where the chunk ends
    pub fn end(&self) -> Time {
        self.end
    }

    #[doc = r#"
Convert the chunk into a tree.

Groups with a single member are replaced by that member, and sequences nested
directly in a sequence are spliced into it. Notes keep their
onsets. Each member of a `Par` group that does not start at zero is preceded
by a rest as long as its onset.
"#]
    pub fn to_tree(&self) -> Tree {
        match &self.kind {
            ChunkKind::Rest => Tree::Rest(Rest::new(self.duration)),
            ChunkKind::Event(event) => Tree::Note(event.to_note()),
            ChunkKind::Seq(members) => match members.as_slice() {
                [only] => only.to_tree(),
                _ => {
                    let mut trees = Vec::with_capacity(members.len());
                    for member in members {
                        match member.to_tree() {
                            Tree::Seq(inner) => trees.extend(inner),
                            tree => trees.push(tree),
                        }
                    }
                    Tree::Seq(trees)
                }
            },
            ChunkKind::Chord(members) => {
                let trees: Vec<Tree> = members.iter().map(Chunk::to_tree).collect();
                match Chord::new(trees.clone()) {
                    Ok(chord) => Tree::Chord(chord),
                    Err(_) => Tree::Par(trees),
                }
            }
            ChunkKind::Par(members) => match members.as_slice() {
                [only] => only.to_tree(),
                _ => Tree::Par(members.iter().map(Chunk::to_delayed_tree).collect()),
            },
        }
    }

    fn to_delayed_tree(&self) -> Tree {
        if self.onset <= ZERO {
            return self.to_tree();
        }
        let rest = Tree::rest(self.onset);
        match self.to_tree() {
            Tree::Seq(mut trees) => {
                trees.insert(0, rest);
                Tree::Seq(trees)
            }
            tree => Tree::Seq(alloc::vec![rest, tree]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{time::*, tree::Note};
    use alloc::vec;
    use pretty_assertions::assert_eq;

    fn event(onset: Time, pitch: i32, duration: Time) -> Chunk {
        Chunk::event(MEvent::new(onset, pitch, duration, 100, None))
    }

    #[test]
    fn spans() {
        let seq = Chunk::seq(vec![event(ZERO, 60, QN), Chunk::rest(QN, HN), event(DHN, 62, QN)]);
        assert_eq!((seq.onset(), seq.duration(), seq.end()), (ZERO, WN, WN));

        let chord = Chunk::chord(vec![event(QN, 60, HN), event(QN, 64, HN)]);
        assert_eq!((chord.onset(), chord.duration(), chord.end()), (QN, HN, DHN));

        let par = Chunk::par(vec![event(QN, 60, QN), event(ZERO, 64, QN)]);
        assert_eq!((par.onset(), par.duration(), par.end()), (ZERO, HN, HN));

        let empty = Chunk::par(vec![]);
        assert_eq!((empty.onset(), empty.end()), (ZERO, ZERO));
    }

    #[test]
    fn singletons_collapse() {
        let nested = Chunk::par(vec![Chunk::seq(vec![event(ZERO, 60, QN)])]);
        assert_eq!(nested.to_tree(), Note::new(60, QN).with_onset(ZERO).into());
    }

    #[test]
    fn par_members_are_delayed_by_their_onset() {
        let par = Chunk::par(vec![event(ZERO, 60, HN), event(QN, 64, QN)]);
        assert_eq!(
            par.to_tree(),
            Tree::par([
                Note::new(60, HN).with_onset(ZERO).into(),
                Tree::seq([Tree::rest(QN), Note::new(64, QN).with_onset(QN).into()]),
            ])
        );
    }

    #[test]
    fn delayed_sequences_start_with_their_rest() {
        let late = Chunk::seq(vec![event(QN, 64, QN), event(HN, 65, QN)]);
        let par = Chunk::par(vec![event(ZERO, 60, WN), late]);
        assert_eq!(
            par.to_tree(),
            Tree::par([
                Note::new(60, WN).with_onset(ZERO).into(),
                Tree::seq([
                    Tree::rest(QN),
                    Note::new(64, QN).with_onset(QN).into(),
                    Note::new(65, QN).with_onset(HN).into(),
                ]),
            ])
        );
    }

    #[test]
    fn nested_sequences_are_spliced() {
        let inner = Chunk::seq(vec![event(ZERO, 60, QN), event(QN, 62, QN)]);
        let outer = Chunk::seq(vec![inner, Chunk::rest(HN, QN), event(DHN, 64, QN)]);
        let Tree::Seq(trees) = outer.to_tree() else {
            panic!("expected a sequence");
        };
        assert_eq!(trees.len(), 4);
        assert_eq!(trees[2], Tree::rest(QN));
    }

    #[test]
    fn chords_become_checked_chords() {
        let chord = Chunk::chord(vec![event(ZERO, 60, HN), event(ZERO, 64, HN)]);
        assert!(matches!(chord.to_tree(), Tree::Chord(_)));
    }
}
