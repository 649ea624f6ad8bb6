#![doc = r#"
The symbolic music tree.

# Overview

A [`Tree`] is one of a closed set of node kinds:

- [`Note`] and [`Rest`] are the leaves. Both have a duration and an optional
  absolute onset.
- [`Tree::Seq`] plays its children back to back. Its duration is the sum of
  its children's durations.
- [`Tree::Par`] starts every child at the same time. Its duration is the
  longest child's.
- [`Chord`] is a `Par` whose members are checked to share onset and duration.
- [`Part`] wraps a single child and assigns it an [`Instrument`]. It does not
  affect timing.

A [`Music`] value is the root: an ordered list of trees, usually one per
`Part`, plus the global tempo.

Trees own their children outright. Every operation comes in an in-place
form taking `&mut self` and, where a copy is useful, a `with_`/`to_` form that
clones first and leaves the original untouched.
"#]

mod chord;
pub use chord::*;

mod error;
pub use error::*;

mod instrument;
pub use instrument::*;

mod music;
pub use music::*;

mod note;
pub use note::*;

use alloc::{boxed::Box, vec::Vec};

use crate::time::{Time, ZERO};

/// A node of the music tree. See the [module docs](self) for the timing rules.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Tree {
    /// A sounding note
    Note(Note),
    /// A silent placeholder
    Rest(Rest),
    /// Children played one after another
    Seq(Vec<Tree>),
    /// Children started together
    Par(Vec<Tree>),
    /// Children started together with identical onsets and durations
    Chord(Chord),
    /// A child assigned to an instrument
    Part(Part),
}

/// A sub-tree played by a single instrument.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Part {
    /// The music played by this part
    pub tree: Box<Tree>,
    /// The instrument, or `None` to leave the channel's program untouched
    pub instrument: Option<Instrument>,
}

impl Part {
    /// Assign an instrument to a tree
    pub fn new(tree: Tree, instrument: Option<Instrument>) -> Self {
        Self {
            tree: Box::new(tree),
            instrument,
        }
    }
}

impl Tree {
    /// Shorthand for a [`Note`] leaf at the default volume
    pub fn note(pitch: i32, duration: Time) -> Self {
        Self::Note(Note::new(pitch, duration))
    }

    /// Shorthand for a [`Rest`] leaf
    pub fn rest(duration: Time) -> Self {
        Self::Rest(Rest::new(duration))
    }

    /// Compose trees back to back
    pub fn seq<I: IntoIterator<Item = Tree>>(trees: I) -> Self {
        Self::Seq(trees.into_iter().collect())
    }

    /// Compose trees in parallel
    pub fn par<I: IntoIterator<Item = Tree>>(trees: I) -> Self {
        Self::Par(trees.into_iter().collect())
    }

    /// Build a checked [`Chord`]
    pub fn chord<I: IntoIterator<Item = Tree>>(trees: I) -> Result<Self, TreeError> {
        Chord::new(trees).map(Self::Chord)
    }

    /// Wrap a tree in a [`Part`]
    pub fn part(tree: Tree, instrument: Option<Instrument>) -> Self {
        Self::Part(Part::new(tree, instrument))
    }

    /// Structural duration: the sum over `Seq` children, the maximum over
    /// `Par` children. Onsets are not consulted; see [`Tree::span`].
    pub fn duration(&self) -> Time {
        match self {
            Tree::Note(n) => n.duration,
            Tree::Rest(r) => r.duration,
            Tree::Seq(trees) => trees.iter().map(Tree::duration).fold(ZERO, |a, b| a + b),
            Tree::Par(trees) => trees.iter().map(Tree::duration).max().unwrap_or(ZERO),
            Tree::Chord(chord) => chord.duration(),
            Tree::Part(part) => part.tree.duration(),
        }
    }

    /// The earliest onset set anywhere in the tree.
    pub fn onset(&self) -> Option<Time> {
        match self {
            Tree::Note(n) => n.onset,
            Tree::Rest(r) => r.onset,
            Tree::Seq(trees) | Tree::Par(trees) => trees.iter().filter_map(Tree::onset).min(),
            Tree::Chord(chord) => chord.onset(),
            Tree::Part(part) => part.tree.onset(),
        }
    }

    /// Onset-aware length: latest end minus earliest onset over every leaf,
    /// once onsets have been derived from time zero. Unlike
    /// [`Tree::duration`], notes placed with explicit onsets count where they
    /// actually sound.
    pub fn span(&self) -> Time {
        let derived = self.with_derived_onsets(ZERO);
        let mut bounds: Option<(Time, Time)> = None;
        derived.for_each_leaf(&mut |onset, duration| {
            let end = onset + duration;
            bounds = Some(match bounds {
                Some((lo, hi)) => (lo.min(onset), hi.max(end)),
                None => (onset, end),
            });
        });
        bounds.map(|(lo, hi)| hi - lo).unwrap_or(ZERO)
    }

    /// Fill in missing onsets, in place.
    ///
    /// `Seq` children start where the previous child's duration ends, every
    /// other node passes `start` through unchanged. Onsets that are already
    /// set are never overwritten.
    pub fn derive_onsets(&mut self, start: Time) {
        match self {
            Tree::Note(n) => {
                n.onset.get_or_insert(start);
            }
            Tree::Rest(r) => {
                r.onset.get_or_insert(start);
            }
            Tree::Seq(trees) => {
                let mut current = start;
                for tree in trees {
                    tree.derive_onsets(current);
                    current += tree.duration();
                }
            }
            Tree::Par(trees) => trees.iter_mut().for_each(|t| t.derive_onsets(start)),
            Tree::Chord(chord) => chord
                .members_mut()
                .iter_mut()
                .for_each(|t| t.derive_onsets(start)),
            Tree::Part(part) => part.tree.derive_onsets(start),
        }
    }

    /// A copy of this tree with missing onsets filled in from `start`.
    pub fn with_derived_onsets(&self, start: Time) -> Self {
        let mut tree = self.clone();
        tree.derive_onsets(start);
        tree
    }

    /// Move every onset that is set by `amount`, in place.
    pub fn shift_onsets(&mut self, amount: Time) {
        self.for_each_onset_mut(&mut |onset| *onset += amount);
    }

    /// Check, or clamp, every pitch and volume to the MIDI range, in place.
    ///
    /// With [`RangePolicy::Strict`] the first offending note is reported and the
    /// notes before it are left as they were.
    pub fn force_midi_compatible(&mut self, policy: RangePolicy) -> Result<(), TreeError> {
        self.try_for_each_note_mut(&mut |note| note.fit_midi_range(policy))
    }

    /// A MIDI compatible copy of this tree. See [`Tree::force_midi_compatible`].
    pub fn to_midi_compatible(&self, policy: RangePolicy) -> Result<Self, TreeError> {
        let mut tree = self.clone();
        tree.force_midi_compatible(policy)?;
        Ok(tree)
    }

    /// Drop `Seq` and `Par` children whose duration is zero, in place.
    pub fn remove_zeros(&mut self) {
        match self {
            Tree::Note(_) | Tree::Rest(_) | Tree::Chord(_) => {}
            Tree::Seq(trees) | Tree::Par(trees) => {
                trees.iter_mut().for_each(Tree::remove_zeros);
                trees.retain(|t| t.duration() > ZERO);
            }
            Tree::Part(part) => part.tree.remove_zeros(),
        }
    }

    /// Visit every note in order.
    pub fn for_each_note<F: FnMut(&Note)>(&self, f: &mut F) {
        match self {
            Tree::Note(n) => f(n),
            Tree::Rest(_) => {}
            Tree::Seq(trees) | Tree::Par(trees) => trees.iter().for_each(|t| t.for_each_note(f)),
            Tree::Chord(chord) => chord.members().iter().for_each(|t| t.for_each_note(f)),
            Tree::Part(part) => part.tree.for_each_note(f),
        }
    }

    /// Visit every note in order, allowing edits. Durations must be left alone
    /// inside chords.
    pub fn for_each_note_mut<F: FnMut(&mut Note)>(&mut self, f: &mut F) {
        let _ = self.try_for_each_note_mut(&mut |note| {
            f(note);
            Ok::<(), core::convert::Infallible>(())
        });
    }

    pub(crate) fn try_for_each_note_mut<E, F>(&mut self, f: &mut F) -> Result<(), E>
    where
        F: FnMut(&mut Note) -> Result<(), E>,
    {
        match self {
            Tree::Note(n) => f(n),
            Tree::Rest(_) => Ok(()),
            Tree::Seq(trees) | Tree::Par(trees) => {
                trees.iter_mut().try_for_each(|t| t.try_for_each_note_mut(f))
            }
            Tree::Chord(chord) => chord
                .members_mut()
                .iter_mut()
                .try_for_each(|t| t.try_for_each_note_mut(f)),
            Tree::Part(part) => part.tree.try_for_each_note_mut(f),
        }
    }

    fn for_each_onset_mut<F: FnMut(&mut Time)>(&mut self, f: &mut F) {
        match self {
            Tree::Note(n) => n.onset.iter_mut().for_each(f),
            Tree::Rest(r) => r.onset.iter_mut().for_each(f),
            Tree::Seq(trees) | Tree::Par(trees) => {
                trees.iter_mut().for_each(|t| t.for_each_onset_mut(f))
            }
            Tree::Chord(chord) => chord
                .members_mut()
                .iter_mut()
                .for_each(|t| t.for_each_onset_mut(f)),
            Tree::Part(part) => part.tree.for_each_onset_mut(f),
        }
    }

    /// Leaves with an onset, reported as `(onset, duration)`.
    fn for_each_leaf<F: FnMut(Time, Time)>(&self, f: &mut F) {
        match self {
            Tree::Note(n) => n.onset.into_iter().for_each(|o| f(o, n.duration)),
            Tree::Rest(r) => r.onset.into_iter().for_each(|o| f(o, r.duration)),
            Tree::Seq(trees) | Tree::Par(trees) => trees.iter().for_each(|t| t.for_each_leaf(f)),
            Tree::Chord(chord) => chord.members().iter().for_each(|t| t.for_each_leaf(f)),
            Tree::Part(part) => part.tree.for_each_leaf(f),
        }
    }
}

impl From<Note> for Tree {
    fn from(value: Note) -> Self {
        Self::Note(value)
    }
}

impl From<Rest> for Tree {
    fn from(value: Rest) -> Self {
        Self::Rest(value)
    }
}

impl From<Chord> for Tree {
    fn from(value: Chord) -> Self {
        Self::Chord(value)
    }
}

impl From<Part> for Tree {
    fn from(value: Part) -> Self {
        Self::Part(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::*;
    use pretty_assertions::assert_eq;

    fn onsets(tree: &Tree) -> Vec<Option<Time>> {
        let mut out = Vec::new();
        tree.for_each_note(&mut |n| out.push(n.onset));
        out
    }

    #[test]
    fn seq_and_par_durations() {
        let tree = Tree::seq([
            Tree::note(60, QN),
            Tree::par([Tree::note(62, HN), Tree::note(64, QN)]),
            Tree::rest(EN),
        ]);
        assert_eq!(tree.duration(), QN + HN + EN);
        assert_eq!(Tree::par(Vec::new()).duration(), ZERO);
    }

    #[test]
    fn derive_onsets_advances_through_seq_only() {
        let mut tree = Tree::seq([
            Tree::note(60, QN),
            Tree::par([Tree::note(62, HN), Tree::note(64, QN)]),
            Tree::note(65, QN),
        ]);
        tree.derive_onsets(ZERO);
        assert_eq!(
            onsets(&tree),
            [Some(ZERO), Some(QN), Some(QN), Some(QN + HN)]
        );
    }

    #[test]
    fn derive_onsets_keeps_existing_values() {
        let mut tree = Tree::seq([
            Tree::note(60, QN),
            Tree::Note(Note::new(62, QN).with_onset(WN)),
            Tree::note(64, QN),
        ]);
        tree.derive_onsets(HN);
        assert_eq!(onsets(&tree), [Some(HN), Some(WN), Some(WN)]);
    }

    #[test]
    fn copy_variant_leaves_original_untouched() {
        let tree = Tree::seq([Tree::note(60, QN), Tree::note(62, QN)]);
        let derived = tree.with_derived_onsets(ZERO);
        assert_eq!(onsets(&tree), [None, None]);
        assert_eq!(onsets(&derived), [Some(ZERO), Some(QN)]);
    }

    #[test]
    fn span_follows_explicit_onsets() {
        let tree = Tree::seq([
            Tree::note(60, QN),
            Tree::Note(Note::new(62, QN).with_onset(WN)),
        ]);
        assert_eq!(tree.duration(), HN);
        assert_eq!(tree.span(), WN + QN);
    }

    #[test]
    fn shift_moves_only_set_onsets() {
        let mut tree = Tree::par([
            Tree::Note(Note::new(60, QN).with_onset(QN)),
            Tree::note(62, QN),
        ]);
        tree.shift_onsets(HN);
        assert_eq!(onsets(&tree), [Some(DHN), None]);
    }

    #[test]
    fn remove_zeros_prunes_empty_children() {
        let mut tree = Tree::seq([
            Tree::rest(ZERO),
            Tree::note(60, QN),
            Tree::par([Tree::rest(ZERO)]),
        ]);
        tree.remove_zeros();
        assert_eq!(tree, Tree::seq([Tree::note(60, QN)]));
    }

    #[test]
    fn midi_compatibility_in_place_and_copy() {
        let tree = Tree::part(
            Tree::chord([Tree::note(130, QN), Tree::note(60, QN)]).unwrap(),
            None,
        );
        assert_eq!(
            tree.to_midi_compatible(RangePolicy::Strict),
            Err(TreeError::PitchOutOfRange(130))
        );

        let clamped = tree.to_midi_compatible(RangePolicy::Clamp).unwrap();
        let mut pitches = Vec::new();
        clamped.for_each_note(&mut |n| pitches.push(n.pitch));
        assert_eq!(pitches, [127, 60]);

        let mut original = Vec::new();
        tree.for_each_note(&mut |n| original.push(n.pitch));
        assert_eq!(original, [130, 60]);
    }

    #[test]
    fn chord_requires_matching_members() {
        assert_eq!(Chord::new(Vec::new()), Err(TreeError::EmptyChord));
        assert_eq!(
            Chord::new([
                Tree::Note(Note::new(60, QN).with_onset(ZERO)),
                Tree::Note(Note::new(64, QN).with_onset(QN)),
            ]),
            Err(TreeError::ChordMismatch { index: 1 })
        );
    }
}
