use alloc::vec::Vec;

use super::{Tree, TreeError};
use crate::time::{Time, ZERO};

#[doc = r#"
A closed group of trees that start together and last equally long.

Unlike [`Tree::Par`], a chord checks on construction that every member
shares the onset and duration of the first one. Members can be read, and
notes inside them may be edited through the tree traversals, but members
cannot be added or removed once built.

# Example
```rust
# use musemidi::prelude::*;
let triad = Chord::new([
    Tree::note(60, HN),
    Tree::note(64, HN),
    Tree::note(67, HN),
]).unwrap();
assert_eq!(triad.duration(), HN);

let lopsided = Chord::new([Tree::note(60, HN), Tree::note(64, QN)]);
assert!(lopsided.is_err());
```
"#]
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chord {
    members: Vec<Tree>,
}

impl Chord {
    /// Build a chord, checking that every member matches the first.
    pub fn new<I>(members: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = Tree>,
    {
        let members: Vec<Tree> = members.into_iter().collect();
        let Some(first) = members.first() else {
            return Err(TreeError::EmptyChord);
        };
        let (onset, duration) = (first.onset(), first.duration());

        if let Some(index) = members
            .iter()
            .position(|m| m.onset() != onset || m.duration() != duration)
        {
            return Err(TreeError::ChordMismatch { index });
        }
        Ok(Self { members })
    }

    /// The chord's members
    pub fn members(&self) -> &[Tree] {
        &self.members
    }

    /// Shared duration of the members
    pub fn duration(&self) -> Time {
        self.members.first().map(Tree::duration).unwrap_or(ZERO)
    }

    /// Shared onset of the members
    pub fn onset(&self) -> Option<Time> {
        self.members.first().and_then(Tree::onset)
    }

    /// Consume the chord, returning its members
    pub fn into_members(self) -> Vec<Tree> {
        self.members
    }

    /// Callers must not change member durations.
    pub(super) fn members_mut(&mut self) -> &mut [Tree] {
        &mut self.members
    }
}
