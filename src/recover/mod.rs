#![doc = r#"
Inferring tree structure from a flat list of note events.

Recovery runs three left to right passes over a working list of
[`Chunk`]s, starting with one chunk per event:

1. **chords**: the first chunk gathers every other chunk with the same onset
   and duration,
2. **runs**: the first chunk gathers every chunk starting exactly where the
   run so far ends,
3. **sequences**: like runs, but a chunk starting after the end of the
   sequence so far is joined with a rest filling the gap. Chunks that overlap
   the sequence are left for a later one.

Each pass repeats until the working list is empty, and its output is the
next pass's input. The resulting sequences are wrapped in one `Par` group.

The decomposition is a heuristic. It is deterministic, but for overlapping
or syncopated input it is neither unique nor guaranteed to be the simplest
tree that sounds the same. Every recovered note keeps its absolute onset, so
the recovered tree always materializes to the input events.

```rust
# use musemidi::prelude::*;
let events = materialize(&Tree::seq([
    Tree::note(60, QN),
    Note::new(62, QN).with_onset(WN).into(),
]));

let tree = recover(&events).unwrap();
assert_eq!(
    tree,
    Tree::seq([
        Note::new(60, QN).with_onset(ZERO).into(),
        Tree::rest(DHN),
        Note::new(62, QN).with_onset(WN).into(),
    ])
);
```
"#]

mod chunk;
pub use chunk::*;

use alloc::{collections::VecDeque, vec::Vec};

use crate::{event::MEvent, tree::Tree};

/// Recover a tree from events sorted by onset. `None` when there are no events.
pub fn recover(events: &[MEvent]) -> Option<Tree> {
    if events.is_empty() {
        return None;
    }
    Some(chunk_events(events).to_tree())
}

/// Run the three passes and wrap the result in a `Par` group.
pub fn chunk_events(events: &[MEvent]) -> Chunk {
    let chunks = events.iter().cloned().map(Chunk::event).collect();
    let chords = chunk_by(chunks, extract_chord);
    let runs = chunk_by(chords, extract_run);
    let seqs = chunk_by(runs, extract_seq);
    #[cfg(feature = "tracing")]
    tracing::debug!(
        "Recovered {} events as {} parallel sequences",
        events.len(),
        seqs.len()
    );
    Chunk::par(seqs)
}

/// Repeatedly take the first chunk and let `extract` absorb what it can from the rest.
fn chunk_by<F>(chunks: Vec<Chunk>, mut extract: F) -> Vec<Chunk>
where
    F: FnMut(Chunk, &mut VecDeque<Chunk>) -> Chunk,
{
    let mut pool: VecDeque<Chunk> = chunks.into();
    let mut out = Vec::new();
    while let Some(first) = pool.pop_front() {
        out.push(extract(first, &mut pool));
    }
    out
}

/// Remove and return, in order, the chunks `pred` accepts.
fn take_where<P>(pool: &mut VecDeque<Chunk>, mut pred: P) -> Vec<Chunk>
where
    P: FnMut(&Chunk) -> bool,
{
    let mut taken = Vec::new();
    let mut kept = VecDeque::with_capacity(pool.len());
    for chunk in pool.drain(..) {
        if pred(&chunk) {
            taken.push(chunk);
        } else {
            kept.push_back(chunk);
        }
    }
    *pool = kept;
    taken
}

fn extract_chord(first: Chunk, pool: &mut VecDeque<Chunk>) -> Chunk {
    let (onset, duration) = (first.onset(), first.duration());
    let others = take_where(pool, |c| c.onset() == onset && c.duration() == duration);
    group(first, others, Chunk::chord)
}

fn extract_run(first: Chunk, pool: &mut VecDeque<Chunk>) -> Chunk {
    let mut end = first.end();
    let others = take_where(pool, |c| {
        let contiguous = c.onset() == end;
        if contiguous {
            end = c.end();
        }
        contiguous
    });
    group(first, others, Chunk::seq)
}

fn extract_seq(first: Chunk, pool: &mut VecDeque<Chunk>) -> Chunk {
    let mut end = first.end();
    let mut members = alloc::vec![first];
    let mut kept = VecDeque::with_capacity(pool.len());
    for chunk in pool.drain(..) {
        if chunk.onset() < end {
            kept.push_back(chunk);
            continue;
        }
        if chunk.onset() > end {
            members.push(Chunk::rest(end, chunk.onset() - end));
        }
        end = chunk.end();
        members.push(chunk);
    }
    *pool = kept;
    match members.len() {
        1 => members.remove(0),
        _ => Chunk::seq(members),
    }
}

fn group(first: Chunk, others: Vec<Chunk>, make: fn(Vec<Chunk>) -> Chunk) -> Chunk {
    if others.is_empty() {
        return first;
    }
    let mut members = Vec::with_capacity(others.len() + 1);
    members.push(first);
    members.extend(others);
    make(members)
}
