//! The scramble synthesis phase.
//!
//! A random walk is a sequence of `(top, bottom, slice)` move groups. The
//! layer moves are chosen so that both layers share an alignment before every
//! slice, which keeps the puzzle cube shaped, and so that the walk alternates
//! between misaligning the top and the bottom layer often enough to mix the
//! state.

use crate::puzzle::{LAYER_SLOTS, Move};
use itertools::Itertools;
use log::trace;

pub const MIN_WALK_GROUPS: usize = 3;
pub const MAX_WALK_GROUPS: usize = 7;

// Twelfths for each kind of layer move. "Var" moves change the layer's
// alignment, "reverse var" moves undo a previous change, and "fixed" moves
// keep it.
const TOP_VAR: [u8; 4] = [1, 4, 7, 10];
const TOP_REVERSE_VAR: [u8; 4] = [11, 8, 5, 2];
const TOP_FIXED: [u8; 3] = [12, 3, 9];
const BOTTOM_VAR: [u8; 3] = [11, 8, 2];
const BOTTOM_REVERSE_VAR: [u8; 3] = [1, 4, 10];
const BOTTOM_FIXED: [u8; 3] = [12, 3, 9];

/// Whether each layer can be sliced without moving it off its current
/// alignment. Corresponds to the `(top_edge_first, bottom_edge_first)` flags
/// of [`crate::coord::SquareCoord`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Aligned,
    TopMisaligned,
    BottomMisaligned,
    DoubleMisaligned,
}

impl Alignment {
    #[must_use]
    pub fn from_posture(top_edge_first: bool, bottom_edge_first: bool) -> Self {
        match (top_edge_first, bottom_edge_first) {
            (false, true) => Alignment::Aligned,
            (true, true) => Alignment::TopMisaligned,
            (false, false) => Alignment::BottomMisaligned,
            (true, false) => Alignment::DoubleMisaligned,
        }
    }
}

/// The alignments a walk step can move to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Misalignment {
    Top,
    Bottom,
}

impl Misalignment {
    fn other(self) -> Self {
        match self {
            Misalignment::Top => Misalignment::Bottom,
            Misalignment::Bottom => Misalignment::Top,
        }
    }
}

impl From<Misalignment> for Alignment {
    fn from(misalignment: Misalignment) -> Self {
        match misalignment {
            Misalignment::Top => Alignment::TopMisaligned,
            Misalignment::Bottom => Alignment::BottomMisaligned,
        }
    }
}

/// The top and bottom candidate twelfths for a step from `from` to `to`.
fn candidates(from: Alignment, to: Misalignment) -> (&'static [u8], &'static [u8]) {
    match (from, to) {
        (Alignment::Aligned, Misalignment::Top) => (&TOP_VAR, &BOTTOM_FIXED),
        (Alignment::Aligned, Misalignment::Bottom) => (&TOP_FIXED, &BOTTOM_VAR),
        (Alignment::TopMisaligned, Misalignment::Top) => (&TOP_FIXED, &BOTTOM_FIXED),
        (Alignment::TopMisaligned, Misalignment::Bottom) => (&TOP_REVERSE_VAR, &BOTTOM_VAR),
        (Alignment::BottomMisaligned, Misalignment::Bottom) => (&TOP_FIXED, &BOTTOM_FIXED),
        (Alignment::BottomMisaligned, Misalignment::Top) => (&TOP_VAR, &BOTTOM_REVERSE_VAR),
        (Alignment::DoubleMisaligned, Misalignment::Bottom) => (&TOP_REVERSE_VAR, &BOTTOM_FIXED),
        (Alignment::DoubleMisaligned, Misalignment::Top) => (&TOP_FIXED, &BOTTOM_REVERSE_VAR),
    }
}

fn pick(rng: &mut fastrand::Rng, set: &[u8]) -> u8 {
    set[rng.usize(..set.len())]
}

#[derive(Clone, Debug)]
pub struct RandomWalk {
    /// The alignment before the walk followed by the alignment after every
    /// group.
    pub path: Vec<Alignment>,
    pub moves: Vec<Move>,
}

impl RandomWalk {
    /// Draw a group count in `MIN_WALK_GROUPS..=MAX_WALK_GROUPS`.
    #[must_use]
    pub fn random_group_count(rng: &mut fastrand::Rng) -> usize {
        rng.usize(MIN_WALK_GROUPS..=MAX_WALK_GROUPS)
    }

    /// Generate a walk of `group_count` groups starting from the canonical
    /// solved posture.
    #[must_use]
    pub fn generate(rng: &mut fastrand::Rng, group_count: usize) -> Self {
        let mut steps: Vec<Misalignment> = Vec::with_capacity(group_count);
        for i in 0..group_count {
            // Never misalign the same layer three times in a row
            let next = if i >= 2 && steps[i - 1] == steps[i - 2] {
                steps[i - 1].other()
            } else if rng.bool() {
                Misalignment::Top
            } else {
                Misalignment::Bottom
            };
            steps.push(next);
        }

        let mut from = Alignment::Aligned;
        let mut path = Vec::with_capacity(group_count + 1);
        path.push(from);
        let mut moves = Vec::with_capacity(group_count * 3);
        for to in steps {
            let (top_set, bottom_set) = candidates(from, to);
            let (top, bottom) = loop {
                let top = pick(rng, top_set);
                let bottom = pick(rng, bottom_set);
                // Two full turns would make the group a bare slice
                if top != LAYER_SLOTS || bottom != LAYER_SLOTS {
                    break (top, bottom);
                }
            };
            moves.extend([Move::Top(top), Move::Bottom(bottom), Move::Slice]);
            from = to.into();
            path.push(from);
        }
        trace!("Random walk path: {:?}", path.iter().format(" -> "));

        RandomWalk { path, moves }
    }
}
