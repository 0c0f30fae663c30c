use crate::{permutation::rank, puzzle::PuzzleState};

/// The projection of a cube shaped [`PuzzleState`] that the solver searches
/// over.
///
/// `top_edge_first` is set when the top ring starts with a whole corner, in
/// which case its edges sit in slots 2, 5, 8 and 11 instead of 0, 3, 6 and 9.
/// `bottom_edge_first` is the same for the bottom ring. The canonical solved
/// posture has `top_edge_first == false` and `bottom_edge_first == true`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SquareCoord {
    pub edge_perm: u16,
    pub corner_perm: u16,
    pub top_edge_first: bool,
    pub bottom_edge_first: bool,
    pub middle_swapped: bool,
}

impl SquareCoord {
    #[must_use]
    pub fn has_canonical_posture(&self) -> bool {
        !self.top_edge_first && self.bottom_edge_first
    }

    /// The middle flag as used by the pruning table index.
    #[must_use]
    pub fn middle_flag(&self) -> usize {
        usize::from(self.middle_swapped)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn rank_u16(perm: &[u8]) -> u16 {
    // 8! fits in a u16
    rank(perm) as u16
}

impl From<&PuzzleState> for SquareCoord {
    fn from(state: &PuzzleState) -> Self {
        // Pieces come in pairs of labels (2k, 2k + 1) for edges and corners,
        // so halving a label gives its index within its piece class
        let mut perm = [0; 8];

        // Slot 3k + 1 always holds a corner half in a cube shaped ring
        for (i, piece) in perm.iter_mut().enumerate() {
            *piece = state.piece_at(i * 3 + 1) >> 1;
        }
        let corner_perm = rank_u16(&perm);

        let top_edge_first = state.piece_at(0) == state.piece_at(1);
        let top_start = if top_edge_first { 2 } else { 0 };
        let bottom_edge_first = state.piece_at(12) == state.piece_at(13);
        let bottom_start = if bottom_edge_first { 14 } else { 12 };
        for i in 0..4 {
            perm[i] = state.piece_at(top_start + i * 3) >> 1;
            perm[i + 4] = state.piece_at(bottom_start + i * 3) >> 1;
        }
        let edge_perm = rank_u16(&perm);

        SquareCoord {
            edge_perm,
            corner_perm,
            top_edge_first,
            bottom_edge_first,
            middle_swapped: state.middle_swapped(),
        }
    }
}
