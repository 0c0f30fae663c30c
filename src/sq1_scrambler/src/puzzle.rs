use std::{fmt, mem, str::FromStr};
use thiserror::Error;

/// The number of slots in one layer, which is also the number of twelfths in
/// a full turn.
pub const LAYER_SLOTS: u8 = 12;

const PACK_MASK: u64 = 0xff_ffff;
const RING_MASK: u64 = 0xffff_ffff_ffff;

/// A single Square-1 move. Twist amounts are in twelfths of a turn and are
/// taken modulo 12, so `Top(12)` is a full turn that leaves the state as is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    Top(u8),
    Bottom(u8),
    Slice,
}

impl Move {
    #[must_use]
    pub fn inverse(self) -> Self {
        match self {
            Move::Top(twelfths) => Move::Top(inverse_twelfths(twelfths)),
            Move::Bottom(twelfths) => Move::Bottom(inverse_twelfths(twelfths)),
            Move::Slice => Move::Slice,
        }
    }

    #[must_use]
    pub fn is_slice(self) -> bool {
        self == Move::Slice
    }
}

fn inverse_twelfths(twelfths: u8) -> u8 {
    match twelfths % LAYER_SLOTS {
        0 => LAYER_SLOTS,
        rem => LAYER_SLOTS - rem,
    }
}

/// The piece placement of a Square-1.
///
/// Each layer is a ring of twelve slots split into two packs of six 4-bit
/// piece labels, the lowest slot index being the most significant nibble.
/// Corners take two adjacent slots with the same label. `middle_swapped`
/// tracks the equator, which flips on every slice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PuzzleState {
    ul: u32,
    ur: u32,
    dl: u32,
    dr: u32,
    middle_swapped: bool,
}

impl PuzzleState {
    pub const SOLVED: Self = Self {
        ul: 0x01_1233,
        ur: 0x45_5677,
        dl: 0x99_8bba,
        dr: 0xdd_cffe,
        middle_swapped: false,
    };

    #[must_use]
    pub fn is_solved(&self) -> bool {
        *self == Self::SOLVED
    }

    #[must_use]
    pub fn middle_swapped(&self) -> bool {
        self.middle_swapped
    }

    fn pack(&self, slot: usize) -> u32 {
        match slot / 6 {
            0 => self.ul,
            1 => self.ur,
            2 => self.dl,
            _ => self.dr,
        }
    }

    fn pack_mut(&mut self, slot: usize) -> &mut u32 {
        match slot / 6 {
            0 => &mut self.ul,
            1 => &mut self.ur,
            2 => &mut self.dl,
            _ => &mut self.dr,
        }
    }

    /// Read the piece label in `slot`. Slots 0 to 11 are the top layer and
    /// 12 to 23 the bottom layer.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn piece_at(&self, slot: usize) -> u8 {
        debug_assert!(slot < 24, "slot {slot} out of range");
        ((self.pack(slot) >> nibble_shift(slot)) & 0xf) as u8
    }

    pub fn set_piece(&mut self, slot: usize, label: u8) {
        debug_assert!(slot < 24, "slot {slot} out of range");
        debug_assert!(label < 16, "label {label} out of range");
        let shift = nibble_shift(slot);
        let pack = self.pack_mut(slot);
        *pack &= !(0xf << shift);
        *pack |= u32::from(label) << shift;
    }

    pub fn apply_move(&mut self, move_: Move) {
        match move_ {
            Move::Top(twelfths) => rotate_ring(&mut self.ul, &mut self.ur, twelfths),
            Move::Bottom(twelfths) => rotate_ring(&mut self.dl, &mut self.dr, twelfths),
            Move::Slice => {
                mem::swap(&mut self.ur, &mut self.dl);
                self.middle_swapped = !self.middle_swapped;
            }
        }
    }

    pub fn apply_moves<'a>(&mut self, moves: impl IntoIterator<Item = &'a Move>) {
        for &move_ in moves {
            self.apply_move(move_);
        }
    }
}

impl Default for PuzzleState {
    fn default() -> Self {
        Self::SOLVED
    }
}

fn nibble_shift(slot: usize) -> usize {
    (5 - slot % 6) << 2
}

/// Rotate the twelve slot ring formed by `left` followed by `right` so the
/// piece in slot `twelfths` ends up in slot 0.
#[allow(clippy::cast_possible_truncation)]
fn rotate_ring(left: &mut u32, right: &mut u32, twelfths: u8) {
    let shift = u32::from(twelfths % LAYER_SLOTS) << 2;
    let ring = (u64::from(*left) << 24) | u64::from(*right);
    let rotated = ((ring << shift) | (ring >> (48 - shift))) & RING_MASK;
    *left = (rotated >> 24) as u32;
    *right = (rotated & PACK_MASK) as u32;
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StateParseError {
    #[error("Invalid format. Expected: 12 hex digits + separator (`|` or `/`) + 12 hex digits")]
    InvalidSeparator,
    #[error("Each layer must be exactly 12 hex digits, found {0}")]
    InvalidPartLength(usize),
    #[error("Invalid hex digit {0:?}")]
    InvalidHexDigit(char),
}

fn parse_layer(layer: &str) -> Result<(u32, u32), StateParseError> {
    let digit_count = layer.chars().count();
    if digit_count != usize::from(LAYER_SLOTS) {
        return Err(StateParseError::InvalidPartLength(digit_count));
    }
    if let Some(bad) = layer.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(StateParseError::InvalidHexDigit(bad));
    }
    // Every character is an ASCII hex digit so these cannot fail
    let left = u32::from_str_radix(&layer[..6], 16)
        .map_err(|_| StateParseError::InvalidPartLength(digit_count))?;
    let right = u32::from_str_radix(&layer[6..], 16)
        .map_err(|_| StateParseError::InvalidPartLength(digit_count))?;
    Ok((left, right))
}

impl FromStr for PuzzleState {
    type Err = StateParseError;

    /// Parse `TTTTTTTTTTTTsBBBBBBBBBBBB`, where the separator `s` is `|` for
    /// an unswapped equator and `/` for a swapped one. Whitespace anywhere is
    /// ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let mut parts = input.split(['|', '/']);
        let (Some(top), Some(bottom), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(StateParseError::InvalidSeparator);
        };
        let (ul, ur) = parse_layer(top)?;
        let (dl, dr) = parse_layer(bottom)?;
        Ok(PuzzleState {
            ul,
            ur,
            dl,
            dr,
            middle_swapped: input.contains('/'),
        })
    }
}

impl fmt::Display for PuzzleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:06x}{:06x}{}{:06x}{:06x}",
            self.ul,
            self.ur,
            if self.middle_swapped { '/' } else { '|' },
            self.dl,
            self.dr
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_state(rng: &mut fastrand::Rng) -> PuzzleState {
        let mut state = PuzzleState::SOLVED;
        for _ in 0..40 {
            state.apply_move(match rng.u8(0..3) {
                0 => Move::Top(rng.u8(1..=12)),
                1 => Move::Bottom(rng.u8(1..=12)),
                _ => Move::Slice,
            });
        }
        state
    }

    #[test]
    fn test_solved_display() {
        assert_eq!(
            PuzzleState::SOLVED.to_string(),
            "011233455677|998bbaddcffe"
        );
        assert_eq!(PuzzleState::default(), PuzzleState::SOLVED);
    }

    #[test]
    fn test_piece_at() {
        let solved = PuzzleState::SOLVED;
        let labels: Vec<u8> = (0..24).map(|slot| solved.piece_at(slot)).collect();
        assert_eq!(
            labels,
            [
                0, 1, 1, 2, 3, 3, 4, 5, 5, 6, 7, 7, 9, 9, 8, 11, 11, 10, 13, 13, 12, 15, 15, 14
            ]
        );
    }

    #[test]
    fn test_set_piece() {
        let mut state = PuzzleState::SOLVED;
        state.set_piece(0, 0xf);
        state.set_piece(11, 0x0);
        state.set_piece(17, 0x3);
        state.set_piece(23, 0x5);
        assert_eq!(state.piece_at(0), 0xf);
        assert_eq!(state.piece_at(1), 0x1);
        assert_eq!(state.piece_at(11), 0x0);
        assert_eq!(state.piece_at(17), 0x3);
        assert_eq!(state.piece_at(23), 0x5);
        assert_eq!(state.to_string(), "f11233455670|998bb3ddcff5");
    }

    #[test]
    fn test_top_twist() {
        let mut state = PuzzleState::SOLVED;
        state.apply_move(Move::Top(1));
        assert_eq!(state.to_string(), "112334556770|998bbaddcffe");
        state.apply_move(Move::Top(11));
        assert!(state.is_solved());

        state.apply_move(Move::Top(3));
        assert_eq!(state.to_string(), "233455677011|998bbaddcffe");
    }

    #[test]
    fn test_bottom_twist() {
        let mut state = PuzzleState::SOLVED;
        state.apply_move(Move::Bottom(3));
        assert_eq!(state.to_string(), "011233455677|bbaddcffe998");
        state.apply_move(Move::Bottom(9));
        assert!(state.is_solved());
    }

    #[test]
    fn test_full_turn_is_identity() {
        let mut state = PuzzleState::SOLVED;
        state.apply_move(Move::Top(12));
        state.apply_move(Move::Bottom(12));
        assert!(state.is_solved());
    }

    #[test]
    fn test_slice() {
        let mut state = PuzzleState::SOLVED;
        state.apply_move(Move::Slice);
        assert_eq!(state.to_string(), "011233998bba/455677ddcffe");
        assert!(state.middle_swapped());
        state.apply_move(Move::Slice);
        assert!(state.is_solved());
        assert!(!state.middle_swapped());
    }

    #[test]
    fn test_move_reversibility() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..100 {
            let original = random_state(&mut rng);
            for twelfths in 1..=12 {
                for move_ in [Move::Top(twelfths), Move::Bottom(twelfths), Move::Slice] {
                    let mut state = original;
                    state.apply_move(move_);
                    state.apply_move(move_.inverse());
                    assert_eq!(state, original);
                }
            }
            let mut state = original;
            state.apply_move(Move::Top(6));
            state.apply_move(Move::Top(6));
            assert_eq!(state, original);
        }
    }

    #[test]
    fn test_inverse() {
        assert_eq!(Move::Top(1).inverse(), Move::Top(11));
        assert_eq!(Move::Bottom(6).inverse(), Move::Bottom(6));
        assert_eq!(Move::Top(12).inverse(), Move::Top(12));
        assert_eq!(Move::Slice.inverse(), Move::Slice);
    }

    #[test]
    fn test_parse_round_trip() {
        for input in [
            "011233455677|998bbaddcffe",
            "211455633077|99edd8bbaffc",
            "611055233477/99addcbbeff8",
        ] {
            let state: PuzzleState = input.parse().unwrap();
            assert_eq!(state.to_string(), input);
        }
        let state: PuzzleState = " 0112 33455677 / 998bbaddcffe\n".parse().unwrap();
        assert!(state.middle_swapped());
        assert_eq!(state.to_string(), "011233455677/998bbaddcffe");
        let state: PuzzleState = "011233455677|998BBADDCFFE".parse().unwrap();
        assert!(state.is_solved());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "011233455677998bbaddcffe".parse::<PuzzleState>(),
            Err(StateParseError::InvalidSeparator)
        );
        assert_eq!(
            "011233455677|998bba|ddcffe".parse::<PuzzleState>(),
            Err(StateParseError::InvalidSeparator)
        );
        assert_eq!(
            "01123345567|998bbaddcffe".parse::<PuzzleState>(),
            Err(StateParseError::InvalidPartLength(11))
        );
        assert_eq!(
            "011233455677|998bbaddcffe0".parse::<PuzzleState>(),
            Err(StateParseError::InvalidPartLength(13))
        );
        assert_eq!(
            "01123345567g|998bbaddcffe".parse::<PuzzleState>(),
            Err(StateParseError::InvalidHexDigit('g'))
        );
        assert_eq!(
            "+11233455677|998bbaddcffe".parse::<PuzzleState>(),
            Err(StateParseError::InvalidHexDigit('+'))
        );
    }
}
