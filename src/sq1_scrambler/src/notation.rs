//! Rendering and parsing of Square-1 move sequences.
//!
//! A scramble is written as groups `(t,b)` of top and bottom twelfths in
//! `-5..=6`, each followed by a `/` for the slice. The compact form used by
//! trainers drops the parentheses and the spaces: `1,0/-3,3//2,-1`.

use crate::puzzle::{LAYER_SLOTS, Move};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NotationError {
    #[error("Expected a `top,bottom` pair, found {0:?}")]
    MissingComma(String),
    #[error("Invalid twist amount {0:?}")]
    InvalidAmount(String),
}

/// Normalize an amount of twelfths to `-5..=6`.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn signed_twelfths(twelfths: i32) -> i8 {
    let rem = twelfths.rem_euclid(i32::from(LAYER_SLOTS));
    (if rem > 6 { rem - 12 } else { rem }) as i8
}

/// Render the inverse of `moves`: walk them backwards, inverting every twist.
/// Applied to a solved puzzle, the result sets up the state that `moves`
/// solves.
#[must_use]
pub fn inverse_display_string(moves: &[Move]) -> String {
    let mut display = String::new();
    let (mut top, mut bottom) = (0, 0);
    for &move_ in moves.iter().rev() {
        match move_ {
            Move::Top(twelfths) => top = signed_twelfths(i32::from(top) - i32::from(twelfths)),
            Move::Bottom(twelfths) => {
                bottom = signed_twelfths(i32::from(bottom) - i32::from(twelfths));
            }
            Move::Slice => {
                if top == 0 && bottom == 0 {
                    display.push('/');
                } else {
                    display.push_str(&format!(" ({top},{bottom})/"));
                }
                top = 0;
                bottom = 0;
            }
        }
    }
    if top != 0 || bottom != 0 {
        display.push_str(&format!(" ({top},{bottom}) "));
    }
    display
}

/// Strip the parentheses and their leading space from a display string.
#[must_use]
pub fn compact(display: &str) -> String {
    display.replace(" (", "").replace(')', "")
}

fn parse_amount(amount: &str) -> Result<u8, NotationError> {
    let parsed: i32 = amount
        .trim()
        .parse()
        .map_err(|_| NotationError::InvalidAmount(amount.to_owned()))?;
    let twelfths = parsed.rem_euclid(i32::from(LAYER_SLOTS));
    u8::try_from(twelfths).map_err(|_| NotationError::InvalidAmount(amount.to_owned()))
}

/// Parse a display or compact move string. Zero amounts produce no move.
///
/// # Errors
///
/// Fails on a group that is not a pair of integers.
pub fn parse_sequence(sequence: &str) -> Result<Vec<Move>, NotationError> {
    let mut moves = vec![];
    let groups: Vec<&str> = sequence.split('/').collect();
    for (i, group) in groups.iter().enumerate() {
        let group = group
            .trim()
            .trim_start_matches('(')
            .trim_end_matches(')')
            .trim();
        if !group.is_empty() {
            let (top, bottom) = group
                .split_once(',')
                .ok_or_else(|| NotationError::MissingComma(group.to_owned()))?;
            let top = parse_amount(top)?;
            let bottom = parse_amount(bottom)?;
            if top != 0 {
                moves.push(Move::Top(top));
            }
            if bottom != 0 {
                moves.push(Move::Bottom(bottom));
            }
        }
        if i + 1 != groups.len() {
            moves.push(Move::Slice);
        }
    }
    Ok(moves)
}
