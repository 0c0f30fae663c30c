#![warn(clippy::pedantic)]
#![allow(clippy::similar_names, clippy::too_many_lines)]

pub mod cases;
pub mod coord;
pub mod notation;
pub mod permutation;
pub mod pruning;
pub mod puzzle;
pub mod random_walk;
pub mod scrambler;
pub mod solver;

pub use puzzle::{Move, PuzzleState};
pub use scrambler::{Scramble, ScrambleError, Scrambler, ScramblerConfig};

#[macro_export]
macro_rules! start {
    ($msg:expr) => {
        concat!("⏳ ", $msg)
    };
}

#[macro_export]
macro_rules! working {
    ($msg:expr) => {
        concat!("🛠  ", $msg)
    };
}

#[macro_export]
macro_rules! success {
    ($msg:expr) => {
        concat!("✅ ", $msg)
    };
}

/// A precomputed factorial table where index[i] is i!. Square-1 projections
/// never exceed eight pieces, but ranks of up to 12 pieces still fit in a
/// `usize` on 32-bit targets.
const FACT_UNTIL_12: [usize; 13] = {
    let mut arr = [0; 13];
    arr[0] = 1;
    let mut i = 1;
    while i < arr.len() {
        arr[i] = arr[i - 1] * i;
        i += 1;
    }
    arr
};
