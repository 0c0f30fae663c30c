//! Random state scrambles for cube shaped Square-1 states.
//!
//! A scramble is found in two phases. A random walk of slice groups mixes the
//! target state, then [`InverseSearch`] solves what the walk produced. The
//! walk followed by the solution solves the target, so its inverse sets the
//! target up from solved. Attempts are retried until the combined sequence
//! has enough slices to be a real scramble.

use crate::{
    cases::{CaseError, MiddleLayerMode, generate_case_state},
    coord::SquareCoord,
    notation::{compact, inverse_display_string},
    pruning::PruningTable,
    puzzle::{Move, PuzzleState, StateParseError},
    random_walk::{MAX_WALK_GROUPS, MIN_WALK_GROUPS, RandomWalk},
    solver::{InverseSearch, MAX_SOLVE_DEPTH},
    start, success, working,
};
use itertools::Itertools;
use log::{debug, info, trace};
use serde::Deserialize;
use std::{fmt, sync::Arc, time::Instant};
use thiserror::Error;

/// The longest a random walk and its solution may be together.
pub const MOVE_BUDGET: u8 = 45;

/// The fewest slices an accepted scramble may have.
pub const MIN_SLICE_COUNT: usize = 9;

pub const DEFAULT_MAX_ATTEMPTS: usize = 1000;

/// Tuning knobs of a [`Scrambler`]. Missing fields in a config file take
/// their default.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScramblerConfig {
    pub max_attempts: usize,
    pub min_slice_count: usize,
    pub move_budget: u8,
    pub max_solve_depth: u8,
    pub min_walk_groups: usize,
    pub max_walk_groups: usize,
}

impl Default for ScramblerConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            min_slice_count: MIN_SLICE_COUNT,
            move_budget: MOVE_BUDGET,
            max_solve_depth: MAX_SOLVE_DEPTH,
            min_walk_groups: MIN_WALK_GROUPS,
            max_walk_groups: MAX_WALK_GROUPS,
        }
    }
}

impl ScramblerConfig {
    /// The exclusive depth limit of the search that follows a walk of
    /// `walk_len` moves.
    #[must_use]
    pub fn max_depth_after_walk(&self, walk_len: usize) -> u8 {
        let remaining = usize::from(self.move_budget).saturating_sub(walk_len);
        u8::try_from(remaining)
            .unwrap_or(u8::MAX)
            .min(self.max_solve_depth)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScrambleError {
    #[error("The puzzle is already solved")]
    AlreadySolved,
    #[error("State {0} is not a cube shaped Square-1 with the solved piece set")]
    NotCubeShaped(PuzzleState),
    #[error("No scramble was found after {attempts} attempts")]
    AttemptsExhausted { attempts: usize },
    #[error(transparent)]
    Case(#[from] CaseError),
    #[error(transparent)]
    State(#[from] StateParseError),
    #[error("Could not scramble case {case_name:?} with middle layer mode {ml_mode:?}: {source}")]
    NoScramble {
        case_name: String,
        ml_mode: String,
        source: Box<ScrambleError>,
    },
}

/// A sequence of moves that solves the scrambled state. It is displayed as
/// its inverse, which is what gets applied to a solved puzzle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scramble {
    moves: Vec<Move>,
}

impl Scramble {
    #[must_use]
    pub fn new(moves: Vec<Move>) -> Self {
        Self { moves }
    }

    /// The random walk followed by its solution.
    #[must_use]
    pub fn solving_moves(&self) -> &[Move] {
        &self.moves
    }

    /// The moves that set the scrambled state up from solved.
    #[must_use]
    pub fn setup_moves(&self) -> Vec<Move> {
        self.moves.iter().rev().map(|move_| move_.inverse()).collect()
    }

    #[must_use]
    pub fn slice_count(&self) -> usize {
        self.moves.iter().filter(|move_| move_.is_slice()).count()
    }

    /// The display string without parentheses and their leading spaces.
    #[must_use]
    pub fn compact(&self) -> String {
        compact(&self.to_string())
    }
}

impl fmt::Display for Scramble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&inverse_display_string(&self.moves))
    }
}

/// Whether the twelve slots from `base` alternate an edge and a whole corner,
/// with the edges on `base + 3k` or on `base + 3k + 2`. These are the two
/// alignments [`SquareCoord`] can read.
fn is_square_layer(state: &PuzzleState, base: usize) -> bool {
    [0, 2].into_iter().any(|offset| {
        (0..4).all(|k| {
            let edge = 3 * k + offset;
            let first_half = state.piece_at(base + (edge + 1) % 12);
            let second_half = state.piece_at(base + (edge + 2) % 12);
            state.piece_at(base + edge) % 2 == 0
                && first_half % 2 == 1
                && first_half == second_half
        })
    })
}

/// Whether both layers are squares holding exactly the labels of the solved
/// puzzle.
pub(crate) fn is_cube_shaped(state: &PuzzleState) -> bool {
    let labels = |state: &PuzzleState| (0..24).map(|slot| state.piece_at(slot)).sorted();
    is_square_layer(state, 0)
        && is_square_layer(state, 12)
        && labels(state).eq(labels(&PuzzleState::SOLVED))
}

/// Finds scrambles with a shared pruning table. Each scrambler owns its
/// random number generator.
pub struct Scrambler {
    pruning_table: Arc<PruningTable>,
    config: ScramblerConfig,
    rng: fastrand::Rng,
}

impl Scrambler {
    #[must_use]
    pub fn new(pruning_table: Arc<PruningTable>) -> Self {
        Self {
            pruning_table,
            config: ScramblerConfig::default(),
            rng: fastrand::Rng::new(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ScramblerConfig) -> Self {
        self.config = config;
        self
    }

    /// Make every scramble reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = fastrand::Rng::with_seed(seed);
        self
    }

    #[must_use]
    pub fn config(&self) -> &ScramblerConfig {
        &self.config
    }

    fn random_walk(&mut self) -> RandomWalk {
        let min = self.config.min_walk_groups;
        let group_count = self.rng.usize(min..=self.config.max_walk_groups.max(min));
        RandomWalk::generate(&mut self.rng, group_count)
    }

    /// Find a scramble that sets up `state` from solved.
    ///
    /// # Errors
    ///
    /// Fails if `state` is solved or not cube shaped, or if every attempt
    /// failed to find a long enough scramble.
    pub fn scramble_state(&mut self, state: &PuzzleState) -> Result<Scramble, ScrambleError> {
        if state.is_solved() {
            return Err(ScrambleError::AlreadySolved);
        }
        // The random walk starts from the solved posture
        if !is_cube_shaped(state) || !SquareCoord::from(state).has_canonical_posture() {
            return Err(ScrambleError::NotCubeShaped(*state));
        }

        info!(start!("Scrambling {}"), state);
        let start = Instant::now();
        for attempt in 1..=self.config.max_attempts {
            let walk = self.random_walk();
            let mut walked = *state;
            walked.apply_moves(&walk.moves);

            let max_depth = self.config.max_depth_after_walk(walk.moves.len());
            let solver = InverseSearch::new(&self.pruning_table).with_max_depth(max_depth);
            let solution = match solver.solve_state(&walked) {
                Ok(solution) => solution,
                Err(e) => {
                    debug!(working!("Attempt {}: {}"), attempt, e);
                    continue;
                }
            };

            let walk_len = walk.moves.len();
            let scramble = Scramble::new(walk.moves.into_iter().chain(solution).collect());
            let slice_count = scramble.slice_count();
            if slice_count < self.config.min_slice_count {
                debug!(
                    working!("Attempt {}: only {} slices, need {}"),
                    attempt, slice_count, self.config.min_slice_count
                );
                continue;
            }

            trace!("Solving sequence: {:?}", scramble.solving_moves());
            info!(
                success!("Found a {} move scramble ({} walk, {} slices) in {:.3}s after {} attempts"),
                scramble.solving_moves().len(),
                walk_len,
                slice_count,
                start.elapsed().as_secs_f64(),
                attempt
            );
            return Ok(scramble);
        }

        Err(ScrambleError::AttemptsExhausted {
            attempts: self.config.max_attempts,
        })
    }

    /// Scramble a state given in the hex wire format, e.g.
    /// `211455633077|99edd8bbaffc`.
    ///
    /// # Errors
    ///
    /// Fails if `hex` is malformed or [`Scrambler::scramble_state`] fails.
    pub fn scramble_hex(&mut self, hex: &str) -> Result<Scramble, ScrambleError> {
        let state: PuzzleState = hex.parse()?;
        self.scramble_state(&state)
    }

    /// Generate a random state of the PBL case `case_name`. `ml_mode` is `+`
    /// for a swapped equator, `-` for a solved one and anything else for a
    /// random one.
    ///
    /// # Errors
    ///
    /// Fails if the case name is invalid.
    pub fn generate_case(
        &mut self,
        case_name: &str,
        ml_mode: &str,
    ) -> Result<PuzzleState, CaseError> {
        generate_case_state(&mut self.rng, case_name, MiddleLayerMode::from(ml_mode))
    }

    /// Scramble a random state of the PBL case `case_name`.
    ///
    /// # Errors
    ///
    /// Fails if the case name is invalid or no scramble was found.
    pub fn scramble_case(
        &mut self,
        case_name: &str,
        ml_mode: &str,
    ) -> Result<Scramble, ScrambleError> {
        let state = self.generate_case(case_name, ml_mode)?;
        self.scramble_state(&state)
    }

    /// The compact scramble of a random state of the PBL case `case_name`.
    ///
    /// # Errors
    ///
    /// Fails with [`ScrambleError::NoScramble`] wrapping whatever went wrong.
    pub fn get_scramble(&mut self, case_name: &str, ml_mode: &str) -> Result<String, ScrambleError> {
        self.scramble_case(case_name, ml_mode)
            .map(|scramble| scramble.compact())
            .map_err(|source| ScrambleError::NoScramble {
                case_name: case_name.to_owned(),
                ml_mode: ml_mode.to_owned(),
                source: Box::new(source),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::LazyLock;

    static PRUNING_TABLE: LazyLock<Arc<PruningTable>> =
        LazyLock::new(|| Arc::new(PruningTable::square()));

    fn scrambler(seed: u64) -> Scrambler {
        Scrambler::new(Arc::clone(&PRUNING_TABLE)).with_seed(seed)
    }

    #[test]
    fn test_default_config() {
        let config = ScramblerConfig::default();
        assert_eq!(config.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(config.min_slice_count, 9);
        assert_eq!(config.move_budget, 45);
        assert_eq!(config.max_solve_depth, 18);
        assert_eq!(config.max_depth_after_walk(9), 18);
        assert_eq!(config.max_depth_after_walk(30), 15);
        assert_eq!(config.max_depth_after_walk(60), 0);
    }

    #[test]
    fn test_scramble_strings() {
        let scramble = Scramble::new(vec![
            Move::Top(1),
            Move::Bottom(11),
            Move::Slice,
            Move::Top(3),
            Move::Bottom(2),
        ]);
        assert_eq!(scramble.to_string(), " (-3,-2)/ (-1,1) ");
        assert_eq!(scramble.compact(), "-3,-2/-1,1 ");
        assert_eq!(scramble.slice_count(), 1);
        assert_eq!(
            scramble.setup_moves(),
            vec![
                Move::Bottom(10),
                Move::Top(9),
                Move::Slice,
                Move::Bottom(1),
                Move::Top(11),
            ]
        );
    }

    #[test]
    fn test_cube_shape_check() {
        assert!(is_cube_shaped(&PuzzleState::SOLVED));
        let mut state = PuzzleState::SOLVED;
        state.apply_moves(&[Move::Top(3), Move::Bottom(6)]);
        assert!(is_cube_shaped(&state));
        let mut state = PuzzleState::SOLVED;
        state.set_piece(0, 2);
        assert!(!is_cube_shaped(&state));
        // Right labels in the right slot classes, but two corners are split
        let split: PuzzleState = "013213455677|998bbaddcffe".parse().unwrap();
        assert!(!is_cube_shaped(&split));
        let adjacent_swap: PuzzleState = "011233455677|99abb8ddcffe".parse().unwrap();
        assert!(is_cube_shaped(&adjacent_swap));
        let split: PuzzleState = "011233455677|9b8b9addcffe".parse().unwrap();
        assert!(!is_cube_shaped(&split));
    }

    #[test_log::test]
    fn test_rejected_states() {
        let mut scrambler = scrambler(1);
        assert_eq!(
            scrambler.scramble_state(&PuzzleState::SOLVED),
            Err(ScrambleError::AlreadySolved)
        );
        let mut state = PuzzleState::SOLVED;
        state.apply_move(Move::Top(1));
        assert_eq!(
            scrambler.scramble_state(&state),
            Err(ScrambleError::NotCubeShaped(state))
        );
    }

    #[test_log::test]
    fn test_split_corners_are_rejected() {
        let mut scrambler = scrambler(1);
        assert!(matches!(
            scrambler.scramble_hex("013213455677|998bbaddcffe"),
            Err(ScrambleError::NotCubeShaped(_))
        ));
        assert!(matches!(
            scrambler.scramble_hex("011233455677|9b8b9addcffe"),
            Err(ScrambleError::NotCubeShaped(_))
        ));
    }

    #[test_log::test]
    fn test_malformed_hex() {
        assert_eq!(
            scrambler(1).scramble_hex("211455633077-99edd8bbaffc"),
            Err(ScrambleError::State(StateParseError::InvalidSeparator))
        );
    }

    #[test_log::test]
    fn test_attempts_exhausted() {
        let mut scrambler = scrambler(2).with_config(ScramblerConfig {
            max_attempts: 3,
            min_slice_count: 100,
            ..ScramblerConfig::default()
        });
        let mut state = PuzzleState::SOLVED;
        state.apply_moves(&[Move::Top(3), Move::Slice, Move::Slice, Move::Bottom(3)]);
        assert_eq!(
            scrambler.scramble_state(&state),
            Err(ScrambleError::AttemptsExhausted { attempts: 3 })
        );
    }

    #[test_log::test]
    fn test_scramble_solves_state() {
        let mut scrambler = scrambler(3);
        let state = scrambler.generate_case("T/Y", "-").unwrap();
        let scramble = scrambler.scramble_state(&state).unwrap();
        assert!(scramble.slice_count() >= MIN_SLICE_COUNT);
        assert!(scramble.solving_moves().len() <= usize::from(MOVE_BUDGET));

        let mut solved = state;
        solved.apply_moves(scramble.solving_moves());
        assert!(solved.is_solved());

        let mut set_up = PuzzleState::SOLVED;
        set_up.apply_moves(&scramble.setup_moves());
        assert_eq!(set_up, state);
    }

    #[test_log::test]
    fn test_get_scramble_wraps_errors() {
        let mut scrambler = scrambler(4);
        assert_eq!(
            scrambler.get_scramble("Al/Opp", "+"),
            Err(ScrambleError::NoScramble {
                case_name: "Al/Opp".to_owned(),
                ml_mode: "+".to_owned(),
                source: Box::new(ScrambleError::Case(CaseError::MixedParity {
                    top: "Al".to_owned(),
                    bottom: "Opp".to_owned(),
                })),
            })
        );
        // Relabeling can leave the solved case solved
        for _ in 0..5 {
            match scrambler.get_scramble("-/-", "-") {
                Ok(scramble) => assert!(!scramble.is_empty()),
                Err(ScrambleError::NoScramble { source, .. }) => {
                    assert_eq!(*source, ScrambleError::AlreadySolved);
                }
                Err(e) => panic!("{e}"),
            }
        }
    }

    #[test_log::test]
    fn test_seeded_scramblers_agree() {
        let first = scrambler(5).get_scramble("Ja/Jm", "random").unwrap();
        let second = scrambler(5).get_scramble("Ja/Jm", "random").unwrap();
        assert_eq!(first, second);
    }
}
