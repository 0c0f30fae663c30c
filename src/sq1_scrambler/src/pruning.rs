//! Move transition tables and the twist distance pruning table.
//!
//! The table stores, for every pair of permutation rank and middle flag, the
//! exact number of layer moves needed to bring the projection back to the
//! identity with an unswapped equator. Because the edge projection and the
//! corner projection must both be solved, the larger of their two distances
//! is an admissible heuristic for the solver.

use crate::{
    FACT_UNTIL_12,
    coord::SquareCoord,
    permutation::{cycle, rank, unrank},
    start, success, working,
};
use log::{debug, info, warn};
use std::time::Instant;

/// Marks an entry that has not been reached yet during generation.
pub const UNKNOWN: u8 = u8::MAX;

/// How many times a layer cycle is applied when looking for neighbors. The
/// layer cycles must have an order dividing this.
pub const LAYER_STEPS: usize = 4;

/// From this depth on, generation switches from expanding the frontier to
/// searching from the unknown entries back to the frontier, which is cheaper
/// once most of the table is filled.
pub const BACKWARD_SEARCH_DEPTH: u8 = 11;

const NEIGHBOR_COUNT: usize = 1 + 2 * LAYER_STEPS;

/// Describes how the moves act on one permutation projection.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionDef {
    pub piece_count: usize,
    /// Disjoint swaps performed by a slice. A slice also flips the middle
    /// flag.
    pub twist_swaps: &'static [[usize; 2]],
    /// The cycle one step of a top layer move performs.
    pub top_cycle: &'static [usize],
    /// The cycle one step of a bottom layer move performs.
    pub bottom_cycle: &'static [usize],
    pub backward_search_depth: u8,
}

/// The projection of the eight edges or the eight corners of a cube shaped
/// Square-1. Positions 0 to 3 are the top layer and 4 to 7 the bottom layer.
pub const SQUARE_PROJECTION: ProjectionDef = ProjectionDef {
    piece_count: 8,
    twist_swaps: &[[2, 4], [3, 5]],
    top_cycle: &[0, 3, 2, 1],
    bottom_cycle: &[4, 7, 6, 5],
    backward_search_depth: BACKWARD_SEARCH_DEPTH,
};

#[derive(Debug)]
struct MoveTables {
    twist: Box<[u16]>,
    top: Box<[u16]>,
    bottom: Box<[u16]>,
}

#[allow(clippy::cast_possible_truncation)]
fn apply_and_rank(perm: &mut [u8], index: usize, cycles: &[&[usize]]) -> u16 {
    unrank(index, perm);
    for positions in cycles {
        cycle(perm, positions);
    }
    // Projections are at most eight pieces so every rank fits
    rank(perm) as u16
}

impl MoveTables {
    fn generate(def: &ProjectionDef) -> Self {
        assert!(
            def.piece_count <= 8,
            "projections of more than eight pieces do not fit in u16 ranks"
        );
        let perm_count = FACT_UNTIL_12[def.piece_count];
        let twist_cycles: Vec<&[usize]> = def.twist_swaps.iter().map(|swap| &swap[..]).collect();

        let mut perm = vec![0; def.piece_count];
        let mut twist = Vec::with_capacity(perm_count);
        let mut top = Vec::with_capacity(perm_count);
        let mut bottom = Vec::with_capacity(perm_count);
        for index in 0..perm_count {
            twist.push(apply_and_rank(&mut perm, index, &twist_cycles));
            top.push(apply_and_rank(&mut perm, index, &[def.top_cycle]));
            bottom.push(apply_and_rank(&mut perm, index, &[def.bottom_cycle]));
        }

        MoveTables {
            twist: twist.into_boxed_slice(),
            top: top.into_boxed_slice(),
            bottom: bottom.into_boxed_slice(),
        }
    }

    /// Every table index reachable from `index` with one twist or with one to
    /// `LAYER_STEPS` steps of either layer.
    fn neighbors(&self, index: usize) -> [usize; NEIGHBOR_COUNT] {
        let (perm, middle_flag) = (index >> 1, index & 1);
        let mut neighbors = [0; NEIGHBOR_COUNT];
        neighbors[0] = (usize::from(self.twist[perm]) << 1) | (middle_flag ^ 1);
        let mut next_perm = perm;
        for (i, neighbor) in neighbors[1..].iter_mut().enumerate() {
            next_perm = usize::from(if i < LAYER_STEPS {
                self.top[next_perm]
            } else {
                self.bottom[next_perm]
            });
            *neighbor = (next_perm << 1) | middle_flag;
        }
        neighbors
    }
}

/// The pruning table together with the move tables it was generated from.
/// It is immutable once generated; share it with an `Arc`.
#[derive(Debug)]
pub struct PruningTable {
    move_tables: MoveTables,
    distances: Box<[u8]>,
}

impl PruningTable {
    /// Generate the table for [`SQUARE_PROJECTION`].
    #[must_use]
    pub fn square() -> Self {
        Self::generate(&SQUARE_PROJECTION)
    }

    /// Generate the move tables for `def` and fill the pruning table with a
    /// breadth first search from the identity.
    #[must_use]
    pub fn generate(def: &ProjectionDef) -> Self {
        info!(
            start!("Generating pruning table for {} piece projections"),
            def.piece_count
        );
        let start = Instant::now();

        let move_tables = MoveTables::generate(def);
        let entry_count = move_tables.twist.len() * 2;
        let mut distances = vec![UNKNOWN; entry_count].into_boxed_slice();
        distances[0] = 0;

        let mut depth = 0;
        let mut done = 1;
        while done < entry_count {
            let backward = depth >= def.backward_search_depth;
            let (find, check) = if backward {
                (UNKNOWN, depth)
            } else {
                (depth, UNKNOWN)
            };
            depth += 1;

            let depth_start = Instant::now();
            let mut assigned = 0;
            for index in 0..entry_count {
                if distances[index] != find {
                    continue;
                }
                for neighbor in move_tables.neighbors(index) {
                    if distances[neighbor] != check {
                        continue;
                    }
                    assigned += 1;
                    if backward {
                        distances[index] = depth;
                        break;
                    }
                    distances[neighbor] = depth;
                }
            }
            debug!(
                working!("Assigned {} entries at depth {} in {:.3}s ({})"),
                assigned,
                depth,
                depth_start.elapsed().as_secs_f64(),
                if backward { "backward" } else { "forward" }
            );

            if assigned == 0 {
                warn!(
                    "{} of {} pruning table entries are unreachable",
                    entry_count - done,
                    entry_count
                );
                break;
            }
            done += assigned;
        }

        info!(
            success!("Pruning table generated in {:.3}s with max depth {}"),
            start.elapsed().as_secs_f64(),
            depth
        );
        PruningTable {
            move_tables,
            distances,
        }
    }

    /// The number of layer moves needed to solve the projection `perm` with
    /// the given middle flag.
    #[must_use]
    pub fn distance(&self, perm: u16, middle_flag: usize) -> u8 {
        self.distances[(usize::from(perm) << 1) | middle_flag]
    }

    /// An admissible lower bound on the number of moves needed to solve
    /// `coord`.
    #[must_use]
    pub fn heuristic(&self, coord: &SquareCoord) -> u8 {
        let middle_flag = coord.middle_flag();
        self.distance(coord.edge_perm, middle_flag)
            .max(self.distance(coord.corner_perm, middle_flag))
    }

    #[must_use]
    pub fn twist(&self, perm: u16) -> u16 {
        self.move_tables.twist[usize::from(perm)]
    }

    #[must_use]
    pub fn top(&self, perm: u16) -> u16 {
        self.move_tables.top[usize::from(perm)]
    }

    #[must_use]
    pub fn bottom(&self, perm: u16) -> u16 {
        self.move_tables.bottom[usize::from(perm)]
    }

    /// The number of permutation ranks covered, i.e. `piece_count!`.
    #[must_use]
    pub fn perm_count(&self) -> usize {
        self.move_tables.twist.len()
    }

    #[must_use]
    pub fn distances(&self) -> &[u8] {
        &self.distances
    }
}
