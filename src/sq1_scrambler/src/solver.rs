use crate::{
    coord::SquareCoord,
    pruning::PruningTable,
    puzzle::{Move, PuzzleState},
    success, working,
};
use log::{Level, debug, log_enabled};
use std::time::Instant;
use thiserror::Error;

/// The deepest the solver will ever search, regardless of how short the
/// random walk was.
pub const MAX_SOLVE_DEPTH: u8 = 18;

/// The largest top layer move the solver emits, in twelfths.
pub const MAX_TOP_TWIST: u8 = 11;

/// The largest bottom layer move the solver emits, in twelfths. Smaller than
/// the top layer to keep the branching factor and the scrambles tame.
pub const MAX_BOTTOM_TWIST: u8 = 4;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum InverseSearchError {
    #[error("No solution shorter than {max_depth} moves was found")]
    MaxSolutionLengthExceeded { max_depth: u8 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MoveClass {
    Slice,
    Top,
    Bottom,
}

#[derive(Clone, Copy, Debug)]
enum Layer {
    Top,
    Bottom,
}

/// A search node. The same as a [`SquareCoord`] but with the middle flag
/// kept as a table index.
#[derive(Clone, Copy, Debug)]
struct SearchNode {
    edge: u16,
    corner: u16,
    top_edge_first: bool,
    bottom_edge_first: bool,
    middle_flag: usize,
}

impl SearchNode {
    fn is_solved(&self) -> bool {
        self.edge == 0
            && self.corner == 0
            && self.middle_flag == 0
            && !self.top_edge_first
            && self.bottom_edge_first
    }
}

impl From<&SquareCoord> for SearchNode {
    fn from(coord: &SquareCoord) -> Self {
        SearchNode {
            edge: coord.edge_perm,
            corner: coord.corner_perm,
            top_edge_first: coord.top_edge_first,
            bottom_edge_first: coord.bottom_edge_first,
            middle_flag: coord.middle_flag(),
        }
    }
}

impl Layer {
    fn edge_first(self, node: &SearchNode) -> bool {
        match self {
            Layer::Top => node.top_edge_first,
            Layer::Bottom => node.bottom_edge_first,
        }
    }

    fn with_edge_first(self, mut node: SearchNode, edge_first: bool) -> SearchNode {
        match self {
            Layer::Top => node.top_edge_first = edge_first,
            Layer::Bottom => node.bottom_edge_first = edge_first,
        }
        node
    }

    fn max_twelfths(self) -> u8 {
        match self {
            Layer::Top => MAX_TOP_TWIST,
            Layer::Bottom => MAX_BOTTOM_TWIST,
        }
    }

    fn twist(self, twelfths: u8) -> Move {
        match self {
            Layer::Top => Move::Top(twelfths),
            Layer::Bottom => Move::Bottom(twelfths),
        }
    }

    fn move_class(self) -> MoveClass {
        match self {
            Layer::Top => MoveClass::Top,
            Layer::Bottom => MoveClass::Bottom,
        }
    }

    fn step(self, pruning_table: &PruningTable, perm: u16) -> u16 {
        match self {
            Layer::Top => pruning_table.top(perm),
            Layer::Bottom => pruning_table.bottom(perm),
        }
    }
}

/// Iterative deepening search from a cube shaped state back to solved.
pub struct InverseSearch<'a> {
    pruning_table: &'a PruningTable,
    max_depth: u8,
}

/// Scratch space owned by a single [`InverseSearch::solve`] call.
struct InverseSearchMutable {
    moves: Vec<Move>,
    nodes_visited: u64,
}

impl<'a> InverseSearch<'a> {
    #[must_use]
    pub fn new(pruning_table: &'a PruningTable) -> Self {
        Self {
            pruning_table,
            max_depth: MAX_SOLVE_DEPTH,
        }
    }

    /// Only search depths strictly less than `max_depth`.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: u8) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Solve `state`, which must be cube shaped.
    ///
    /// # Errors
    ///
    /// Fails if no solution exists within the depth limit.
    pub fn solve_state(&self, state: &PuzzleState) -> Result<Vec<Move>, InverseSearchError> {
        self.solve(&SquareCoord::from(state))
    }

    /// Find the first solution at the shallowest depth that the solver's move
    /// restrictions allow, starting the search from the pruning table bound.
    ///
    /// # Errors
    ///
    /// Fails if no solution exists within the depth limit.
    pub fn solve(&self, coord: &SquareCoord) -> Result<Vec<Move>, InverseSearchError> {
        let start = Instant::now();
        let root = SearchNode::from(coord);
        let mut mutable = InverseSearchMutable {
            moves: vec![Move::Slice; usize::from(self.max_depth)],
            nodes_visited: 0,
        };

        for depth in self.pruning_table.heuristic(coord)..self.max_depth {
            debug!(working!("Searching depth {}..."), depth);
            let depth_start = Instant::now();
            // The random walk always ends in a slice, so the root behaves as
            // if it was just sliced
            let found = self.search_for_solution(&mut mutable, root, depth, 0, MoveClass::Slice);
            debug!(
                working!("Traversed {} nodes in {:.3}s"),
                mutable.nodes_visited,
                depth_start.elapsed().as_secs_f64()
            );
            if found {
                debug!(
                    success!("Inverse found in {:.3}s at depth {}"),
                    start.elapsed().as_secs_f64(),
                    depth
                );
                mutable.moves.truncate(usize::from(depth));
                return Ok(mutable.moves);
            }
            mutable.nodes_visited = 0;
        }

        Err(InverseSearchError::MaxSolutionLengthExceeded {
            max_depth: self.max_depth,
        })
    }

    /// The IDA* recursion. `permitted_cost` is the exact number of moves left
    /// to place; a child is only explored if both of its projections can be
    /// solved in fewer moves than that.
    fn search_for_solution(
        &self,
        mutable: &mut InverseSearchMutable,
        node: SearchNode,
        permitted_cost: u8,
        ply: usize,
        last_move_class: MoveClass,
    ) -> bool {
        if log_enabled!(Level::Debug) {
            mutable.nodes_visited += 1;
        }
        if permitted_cost == 0 {
            return node.is_solved();
        }

        // A slice is only possible when both layers share an alignment, and
        // two slices in a row cancel
        if last_move_class != MoveClass::Slice && node.top_edge_first == node.bottom_edge_first {
            let next = SearchNode {
                edge: self.pruning_table.twist(node.edge),
                corner: self.pruning_table.twist(node.corner),
                middle_flag: node.middle_flag ^ 1,
                ..node
            };
            if self.pruning_table.distance(next.edge, next.middle_flag) < permitted_cost
                && self.pruning_table.distance(next.corner, next.middle_flag) < permitted_cost
            {
                mutable.moves[ply] = Move::Slice;
                if self.search_for_solution(
                    mutable,
                    next,
                    permitted_cost - 1,
                    ply + 1,
                    MoveClass::Slice,
                ) {
                    return true;
                }
            }
        }

        // The top layer only moves right after a slice and the bottom layer
        // never moves twice in a row. This orders the commuting pair as top
        // then bottom.
        if last_move_class == MoveClass::Slice
            && self.search_layer(mutable, node, permitted_cost, ply, Layer::Top)
        {
            return true;
        }
        last_move_class != MoveClass::Bottom
            && self.search_layer(mutable, node, permitted_cost, ply, Layer::Bottom)
    }

    /// Try every twist of `layer` in increasing twelfths.
    ///
    /// Moving a cube shaped layer by one twelfth only changes its alignment,
    /// and moving it by one more slot in the same alignment steps either the
    /// edge or the corner projection. A twist is therefore a walk that
    /// alternately steps the edge projection (one twelfth) and the corner
    /// projection (two twelfths).
    fn search_layer(
        &self,
        mutable: &mut InverseSearchMutable,
        node: SearchNode,
        permitted_cost: u8,
        ply: usize,
        layer: Layer,
    ) -> bool {
        let table = self.pruning_table;
        let mut edge_first = !layer.edge_first(&node);
        let (mut edge, mut corner, mut twelfths) = if edge_first {
            (layer.step(table, node.edge), node.corner, 1)
        } else {
            (node.edge, layer.step(table, node.corner), 2)
        };
        let mut edge_distance = table.distance(edge, node.middle_flag);
        let mut corner_distance = table.distance(corner, node.middle_flag);

        // Once either projection needs more than the remaining moves, every
        // later twist is at least as far, since they differ by one layer move
        while twelfths <= layer.max_twelfths()
            && edge_distance <= permitted_cost
            && corner_distance <= permitted_cost
        {
            if edge_distance < permitted_cost && corner_distance < permitted_cost {
                mutable.moves[ply] = layer.twist(twelfths);
                let next = layer.with_edge_first(
                    SearchNode {
                        edge,
                        corner,
                        ..node
                    },
                    edge_first,
                );
                if self.search_for_solution(
                    mutable,
                    next,
                    permitted_cost - 1,
                    ply + 1,
                    layer.move_class(),
                ) {
                    return true;
                }
            }

            edge_first = !edge_first;
            if edge_first {
                edge = layer.step(table, edge);
                edge_distance = table.distance(edge, node.middle_flag);
                twelfths += 1;
            } else {
                corner = layer.step(table, corner);
                corner_distance = table.distance(corner, node.middle_flag);
                twelfths += 2;
            }
        }
        false
    }
}
