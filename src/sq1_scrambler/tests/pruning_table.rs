use sq1_scrambler::{
    coord::SquareCoord,
    pruning::{LAYER_STEPS, PruningTable, UNKNOWN},
    puzzle::{Move, PuzzleState},
    random_walk::{MAX_WALK_GROUPS, RandomWalk},
};
use std::sync::LazyLock;

static PRUNING_TABLE: LazyLock<PruningTable> = LazyLock::new(PruningTable::square);

fn neighbors(table: &PruningTable, perm: u16, middle_flag: usize) -> Vec<(u16, usize)> {
    let mut neighbors = vec![(table.twist(perm), middle_flag ^ 1)];
    let (mut top, mut bottom) = (perm, perm);
    for _ in 0..LAYER_STEPS {
        top = table.top(top);
        bottom = table.bottom(bottom);
        neighbors.push((top, middle_flag));
        neighbors.push((bottom, middle_flag));
    }
    neighbors
}

#[test_log::test]
fn test_table_is_fully_assigned() {
    let table = &*PRUNING_TABLE;
    assert_eq!(table.perm_count(), 40320);
    assert_eq!(table.distances().len(), 2 * 40320);
    assert!(table.distances().iter().all(|&d| d != UNKNOWN));
    assert_eq!(table.distance(0, 0), 0);
    assert_eq!(
        table.distances().iter().filter(|&&d| d == 0).count(),
        1,
        "only the identity with a solved equator is at distance zero"
    );
}

#[test_log::test]
fn test_table_is_consistent() {
    let table = &*PRUNING_TABLE;
    for perm in 0..u16::try_from(table.perm_count()).unwrap() {
        for middle_flag in 0..2 {
            let distance = table.distance(perm, middle_flag);
            let neighbor_distances = neighbors(table, perm, middle_flag)
                .into_iter()
                .map(|(next, flag)| table.distance(next, flag))
                .collect::<Vec<_>>();
            assert!(
                neighbor_distances.iter().all(|&d| d.abs_diff(distance) <= 1),
                "{perm} {middle_flag}"
            );
            if distance > 0 {
                assert!(neighbor_distances.contains(&(distance - 1)));
            }
        }
    }
}

#[test_log::test]
fn test_layer_moves_have_order_four() {
    let table = &*PRUNING_TABLE;
    for perm in (0..40320).step_by(97) {
        let mut top = perm;
        let mut bottom = perm;
        for _ in 0..LAYER_STEPS {
            top = table.top(top);
            bottom = table.bottom(bottom);
        }
        assert_eq!(top, perm);
        assert_eq!(bottom, perm);
        assert_eq!(table.twist(table.twist(perm)), perm);
    }
}

#[test_log::test]
fn test_heuristic_never_overestimates_walks() {
    let table = &*PRUNING_TABLE;
    let mut rng = fastrand::Rng::with_seed(21);
    for _ in 0..100 {
        let walk = RandomWalk::generate(&mut rng, MAX_WALK_GROUPS);
        let mut state = PuzzleState::SOLVED;
        for (i, &move_) in walk.moves.iter().enumerate() {
            state.apply_move(move_);
            if move_.is_slice() {
                let coord = SquareCoord::from(&state);
                assert!(usize::from(table.heuristic(&coord)) <= i + 1, "{walk:?}");
            }
        }
    }

    let mut state = PuzzleState::SOLVED;
    state.apply_move(Move::Top(3));
    assert_eq!(table.heuristic(&SquareCoord::from(&state)), 1);
}
