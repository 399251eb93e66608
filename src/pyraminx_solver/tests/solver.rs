use itertools::Itertools;
use pyraminx_solver::{
    Color, MoveTable, Puzzle, SearchEngine, SearchOutcome, StateVector,
    facelets::Preset,
    moves::{MoveDef, MoveSetDef},
    solver::{SearchReport, SearchStats},
};

fn pyraminx() -> MoveTable {
    MoveTable::pyraminx().unwrap()
}

fn solve(table: &MoveTable, initial: &StateVector, max_depth: usize) -> SearchReport {
    SearchEngine::new(table)
        .with_max_depth(max_depth)
        .solve(initial)
        .unwrap()
}

fn scrambled(tokens: &str) -> StateVector {
    pyraminx()
        .apply_tokens(&StateVector::solved(), tokens)
        .unwrap()
}

/// Solved everywhere except the first facelet, so the color counts can never
/// match the goal.
fn unreachable_state() -> StateVector {
    let mut facelets = StateVector::solved().facelets().to_vec();
    facelets[0] = Color::Blue;
    StateVector::new(facelets)
}

fn assert_replays_to(table: &MoveTable, initial: &StateVector, report: &SearchReport, goal: &StateVector) {
    let solution = report.solution().expect("expected a solution");
    let tokens = solution.to_string();
    assert_eq!(&table.apply_tokens(initial, &tokens).unwrap(), goal, "{tokens}");
}

#[test_log::test]
fn test_solved_state() {
    let table = pyraminx();
    let report = solve(&table, &StateVector::solved(), 25);
    let solution = report.solution().unwrap();
    assert!(solution.is_empty());
    assert_eq!(report.stats.nodes_visited, 1);
    assert_eq!(report.stats.states_expanded, 0);
}

#[test_log::test]
fn test_single_twist() {
    let table = pyraminx();
    let initial = scrambled("r");
    let report = solve(&table, &initial, 25);
    // The first branch applies `r` once more and then again at the next
    // depth, which reaches the goal before `rr` is ever tried at the root
    assert_eq!(report.solution().unwrap().to_string(), "r r");
    assert_eq!(report.stats.nodes_visited, 3);
    assert_eq!(report.stats.states_expanded, 2);
    assert_replays_to(&table, &initial, &report, &StateVector::solved());

    let report = solve(&table, &scrambled("rr"), 25);
    assert_eq!(report.solution().unwrap().to_string(), "r");
    assert_eq!(report.stats.states_expanded, 1);
}

#[test_log::test]
fn test_single_rotation() {
    let table = pyraminx();
    let report = solve(&table, &scrambled("t"), 3);
    assert_eq!(report.solution().unwrap().to_string(), "t t");
    assert_eq!(
        report.stats,
        SearchStats {
            nodes_visited: 107,
            states_expanded: 27,
            memo_prunes: 15,
            depth_cutoffs: 64,
            distinct_states: 22,
        }
    );
}

#[test_log::test]
fn test_two_move_scrambles() {
    let table = pyraminx();

    let initial = scrambled("r t");
    let report = solve(&table, &initial, 4);
    assert_eq!(report.solution().unwrap().to_string(), "t t r r");
    assert_replays_to(&table, &initial, &report, &StateVector::solved());

    let initial = scrambled("t r");
    let report = solve(&table, &initial, 6);
    assert_eq!(report.solution().unwrap().to_string(), "r r t t");
    assert_replays_to(&table, &initial, &report, &StateVector::solved());
}

#[test_log::test]
fn test_unreachable_state() {
    let table = pyraminx();
    let report = solve(&table, &unreachable_state(), 4);
    assert_eq!(report.outcome, SearchOutcome::NotFound { max_depth: 4 });
    assert_eq!(
        report.stats,
        SearchStats {
            nodes_visited: 341,
            states_expanded: 85,
            memo_prunes: 64,
            depth_cutoffs: 192,
            distinct_states: 61,
        }
    );

    let report = solve(&table, &unreachable_state(), 6);
    assert_eq!(report.outcome, SearchOutcome::NotFound { max_depth: 6 });
    assert_eq!(report.stats.states_expanded, 401);
    assert_eq!(report.stats.distinct_states, 253);

    // Every color is the same so every move leads back to the root
    let report = solve(&table, &StateVector::new(vec![Color::Red; 28]), 4);
    assert_eq!(report.outcome, SearchOutcome::NotFound { max_depth: 4 });
    assert_eq!(report.stats.states_expanded, 1);
    assert_eq!(report.stats.memo_prunes, 4);
}

#[test_log::test]
fn test_top_swap_beyond_small_bound() {
    let table = pyraminx();
    let report = solve(&table, &Preset::TopSwap.state(), 4);
    assert_eq!(report.outcome, SearchOutcome::NotFound { max_depth: 4 });
    assert_eq!(report.stats.states_expanded, 85);
}

#[test_log::test]
fn test_deterministic() {
    let table = pyraminx();
    for (initial, max_depth) in [
        (scrambled("t"), 5),
        (unreachable_state(), 5),
        (scrambled("r t r"), 6),
    ] {
        let first = solve(&table, &initial, max_depth);
        let second = solve(&table, &initial, max_depth);
        assert_eq!(first.outcome, second.outcome);
        assert_eq!(first.stats, second.stats);
    }
}

#[test_log::test]
fn test_counters_are_consistent() {
    let table = pyraminx();
    for initial in [unreachable_state(), Preset::Scrambled.state()] {
        let stats = solve(&table, &initial, 5).stats;
        // Every visited node is either cut off, pruned, or expanded
        assert_eq!(
            stats.nodes_visited,
            stats.depth_cutoffs + stats.memo_prunes + stats.states_expanded
        );
        // `r` and `t` each contribute two children per expansion; `l` none
        assert_eq!(stats.nodes_visited, 1 + 4 * stats.states_expanded);
        // A state is expanded again only when reached shallower than before
        assert!(stats.states_expanded >= stats.distinct_states as u64);
    }
}

#[test_log::test]
fn test_identity_move_does_not_change_search() {
    let table = pyraminx();
    let without_identity = table.without_identity_moves();
    for (initial, max_depth) in [(scrambled("t"), 3), (unreachable_state(), 4)] {
        let with = solve(&table, &initial, max_depth);
        let without = solve(&without_identity, &initial, max_depth);
        assert_eq!(with.outcome, without.outcome);
        assert_eq!(with.stats, without.stats);
    }
}

#[test_log::test]
fn test_random_scrambles_are_solved() {
    let mut rng = fastrand::Rng::with_seed(2024);
    for _ in 0..8 {
        let mut puzzle = Puzzle::pyraminx().unwrap();
        puzzle.scramble(3, &mut rng);
        let initial = puzzle.state().clone();
        // Each scramble token is undone by a single token, so depth 6 always
        // contains a solution
        let report = puzzle.solve(6).unwrap();
        assert_replays_to(puzzle.move_table(), &initial, &report, &StateVector::solved());
        assert!(report.solution().unwrap().len() <= 6);
        assert_eq!(puzzle.state(), &initial);
    }
}

#[test_log::test]
fn test_moves_of_other_orders() {
    let table = MoveTable::new(&MoveSetDef {
        name: "square".to_owned(),
        facelet_count: 4,
        moves: vec![
            MoveDef {
                name: "a".to_owned(),
                permutation: vec![1, 0, 2, 3],
            },
            MoveDef {
                name: "c".to_owned(),
                permutation: vec![1, 2, 3, 0],
            },
        ],
    })
    .unwrap();
    assert_eq!(
        table.moves().iter().map(|move_| move_.order()).collect_vec(),
        vec![2, 4]
    );

    let goal: StateVector = "r y g b".parse().unwrap();
    let engine = SearchEngine::new(&table)
        .with_goal(goal.clone())
        .with_max_depth(3);
    for tokens in ["a", "c", "cc", "a c", "c a cc"] {
        let initial = table.apply_tokens(&goal, tokens).unwrap();
        let report = engine.solve(&initial).unwrap();
        assert_replays_to(&table, &initial, &report, &goal);
    }

    let report = engine.solve(&goal).unwrap();
    assert!(report.solution().unwrap().is_empty());
}

#[test_log::test]
fn test_multi_letter_move_names_replay() {
    let move_set_def = |names: [&str; 2]| MoveSetDef {
        name: "prefixed".to_owned(),
        facelet_count: 4,
        moves: vec![
            MoveDef {
                name: names[0].to_owned(),
                permutation: vec![1, 2, 0, 3],
            },
            MoveDef {
                name: names[1].to_owned(),
                permutation: vec![0, 1, 3, 2],
            },
        ],
    };
    // `aa` would read as either move
    assert!(MoveTable::new(&move_set_def(["a", "aa"])).is_err());

    let table = MoveTable::new(&move_set_def(["a", "ab"])).unwrap();
    let goal: StateVector = "r y g b".parse().unwrap();
    let engine = SearchEngine::new(&table)
        .with_goal(goal.clone())
        .with_max_depth(3);
    for tokens in ["a", "ab", "ab a", "aa ab"] {
        let initial = table.apply_tokens(&goal, tokens).unwrap();
        let report = engine.solve(&initial).unwrap();
        assert_replays_to(&table, &initial, &report, &goal);
    }
}
