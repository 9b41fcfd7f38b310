//! Drives the board and the solver by hand, the way a host application
//! would, without going through `Trainer`.

use jigsaw_rl::{Board, QLearningSolver, SolverConfig};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

fn run_episode(solver: &mut QLearningSolver, start: Board, max_steps: usize) -> Option<usize> {
    let mut board = start;
    let mut steps = 0;
    while !board.is_solved() {
        if steps >= max_steps {
            return None;
        }
        let moves = board.legal_moves();
        let choice = solver.select_action(&board, &moves)?;
        let next = board.apply_move(moves[choice.index()]).unwrap();
        let reward = if next.is_solved() { 1.0 } else { 0.0 };
        solver.update(&board, choice.index(), reward, &next).unwrap();
        board = next;
        steps += 1;
    }
    Some(steps)
}

#[test]
fn test_one_move_from_solved_learns_the_winning_move() {
    let config = SolverConfig {
        initial_exploration: 1.0,
        exploration_decay: 0.9,
        min_exploration: 0.0,
        ..SolverConfig::with_side(2)
    };
    let mut solver = QLearningSolver::with_seed(config, 17).unwrap();
    let start = Board::from_tiles(2, vec![0, 3, 2, 1]).unwrap();

    for _ in 0..200 {
        assert!(run_episode(&mut solver, start.clone(), 10_000).is_some());
        solver.decay_exploration();
    }

    // Legal moves are [3, 0]; sliding tile 1 up from position 3 solves it.
    assert_eq!(solver.greedy_action(&start), Some(0));
    let q = solver.q_values(&start).unwrap();
    assert!(q[0] > q[1]);
}

#[test]
fn test_greedy_policy_solves_after_training() {
    let mut solver = QLearningSolver::with_seed(SolverConfig::with_side(2), 23).unwrap();
    let mut rng = StdRng::seed_from_u64(29);
    let solved = Board::solved(2).unwrap();

    // Solvable 2x2 starts, reached by random walks from the identity.
    let starts: Vec<Board> = (0..12)
        .map(|_| {
            let mut board = solved.clone();
            for _ in 0..7 {
                let moves = board.legal_moves();
                let mv = *moves.choose(&mut rng).unwrap();
                board = board.apply_move(mv).unwrap();
            }
            board
        })
        .collect();

    for episode in 0..2000 {
        let start = starts[episode % starts.len()].clone();
        assert!(run_episode(&mut solver, start, 100_000).is_some());
        solver.decay_exploration();
    }

    for start in &starts {
        let mut board = start.clone();
        for _ in 0..12 {
            if board.is_solved() {
                break;
            }
            let moves = board.legal_moves();
            let index = solver.greedy_action(&board).unwrap();
            board = board.apply_move(moves[index]).unwrap();
        }
        assert!(board.is_solved(), "greedy rollout stuck from {:?}", start.tiles());
    }
}
