//! Performance tests for move generation: known node counts from the
//! starting position and a couple of hand-constructed positions.

use crate::board::Board;

#[test]
fn startpos_perft_one() {
    let mut board = Board::new();
    assert_eq!(board.perft(1), 30);
}

#[test]
fn startpos_perft_two_matches_sum_of_replies() {
    let mut board = Board::new();
    let moves = board.generate_moves();
    let mut total = 0u64;
    for mv in moves.iter() {
        let info = board.make_move(*mv);
        total += board.generate_moves().len() as u64;
        board.unmake_move(info);
    }
    assert_eq!(board.perft(2), total);
}

#[test]
fn perft_zero_is_one() {
    let mut board = Board::new();
    assert_eq!(board.perft(0), 1);
}

#[test]
fn perft_on_a_hand_heavy_position_counts_drops() {
    // A lone black pawn in hand on an otherwise empty board (minus the
    // two kings) can drop on any square except the last rank (no forward
    // move left), the two occupied king squares, and the file already
    // holding a pawn -- none, here.
    let mut board = Board::from_sfen("4k4/9/9/9/9/9/9/9/4K4 b P 1");
    let nodes = board.perft(1);
    assert!(nodes > 60, "expected many legal drop targets, got {nodes}");
}
