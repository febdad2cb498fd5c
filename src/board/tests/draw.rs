//! Draw detection. Shogi recognizes repetition (sennichite) but has no
//! fifty-move rule and no insufficient-material draw, so this only covers
//! the repetition table.

use crate::board::Board;

#[test]
fn fresh_position_is_not_a_repetition_draw() {
    let board = Board::new();
    assert!(!board.is_repetition_draw());
}

#[test]
fn position_recurring_four_times_is_a_draw() {
    let mut board = Board::new();
    let cycle = ["f9f8", "f1f2", "f8f9", "f2f1"];
    for _ in 0..3 {
        for mv_str in cycle {
            let mv = board.parse_move(mv_str).unwrap();
            board.make_move(mv);
        }
    }
    assert!(board.is_repetition_draw());
}

#[test]
fn position_recurring_only_three_times_is_not_yet_a_draw() {
    let mut board = Board::new();
    let cycle = ["f9f8", "f1f2", "f8f9", "f2f1"];
    for _ in 0..2 {
        for mv_str in cycle {
            let mv = board.parse_move(mv_str).unwrap();
            board.make_move(mv);
        }
    }
    assert!(!board.is_repetition_draw());
}

#[test]
fn push_and_pop_repetition_are_balanced() {
    let mut board = Board::new();
    let hash = board.hash();
    let first = board.push_repetition();
    assert_eq!(first, 1);
    let second = board.push_repetition();
    assert_eq!(second, 2);
    board.pop_repetition(hash);
    board.pop_repetition(hash);
}
