//! Board-level integration tests: SFEN round trips, perft, and repetition.

use shogi_engine::board::{Board, Color};

#[test]
fn perft_startpos_depth_one() {
    let mut board = Board::new();
    assert_eq!(board.perft(1), 30, "the first player has exactly 30 legal moves from the starting position");
}

#[test]
fn perft_matches_after_sfen_round_trip() {
    let mut original = Board::new();
    let sfen = original.to_sfen();
    let mut reloaded = Board::try_from_sfen(&sfen).expect("round-tripped sfen should parse");
    assert_eq!(original.perft(2), reloaded.perft(2));
}

#[test]
fn nifu_forbids_second_pawn_on_same_file() {
    let mut board = Board::from_sfen("4k4/9/9/9/4P4/9/9/9/4K4 b P 1");
    let legal = board.generate_moves();
    let blocked_file_drop = legal.iter().any(|mv| mv.is_drop() && mv.to().file() == 4);
    assert!(!blocked_file_drop, "dropping a second pawn on a file that already has one is nifu");
}

#[test]
fn draw_by_fourfold_repetition() {
    let mut board = Board::new();
    let cycle = ["f9f8", "f1f2", "f8f9", "f2f1"];
    for _ in 0..3 {
        for mv_str in cycle {
            let mv = board.parse_move(mv_str).expect("shuffling the gold back and forth is legal");
            board.make_move(mv);
        }
    }
    assert!(board.is_repetition_draw(), "the position recurring a fourth time should be a draw");
}

#[test]
fn side_to_move_alternates() {
    let mut board = Board::new();
    assert_eq!(board.side_to_move(), Color::Black);
    let mv = board.parse_move("e7e6").expect("pawn push should be legal from the start position");
    board.make_move(mv);
    assert_eq!(board.side_to_move(), Color::White);
}
