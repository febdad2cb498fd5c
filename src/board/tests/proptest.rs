//! Property-based tests: random short games should never corrupt basic
//! invariants (piece counts, hash/SFEN round trip, make/unmake symmetry).

use proptest::prelude::*;

use crate::board::{Board, Square};

fn total_pieces_on_board_and_in_hand(board: &Board) -> u32 {
    let mut count = 0u32;
    for rank in 0..9 {
        for file in 0..9 {
            let sq = Square::try_new(rank, file).unwrap();
            if board.piece_at(sq).is_some() {
                count += 1;
            }
        }
    }
    for color in [crate::board::Color::Black, crate::board::Color::White] {
        for (_piece, held) in board.hand(color).iter() {
            count += u32::from(held);
        }
    }
    count
}

fn play_random_game(seed_choices: &[usize], max_plies: usize) -> Board {
    let mut board = Board::new();
    for &choice in seed_choices.iter().take(max_plies) {
        let moves = board.generate_moves();
        if moves.is_empty() {
            break;
        }
        let mv = moves.get(choice % moves.len()).unwrap();
        board.make_move(mv);
    }
    board
}

proptest! {
    #[test]
    fn piece_count_is_conserved_across_random_play(choices in prop::collection::vec(0usize..64, 1..30)) {
        let start = Board::new();
        let initial_total = total_pieces_on_board_and_in_hand(&start);

        let board = play_random_game(&choices, 30);
        let final_total = total_pieces_on_board_and_in_hand(&board);
        prop_assert_eq!(initial_total, final_total, "captures move pieces to hand, never off the board entirely");
    }

    #[test]
    fn sfen_round_trip_preserves_perft(choices in prop::collection::vec(0usize..64, 1..20)) {
        let board = play_random_game(&choices, 20);
        let sfen = board.to_sfen();
        let mut reloaded = Board::try_from_sfen(&sfen).expect("a board's own sfen output should always reparse");
        let mut original = board;
        prop_assert_eq!(original.perft(1), reloaded.perft(1));
    }

    #[test]
    fn make_then_unmake_restores_the_hash(choices in prop::collection::vec(0usize..64, 1..20)) {
        let mut board = play_random_game(&choices, 20);
        let moves = board.generate_moves();
        prop_assume!(!moves.is_empty());
        let before = board.hash();
        let mv = moves.first().unwrap();
        let info = board.make_move(mv);
        board.unmake_move(info);
        prop_assert_eq!(board.hash(), before);
    }
}
