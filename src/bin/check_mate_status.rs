use std::env;

use shogi_engine::board::Board;
use shogi_engine::usi::{format_usi_move, parse_position_command};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() <= 1 {
        eprintln!("usage: check_mate_status <move1> <move2> ...");
        return;
    }

    let mut board = Board::new();
    let mut parts: Vec<&str> = vec!["position", "startpos", "moves"];
    for mv in args.iter().skip(1) {
        parts.push(mv.as_str());
    }

    parse_position_command(&mut board, &parts);

    let legal_moves = board.generate_moves();
    let in_checkmate = board.is_checkmate();
    println!("side_to_move: {:?}", board.side_to_move());
    println!("in_check: {}", board.is_in_check(board.side_to_move()));
    println!("legal_moves: {}", legal_moves.len());
    println!("checkmate: {in_checkmate}");
    for mv in legal_moves.iter() {
        println!("{}", format_usi_move(mv));
    }
}
