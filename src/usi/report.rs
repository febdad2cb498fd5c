use crate::board::Move;

use super::format_usi_move;

pub fn print_ready() {
    println!("readyok");
}

pub fn print_bestmove(best_move: Option<Move>, ponder_move: Option<Move>) {
    let Some(best_move) = best_move else {
        println!("bestmove resign");
        return;
    };
    match ponder_move {
        Some(ponder) => println!("bestmove {} ponder {}", format_usi_move(&best_move), format_usi_move(&ponder)),
        None => println!("bestmove {}", format_usi_move(&best_move)),
    }
}
