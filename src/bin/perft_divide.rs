use std::env;
use std::time::Instant;

use shogi_engine::board::Board;

fn main() {
    let args: Vec<String> = env::args().collect();
    let depth: u32 = args.get(1).and_then(|v| v.parse().ok()).unwrap_or(3);
    let sfen = args.get(2).map(String::as_str);

    let mut board = sfen.map_or_else(Board::new, |s| {
        Board::try_from_sfen(s).unwrap_or_else(|e| panic!("invalid sfen: {e}"))
    });

    println!("Perft divide depth {depth}");
    let start = Instant::now();
    let mut total = 0u64;
    let root_moves = board.generate_moves();
    for mv in root_moves.iter() {
        let info = board.make_move(*mv);
        let cnt = if depth > 0 { board.perft(depth - 1) } else { 1 };
        board.unmake_move(info);
        println!("  {mv}: {cnt}");
        total += cnt;
    }
    let dur = start.elapsed();
    println!("Total: {total} in {dur:?}");
}
