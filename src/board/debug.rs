use super::{Bitboard, Board, Color, Piece};

#[cfg(debug_assertions)]
impl Board {
    /// Debug helper to print all per-piece bitboards plus hands.
    pub fn debug_bitboards(&self) {
        println!("Side to move: {:?}", self.side_to_move);
        println!("All occupied: {:#024x}", self.all_occupied.0);

        for color in Color::BOTH {
            for piece in Piece::ALL {
                let bb = self.pieces[color.index()][piece.index()].0;
                if bb != 0 {
                    println!("{color:?} {piece:?}: {bb:#024x}");
                }
            }
            println!("{color:?} hand: {:?}", self.hands[color.index()]);
        }
        println!("------------------------------------");
    }

    pub fn print_bitboard_grid(&self, label: &str, bb: Bitboard) {
        println!("{label} {:#024x}", bb.0);
        println!("  +---+---+---+---+---+---+---+---+---+");
        for rank in 0..9 {
            print!("{} |", rank + 1);
            for file in (0..9).rev() {
                let idx = rank * 9 + file;
                let ch = if (bb.0 >> idx) & 1 == 1 { '1' } else { '.' };
                print!(" {ch} |");
            }
            println!("\n  +---+---+---+---+---+---+---+---+---+");
        }
        println!("    9   8   7   6   5   4   3   2   1");
        println!("------------------------------------");
    }
}
