//! End-to-end tests driving the compiled engine binary over stdin/stdout,
//! the way a Shogi GUI would speak USI to it.

use std::io::Write;
use std::process::{Command, Stdio};

use shogi_engine::board::Board;
use shogi_engine::usi::parse_position_command;

fn run_usi(input: &str) -> String {
    let exe = env!("CARGO_BIN_EXE_shogi_engine");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("failed to spawn engine binary");

    child.stdin.as_mut().unwrap().write_all(input.as_bytes()).unwrap();
    let output = child.wait_with_output().expect("failed to read output");
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn usi_handshake_reports_usiok_and_readyok() {
    let stdout = run_usi("usi\nisready\nquit\n");
    assert!(stdout.contains("usiok"));
    assert!(stdout.contains("readyok"));
    assert!(stdout.contains("id name"));
}

#[test]
fn usi_smoke_test_returns_legal_move() {
    let stdout = run_usi("usi\nisready\nposition startpos moves e7e6\ngo movetime 100\nquit\n");

    let bestmove_line = stdout
        .lines()
        .filter(|line| line.starts_with("bestmove"))
        .last()
        .expect("no bestmove found");

    let parts: Vec<&str> = bestmove_line.split_whitespace().collect();
    assert!(parts.len() >= 2, "bestmove line missing a move: {bestmove_line}");
    let mv_str = parts[1];
    assert_ne!(mv_str, "resign", "engine should find a move from a fresh position");

    let mut board = Board::new();
    let position_parts = ["position", "startpos", "moves", "e7e6"];
    parse_position_command(&mut board, &position_parts);
    let mv = board.parse_move(mv_str);
    assert!(mv.is_ok(), "bestmove {mv_str} should be legal in the resulting position");
}

#[test]
fn usi_reports_resign_when_no_legal_reply_exists() {
    let stdout = run_usi("usi\nisready\nposition sfen R7k/7pp/9/9/9/9/9/9/4K4 w - 1\ngo movetime 50\nquit\n");
    let bestmove_line = stdout
        .lines()
        .filter(|line| line.starts_with("bestmove"))
        .last()
        .expect("no bestmove found");
    assert_eq!(bestmove_line, "bestmove resign");
}

#[test]
fn usi_setoption_hash_is_accepted() {
    let stdout = run_usi("usi\nsetoption name USI_Hash value 32\nisready\nquit\n");
    assert!(stdout.contains("readyok"));
}
