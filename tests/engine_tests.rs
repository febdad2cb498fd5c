//! Integration tests for `EngineController`: starting, stopping, and
//! resizing searches through the same API the USI front end drives.

use std::sync::mpsc;
use std::time::Duration;

use shogi_engine::engine::{EngineController, SearchParams};

#[test]
fn depth_limited_search_returns_a_legal_move() {
    let mut controller = EngineController::new(16);
    let (tx, rx) = mpsc::channel();

    controller.start_search(SearchParams { depth: Some(3), ..Default::default() }, move |result| {
        let _ = tx.send(result);
    });

    let result = rx.recv_timeout(Duration::from_secs(10)).expect("search should complete");
    assert!(result.best_move.is_some(), "depth 3 from the starting position should find a move");
}

#[test]
fn time_limited_search_respects_the_hard_deadline() {
    let mut controller = EngineController::new(16);
    let (tx, rx) = mpsc::channel();

    let started = std::time::Instant::now();
    controller.start_search(
        SearchParams { soft_time_ms: 50, hard_time_ms: 100, ..Default::default() },
        move |result| {
            let _ = tx.send(result);
        },
    );

    let result = rx.recv_timeout(Duration::from_secs(10)).expect("search should complete");
    assert!(result.best_move.is_some());
    assert!(started.elapsed() < Duration::from_secs(5), "search overran its hard deadline");
}

#[test]
fn stop_search_joins_a_running_search() {
    let mut controller = EngineController::new(16);
    controller.start_search(SearchParams { infinite: true, ..Default::default() }, |_| {});
    assert!(controller.is_searching());
    controller.stop_search();
    assert!(!controller.is_searching());
}

#[test]
fn new_game_resets_the_board_to_the_starting_position() {
    let mut controller = EngineController::new(16);
    let mv = controller.board_mut().parse_move("e7e6").expect("legal opening move");
    controller.board_mut().make_move(mv);
    controller.new_game();
    assert_eq!(controller.board().to_sfen(), shogi_engine::board::Board::new().to_sfen());
}

#[test]
fn resize_hash_does_not_panic_mid_session() {
    let mut controller = EngineController::new(16);
    controller.resize_hash(4);
    controller.resize_hash(32);
}
