use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use shogi_engine::bench;
use shogi_engine::board::{Board, SearchIterationInfo, DEFAULT_TT_MB};
use shogi_engine::engine::time::{TimeConfig, TimeControl};
use shogi_engine::engine::{EngineController, SearchParams};
use shogi_engine::usi::command::{parse_go_params, parse_usi_command, GoParams, UsiCommand};
use shogi_engine::usi::options::{parse_setoption, UsiOptionAction, UsiOptions};
use shogi_engine::usi::report::{print_bestmove, print_ready};
use shogi_engine::usi::parse_position_command;

fn print_iteration_info(info: &SearchIterationInfo) {
    let score_str = info
        .mate_in
        .map_or_else(|| format!("cp {}", info.score), |plies| format!("mate {plies}"));
    println!(
        "info depth {} seldepth {} multipv {} score {} nodes {} nps {} time {} tthits {} pv {}",
        info.depth, info.seldepth, info.multipv, score_str, info.nodes, info.nps, info.time_ms, info.tt_hits, info.pv
    );
    let _ = io::stdout().flush();
}

/// Root moves named by `go searchmoves`, resolved against `board`'s current
/// legal moves. Tokens that don't parse or don't match a legal move are
/// dropped rather than rejecting the whole command.
fn resolve_searchmoves(board: &Board, tokens: &[String]) -> Option<Vec<shogi_engine::board::Move>> {
    if tokens.is_empty() {
        return None;
    }
    let mut scratch = board.clone();
    let moves: Vec<_> = tokens.iter().filter_map(|t| scratch.parse_move(t).ok()).collect();
    if moves.is_empty() {
        None
    } else {
        Some(moves)
    }
}

fn build_search_params(go: &GoParams, options: &UsiOptions, stm_is_black: bool) -> SearchParams {
    if go.infinite {
        return SearchParams { infinite: true, node_limit: go.nodes.unwrap_or(0), ..Default::default() };
    }
    if let Some(depth) = go.depth {
        return SearchParams { depth: Some(depth), node_limit: go.nodes.unwrap_or(0), ..Default::default() };
    }

    let config = TimeConfig {
        move_overhead_ms: options.move_overhead_ms,
        soft_time_percent: options.soft_time_percent,
        hard_time_percent: options.hard_time_percent,
        default_max_nodes: options.default_max_nodes,
    };

    let time_left_ms = if stm_is_black { go.btime } else { go.wtime }.unwrap_or(0);
    let inc_ms = if stm_is_black { go.binc } else { go.winc }.unwrap_or(0);

    let time_control = if let Some(mt) = go.movetime {
        TimeControl::move_time_ms(mt)
    } else if let Some(byoyomi) = go.byoyomi {
        TimeControl::byoyomi_ms(time_left_ms, byoyomi)
    } else if time_left_ms > 0 {
        TimeControl::Incremental { time_left_ms, inc_ms, movestogo: None }
    } else {
        TimeControl::Infinite
    };

    let (soft_ms, hard_ms) = time_control.compute_limits(&config);
    SearchParams {
        soft_time_ms: if time_control.is_unlimited() { 0 } else { soft_ms },
        hard_time_ms: if time_control.is_unlimited() { 0 } else { hard_ms },
        node_limit: go.nodes.unwrap_or(0),
        ponder: go.ponder,
        infinite: time_control.is_unlimited(),
        ..Default::default()
    }
}

/// `bench`/`benchmark [depth]` run the built-in suite once and exit,
/// without entering the USI loop; any other argument (or none) enters USI
/// protocol mode on stdin/stdout.
fn run_cli_benchmark(args: &[String]) -> bool {
    let Some(first) = args.first() else { return false };
    if first != "bench" && first != "benchmark" {
        return false;
    }
    let depth = args.get(1).and_then(|v| v.parse::<u32>().ok()).unwrap_or(bench::DEFAULT_DEPTH);
    let summary = bench::run(depth);
    bench::print_summary(&summary);
    true
}

fn main() {
    let cli_args: Vec<String> = std::env::args().skip(1).collect();
    if run_cli_benchmark(&cli_args) {
        return;
    }

    let mut controller = EngineController::new(DEFAULT_TT_MB);
    let mut options = UsiOptions::new(DEFAULT_TT_MB);
    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let Some(command) = parse_usi_command(&line) else { continue };

        match command {
            UsiCommand::Usi => {
                let params = controller.with_search_state_ref(|s| s.params().clone());
                options.print(&params);
            }
            UsiCommand::IsReady => print_ready(),
            UsiCommand::UsiNewGame => controller.new_game(),
            UsiCommand::Position(parts) => {
                let str_parts: Vec<&str> = parts.iter().map(String::as_str).collect();
                let mut board = controller.board().clone();
                parse_position_command(&mut board, &str_parts);
                controller.set_board(board);
            }
            UsiCommand::Go(parts) => {
                let str_parts: Vec<&str> = parts.iter().map(String::as_str).collect();
                let go = parse_go_params(&str_parts);
                let stm_is_black = controller.board().side_to_move() == shogi_engine::board::Color::Black;
                let mut params = build_search_params(&go, &options, stm_is_black);
                params.root_moves = resolve_searchmoves(controller.board(), &go.searchmoves);
                params.multi_pv = options.multi_pv;
                controller.set_info_callback(Some(Arc::new(print_iteration_info)));
                // Report the result from the search thread itself so `stop`
                // and `ponderhit` keep being read from stdin while it runs.
                controller.start_search(params, move |result| {
                    print_bestmove(result.best_move, result.ponder_move);
                });
            }
            UsiCommand::Perft(depth) => {
                let mut board = controller.board().clone();
                let start = std::time::Instant::now();
                let nodes = board.perft(depth as u32);
                shogi_engine::usi::print::print_perft_info(depth, nodes, start.elapsed());
            }
            UsiCommand::Benchmark(depth) => {
                let summary = bench::run(depth);
                bench::print_summary(&summary);
            }
            UsiCommand::SetOption(parts) => {
                if let Some((name, value)) = parse_setoption(&parts.iter().map(String::as_str).collect::<Vec<_>>()) {
                    let action = controller.with_search_state(|state| {
                        options.apply_setoption(&name, value.as_deref(), state)
                    });
                    match action {
                        Some(UsiOptionAction::ReinitHash(mb)) => controller.resize_hash(mb),
                        Some(UsiOptionAction::SetThreads(_)) => {}
                        Some(UsiOptionAction::LoadEvalFile(path)) => {
                            if let Err(e) = controller.load_nnue(&path) {
                                eprintln!("info string failed to load EvalFile {path}: {e}");
                            }
                        }
                        None => {}
                    }
                }
            }
            UsiCommand::Stop => controller.signal_stop(),
            UsiCommand::PonderHit => controller.ponderhit(),
            UsiCommand::GameOver(_) => {}
            UsiCommand::Quit => break,
            UsiCommand::Unknown(line) => {
                eprintln!("info string unknown command: {line}");
            }
        }
    }

    controller.stop_search();
    std::thread::sleep(Duration::from_millis(1));
}
