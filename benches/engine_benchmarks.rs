//! Benchmarks for the shogi engine: move generation, perft, search, and
//! static evaluation.

use std::sync::atomic::AtomicBool;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use shogi_engine::board::{find_best_move, Board, SearchState, DEFAULT_TT_MB};

fn bench_perft(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft");

    let mut startpos = Board::new();
    for depth in 1..=3 {
        group.bench_with_input(BenchmarkId::new("startpos", depth), &depth, |b, &depth| {
            b.iter(|| startpos.perft(black_box(depth)))
        });
    }

    // A midgame-ish position with open lines and a hand on both sides,
    // exercising drop generation alongside board moves.
    let mut midgame =
        Board::from_sfen("lnsgk1snl/1r4gb1/pppppp1pp/6p2/9/2P6/PP1PPPPPP/1B3G1R1/LNSGK1SNL b Pp 1");
    for depth in 1..=3 {
        group.bench_with_input(BenchmarkId::new("midgame", depth), &depth, |b, &depth| {
            b.iter(|| midgame.perft(black_box(depth)))
        });
    }

    group.finish();
}

fn bench_movegen(c: &mut Criterion) {
    let mut group = c.benchmark_group("movegen");

    let mut startpos = Board::new();
    group.bench_function("startpos", |b| b.iter(|| black_box(startpos.generate_moves())));

    let mut midgame =
        Board::from_sfen("lnsgk1snl/1r4gb1/pppppp1pp/6p2/9/2P6/PP1PPPPPP/1B3G1R1/LNSGK1SNL b Pp 1");
    group.bench_function("midgame", |b| b.iter(|| black_box(midgame.generate_moves())));

    // A position with several pieces in hand, so drop generation dominates.
    let mut hand_heavy = Board::from_sfen("4k4/9/9/9/9/9/9/9/4K4 b RBGSNLP 1");
    group.bench_function("hand_heavy", |b| b.iter(|| black_box(hand_heavy.generate_moves())));

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(10);

    let stop = AtomicBool::new(false);

    for depth in [3, 4, 5] {
        group.bench_with_input(BenchmarkId::new("startpos", depth), &depth, |b, &depth| {
            b.iter(|| {
                let mut board = Board::new();
                let mut state = SearchState::new(DEFAULT_TT_MB);
                find_best_move(&mut board, &mut state, depth, &stop)
            })
        });
    }

    // A position with an immediate tactical resolution, so search spends
    // most of its time in quiescence rather than the main tree.
    for depth in [3, 4] {
        group.bench_with_input(BenchmarkId::new("tactical", depth), &depth, |b, &depth| {
            b.iter(|| {
                let mut board = Board::from_sfen("4k4/9/9/9/p8/9/9/9/R3K4 b - 1");
                let mut state = SearchState::new(DEFAULT_TT_MB);
                find_best_move(&mut board, &mut state, depth, &stop)
            })
        });
    }

    group.finish();
}

fn bench_eval(c: &mut Criterion) {
    let mut group = c.benchmark_group("eval");

    let positions = [
        ("startpos", "lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL b - 1"),
        ("midgame", "lnsgk1snl/1r4gb1/pppppp1pp/6p2/9/2P6/PP1PPPPPP/1B3G1R1/LNSGK1SNL b Pp 1"),
        ("endgame", "4k4/9/9/9/9/9/9/4R4/4K4 w - 1"),
    ];

    for (name, sfen) in positions {
        let board = Board::from_sfen(sfen);
        group.bench_with_input(BenchmarkId::new("position", name), &board, |b, board| {
            b.iter(|| black_box(board.evaluate()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_perft, bench_movegen, bench_search, bench_eval);
criterion_main!(benches);
