use std::hint::black_box;

use arcade_core::minesweeper::{Minesweeper, MinesweeperConfig, MinesweeperMove};
use arcade_core::pac_man::{PacMan, PacManConfig};
use arcade_core::snake::{Snake, SnakeConfig};
use arcade_core::tetris::Tetris;
use arcade_core::{Clocked, Engine};
use criterion::{Criterion, criterion_group, criterion_main};

const SEEDS: u64 = 32;

fn minefield_tiers(c: &mut Criterion) {
    let tiers = [
        ("easy", MinesweeperConfig::EASY),
        ("medium", MinesweeperConfig::MEDIUM),
        ("hard", MinesweeperConfig::HARD),
    ];
    let mut group = c.benchmark_group("minefield_first_reveal");
    for (name, config) in tiers {
        let center = (config.size.0 / 2, config.size.1 / 2);
        group.bench_function(name, |b| {
            b.iter(|| {
                for seed in 0..SEEDS {
                    let mut game = Minesweeper::new(config, seed);
                    let outcome = game.submit(MinesweeperMove::Reveal(black_box(center)));
                    black_box(outcome.ok());
                }
            })
        });
    }
    group.finish();
}

/// One simulated minute at 60 frames per second.
fn clocked_minute(c: &mut Criterion) {
    let mut group = c.benchmark_group("clocked_minute");
    group.bench_function("snake", |b| {
        b.iter(|| {
            let mut game = Snake::new(SnakeConfig::default(), black_box(7));
            for _ in 0..3600 {
                game.tick(16);
            }
            black_box(game.snapshot().score)
        })
    });
    group.bench_function("tetris", |b| {
        b.iter(|| {
            let mut game = Tetris::new(black_box(7));
            for _ in 0..3600 {
                game.tick(16);
            }
            black_box(game.snapshot().score)
        })
    });
    group.bench_function("pac_man", |b| {
        b.iter(|| {
            let mut game = PacMan::new(PacManConfig::default(), black_box(7));
            for _ in 0..3600 {
                game.tick(16);
            }
            black_box(game.snapshot().score)
        })
    });
    group.finish();
}

criterion_group!(benches, minefield_tiers, clocked_minute);
criterion_main!(benches);
