use celestial_bot::{BotDifficulty, play_player_hand, spawn_strategy};
use celestial_core::game::state::GameState;
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};

fn bench_full_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("strategy_decision");
    for difficulty in [BotDifficulty::Moderate, BotDifficulty::Hard] {
        for seed in [42u64, 1040, 8675309] {
            group.bench_function(format!("{}_match_seed{}", difficulty.label(), seed), |b| {
                b.iter_batched(
                    || {
                        let enemy = spawn_strategy(difficulty, Some(seed));
                        let state = GameState::with_seed(seed, enemy);
                        let seat = spawn_strategy(difficulty, Some(seed + 1));
                        (state, seat)
                    },
                    |(mut state, mut seat)| {
                        while play_player_hand(&mut state, seat.as_mut()) {}
                        state.hands_played()
                    },
                    BatchSize::SmallInput,
                )
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_full_match);
criterion_main!(benches);
