//! Criterion benchmarks for the text wire encoder.
//!
//! The encoder runs once per captured event, so at several hundred mouse
//! samples per second it sits directly on the hot path.
//!
//! Run with:
//! ```bash
//! cargo bench --package hidrelay-core --bench encode_bench
//! ```

use std::time::{Duration, Instant};

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hidrelay_core::domain::rate_limit::MoveRateLimiter;
use hidrelay_core::{encode, ButtonEdge, InputEvent, KeyCode, KeyEdge, ModifierState, MouseButton};

// ── Event fixtures ────────────────────────────────────────────────────────────

fn fixtures() -> Vec<(&'static str, InputEvent, ModifierState)> {
    let none = ModifierState::default();
    let chord = ModifierState { shift: true, ctrl: true, alt: true };
    vec![
        ("KeyLetter", InputEvent::key(KeyCode::KeyA, KeyEdge::Down), none),
        ("KeyNamed", InputEvent::key(KeyCode::Enter, KeyEdge::Down), none),
        ("KeyChord", InputEvent::key(KeyCode::KeyT, KeyEdge::Down), chord),
        ("KeyUnmapped", InputEvent::key(KeyCode::AudioMute, KeyEdge::Down), none),
        ("KeyUp", InputEvent::key(KeyCode::KeyA, KeyEdge::Up), none),
        (
            "Click",
            InputEvent::MouseButton { button: MouseButton::Left, edge: ButtonEdge::Down },
            none,
        ),
        ("Move", InputEvent::MouseMove { dx: 12, dy: -7 }, none),
        ("Scroll", InputEvent::MouseWheel { delta: -1 }, none),
    ]
}

// ── Benchmark groups ──────────────────────────────────────────────────────────

/// Benchmarks `encode` for every event shape.
fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    for (name, event, mods) in fixtures() {
        group.bench_with_input(BenchmarkId::new("event", name), &(event, mods), |b, (event, mods)| {
            b.iter(|| encode(black_box(event), black_box(*mods)))
        });
    }
    group.finish();
}

/// Benchmarks a 1 kHz mouse burst through the rate limiter and encoder.
fn bench_move_burst(c: &mut Criterion) {
    let mut group = c.benchmark_group("move_burst");
    group.bench_function("limit_and_encode_1000", |b| {
        b.iter(|| {
            let mut limiter = MoveRateLimiter::default();
            let start = Instant::now();
            let mut sent = 0usize;
            for i in 0..1000u64 {
                let now = start + Duration::from_millis(i);
                if let Some((dx, dy)) = limiter.offer(black_box(1), black_box(-1), now) {
                    let event = InputEvent::MouseMove { dx, dy };
                    if encode(&event, ModifierState::default()).is_some() {
                        sent += 1;
                    }
                }
            }
            sent
        })
    });
    group.finish();
}

criterion_group!(benches, bench_encode, bench_move_burst);
criterion_main!(benches);
