//! Criterion benchmarks for key code translation tables.
//!
//! Measures evdev→KeyCode, VK→KeyCode and name parsing.  The first two run
//! on the capture thread for every key event.
//!
//! Run with:
//! ```bash
//! cargo bench --package hidrelay-core --bench keymap_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hidrelay_core::keymap::KeyMapper;
use hidrelay_core::KeyCode;

// ── Representative codes ──────────────────────────────────────────────────────

/// evdev codes: letters, digits, named keys, modifiers, grave and one unmapped.
const BENCH_EVDEV_CODES: &[u16] = &[30, 44, 2, 11, 28, 1, 14, 15, 57, 59, 88, 29, 42, 56, 125, 105, 106, 103, 108, 41, 240];

/// A slice of Windows VK codes that map to common keys.
const BENCH_VK_CODES: &[u8] = &[
    0x41, // 'A'
    0x5A, // 'Z'
    0x0D, // VK_RETURN
    0x1B, // VK_ESCAPE
    0x08, // VK_BACK
    0x09, // VK_TAB
    0x20, // VK_SPACE
    0x70, // VK_F1
    0x7B, // VK_F12
    0xA2, // VK_LCONTROL
    0xA0, // VK_LSHIFT
    0xA4, // VK_LMENU
    0x25, // VK_LEFT
    0x27, // VK_RIGHT
    0xC0, // VK_OEM_3 (`)
    0xFF, // No mapping (unmapped VK)
];

// ── Benchmarks: evdev translation ─────────────────────────────────────────────

fn bench_evdev_to_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("keymap_evdev");

    group.bench_function("evdev_to_key_single", |b| {
        b.iter(|| KeyMapper::evdev_to_key(black_box(30)))
    });

    group.bench_function("evdev_to_key_batch", |b| {
        b.iter(|| {
            BENCH_EVDEV_CODES
                .iter()
                .map(|&code| KeyMapper::evdev_to_key(black_box(code)))
                .collect::<Vec<_>>()
        })
    });

    group.finish();
}

// ── Benchmarks: Windows VK translation ───────────────────────────────────────

fn bench_windows_vk_to_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("keymap_windows_vk");

    group.bench_function("vk_to_key_single", |b| {
        b.iter(|| KeyMapper::windows_vk_to_key(black_box(0x41)))
    });

    group.bench_function("vk_to_key_batch", |b| {
        b.iter(|| {
            BENCH_VK_CODES
                .iter()
                .map(|&vk| KeyMapper::windows_vk_to_key(black_box(vk)))
                .collect::<Vec<_>>()
        })
    });

    group.finish();
}

// ── Benchmarks: configuration name parsing ───────────────────────────────────

fn bench_from_name(c: &mut Criterion) {
    let mut group = c.benchmark_group("keymap_names");

    for name in ["KEY_A", "KEY_GRAVE", "MediaTrackPrevious", "NOT_A_KEY"] {
        group.bench_with_input(BenchmarkId::new("from_name", name), name, |b, name| {
            b.iter(|| KeyCode::from_name(black_box(name)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_evdev_to_key, bench_windows_vk_to_key, bench_from_name);
criterion_main!(benches);
