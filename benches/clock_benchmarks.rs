use beat_trainer::chords::{ChordQuality, PitchClass, Tension, select_next};
use beat_trainer::{BeatClock, ChordSelection, TempoConfig, VirtualScheduler};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;

/// Dispatch cost of one minute of ticks at various subdivision counts
fn bench_clock_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("clock_dispatch");

    for subdivisions in [1, 4, 16] {
        group.bench_with_input(
            BenchmarkId::from_parameter(subdivisions),
            &subdivisions,
            |b, &subdivisions| {
                b.iter(|| {
                    let config = TempoConfig::metronome().with_bpm(240).with_subdivisions(subdivisions);
                    let mut clock = BeatClock::new(VirtualScheduler::new(), config);
                    clock.start();
                    black_box(clock.run_until(Duration::from_secs(60)))
                });
            },
        );
    }

    group.finish();
}

/// Restarting on every tempo change (slider drag)
fn bench_tempo_changes(c: &mut Criterion) {
    c.bench_function("tempo_change_restart", |b| {
        let mut clock = BeatClock::new(VirtualScheduler::new(), TempoConfig::metronome().with_subdivisions(4));
        clock.start();
        let mut bpm = 60;
        b.iter(|| {
            bpm = if bpm >= 300 { 60 } else { bpm + 1 };
            clock.set_config(clock.config().with_bpm(bpm));
            clock.advance(Duration::from_millis(5));
        });
    });
}

fn bench_chord_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("chord_selection");
    let mut rng = StdRng::seed_from_u64(1);

    let plain = ChordSelection::all();
    group.bench_function("no_tensions", |b| {
        b.iter(|| black_box(select_next(&plain, &mut rng)))
    });

    let full = ChordSelection::new(
        PitchClass::ALL.to_vec(),
        ChordQuality::ALL.to_vec(),
        Tension::ALL.to_vec(),
    );
    group.bench_function("all_tensions", |b| {
        b.iter(|| black_box(select_next(&full, &mut rng)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_clock_dispatch,
    bench_tempo_changes,
    bench_chord_selection
);
criterion_main!(benches);
