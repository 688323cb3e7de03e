//! Benchmarks for the recommendation mixer
//!
//! Run with: cargo bench --package server
//!
//! Uses a synthetic snapshot so it runs without the data directory.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_loader::{PersonalRecommendation, PopularTrack, SimilarTrack, TableSnapshot};
use server::RecommendationMixer;
use std::sync::Arc;

const USERS: usize = 1_000;
const TRACKS: usize = 20_000;

fn synthetic_snapshot() -> Arc<TableSnapshot> {
    let mut personal = Vec::with_capacity(USERS * 50);
    for user in 0..USERS {
        for k in 0..50 {
            personal.push(PersonalRecommendation {
                user_id: user.to_string(),
                track_id: ((user * 31 + k * 7) % TRACKS).to_string(),
                score: 1.0 / (k + 1) as f32,
            });
        }
    }

    let mut similar = Vec::with_capacity(TRACKS * 10);
    for track in 0..TRACKS {
        for k in 1..=10 {
            similar.push(SimilarTrack {
                track_id: track.to_string(),
                similar_track_id: ((track + k * 13) % TRACKS).to_string(),
                similarity_score: 1.0 / k as f32,
            });
        }
    }

    let popular = (0..TRACKS)
        .map(|track| PopularTrack {
            track_id: track.to_string(),
            popularity_score: (TRACKS - track) as f32,
        })
        .collect();

    Arc::new(TableSnapshot::from_rows(personal, similar, popular))
}

fn bench_mix_personal_only(c: &mut Criterion) {
    let mixer = RecommendationMixer::new(synthetic_snapshot());

    c.bench_function("mix_personal_only", |b| {
        b.iter(|| {
            let result = mixer.mix(black_box("42"), black_box(&[]), black_box(10));
            black_box(result)
        })
    });
}

fn bench_mix_with_history(c: &mut Criterion) {
    let mixer = RecommendationMixer::new(synthetic_snapshot());
    let history: Vec<String> = (0..20).map(|t| (t * 101).to_string()).collect();

    c.bench_function("mix_with_history", |b| {
        b.iter(|| {
            let result = mixer.mix(black_box("42"), black_box(&history), black_box(10));
            black_box(result)
        })
    });
}

fn bench_mix_cold_start_large_n(c: &mut Criterion) {
    let mixer = RecommendationMixer::new(synthetic_snapshot());

    c.bench_function("mix_cold_start_n500", |b| {
        b.iter(|| {
            let result = mixer.mix(black_box("unknown"), black_box(&[]), black_box(500));
            black_box(result)
        })
    });
}

criterion_group!(
    benches,
    bench_mix_personal_only,
    bench_mix_with_history,
    bench_mix_cold_start_large_n
);
criterion_main!(benches);
