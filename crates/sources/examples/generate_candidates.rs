//! Example: Generate candidates for a listener
//!
//! Run with: cargo run --package sources --example generate_candidates
//!
//! This example shows how to:
//! 1. Load the lookup tables
//! 2. Build a listening context
//! 3. Generate personal, similar-online and popular candidates
//! 4. Display the results

use data_loader::TableSnapshot;
use sources::{
    Candidate, ListeningContext, PersonalSource, PopularSource, SimilarTracksSource,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

fn print_candidates(title: &str, candidates: &[Candidate]) {
    println!("{} ({}):", title, candidates.len());
    for (i, candidate) in candidates.iter().enumerate() {
        match &candidate.seed {
            Some(seed) => println!(
                "  {}. {} (score: {:.3}, seed: {})",
                i + 1,
                candidate.track_id,
                candidate.base_score,
                seed
            ),
            None => println!(
                "  {}. {} (score: {:.3})",
                i + 1,
                candidate.track_id,
                candidate.base_score
            ),
        }
    }
    println!();
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    println!("=== Track Mixer Candidate Generation Example ===\n");

    println!("Loading recommendation tables...");
    let start = Instant::now();
    let snapshot = Arc::new(TableSnapshot::load_from_files(Path::new("data"))?);
    println!("Loaded tables in {:?}\n", start.elapsed());

    // Any user with personal rows will do
    let user_id = snapshot
        .user_ids()
        .next()
        .cloned()
        .unwrap_or_else(|| "unknown".to_string());
    let history: Vec<String> = snapshot
        .popular()
        .iter()
        .take(3)
        .map(|p| p.track_id.clone())
        .collect();
    let context = ListeningContext::new(user_id, history);
    println!("Target user: {}", context.user_id);
    println!("Online history: {:?}\n", context.online_history);

    let start = Instant::now();
    let personal = PersonalSource::new(snapshot.clone()).get_candidates(&context, 10);
    let similar = SimilarTracksSource::new(snapshot.clone()).get_candidates(&context.online_history, 2);
    let popular = PopularSource::new(snapshot.clone()).get_candidates(20);
    println!("Generated candidates in {:?}\n", start.elapsed());

    print_candidates("Personal", &personal);
    print_candidates("Similar to online history", &similar);
    print_candidates("Top popular", &popular);

    Ok(())
}
