use data_loader::TableSnapshot;
use std::path::Path;
use std::time::Instant;

fn main() {
    let data_dir = Path::new("data");

    println!("Loading recommendation tables...\n");

    let start = Instant::now();
    let snapshot = TableSnapshot::load_from_files(data_dir)
        .expect("Failed to load tables");
    let elapsed = start.elapsed();

    let counts = snapshot.counts();
    let rows = counts.personal_rows + counts.similar_edges + counts.popular_tracks;

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Personal rows: {} ({} users)", counts.personal_rows, counts.users);
    println!("Similarity edges: {} ({} seed tracks)", counts.similar_edges, counts.seed_tracks);
    println!("Popular tracks: {}", counts.popular_tracks);
    println!("\nPerformance: {:.0} rows/second",
             rows as f64 / elapsed.as_secs_f64());
}
