use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{TableSnapshot, TrackId, UserId};
use rand::Rng;
use server::{AppState, MixedRecommendations, RecommendationMixer, SnapshotStore};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::info;

/// Track Mixer - music recommendation service
#[derive(Parser)]
#[command(name = "track-mixer")]
#[command(about = "Blends personal, similar-track and popular recommendations", long_about = None)]
struct Cli {
    /// Directory holding personal_als.csv, similar.csv and top_popular.csv
    #[arg(short, long, env = "TRACK_MIXER_DATA_DIR", default_value = "data", global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        #[arg(long, env = "TRACK_MIXER_HOST", default_value = "0.0.0.0")]
        host: String,

        #[arg(long, env = "TRACK_MIXER_PORT", default_value = "8010")]
        port: u16,
    },

    /// Mix recommendations for one user without starting the service
    Recommend {
        /// User ID to get recommendations for
        #[arg(long)]
        user_id: UserId,

        /// Recently played track, repeatable, oldest first
        #[arg(long = "history")]
        history: Vec<TrackId>,

        /// Number of recommendations to return
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Show row counts of the loaded tables
    Tables,

    /// Run benchmark to test mixing throughput
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "1000")]
        requests: usize,

        /// Number of requests in flight at once
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => handle_serve(&cli.data_dir, &host, port).await?,
        Commands::Recommend {
            user_id,
            history,
            limit,
        } => handle_recommend(&cli.data_dir, user_id, history, limit)?,
        Commands::Tables => handle_tables(&cli.data_dir)?,
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(&cli.data_dir, requests, concurrent).await?,
    }

    Ok(())
}

/// Strict load for the one-shot commands; a missing table is an error here
fn load_snapshot(data_dir: &Path) -> Result<Arc<TableSnapshot>> {
    println!("Loading tables from {}...", data_dir.display());
    let start = Instant::now();
    let snapshot = TableSnapshot::load_from_files(data_dir)
        .with_context(|| format!("Failed to load tables from {}", data_dir.display()))?;
    println!("{} Loaded tables in {:?}", "✓".green(), start.elapsed());
    Ok(Arc::new(snapshot))
}

/// Handle the 'serve' command
async fn handle_serve(data_dir: &Path, host: &str, port: u16) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid listen address {host}:{port}"))?;

    // Missing tables degrade to empty ones so the service still starts
    let data_dir = data_dir.to_path_buf();
    let state = tokio::task::spawn_blocking(move || {
        let store = SnapshotStore::from_dir(&data_dir);
        AppState::new(store, data_dir)
    })
    .await
    .context("Table loading task failed")?;

    let counts = state.store.load().counts();
    info!(
        users = counts.users,
        seed_tracks = counts.seed_tracks,
        popular_tracks = counts.popular_tracks,
        "Starting track mixer"
    );

    server::serve(state, addr).await
}

/// Handle the 'recommend' command
fn handle_recommend(
    data_dir: &Path,
    user_id: UserId,
    history: Vec<TrackId>,
    limit: usize,
) -> Result<()> {
    let snapshot = load_snapshot(data_dir)?;
    let user_id = data_loader::canonical_id(&user_id).unwrap_or_default();
    let history: Vec<TrackId> = history
        .iter()
        .filter_map(|id| data_loader::canonical_id(id))
        .collect();

    let mixer = RecommendationMixer::new(snapshot);
    let mixed = mixer.mix(&user_id, &history, limit)?;

    print_recommendations(&user_id, &history, &mixed);
    Ok(())
}

/// Handle the 'tables' command
fn handle_tables(data_dir: &Path) -> Result<()> {
    let snapshot = load_snapshot(data_dir)?;
    let counts = snapshot.counts();

    println!("{}", "Lookup tables:".bold().blue());
    println!(
        "{}personal: {} rows for {} users",
        "• ".green(),
        counts.personal_rows,
        counts.users
    );
    println!(
        "{}similar: {} edges from {} seed tracks",
        "• ".green(),
        counts.similar_edges,
        counts.seed_tracks
    );
    println!("{}popular: {} tracks", "• ".green(), counts.popular_tracks);

    println!("{}", "Top popular:".bold());
    for (rank, track) in snapshot.popular().iter().take(5).enumerate() {
        println!(
            "  {}. {} ({:.2})",
            rank + 1,
            track.track_id,
            track.popularity_score
        );
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(data_dir: &Path, requests: usize, concurrent: usize) -> Result<()> {
    if requests == 0 {
        bail!("--requests must be at least 1");
    }

    let snapshot = load_snapshot(data_dir)?;
    let mixer = RecommendationMixer::new(snapshot.clone());

    // Random known users, each with a short random history from the popular head
    let users: Vec<UserId> = snapshot.user_ids().cloned().collect();
    let head: Vec<TrackId> = snapshot
        .popular()
        .iter()
        .take(1000)
        .map(|p| p.track_id.clone())
        .collect();
    let mut rng = rand::rng();
    let workload: Vec<(UserId, Vec<TrackId>)> = (0..requests)
        .map(|i| {
            let user = if users.is_empty() {
                format!("unknown-{i}")
            } else {
                users[rng.random_range(0..users.len())].clone()
            };
            let history_len = if head.is_empty() { 0 } else { rng.random_range(0..=5) };
            let history = (0..history_len)
                .map(|_| head[rng.random_range(0..head.len())].clone())
                .collect();
            (user, history)
        })
        .collect();

    let semaphore = Arc::new(Semaphore::new(concurrent.max(1)));
    let wall_clock = Instant::now();
    let mut handles = Vec::with_capacity(requests);
    for (user, history) in workload {
        let mixer = mixer.clone();
        let permit = semaphore.clone().acquire_owned().await?;
        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let start = Instant::now();
            mixer.mix(&user, &history, 10)?;
            Ok::<_, anyhow::Error>(start.elapsed())
        }));
    }

    let mut timings: Vec<Duration> = Vec::with_capacity(requests);
    for handle in handles {
        timings.push(handle.await??);
    }
    let total_time = wall_clock.elapsed();

    timings.sort();
    let avg_latency = timings.iter().sum::<Duration>() / timings.len() as u32;
    let percentile = |p: f64| timings[((timings.len() - 1) as f64 * p) as usize];
    let throughput = requests as f64 / total_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} concurrent)", requests, concurrent.max(1));
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

fn print_recommendations(user_id: &str, history: &[TrackId], mixed: &MixedRecommendations) {
    println!(
        "{}",
        format!("Recommendations for user {}:", user_id).bold().blue()
    );
    if !history.is_empty() {
        println!("Online history: {}", history.join(", "));
    }
    println!("Strategy: {}", mixed.strategy.as_str().yellow());

    if mixed.tracks.is_empty() {
        println!("{}", "(no recommendations)".dimmed());
    }
    for (rank, track_id) in mixed.tracks.iter().enumerate() {
        println!("{}. {}", (rank + 1).to_string().green(), track_id);
    }
}
