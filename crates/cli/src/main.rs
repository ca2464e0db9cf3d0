use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{ArtifactPaths, Artifacts, PopularityRow};
use rayon::prelude::*;
use recommender::cover::{cover_candidates, placeholder_caption};
use recommender::{EngineConfig, Recommendation, RecommendationEngine};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

/// BookVault - Book Recommendation Engine
#[derive(Parser)]
#[command(name = "bookvault")]
#[command(about = "Book recommendations from a precomputed similarity matrix", long_about = None)]
struct Cli {
    /// Directory holding the artifact files
    #[arg(short, long, default_value = "data/book-crossing")]
    data_dir: PathBuf,

    /// Catalog file name (relative to the data directory)
    #[arg(long, default_value = "books.dat")]
    books: PathBuf,

    /// Pivot table file name
    #[arg(long, default_value = "pt.dat")]
    pivot: PathBuf,

    /// Similarity matrix file name
    #[arg(long, default_value = "similarity.dat")]
    similarity: PathBuf,

    /// Popularity table file name (optional file)
    #[arg(long, default_value = "popular.dat")]
    popular: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get books similar to one you enjoyed
    Recommend {
        /// Exact title of the book
        #[arg(long)]
        title: String,

        /// Number of recommendations (at most 12)
        #[arg(long)]
        top_k: Option<usize>,

        /// Show similarity score and row position for each result
        #[arg(long)]
        explain: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show the most popular books
    Popular {
        /// Number of books to show
        #[arg(long)]
        limit: Option<usize>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List titles that can be used with `recommend`
    Titles {
        /// Only titles containing this text (case-insensitive)
        #[arg(long)]
        contains: Option<String>,
    },

    /// Show the catalog record and cover URLs for a title
    Lookup {
        /// Exact title of the book
        #[arg(long)]
        title: String,
    },

    /// Run benchmark to test lookup performance
    Benchmark {
        /// Number of lookups to make
        #[arg(long, default_value = "1000")]
        requests: usize,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let paths = ArtifactPaths::default()
        .with_books(&cli.books)
        .with_pivot(&cli.pivot)
        .with_similarity(&cli.similarity)
        .with_popular(&cli.popular);

    // Load once; everything after this is read-only
    let start = Instant::now();
    let artifacts = Artifacts::load_from_files(&cli.data_dir, &paths).with_context(|| {
        format!(
            "Failed to load artifacts from {}. Please place them in that directory.",
            cli.data_dir.display()
        )
    })?;
    let engine = RecommendationEngine::new(artifacts).with_config(EngineConfig::default());
    info!("Loaded artifacts in {:?}", start.elapsed());

    match cli.command {
        Commands::Recommend {
            title,
            top_k,
            explain,
            json,
        } => handle_recommend(&engine, &title, top_k, explain, json)?,
        Commands::Popular { limit, json } => handle_popular(&engine, limit, json)?,
        Commands::Titles { contains } => handle_titles(&engine, contains),
        Commands::Lookup { title } => handle_lookup(&engine, &title),
        Commands::Benchmark { requests } => handle_benchmark(&engine, requests),
    }

    Ok(())
}

/// Handle the 'recommend' command
fn handle_recommend(
    engine: &RecommendationEngine,
    title: &str,
    top_k: Option<usize>,
    explain: bool,
    json: bool,
) -> Result<()> {
    let config = engine.config();
    let k = config.clamp_top_k(top_k.unwrap_or(config.default_top_k));

    let recommendations = engine.recommend(title, k);

    if json {
        println!("{}", serde_json::to_string_pretty(&recommendations)?);
        return Ok(());
    }

    if recommendations.is_empty() {
        println!(
            "{} No recommendations for '{}'. Try another selection.",
            "!".yellow(),
            title
        );
        return Ok(());
    }

    print_recommendations(title, &recommendations, explain);
    Ok(())
}

/// Handle the 'popular' command
fn handle_popular(engine: &RecommendationEngine, limit: Option<usize>, json: bool) -> Result<()> {
    let rows = engine.top_popular(limit.unwrap_or(engine.config().popular_limit));

    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("{} No popular books data found.", "i".cyan());
        return Ok(());
    }

    println!("{}", "Most Popular Books:".bold().blue());
    for (rank, row) in rows.iter().enumerate() {
        print_popular_row(rank + 1, row);
    }
    Ok(())
}

fn print_popular_row(rank: usize, row: &PopularityRow) {
    println!(
        "{}. {} by {}",
        rank.to_string().green(),
        row.title.bold(),
        row.author.italic()
    );
    print!("   {} {:.1}  {} ratings", "⭐".yellow(), row.avg_rating, row.num_rating);
    if let Some(year) = row.publication_year {
        print!("  Published: {}", year);
    }
    println!();
}

/// Handle the 'titles' command
fn handle_titles(engine: &RecommendationEngine, contains: Option<String>) {
    let needle = contains.map(|s| s.to_lowercase());
    let mut shown = 0;
    for title in engine.list_known_titles() {
        if title_matches(needle.as_deref(), title) {
            println!("{}", title);
            shown += 1;
        }
    }
    if shown == 0 {
        println!("{} Your pivot table has no matching titles.", "!".yellow());
    }
}

/// No needle matches everything; `needle` is already lowercase
fn title_matches(needle: Option<&str>, title: &str) -> bool {
    needle.is_none_or(|n| title.to_lowercase().contains(n))
}

/// Handle the 'lookup' command
fn handle_lookup(engine: &RecommendationEngine, title: &str) {
    let in_model = engine.model().row_index_of(title).is_some();

    match engine.lookup_by_title(title) {
        Some(book) => {
            println!("{}", book.title.bold().blue());
            println!("{}Author: {}", "• ".green(), book.author);
            println!("{}ISBN: {}", "• ".green(), book.isbn);
            if let Some(year) = book.year_of_publication {
                println!("{}Published: {}", "• ".green(), year);
            }
            if let Some(publisher) = &book.publisher {
                println!("{}Publisher: {}", "• ".green(), publisher);
            }
            println!("{}Can recommend from: {}", "• ".cyan(), in_model);
            println!("Cover candidates:");
            for url in cover_candidates(book) {
                println!("  - {}", url);
            }
        }
        None => {
            println!("{} '{}' is not in the catalog.", "!".yellow(), title);
            println!("{}Can recommend from: {}", "• ".cyan(), in_model);
            println!("Placeholder cover:");
            for line in placeholder_caption(title) {
                println!("  | {}", line);
            }
        }
    }
}

/// Handle the 'benchmark' command
fn handle_benchmark(engine: &RecommendationEngine, requests: usize) {
    let titles: Vec<&str> = engine.list_known_titles().collect();
    if titles.is_empty() || requests == 0 {
        println!("Nothing to benchmark.");
        return;
    }

    // Random known titles
    let queries: Vec<&str> = (0..requests)
        .map(|_| titles[rand::random_range(0..titles.len())])
        .collect();
    let k = engine.config().default_top_k;

    // The engine is shared by reference across the rayon pool
    let wall = Instant::now();
    let mut timings: Vec<Duration> = queries
        .par_iter()
        .map(|title| {
            let start = Instant::now();
            let recs = engine.recommend(title, k);
            std::hint::black_box(recs);
            start.elapsed()
        })
        .collect();
    let wall = wall.elapsed();

    let total: Duration = timings.iter().sum();
    let avg_latency = total / (timings.len() as u32);
    timings.sort();
    let percentile = |p: f32| timings[((timings.len() as f32 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f32 / wall.as_secs_f32();

    println!("Benchmark results:");
    println!("Wall time: {:?}", wall);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);
}

/// Helper function to format and print recommendations
fn print_recommendations(title: &str, recommendations: &[Recommendation], explain: bool) {
    println!("{}", format!("Because you enjoyed '{}':", title).bold().blue());
    for (rank, rec) in recommendations.iter().enumerate() {
        let author = if rec.author.is_empty() {
            "unknown author".dimmed().to_string()
        } else {
            rec.author.italic().to_string()
        };
        println!("{}. {} by {}", (rank + 1).to_string().green(), rec.title, author);
        if explain {
            println!(
                "   Similarity: {:.3} (row {}){}",
                rec.score,
                rec.position,
                if rec.image_url.is_empty() {
                    String::new()
                } else {
                    format!("  Cover: {}", rec.image_url)
                }
            );
        }
    }
}
