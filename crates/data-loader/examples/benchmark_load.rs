use data_loader::{ArtifactPaths, Artifacts};
use std::path::Path;
use std::time::Instant;

fn main() {
    let data_dir = Path::new("data/book-crossing");

    println!("Loading BookVault artifacts...\n");

    let start = Instant::now();
    let artifacts = Artifacts::load_from_files(data_dir, &ArtifactPaths::default())
        .expect("Failed to load artifacts");
    let elapsed = start.elapsed();

    let (books, titles, popular) = artifacts.counts();
    let side = artifacts.model.matrix().side();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Catalog rows: {}", books);
    println!("Distinct catalog titles: {}", artifacts.catalog.distinct_titles());
    println!("Pivot titles: {}", titles);
    println!("Popular rows: {}", popular);
    println!("\nPerformance: {:.0} similarity cells/second",
             (side * side) as f64 / elapsed.as_secs_f64());
}
