//! Integration tests for the recommender.
//!
//! These tests write artifact files to a temporary directory, load them the
//! way the CLI does, and query the engine end to end.

use data_loader::{ArtifactPaths, Artifacts};
use recommender::{Cover, CoverResolver, RecommendationEngine};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const BOOKS: &str = "\
# isbn, title, author, year, publisher, small, medium, large
0001::A::Author A::1999::Pub::http://img/a-s.jpg::http://img/a-m.jpg::http://img/a-l.jpg
0002::B::Author B::2001::Pub::::::http://img/b-l.jpg
0003::B::Duplicate Author::2005::Pub::::http://img/b2-m.jpg::
0004::D::Author D
0005::E::Author E::0
";

const PIVOT: &str = "\
Book-Title::254,2276,2766
A::5,,8
B::,7,
C::9,9,
D::,,3
E::1,,
";

const SIMILARITY: &str = "\
1.0,0.9,0.9,0.2,0.5
0.9,1.0,0.3,0.4,0.1
0.9,0.3,1.0,0.5,0.5
0.2,0.4,0.5,1.0,0.7
0.5,0.1,0.5,0.7,1.0
";

const POPULAR: &str = "\
Harry Potter and the Prisoner of Azkaban::J. K. Rowling::5.85::428::1999::http://img/hp.jpg
Harry Potter and the Goblet of Fire::J. K. Rowling::5.82::387::2000
The Fellowship of the Ring::J. R. R. Tolkien::5.74::368::
";

fn write_artifacts(dir: &Path, with_popular: bool) {
    fs::write(dir.join("books.dat"), BOOKS).unwrap();
    fs::write(dir.join("pt.dat"), PIVOT).unwrap();
    fs::write(dir.join("similarity.dat"), SIMILARITY).unwrap();
    if with_popular {
        fs::write(dir.join("popular.dat"), POPULAR).unwrap();
    }
}

fn load_engine(with_popular: bool) -> (TempDir, RecommendationEngine) {
    let dir = TempDir::new().unwrap();
    write_artifacts(dir.path(), with_popular);
    let artifacts = Artifacts::load_from_files(dir.path(), &ArtifactPaths::default()).unwrap();
    (dir, RecommendationEngine::new(artifacts))
}

fn titles(engine: &RecommendationEngine, title: &str, k: usize) -> Vec<String> {
    engine.recommend(title, k).into_iter().map(|r| r.title).collect()
}

#[test]
fn test_recommend_end_to_end() {
    let (_dir, engine) = load_engine(true);

    assert_eq!(titles(&engine, "A", 2), vec!["B", "C"]);
    assert_eq!(titles(&engine, "A", 4), vec!["B", "C", "E", "D"]);
    assert_eq!(titles(&engine, "D", 2), vec!["E", "C"]);
}

#[test]
fn test_results_are_bounded_unique_and_sorted() {
    let (_dir, engine) = load_engine(true);
    let known: Vec<String> = engine.list_known_titles().map(String::from).collect();

    for title in &known {
        for k in 0..=6 {
            let recs = engine.recommend(title, k);
            assert!(recs.len() <= k);
            assert!(recs.iter().all(|r| &r.title != title));

            let positions: HashSet<_> = recs.iter().map(|r| r.position).collect();
            assert_eq!(positions.len(), recs.len());

            // Descending, and equal scores keep row order
            for pair in recs.windows(2) {
                assert!(pair[0].score >= pair[1].score);
                if pair[0].score == pair[1].score {
                    assert!(pair[0].position < pair[1].position);
                }
            }
        }
    }
}

#[test]
fn test_unknown_titles_are_empty() {
    let (_dir, engine) = load_engine(true);
    for k in [0, 1, 5, 100] {
        assert!(engine.recommend("Unknown Title", k).is_empty());
    }
    // Present in the catalog is not enough; the pivot decides
    assert!(engine.lookup_by_title("Harry Potter and the Goblet of Fire").is_none());
    assert!(engine.recommend("\u{0}", 3).is_empty());
}

#[test]
fn test_recommend_is_idempotent() {
    let (_dir, engine) = load_engine(true);
    assert_eq!(engine.recommend("C", 3), engine.recommend("C", 3));
}

#[test]
fn test_metadata_resolution() {
    let (_dir, engine) = load_engine(true);
    let recs = engine.recommend("A", 4);

    // First B record wins, and its only image is the large one
    let b = &recs[0];
    assert_eq!(b.author, "Author B");
    assert_eq!(b.image_url, "http://img/b-l.jpg");

    // C has no catalog record but is still returned
    let c = &recs[1];
    assert_eq!(c.title, "C");
    assert_eq!(c.author, "");
    assert_eq!(c.image_url, "");

    let a = &engine.recommend("B", 1)[0];
    assert_eq!(a.image_url, "http://img/a-m.jpg");
}

#[test]
fn test_top_popular() {
    let (_dir, engine) = load_engine(true);

    let top = engine.top_popular(2);
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].title, "Harry Potter and the Prisoner of Azkaban");
    assert_eq!(top[1].publication_year, Some(2000));

    let all = engine.top_popular(12);
    assert_eq!(all.len(), 3);
    assert_eq!(all[2].publication_year, None);
    assert!(engine.top_popular(0).is_empty());
}

#[test]
fn test_popular_absent_is_empty() {
    let (_dir, engine) = load_engine(false);
    assert!(engine.top_popular(12).is_empty());
    assert_eq!(titles(&engine, "A", 1), vec!["B"]);
}

#[test]
fn test_shared_engine_across_threads() {
    let (_dir, engine) = load_engine(true);
    let engine = Arc::new(engine);
    let expected = engine.recommend("E", 3);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || engine.recommend("E", 3))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

struct OfflineResolver;

impl CoverResolver for OfflineResolver {
    fn fetch(&self, _url: &str) -> Option<Vec<u8>> {
        None
    }
}

#[test]
fn test_cover_requests() {
    let (_dir, engine) = load_engine(true);

    let request = engine.cover_request("A");
    assert_eq!(
        request.candidates,
        vec![
            "https://img/a-m.jpg",
            "https://img/a-l.jpg",
            "https://img/a-s.jpg",
            "https://covers.openlibrary.org/b/isbn/0001-M.jpg?default=false",
        ]
    );

    assert_eq!(
        OfflineResolver.resolve(&engine.cover_request("C")),
        Cover::Placeholder(vec!["C".to_string()])
    );
}
