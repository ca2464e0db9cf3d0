//! Parsers for the artifact files.
//!
//! All files are Latin-1 text with one record per line. Blank lines are
//! skipped, and so are comment lines: a `#` followed by anything but a
//! `::` separator. A record may therefore start with `#`.
//!
//! Inside a field a backslash escapes the next character, so a title
//! containing the separator is written `Star Trek\::The Novel` and a
//! literal backslash `\\`.
//! - books.dat: isbn::title::author[::year::publisher::url_s::url_m::url_l]
//! - pt.dat: header `label::rater1,rater2,...`, then `title::v1,v2,...`
//! - similarity.dat: one row of comma-separated scores per line
//! - popular.dat: title::author::avg_rating::num_rating[::year[::image_url]]

use crate::config::display_name;
use crate::error::{DataLoadError, Result};
use crate::types::*;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read a file with ISO-8859-1 encoding (Latin-1)
///
/// Each byte maps directly to the Unicode code point of the same value, so
/// the conversion never fails.
fn read_lines_latin1(path: &Path) -> Result<Vec<String>> {
    let mut file = File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    let content: String = bytes.iter().map(|&b| b as char).collect();

    Ok(content.lines().map(|s| s.to_string()).collect())
}

/// Split a line on unescaped `::`
///
/// `\x` yields a literal `x`; a lone trailing backslash is kept as is.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => current.push(chars.next().unwrap_or('\\')),
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// `#` line with no field separator
fn is_comment(line: &str) -> bool {
    line.starts_with('#') && split_fields(line).len() == 1
}

/// Numbered data lines: trimmed, non-empty, non-comment
fn data_lines(lines: &[String]) -> impl Iterator<Item = (usize, &str)> {
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !is_comment(line))
}

fn parse_error(file: &str, line: usize, reason: impl Into<String>) -> DataLoadError {
    DataLoadError::ParseError {
        file: file.to_string(),
        line,
        reason: reason.into(),
    }
}

/// Years of 0 are the dataset's "unknown" marker
fn parse_year(file: &str, line: usize, s: &str) -> Result<Option<u16>> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    let year: u16 = s
        .parse()
        .map_err(|e| parse_error(file, line, format!("Invalid year: {}", e)))?;
    Ok((year > 0).then_some(year))
}

fn optional_text(s: Option<&str>) -> Option<String> {
    s.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse the book catalog
pub fn parse_books(path: &Path) -> Result<Vec<BookRecord>> {
    let file = display_name(path);
    let lines = read_lines_latin1(path)?;
    let mut books = Vec::new();

    for (line_no, line) in data_lines(&lines) {
        let fields = split_fields(line);
        let mut parts = fields.iter().map(String::as_str);

        let isbn = parts
            .next()
            .ok_or_else(|| parse_error(&file, line_no, "Missing ISBN"))?;
        let title = parts
            .next()
            .ok_or_else(|| parse_error(&file, line_no, "Missing title"))?;
        let author = parts
            .next()
            .ok_or_else(|| parse_error(&file, line_no, "Missing author"))?;

        let year_of_publication = match parts.next() {
            Some(year) => parse_year(&file, line_no, year)?,
            None => None,
        };
        let publisher = optional_text(parts.next());

        let images = ImageUrls {
            small: parts.next().unwrap_or("").trim().to_string(),
            medium: parts.next().unwrap_or("").trim().to_string(),
            large: parts.next().unwrap_or("").trim().to_string(),
        };

        books.push(BookRecord {
            isbn: isbn.trim().to_string(),
            title: title.to_string(),
            author: author.to_string(),
            year_of_publication,
            publisher,
            images,
        });
    }

    Ok(books)
}

fn parse_cell(file: &str, line: usize, s: &str) -> Result<Option<f32>> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    s.parse()
        .map(Some)
        .map_err(|e| parse_error(file, line, format!("Invalid rating '{}': {}", s, e)))
}

fn split_list(s: &str) -> impl Iterator<Item = &str> {
    // An empty list has no cells, not one empty cell
    let s = s.trim();
    (!s.is_empty())
        .then(|| s.split(','))
        .into_iter()
        .flatten()
}

/// `(title, cells)` of a pivot line, or `None` without a separator
fn split_title_and_cells(line: &str) -> Option<(String, String)> {
    let mut fields = split_fields(line);
    if fields.len() < 2 {
        return None;
    }
    let cells = fields.pop()?;
    Some((fields.join("::"), cells))
}

/// Parse the pivot table
///
/// The cells are the last field and the title is everything before it, so
/// an unescaped `::` inside a pivot title is still read back intact.
pub fn parse_pivot(path: &Path) -> Result<InteractionMatrix> {
    let file = display_name(path);
    let lines = read_lines_latin1(path)?;
    let mut lines_iter = data_lines(&lines);

    let (header_line, header) = lines_iter
        .next()
        .ok_or_else(|| parse_error(&file, 1, "Missing header line"))?;
    let (_, raters) = split_title_and_cells(header)
        .ok_or_else(|| parse_error(&file, header_line, "Header has no '::' separator"))?;
    let raters: Vec<String> = split_list(&raters).map(|r| r.trim().to_string()).collect();

    let mut rows = Vec::new();
    for (line_no, line) in lines_iter {
        let (title, cells) = split_title_and_cells(line)
            .ok_or_else(|| parse_error(&file, line_no, "Missing '::' separator"))?;
        let cells = split_list(&cells)
            .map(|c| parse_cell(&file, line_no, c))
            .collect::<Result<Vec<_>>>()?;
        rows.push((title, cells));
    }

    InteractionMatrix::new(raters, rows)
}

/// Parse the similarity matrix
pub fn parse_similarity(path: &Path) -> Result<SimilarityMatrix> {
    let file = display_name(path);
    let lines = read_lines_latin1(path)?;
    let mut rows = Vec::new();

    for (line_no, line) in data_lines(&lines) {
        let row = line
            .split(',')
            .map(|v| {
                v.trim().parse::<Score>().map_err(|e| {
                    parse_error(&file, line_no, format!("Invalid score '{}': {}", v.trim(), e))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        rows.push(row);
    }

    SimilarityMatrix::from_rows(rows)
}

/// Parse the popularity listing, keeping file order
pub fn parse_popular(path: &Path) -> Result<Vec<PopularityRow>> {
    let file = display_name(path);
    let lines = read_lines_latin1(path)?;
    let mut popular = Vec::new();

    for (line_no, line) in data_lines(&lines) {
        let fields = split_fields(line);
        let mut parts = fields.iter().map(String::as_str);

        let title = parts
            .next()
            .ok_or_else(|| parse_error(&file, line_no, "Missing title"))?;
        let author = parts
            .next()
            .ok_or_else(|| parse_error(&file, line_no, "Missing author"))?;
        let avg_rating = parts
            .next()
            .ok_or_else(|| parse_error(&file, line_no, "Missing avg_rating"))?;
        let num_rating = parts
            .next()
            .ok_or_else(|| parse_error(&file, line_no, "Missing num_rating"))?;

        let avg_rating: f32 = avg_rating
            .trim()
            .parse()
            .map_err(|e| parse_error(&file, line_no, format!("Invalid avg_rating: {}", e)))?;
        if !avg_rating.is_finite() {
            return Err(parse_error(&file, line_no, "avg_rating is not finite"));
        }

        let publication_year = match parts.next() {
            Some(year) => parse_year(&file, line_no, year)?,
            None => None,
        };

        popular.push(PopularityRow {
            title: title.to_string(),
            author: author.to_string(),
            avg_rating,
            num_rating: num_rating
                .trim()
                .parse()
                .map_err(|e| parse_error(&file, line_no, format!("Invalid num_rating: {}", e)))?,
            publication_year,
            image_url: optional_text(parts.next()),
        });
    }

    Ok(popular)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_parse_books_full_and_short_rows() {
        let file = write_file(
            b"# isbn, title, author, year, publisher, small, medium, large\n\
              0195153448::Classical Mythology::Mark P. O. Morford::2002::Oxford University Press::s.jpg::m.jpg::l.jpg\n\
              \n\
              0002005018::Clara Callan::Richard Bruce Wright\n",
        );
        let books = parse_books(file.path()).unwrap();

        assert_eq!(books.len(), 2);
        assert_eq!(books[0].year_of_publication, Some(2002));
        assert_eq!(books[0].publisher.as_deref(), Some("Oxford University Press"));
        assert_eq!(books[0].images.medium, "m.jpg");
        assert_eq!(books[1].author, "Richard Bruce Wright");
        assert_eq!(books[1].images, ImageUrls::default());
    }

    #[test]
    fn test_split_fields_honors_escapes() {
        assert_eq!(split_fields("a::b::"), vec!["a", "b", ""]);
        assert_eq!(split_fields("Star Trek\\::The Novel::X"), vec!["Star Trek::The Novel", "X"]);
        assert_eq!(split_fields("C\\\\::D"), vec!["C\\", "D"]);
        assert_eq!(split_fields("Ratio 1:2"), vec!["Ratio 1:2"]);
        assert_eq!(split_fields("trailing\\"), vec!["trailing\\"]);
    }

    #[test]
    fn test_parse_books_escaped_separator_in_title() {
        let file = write_file(b"1::Star Trek\\::The Novel::Author X::1999\n");
        let books = parse_books(file.path()).unwrap();

        assert_eq!(books[0].title, "Star Trek::The Novel");
        assert_eq!(books[0].author, "Author X");
        assert_eq!(books[0].year_of_publication, Some(1999));
    }

    #[test]
    fn test_parse_popular_escaped_separator_in_title() {
        let file = write_file(b"Star Trek\\::The Novel::Author X::4.5::12::1999\n");
        let rows = parse_popular(file.path()).unwrap();

        assert_eq!(rows[0].title, "Star Trek::The Novel");
        assert_eq!(rows[0].num_rating, 12);
    }

    #[test]
    fn test_hash_titles_are_records_not_comments() {
        let books = write_file(b"# catalog\n1::#Girlboss::Sophia Amoruso\n");
        let books = parse_books(books.path()).unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "#Girlboss");

        let pivot = write_file(b"# pivot\nBook-Title::u1\n#Girlboss::1\nB::2\n");
        let pivot = parse_pivot(pivot.path()).unwrap();
        assert_eq!(pivot.row_count(), 2);
        assert_eq!(pivot.row_index_of("#Girlboss"), Some(0));
    }

    #[test]
    fn test_parse_books_decodes_latin1() {
        let file = write_file(b"123::Caf\xe9 Society::Ren\xe9e\n");
        let books = parse_books(file.path()).unwrap();
        assert_eq!(books[0].title, "Café Society");
        assert_eq!(books[0].author, "Renée");
    }

    #[test]
    fn test_parse_books_reports_line_number() {
        let file = write_file(b"1::A::B\n2::only-title\n");
        match parse_books(file.path()).unwrap_err() {
            DataLoadError::ParseError { line, reason, .. } => {
                assert_eq!(line, 2);
                assert_eq!(reason, "Missing author");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zero_year_is_unknown() {
        let file = write_file(b"1::A::B::0\n");
        assert_eq!(parse_books(file.path()).unwrap()[0].year_of_publication, None);
    }

    #[test]
    fn test_parse_pivot() {
        let file = write_file(
            b"Book-Title::11676,98391\n\
              1984::9,\n\
              Book: The Sequel::nan,7.5\n",
        );
        let pivot = parse_pivot(file.path()).unwrap();

        assert_eq!(pivot.rater_count(), 2);
        assert_eq!(pivot.row_count(), 2);
        assert_eq!(pivot.row_key_at(1), Some("Book: The Sequel"));
        assert_eq!(pivot.rating(0, 0), Some(9.0));
        assert_eq!(pivot.rating(0, 1), None);
        assert_eq!(pivot.rating(1, 0), None);
        assert_eq!(pivot.rating(1, 1), Some(7.5));
    }

    #[test]
    fn test_parse_pivot_title_with_separator() {
        let file = write_file(b"Book-Title::u1\nStar Trek::The Novel::8\n");
        let pivot = parse_pivot(file.path()).unwrap();
        assert_eq!(pivot.row_index_of("Star Trek::The Novel"), Some(0));
    }

    #[test]
    fn test_parse_pivot_without_header_fails() {
        let file = write_file(b"\n# nothing here\n");
        assert!(parse_pivot(file.path()).is_err());
    }

    #[test]
    fn test_parse_similarity() {
        let file = write_file(b"1.0, 0.25\n0.25,1.0\n");
        let matrix = parse_similarity(file.path()).unwrap();
        assert_eq!(matrix.side(), 2);
        assert_eq!(matrix.get(1, 0), Some(0.25));
    }

    #[test]
    fn test_parse_similarity_rejects_garbage() {
        let file = write_file(b"1.0,abc\n0.2,1.0\n");
        assert!(matches!(
            parse_similarity(file.path()).unwrap_err(),
            DataLoadError::ParseError { line: 1, .. }
        ));
    }

    #[test]
    fn test_parse_popular() {
        let file = write_file(
            b"Harry Potter and the Prisoner of Azkaban::J. K. Rowling::5.85::428::1999::http://img/m.jpg\n\
              The Two Towers::J. R. R. Tolkien::5.69::260\n",
        );
        let rows = parse_popular(file.path()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].num_rating, 428);
        assert_eq!(rows[0].publication_year, Some(1999));
        assert_eq!(rows[0].image_url.as_deref(), Some("http://img/m.jpg"));
        assert_eq!(rows[1].publication_year, None);
        assert_eq!(rows[1].image_url, None);
    }

    #[test]
    fn test_parse_popular_rejects_bad_count() {
        let file = write_file(b"A::B::4.0::many\n");
        assert!(parse_popular(file.path()).is_err());
    }
}
