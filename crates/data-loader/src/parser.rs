//! Parser for the exported lookup tables.
//!
//! Each table is a CSV file with a header row:
//! - personal_als.csv: user_id,track_id,score
//! - similar.csv: track_id,similar_track_id,similarity_score
//! - top_popular.csv: track_id,popularity_score
//!
//! Columns are matched by name, so extra columns and a different column order
//! are fine. Rows with a missing id or a non-finite score are dropped and
//! counted; they never fail the whole file.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, warn};

pub const PERSONAL_FILE: &str = "personal_als.csv";
pub const SIMILAR_FILE: &str = "similar.csv";
pub const POPULAR_FILE: &str = "top_popular.csv";

/// Canonical string form of a track or user identifier.
///
/// Surrounding whitespace is trimmed, and an integer written in float form
/// (`"42.0"`, `"-7.00"`) becomes its integer form (`"42"`, `"-7"`), which is
/// what numeric id columns look like after a round trip through a float
/// column. Anything else is kept verbatim. Returns `None` for an empty value.
///
/// Example: " 1053.0 " -> Some("1053")
///          "spotify:track:4uLU6h" -> Some("spotify:track:4uLU6h")
///          "  " -> None
pub fn canonical_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some((int_part, frac)) = trimmed.split_once('.') {
        let digits = int_part.strip_prefix('-').unwrap_or(int_part);
        let integral = !digits.is_empty()
            && digits.bytes().all(|b| b.is_ascii_digit())
            && !frac.is_empty()
            && frac.bytes().all(|b| b == b'0');
        if integral {
            return Some(int_part.to_string());
        }
    }

    Some(trimmed.to_string())
}

/// Parse a score field; only finite numbers are accepted
fn parse_score(raw: Option<&str>) -> Option<f32> {
    let value: f32 = raw?.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

// Raw rows keep every field optional so a missing value drops the row
// instead of failing deserialization of the whole file.

#[derive(Debug, Deserialize)]
struct RawPersonal {
    user_id: Option<String>,
    track_id: Option<String>,
    score: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSimilar {
    track_id: Option<String>,
    similar_track_id: Option<String>,
    similarity_score: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPopular {
    track_id: Option<String>,
    popularity_score: Option<String>,
}

/// Read every row of a CSV file, converting each raw record with `convert`.
///
/// Records that fail to deserialize or that `convert` rejects are skipped.
fn read_table<R, T, F>(path: &Path, required: &[&str], convert: F) -> Result<Vec<T>>
where
    R: DeserializeOwned,
    F: Fn(R) -> Option<T>,
{
    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    if !path.exists() {
        return Err(DataLoadError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|source| DataLoadError::CsvError {
            file: file.clone(),
            source,
        })?;

    let headers = reader
        .headers()
        .map_err(|source| DataLoadError::CsvError {
            file: file.clone(),
            source,
        })?
        .clone();
    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(DataLoadError::MissingColumn {
                file: file.clone(),
                column: column.to_string(),
            });
        }
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (idx, record) in reader.deserialize::<R>().enumerate() {
        // Line 1 is the header
        let line_no = idx + 2;
        match record {
            Ok(raw) => match convert(raw) {
                Some(row) => rows.push(row),
                None => {
                    skipped += 1;
                    debug!(file = %file, line = line_no, "Dropping row with missing field");
                }
            },
            Err(e) => {
                skipped += 1;
                debug!(file = %file, line = line_no, error = %e, "Dropping unreadable row");
            }
        }
    }

    if skipped > 0 {
        warn!(
            file = %file,
            skipped,
            kept = rows.len(),
            "Dropped rows with missing or malformed fields"
        );
    }

    Ok(rows)
}

/// Parse the personal recommendation table
pub fn parse_personal(path: &Path) -> Result<Vec<PersonalRecommendation>> {
    read_table(path, &["user_id", "track_id", "score"], |raw: RawPersonal| {
        Some(PersonalRecommendation {
            user_id: canonical_id(raw.user_id.as_deref()?)?,
            track_id: canonical_id(raw.track_id.as_deref()?)?,
            score: parse_score(raw.score.as_deref())?,
        })
    })
}

/// Parse the track similarity table
pub fn parse_similar(path: &Path) -> Result<Vec<SimilarTrack>> {
    read_table(
        path,
        &["track_id", "similar_track_id", "similarity_score"],
        |raw: RawSimilar| {
            Some(SimilarTrack {
                track_id: canonical_id(raw.track_id.as_deref()?)?,
                similar_track_id: canonical_id(raw.similar_track_id.as_deref()?)?,
                similarity_score: parse_score(raw.similarity_score.as_deref())?,
            })
        },
    )
}

/// Parse the global popularity table.
///
/// Rows come back in file order; ranking happens when the snapshot is built.
pub fn parse_popular(path: &Path) -> Result<Vec<PopularTrack>> {
    read_table(path, &["track_id", "popularity_score"], |raw: RawPopular| {
        Some(PopularTrack {
            track_id: canonical_id(raw.track_id.as_deref()?)?,
            popularity_score: parse_score(raw.popularity_score.as_deref())?,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_canonical_id() {
        assert_eq!(canonical_id("1053"), Some("1053".to_string()));
        assert_eq!(canonical_id(" 1053.0 "), Some("1053".to_string()));
        assert_eq!(canonical_id("-7.00"), Some("-7".to_string()));
        assert_eq!(canonical_id("12.5"), Some("12.5".to_string()));
        assert_eq!(canonical_id("v1.0"), Some("v1.0".to_string()));
        assert_eq!(canonical_id("007"), Some("007".to_string()));
        assert_eq!(canonical_id("track_1"), Some("track_1".to_string()));
        assert_eq!(canonical_id("   "), None);
        assert_eq!(canonical_id(""), None);
    }

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score(Some("0.75")), Some(0.75));
        assert_eq!(parse_score(Some(" 3 ")), Some(3.0));
        assert_eq!(parse_score(Some("NaN")), None);
        assert_eq!(parse_score(Some("inf")), None);
        assert_eq!(parse_score(Some("high")), None);
        assert_eq!(parse_score(None), None);
    }

    #[test]
    fn test_parse_personal_canonicalizes_ids() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            PERSONAL_FILE,
            "user_id,track_id,score\n1.0,53.0,0.9\nu2, t7 ,0.4\n",
        );

        let rows = parse_personal(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].user_id, "1");
        assert_eq!(rows[0].track_id, "53");
        assert_eq!(rows[1].user_id, "u2");
        assert_eq!(rows[1].track_id, "t7");
        assert_eq!(rows[1].score, 0.4);
    }

    #[test]
    fn test_parse_drops_rows_with_missing_fields() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            SIMILAR_FILE,
            "track_id,similar_track_id,similarity_score\n\
             t1,t2,0.8\n\
             t1,,0.5\n\
             ,t3,0.5\n\
             t1,t4,\n\
             t1,t5,not-a-number\n\
             t1,t6,0.3\n",
        );

        let rows = parse_similar(&path).unwrap();
        let targets: Vec<&str> = rows.iter().map(|r| r.similar_track_id.as_str()).collect();
        assert_eq!(targets, vec!["t2", "t6"]);
    }

    #[test]
    fn test_parse_matches_columns_by_name() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            POPULAR_FILE,
            "popularity_score,rank,track_id\n120.0,1,t9\n80,2,t3\n",
        );

        let rows = parse_popular(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].track_id, "t9");
        assert_eq!(rows[0].popularity_score, 120.0);
        assert_eq!(rows[1].track_id, "t3");
    }

    #[test]
    fn test_missing_column_fails_the_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, POPULAR_FILE, "track_id,plays\nt1,5\n");

        let result = parse_popular(&path);
        assert!(matches!(
            result,
            Err(DataLoadError::MissingColumn { ref column, .. }) if column == "popularity_score"
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = parse_personal(&dir.path().join(PERSONAL_FILE));
        assert!(matches!(result, Err(DataLoadError::FileNotFound { .. })));
    }
}
