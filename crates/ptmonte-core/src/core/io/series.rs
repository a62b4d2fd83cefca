use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("CSV error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("CSV error: {0}")]
    Writer(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One row of the adsorbed-particle count series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesRow {
    pub step: usize,
    pub particles: usize,
}

/// Acceptance bookkeeping for one move kind, as exported to CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    #[serde(rename = "move")]
    pub name: String,
    pub attempts: u64,
    pub acceptances: u64,
    /// Empty when the move was never attempted.
    pub accept_rate: Option<f64>,
}

/// Writes `step,particles` rows, numbering steps from 1.
pub fn write_series<W: Write>(writer: W, counts: &[usize]) -> Result<(), SeriesError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for (i, &particles) in counts.iter().enumerate() {
        wtr.serialize(SeriesRow {
            step: i + 1,
            particles,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_move_summary<W: Write>(writer: W, records: &[MoveRecord]) -> Result<(), SeriesError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_series_to_path(path: &Path, counts: &[usize]) -> Result<(), SeriesError> {
    let file = create(path)?;
    write_series(file, counts).map_err(|e| with_path(path, e))
}

pub fn write_move_summary_to_path(path: &Path, records: &[MoveRecord]) -> Result<(), SeriesError> {
    let file = create(path)?;
    write_move_summary(file, records).map_err(|e| with_path(path, e))
}

fn create(path: &Path) -> Result<std::fs::File, SeriesError> {
    std::fs::File::create(path).map_err(|e| SeriesError::Csv {
        path: path.to_string_lossy().to_string(),
        source: csv::Error::from(e),
    })
}

fn with_path(path: &Path, err: SeriesError) -> SeriesError {
    match err {
        SeriesError::Writer(source) => SeriesError::Csv {
            path: path.to_string_lossy().to_string(),
            source,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn series_is_written_with_header_and_one_based_steps() {
        let mut buffer = Vec::new();
        write_series(&mut buffer, &[0, 1, 1, 2]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "step,particles\n1,0\n2,1\n3,1\n4,2\n");
    }

    #[test]
    fn move_summary_leaves_rate_empty_for_unattempted_moves() {
        let records = vec![
            MoveRecord {
                name: "translation".to_string(),
                attempts: 4,
                acceptances: 1,
                accept_rate: Some(0.25),
            },
            MoveRecord {
                name: "deletion".to_string(),
                attempts: 0,
                acceptances: 0,
                accept_rate: None,
            },
        ];
        let mut buffer = Vec::new();
        write_move_summary(&mut buffer, &records).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "move,attempts,acceptances,accept_rate\ntranslation,4,1,0.25\ndeletion,0,0,\n"
        );
    }

    #[test]
    fn path_writers_round_trip_through_csv_reader() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("series.csv");
        write_series_to_path(&path, &[3, 5]).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<SeriesRow> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(
            rows,
            vec![
                SeriesRow { step: 1, particles: 3 },
                SeriesRow { step: 2, particles: 5 }
            ]
        );
    }

    #[test]
    fn unwritable_path_reports_the_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("moves.csv");
        let err = write_move_summary_to_path(&path, &[]).unwrap_err();
        assert!(matches!(err, SeriesError::Csv { ref path, .. } if path.ends_with("moves.csv")));
    }
}
