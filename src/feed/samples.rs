use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::feed::error::FeedError;
use crate::tracking::{Coordinate, ParticipantId};

/// One recorded position fix.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Sample {
    pub id: ParticipantId,
    pub timestamp: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Sample {
    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.x, self.y, self.z)
    }

    pub fn is_finite(&self) -> bool {
        [self.timestamp, self.x, self.y, self.z]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Load samples from a CSV file with an `id,timestamp,x,y,z` header.
///
/// Malformed rows and rows holding NaN or infinite values are skipped with a
/// warning; a file that cannot be read or
/// lacks the header is an error.
pub fn load_samples(path: &Path) -> Result<Vec<Sample>, FeedError> {
    let content = fs::read_to_string(path)?;
    let filename = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    parse_samples(&content, &filename)
}

pub fn parse_samples(content: &str, filename: &str) -> Result<Vec<Sample>, FeedError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers().map_err(|e| FeedError::InvalidSample {
        file: filename.to_string(),
        message: e.to_string(),
    })?;
    for column in ["id", "timestamp", "x", "y", "z"] {
        if !headers.iter().any(|h| h == column) {
            return Err(FeedError::InvalidSample {
                file: filename.to_string(),
                message: format!("missing column '{}'", column),
            });
        }
    }

    let mut samples = Vec::new();
    for (line, row) in reader.deserialize::<Sample>().enumerate() {
        match row {
            Ok(sample) if sample.is_finite() => samples.push(sample),
            Ok(sample) => {
                log::warn!(
                    "Skipping sample {} in {}: non-finite value for participant {}",
                    line + 1,
                    filename,
                    sample.id
                );
            }
            Err(e) => {
                log::warn!("Skipping sample {} in {}: {}", line + 1, filename, e);
            }
        }
    }
    Ok(samples)
}

/// Samples grouped per participant, each group in file order.
pub fn group_by_participant(samples: &[Sample]) -> BTreeMap<ParticipantId, Vec<Sample>> {
    let mut groups: BTreeMap<ParticipantId, Vec<Sample>> = BTreeMap::new();
    for sample in samples {
        groups.entry(sample.id).or_default().push(*sample);
    }
    groups
}

/// First candidate, in the given order, whose samples show any movement.
pub fn first_moving_participant(
    candidates: impl IntoIterator<Item = ParticipantId>,
    samples: &[Sample],
) -> Option<ParticipantId> {
    let groups = group_by_participant(samples);
    candidates.into_iter().find(|id| {
        groups.get(id).is_some_and(|track| {
            track
                .windows(2)
                .any(|pair| pair[0].position() != pair[1].position())
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "id,timestamp,x,y,z
1,0.0,0,0,0
2,0.0,5,5,0
1,0.5,0,0,0
2,0.5,5,6,0
oops,1.0,0,0,0
";

    #[test]
    fn parses_and_skips_malformed_rows() {
        let samples = parse_samples(CSV, "test.csv").unwrap();
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[1].position(), Coordinate::new(5.0, 5.0, 0.0));
    }

    #[test]
    fn skips_non_finite_rows() {
        let csv = "id,timestamp,x,y,z
1,0.0,0,0,0
1,1.0,0,10,0
1,NaN,0,20,0
1,2.0,inf,30,0
1,3.0,0,-inf,0
1,4.0,0,40,0
";
        let samples = parse_samples(csv, "test.csv").unwrap();
        let times: Vec<_> = samples.iter().map(|s| s.timestamp).collect();
        assert_eq!(times, vec![0.0, 1.0, 4.0]);
        assert!(samples.iter().all(Sample::is_finite));
    }

    #[test]
    fn missing_columns_are_an_error() {
        let result = parse_samples("id,timestamp,x,y\n1,0,0,0\n", "bad.csv");
        assert!(matches!(result, Err(FeedError::InvalidSample { .. })));
    }

    #[test]
    fn groups_keep_file_order() {
        let samples = parse_samples(CSV, "test.csv").unwrap();
        let groups = group_by_participant(&samples);
        let times: Vec<_> = groups[&2].iter().map(|s| s.timestamp).collect();
        assert_eq!(times, vec![0.0, 0.5]);
    }

    #[test]
    fn hero_is_first_moving_candidate() {
        let samples = parse_samples(CSV, "test.csv").unwrap();
        assert_eq!(first_moving_participant([1, 2], &samples), Some(2));
        assert_eq!(first_moving_participant([1], &samples), None);
    }
}
