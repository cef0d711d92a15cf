use std::collections::VecDeque;

use crate::tracking::{round3, DerivedRecord, ParticipantId, ParticipantKind};

pub const METRIC_COUNT: usize = 6;

/// Export column prefixes, in the order the sequences are laid out.
pub const METRIC_NAMES: [&str; METRIC_COUNT] = [
    "velocity",
    "orientation",
    "angular_speed",
    "acceleration",
    "distance_to_hero",
    "angle_to_hero",
];

/// Recent derived values of one participant, one FIFO sequence per metric.
#[derive(Debug, Clone)]
pub struct RecordBuffer {
    id: ParticipantId,
    kind: ParticipantKind,
    max_entry_count: usize,
    sequences: [VecDeque<f64>; METRIC_COUNT],
}

impl RecordBuffer {
    pub fn new(id: ParticipantId, kind: ParticipantKind, max_entry_count: usize) -> Self {
        Self {
            id,
            kind,
            max_entry_count,
            sequences: std::array::from_fn(|_| VecDeque::with_capacity(max_entry_count)),
        }
    }

    pub fn id(&self) -> ParticipantId {
        self.id
    }

    pub fn kind(&self) -> ParticipantKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.sequences[0].len()
    }

    pub fn append(&mut self, record: &DerivedRecord) {
        if self.max_entry_count == 0 {
            return;
        }
        for (sequence, value) in self.sequences.iter_mut().zip(record.metrics()) {
            if sequence.len() >= self.max_entry_count {
                sequence.pop_front();
            }
            sequence.push_back(value.map(round3).unwrap_or(0.0));
        }
    }

    #[allow(dead_code)]
    pub fn sequence(&self, metric: usize) -> impl Iterator<Item = f64> + '_ {
        self.sequences[metric].iter().copied()
    }

    /// `[id, type_code]` followed by every sequence in metric order. Values
    /// always carry a decimal point (`36.0`, not `36`).
    pub fn export_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(2 + METRIC_COUNT * self.max_entry_count);
        row.push(self.id.to_string());
        row.push(self.kind.type_code().to_string());
        for sequence in &self.sequences {
            row.extend(sequence.iter().map(|v| format!("{v:?}")));
        }
        row
    }
}

/// Header matching [`RecordBuffer::export_row`] for a full buffer.
pub fn export_header(max_entry_count: usize) -> Vec<String> {
    let mut header = vec!["ID".to_string(), "type".to_string()];
    for metric in METRIC_NAMES {
        header.extend((0..max_entry_count).map(|i| format!("{metric}_{i}")));
    }
    header
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::HeroRelation;

    fn record(velocity: f64) -> DerivedRecord {
        DerivedRecord {
            id: 3,
            velocity: Some(velocity),
            orientation: Some(90.0),
            angular_speed: Some(0.0),
            acceleration: Some(1.5),
            distance_to_hero: Some(10.0),
            angle_to_hero: None,
        }
    }

    #[test]
    fn evicts_oldest_value_when_full() {
        let mut buffer = RecordBuffer::new(3, ParticipantKind::Car, 2);
        for v in [1.0, 2.0, 3.0] {
            buffer.append(&record(v));
        }
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.sequence(0).collect::<Vec<_>>(), vec![2.0, 3.0]);
    }

    #[test]
    fn unavailable_values_are_stored_as_zero() {
        let mut buffer = RecordBuffer::new(3, ParticipantKind::Car, 4);
        buffer.append(&DerivedRecord::new(
            3,
            None,
            HeroRelation {
                distance: 7.25,
                angle: None,
            },
        ));
        for metric in [0, 1, 2, 3, 5] {
            assert_eq!(buffer.sequence(metric).collect::<Vec<_>>(), vec![0.0]);
        }
        assert_eq!(buffer.sequence(4).collect::<Vec<_>>(), vec![7.25]);
    }

    #[test]
    fn values_are_rounded_to_three_decimals() {
        let mut buffer = RecordBuffer::new(3, ParticipantKind::Car, 4);
        buffer.append(&record(1.23456));
        assert_eq!(buffer.sequence(0).next(), Some(1.235));
    }

    #[test]
    fn zero_capacity_keeps_sequences_empty() {
        let mut buffer = RecordBuffer::new(3, ParticipantKind::Car, 0);
        buffer.append(&record(1.0));
        buffer.append(&record(2.0));
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.export_row(), vec!["3", "0"]);
    }

    #[test]
    fn whole_values_keep_their_decimal_point() {
        let mut buffer = RecordBuffer::new(3, ParticipantKind::Car, 1);
        buffer.append(&record(36.0));
        let row = buffer.export_row();
        assert_eq!(row[2], "36.0");
        assert_eq!(row[3], "90.0");
        assert_eq!(row[5], "1.5");
        assert_eq!(row[7], "0.0");
    }

    #[test]
    fn header_and_row_columns_line_up() {
        for max in [1, 2, 5] {
            let mut buffer = RecordBuffer::new(9, ParticipantKind::Truck, max);
            for i in 0..max + 3 {
                buffer.append(&record(i as f64));
            }
            let header = export_header(max);
            let row = buffer.export_row();
            assert_eq!(header.len(), row.len());
            assert_eq!(row[0], "9");
            assert_eq!(row[1], "3");

            for (m, name) in METRIC_NAMES.iter().enumerate() {
                for slot in 0..max {
                    let column = 2 + m * max + slot;
                    assert_eq!(header[column], format!("{name}_{slot}"));
                    let expected = buffer.sequence(m).nth(slot).unwrap();
                    assert_eq!(row[column], format!("{expected:?}"));
                }
            }
        }
    }
}
