//! Record types and aggregation.
//!
//! A [`Record`] is one extracted name/score pair. Records from one image form
//! a [`RecordBatch`]; batches are concatenated in processing order into a
//! [`CombinedResult`]. Nothing is sorted, merged or deduplicated.

use std::fmt;

/// Canonical numeric score.
///
/// OCR digit runs and JSON numbers both normalize to this type so the export
/// never sees two spellings of the same value ("042" vs "42", "42.0" vs "42").
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    Integer(i128),
    Decimal(f64),
}

impl Score {
    /// Parses a run of ASCII decimal digits. Leading zeros are dropped.
    ///
    /// Runs too long for `i128` fall back to a decimal approximation; runs
    /// beyond the `f64` range are rejected.
    pub fn from_digits(digits: &str) -> Option<Score> {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        match digits.parse::<i128>() {
            Ok(v) => Some(Score::Integer(v)),
            Err(_) => digits
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Score::from_f64),
        }
    }

    /// Collapses whole-valued floats to `Integer`.
    pub fn from_f64(value: f64) -> Score {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e18 {
            Score::Integer(value as i128)
        } else {
            Score::Decimal(value)
        }
    }

    pub fn from_json_number(number: &serde_json::Number) -> Option<Score> {
        if let Some(v) = number.as_i64() {
            return Some(Score::Integer(v as i128));
        }
        if let Some(v) = number.as_u64() {
            return Some(Score::Integer(v as i128));
        }
        number.as_f64().map(Score::from_f64)
    }

    /// Parses a score written as text, e.g. `"1,234"` or `"98.5"`.
    ///
    /// Plain numbers parse directly; otherwise thousands separators
    /// (`,`, `'`, spaces) are removed and the remainder must be digits.
    pub fn parse_text(text: &str) -> Option<Score> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Ok(v) = trimmed.parse::<i128>() {
            return Some(Score::Integer(v));
        }
        if let Ok(v) = trimmed.parse::<f64>() {
            if v.is_finite() {
                return Some(Score::from_f64(v));
            }
        }
        let digits: String = trimmed
            .chars()
            .filter(|c| !matches!(c, ',' | '\'' | ' ' | '\u{00A0}'))
            .collect();
        Score::from_digits(&digits)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Integer(v) => write!(f, "{}", v),
            Score::Decimal(v) => write!(f, "{}", v),
        }
    }
}

/// One extracted name/score pair, with absent fields made explicit.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Complete { name: String, score: Score },
    MissingName { score: Score },
    MissingScore { name: String },
}

impl Record {
    /// Builds a record, trimming the name. An empty name counts as absent.
    ///
    /// Returns `None` when both fields are absent.
    pub fn new(name: Option<&str>, score: Option<Score>) -> Option<Record> {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        match (name, score) {
            (Some(name), Some(score)) => Some(Record::Complete { name, score }),
            (None, Some(score)) => Some(Record::MissingName { score }),
            (Some(name), None) => Some(Record::MissingScore { name }),
            (None, None) => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Record::Complete { name, .. } | Record::MissingScore { name } => Some(name),
            Record::MissingName { .. } => None,
        }
    }

    pub fn score(&self) -> Option<Score> {
        match self {
            Record::Complete { score, .. } | Record::MissingName { score } => Some(*score),
            Record::MissingScore { .. } => None,
        }
    }
}

/// All records extracted from one source image.
#[derive(Debug, Clone)]
pub struct RecordBatch {
    /// Display label of the image (usually the file name)
    pub source: String,
    pub records: Vec<Record>,
}

impl RecordBatch {
    pub fn new(source: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            source: source.into(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Ordered concatenation of every batch in a processing run.
#[derive(Debug, Clone, Default)]
pub struct CombinedResult {
    records: Vec<Record>,
}

impl CombinedResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a batch after everything already collected.
    pub fn append(mut self, batch: RecordBatch) -> Self {
        self.records.extend(batch.records);
        self
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Concatenates batches in the order given.
pub fn aggregate<I>(batches: I) -> CombinedResult
where
    I: IntoIterator<Item = RecordBatch>,
{
    batches
        .into_iter()
        .fold(CombinedResult::new(), CombinedResult::append)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(name: &str, score: i128) -> Record {
        Record::Complete {
            name: name.to_string(),
            score: Score::Integer(score),
        }
    }

    #[test]
    fn test_score_from_digits() {
        assert_eq!(Score::from_digits("42"), Some(Score::Integer(42)));
        assert_eq!(Score::from_digits("0042"), Some(Score::Integer(42)));
        assert_eq!(Score::from_digits(""), None);
        assert_eq!(Score::from_digits("4a2"), None);
        // 45 digits overflows i128
        let long = "1".repeat(45);
        assert!(matches!(Score::from_digits(&long), Some(Score::Decimal(_))));
        // Past f64::MAX
        let huge = "9".repeat(400);
        assert_eq!(Score::from_digits(&huge), None);
    }

    #[test]
    fn test_score_from_json_number() {
        let n: serde_json::Number = serde_json::from_str("42").unwrap();
        assert_eq!(Score::from_json_number(&n), Some(Score::Integer(42)));

        let n: serde_json::Number = serde_json::from_str("42.0").unwrap();
        assert_eq!(Score::from_json_number(&n), Some(Score::Integer(42)));

        let n: serde_json::Number = serde_json::from_str("98.5").unwrap();
        assert_eq!(Score::from_json_number(&n), Some(Score::Decimal(98.5)));

        let n: serde_json::Number = serde_json::from_str("-7").unwrap();
        assert_eq!(Score::from_json_number(&n), Some(Score::Integer(-7)));
    }

    #[test]
    fn test_score_parse_text() {
        assert_eq!(Score::parse_text("1,234"), Some(Score::Integer(1234)));
        assert_eq!(Score::parse_text(" 17 "), Some(Score::Integer(17)));
        assert_eq!(Score::parse_text("98.5"), Some(Score::Decimal(98.5)));
        assert_eq!(Score::parse_text("1 000 000"), Some(Score::Integer(1_000_000)));
        assert_eq!(Score::parse_text("n/a"), None);
        assert_eq!(Score::parse_text(""), None);
    }

    #[test]
    fn test_score_display_is_canonical() {
        assert_eq!(Score::Integer(42).to_string(), "42");
        assert_eq!(Score::from_f64(42.0).to_string(), "42");
        assert_eq!(Score::Decimal(98.5).to_string(), "98.5");
    }

    #[test]
    fn test_record_new_variants() {
        assert_eq!(
            Record::new(Some("  Alice "), Some(Score::Integer(1))),
            Some(complete("Alice", 1))
        );
        assert_eq!(
            Record::new(Some("   "), Some(Score::Integer(1))),
            Some(Record::MissingName {
                score: Score::Integer(1)
            })
        );
        assert_eq!(
            Record::new(Some("Bob"), None),
            Some(Record::MissingScore {
                name: "Bob".to_string()
            })
        );
        assert_eq!(Record::new(None, None), None);
    }

    #[test]
    fn test_record_accessors() {
        let r = complete("Alice", 42);
        assert_eq!(r.name(), Some("Alice"));
        assert_eq!(r.score(), Some(Score::Integer(42)));

        let r = Record::MissingName {
            score: Score::Integer(3),
        };
        assert_eq!(r.name(), None);
        assert_eq!(r.score(), Some(Score::Integer(3)));
    }

    #[test]
    fn test_aggregate_preserves_order_without_dedup() {
        let r1 = complete("Alice", 42);
        let r2 = complete("Bob", 17);
        let r3 = complete("Alice", 42);

        let b1 = RecordBatch::new("a.png", vec![r1.clone(), r2.clone()]);
        let b2 = RecordBatch::new("b.png", vec![r3.clone()]);

        let combined = aggregate([b1, b2]);
        assert_eq!(combined.records(), &[r1, r2, r3]);
    }

    #[test]
    fn test_append_incremental_matches_aggregate() {
        let b1 = RecordBatch::new("a.png", vec![complete("Alice", 1)]);
        let b2 = RecordBatch::new("b.png", vec![]);
        let b3 = RecordBatch::new("c.png", vec![complete("Carol", 3)]);

        let incremental = CombinedResult::new()
            .append(b1.clone())
            .append(b2.clone())
            .append(b3.clone());
        let batched = aggregate(vec![b1, b2, b3]);

        assert_eq!(incremental.records(), batched.records());
        assert_eq!(incremental.len(), 2);
    }

    #[test]
    fn test_aggregate_empty() {
        let combined = aggregate(Vec::<RecordBatch>::new());
        assert!(combined.is_empty());
    }
}
