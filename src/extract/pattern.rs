use regex::Regex;

use super::Extractor;
use crate::error::ExtractionError;
use crate::record::{Record, Score};

/// Pattern for name/score pairs in OCR text:
/// - name: Unicode word characters other than digits, whitespace, periods, hyphens
/// - score: the decimal digit run immediately after it (greedy, any script)
///
/// Whitespace between the two is swallowed by the name run and trimmed later.
const PAIR_PATTERN: &str = r"(?P<name>[[\w\s.\-]&&\D]+)(?P<score>\d+)";

const DIGIT_PATTERN: &str = r"^\d$";

/// Scans OCR text for "name then digits" runs, left to right.
///
/// Deliberately permissive: a page number or a date next to a word is
/// reported as a pair like anything else.
#[derive(Debug, Clone)]
pub struct PatternExtractor {
    regex: Regex,
    digit: Regex,
}

impl PatternExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(PAIR_PATTERN)?,
            digit: Regex::new(DIGIT_PATTERN)?,
        })
    }

    fn is_digit(&self, code_point: u32) -> bool {
        char::from_u32(code_point)
            .is_some_and(|c| self.digit.is_match(c.encode_utf8(&mut [0; 4])))
    }

    /// ASCII form of any Unicode decimal digit (`８` → `8`, `٤` → `4`).
    ///
    /// Decimal digits are encoded in contiguous runs of ten starting at zero,
    /// so the value is the distance from the start of the run, mod 10.
    fn ascii_digit(&self, c: char) -> Option<char> {
        if c.is_ascii_digit() {
            return Some(c);
        }
        let code_point = c as u32;
        if !self.is_digit(code_point) {
            return None;
        }
        let mut start = code_point;
        while start > 0 && self.is_digit(start - 1) {
            start -= 1;
        }
        char::from_digit((code_point - start) % 10, 10)
    }
}

impl Extractor for PatternExtractor {
    /// Never fails; no match yields an empty sequence.
    fn extract(&self, raw: &str) -> Result<Vec<Record>, ExtractionError> {
        let records = self
            .regex
            .captures_iter(raw)
            .filter_map(|caps| {
                let name = caps.name("name")?.as_str().trim();
                if name.is_empty() {
                    return None;
                }
                let digits: String = caps
                    .name("score")?
                    .as_str()
                    .chars()
                    .map(|c| self.ascii_digit(c))
                    .collect::<Option<_>>()?;
                let score = Score::from_digits(&digits)?;
                Record::new(Some(name), Some(score))
            })
            .collect();
        Ok(records)
    }
}
