use serde_json::{Map, Value};

use super::Extractor;
use crate::error::ExtractionError;
use crate::record::{Record, Score};

/// Code-fence delimiters the model may wrap its JSON in.
/// Order matters: the tagged opener must go before the bare fence.
const FENCE_MARKERS: [&str; 2] = ["```json", "```"];

/// Removes every occurrence of the fence markers, then trims whitespace.
///
/// Not a markdown parser: the markers are removed wherever they appear.
pub fn strip_code_fences(raw: &str) -> String {
    let mut text = raw.to_string();
    for marker in FENCE_MARKERS {
        text = text.replace(marker, "");
    }
    text.trim().to_string()
}

/// One element of the AI's JSON array, with absent fields made explicit.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedRecord {
    Complete { name: String, number: Score },
    PartialMissingName { number: Score },
    PartialMissingNumber { name: String },
}

impl ParsedRecord {
    /// Reads `name` and `number` from one array element.
    ///
    /// Returns `None` for non-objects and objects carrying neither field.
    pub fn from_value(value: &Value) -> Option<ParsedRecord> {
        let object = value.as_object()?;
        let name = read_name(object);
        let number = read_number(object);
        match (name, number) {
            (Some(name), Some(number)) => Some(ParsedRecord::Complete { name, number }),
            (None, Some(number)) => Some(ParsedRecord::PartialMissingName { number }),
            (Some(name), None) => Some(ParsedRecord::PartialMissingNumber { name }),
            (None, None) => None,
        }
    }
}

impl From<ParsedRecord> for Record {
    fn from(parsed: ParsedRecord) -> Record {
        match parsed {
            ParsedRecord::Complete { name, number } => Record::Complete {
                name,
                score: number,
            },
            ParsedRecord::PartialMissingName { number } => Record::MissingName { score: number },
            ParsedRecord::PartialMissingNumber { name } => Record::MissingScore { name },
        }
    }
}

fn read_name(object: &Map<String, Value>) -> Option<String> {
    let name = match object.get("name")? {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(_) | Value::Object(_) => return None,
    };
    if name.is_empty() { None } else { Some(name) }
}

fn read_number(object: &Map<String, Value>) -> Option<Score> {
    match object.get("number")? {
        Value::Number(n) => Score::from_json_number(n),
        Value::String(s) => Score::parse_text(s),
        _ => None,
    }
}

/// Parses the AI source's free-text response as a JSON array of
/// `{"name": ..., "number": ...}` objects.
#[derive(Debug, Clone, Default)]
pub struct StructuredExtractor;

impl StructuredExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for StructuredExtractor {
    fn extract(&self, raw: &str) -> Result<Vec<Record>, ExtractionError> {
        let cleaned = strip_code_fences(raw);
        if cleaned.is_empty() {
            return Ok(Vec::new());
        }

        let value: Value = serde_json::from_str(&cleaned)
            .map_err(|e| ExtractionError::MalformedResponse(format!("invalid JSON: {}", e)))?;

        let Value::Array(items) = value else {
            return Err(ExtractionError::MalformedResponse(
                "top-level JSON value is not an array".to_string(),
            ));
        };

        Ok(items
            .iter()
            .filter_map(ParsedRecord::from_value)
            .map(Record::from)
            .collect())
    }
}
