//! Attempt log text format.
//!
//! One non-negative decimal integer per line, newline terminated, in the
//! order the attempts were made. No header. Blank lines are ignored and
//! duplicates are allowed (they collapse when loaded into a set).
//!
//! ```text
//! 1532
//! 7
//! 940
//! ```

use safecode_core::SecurityCode;

use crate::tried::TriedSet;

/// A line of the log that could not be parsed as a code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRecord {
    /// 1-based line number.
    pub line: usize,

    /// The offending line, trimmed.
    pub content: String,
}

/// Result of parsing an attempt log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLog {
    /// Parsed codes in file order, duplicates included.
    pub codes: Vec<SecurityCode>,

    /// Lines that were skipped.
    pub malformed: Vec<MalformedRecord>,
}

impl ParsedLog {
    /// Collapse the parsed codes into a set.
    pub fn tried(&self) -> TriedSet {
        self.codes.iter().copied().collect()
    }

    /// Number of lines that held a code.
    pub fn record_count(&self) -> usize {
        self.codes.len()
    }
}

/// Parse the contents of an attempt log.
///
/// Never fails: unparseable lines are collected in
/// [`ParsedLog::malformed`] and skipped.
pub fn parse_attempt_log(text: &str) -> ParsedLog {
    let mut parsed = ParsedLog::default();
    for (index, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match trimmed.parse::<SecurityCode>() {
            Ok(code) => parsed.codes.push(code),
            Err(_) => parsed.malformed.push(MalformedRecord {
                line: index + 1,
                content: trimmed.to_string(),
            }),
        }
    }
    parsed
}

/// Format one attempt as a log line.
pub fn format_record(code: SecurityCode) -> String {
    format!("{}\n", code.value())
}
