use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub(crate) const SEPARATOR: &str = ". ";

/// A numbered line of text: `<number>. <text>`
///
/// Records have no natural order, comparisons go through a [crate::order::RecordOrder].
///
/// # Examples
/// ```
/// use text_record_sort::record::Record;
///
/// let record = Record::parse("415. Apple").unwrap();
/// assert_eq!(record.number(), 415);
/// assert_eq!(record.text(), "Apple");
/// assert_eq!(record.to_string(), "415. Apple");
/// assert!(Record::parse("No number here").is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    text: String,
    number: i64,
}

impl Record {
    /// Create a new [Record]
    pub fn new(number: i64, text: String) -> Record {
        Record {
            text,
            number,
        }
    }

    /// Parse a line without its line terminator.
    ///
    /// Returns None for blank lines, lines without the `". "` separator and lines where the part
    /// before the first separator is not an integer. Everything after the first separator is
    /// the text, including further separators.
    pub fn parse(line: &str) -> Option<Record> {
        if line.trim().is_empty() {
            return None;
        }

        let (number, text) = line.split_once(SEPARATOR)?;
        let number = i64::from_str(number.trim()).ok()?;
        Some(
            Record {
                text: text.to_string(),
                number,
            }
        )
    }

    /// Get the text part
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Get the number part
    pub fn number(&self) -> i64 {
        self.number
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.number, SEPARATOR, self.text)
    }
}
