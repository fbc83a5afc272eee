use std::cmp::Ordering;

use crate::record::Record;

/// Sort order of the output
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Order {
    /// Text ascending, then number ascending
    #[default]
    Asc,
    /// The exact reverse of [Order::Asc]
    Desc,
}

/// A total order over records, used both to sort chunks and to merge them.
///
/// Implementations must be consistent: the same pair always compares the same way. Any
/// `Fn(&Record, &Record) -> Ordering` that is `Send + Sync` is a [RecordOrder].
///
/// # Examples
/// ```
/// use std::cmp::Ordering;
/// use text_record_sort::order::{RecordOrder, TextThenNumber};
/// use text_record_sort::record::Record;
///
/// let apple = Record::parse("415. Apple").unwrap();
/// let first_apple = Record::parse("1. Apple").unwrap();
/// assert_eq!(TextThenNumber.compare(&first_apple, &apple), Ordering::Less);
///
/// let by_number = |a: &Record, b: &Record| a.number().cmp(&b.number());
/// assert_eq!(by_number.compare(&apple, &first_apple), Ordering::Greater);
/// ```
pub trait RecordOrder: Send + Sync {
    fn compare(&self, a: &Record, b: &Record) -> Ordering;
}

/// Byte-wise text, then number ascending
#[derive(Clone, Copy, Debug, Default)]
pub struct TextThenNumber;

impl RecordOrder for TextThenNumber {
    fn compare(&self, a: &Record, b: &Record) -> Ordering {
        a.text()
            .as_bytes()
            .cmp(b.text().as_bytes())
            .then_with(|| a.number().cmp(&b.number()))
    }
}

/// Reverses the wrapped order
#[derive(Clone, Copy, Debug, Default)]
pub struct Reversed<O>(pub O);

impl<O: RecordOrder> RecordOrder for Reversed<O> {
    fn compare(&self, a: &Record, b: &Record) -> Ordering {
        self.0.compare(b, a)
    }
}

impl<F> RecordOrder for F
    where F: Fn(&Record, &Record) -> Ordering + Send + Sync {
    fn compare(&self, a: &Record, b: &Record) -> Ordering {
        self(a, b)
    }
}
