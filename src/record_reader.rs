use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use anyhow::Context;
use regex::Regex;

use crate::error::SortError;
use crate::record::Record;

enum Line {
    Record(Record),
    Blank,
    Ignored,
    Malformed,
}

/// Streams records out of a file, one buffered line at a time.
///
/// Lines that do not parse are skipped and counted, unless strict mode is on in which case a
/// non-blank malformed line is an error.
#[derive(Debug)]
pub(crate) struct RecordReader {
    path: PathBuf,
    reader: BufReader<File>,
    line: Vec<u8>,
    lines: u64,
    records: u64,
    skipped: u64,
    ignored: u64,
    ignore_lines: Option<Regex>,
    strict: bool,
}

impl RecordReader {
    pub(crate) fn open(path: &Path, buffer_size: usize) -> Result<RecordReader, anyhow::Error> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SortError::SourceNotFound(path.to_path_buf()).into());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("path: {}", path.display()));
            }
        };

        Ok(
            RecordReader {
                path: path.to_path_buf(),
                reader: BufReader::with_capacity(buffer_size, file),
                line: Vec::new(),
                lines: 0,
                records: 0,
                skipped: 0,
                ignored: 0,
                ignore_lines: None,
                strict: false,
            }
        )
    }

    pub(crate) fn with_ignore_lines(mut self, ignore_lines: Option<Regex>) -> RecordReader {
        self.ignore_lines = ignore_lines;
        self
    }

    pub(crate) fn with_strict(mut self, strict: bool) -> RecordReader {
        self.strict = strict;
        self
    }

    /// Next parseable record, None at the end of the file
    pub(crate) fn next_record(&mut self) -> Result<Option<Record>, anyhow::Error> {
        loop {
            self.line.clear();
            let bytes = self.reader.read_until(b'\n', &mut self.line)
                .with_context(|| format!("file: {}, line: {}", self.path.display(), self.lines + 1))?;
            if bytes == 0 {
                return Ok(None);
            }
            self.lines += 1;

            match Self::classify(&self.line, self.ignore_lines.as_ref()) {
                Line::Record(record) => {
                    self.records += 1;
                    return Ok(Some(record));
                }
                Line::Blank => {
                    self.skipped += 1;
                }
                Line::Ignored => {
                    self.ignored += 1;
                }
                Line::Malformed => {
                    if self.strict {
                        return Err(
                            SortError::MalformedRecord {
                                path: self.path.clone(),
                                line: self.lines,
                            }.into()
                        );
                    }
                    self.skipped += 1;
                }
            }
        }
    }

    fn classify(line: &[u8], ignore_lines: Option<&Regex>) -> Line {
        let mut line = line.strip_suffix(b"\n").unwrap_or(line);
        // text never ends with '\r', so a record reads back unchanged from its chunk file
        while let Some(stripped) = line.strip_suffix(b"\r") {
            line = stripped;
        }
        match std::str::from_utf8(line) {
            Ok(line) if line.trim().is_empty() => Line::Blank,
            Ok(line) if ignore_lines.is_some_and(|r| r.is_match(line)) => Line::Ignored,
            Ok(line) => match Record::parse(line) {
                Some(record) => Line::Record(record),
                None => Line::Malformed,
            },
            Err(_) => Line::Malformed,
        }
    }

    pub(crate) fn records(&self) -> u64 {
        self.records
    }

    pub(crate) fn skipped(&self) -> u64 {
        self.skipped
    }

    pub(crate) fn ignored(&self) -> u64 {
        self.ignored
    }
}

impl Iterator for RecordReader {
    type Item = Result<Record, anyhow::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use regex::Regex;

    use crate::error::SortError;
    use crate::record::Record;
    use crate::record_reader::RecordReader;

    #[test]
    fn test_skips_malformed_and_blank_lines() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("input.txt");
        fs::write(&path, "415. Apple\nInvalid line\n\n   \r\n1. Apple\r\nNo number here\n2. Banana is yellow")?;

        let mut reader = RecordReader::open(&path, 16)?;
        let lines: Vec<String> = reader.by_ref()
            .map(|r| r.map(|record| record.to_string()))
            .collect::<Result<_, _>>()?;
        assert_eq!(lines, vec!["415. Apple", "1. Apple", "2. Banana is yellow"]);
        assert_eq!(reader.records(), 3);
        assert_eq!(reader.skipped(), 4);
        assert_eq!(reader.ignored(), 0);
        Ok(())
    }

    #[test]
    fn test_invalid_utf8_is_malformed() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("input.txt");
        fs::write(&path, b"1. ok\n2. \xff\xfe\n3. fine\n")?;

        let mut reader = RecordReader::open(&path, 1024)?;
        assert_eq!(reader.by_ref().count(), 2);
        assert_eq!(reader.skipped(), 1);
        Ok(())
    }

    #[test]
    fn test_ignore_lines() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("input.txt");
        fs::write(&path, "# 1. header\n1. Apple\n#comment\n")?;

        let mut reader = RecordReader::open(&path, 1024)?
            .with_ignore_lines(Some(Regex::new("^#")?));
        assert_eq!(reader.by_ref().count(), 1);
        assert_eq!(reader.ignored(), 2);
        assert_eq!(reader.skipped(), 0);
        Ok(())
    }

    #[test]
    fn test_strict_fails_on_malformed_line() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("input.txt");
        fs::write(&path, "1. Apple\n\nInvalid line\n")?;

        let mut reader = RecordReader::open(&path, 1024)?.with_strict(true);
        assert!(reader.next_record()?.is_some());
        let error = reader.next_record().unwrap_err();
        match error.downcast_ref::<SortError>() {
            Some(SortError::MalformedRecord { line, .. }) => assert_eq!(*line, 3),
            other => panic!("unexpected error: {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_strips_all_trailing_carriage_returns() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("input.txt");
        fs::write(&path, b"2. a\r\r\n3. b\rc\r\n")?;

        let records: Vec<Record> = RecordReader::open(&path, 1024)?.collect::<Result<_, _>>()?;
        assert_eq!(records[0].text(), "a");
        assert_eq!(records[1].text(), "b\rc");

        // written back the way chunk files are, every record reads back unchanged
        let chunk_path = dir.path().join("chunk.txt");
        let written: String = records.iter().map(|record| format!("{}\n", record)).collect();
        fs::write(&chunk_path, written)?;
        let read_back: Vec<Record> = RecordReader::open(&chunk_path, 1024)?.collect::<Result<_, _>>()?;
        assert_eq!(read_back, records);
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let error = RecordReader::open(Path::new("./target/does/not/exist.txt"), 1024).unwrap_err();
        assert!(matches!(error.downcast_ref::<SortError>(), Some(SortError::SourceNotFound(_))));
    }
}
