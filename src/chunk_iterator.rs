use std::cmp::min;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::SortError;
use crate::record::Record;
use crate::record_reader::RecordReader;

const INITIAL_CAPACITY: usize = 64 * 1024;
const CANCEL_CHECK_INTERVAL: usize = 4096;

#[derive(Debug)]
pub(crate) struct Chunk {
    index: usize,
    records: Vec<Record>,
}

impl Chunk {
    pub(crate) fn new(index: usize, records: Vec<Record>) -> Chunk {
        Chunk {
            index,
            records,
        }
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn into_records(self) -> Vec<Record> {
        self.records
    }
}

/// Cuts the record stream into chunks of `chunk_size` records. Only the last chunk may be
/// shorter.
pub(crate) struct ChunkIterator {
    reader: RecordReader,
    chunk_size: usize,
    capacity: usize,
    index: usize,
    cancel: Arc<AtomicBool>,
    done: bool,
}

impl ChunkIterator {
    pub(crate) fn new(reader: RecordReader, chunk_size: usize, cancel: Arc<AtomicBool>) -> ChunkIterator {
        let chunk_size = chunk_size.max(1);
        ChunkIterator {
            reader,
            chunk_size,
            capacity: min(chunk_size, INITIAL_CAPACITY),
            index: 0,
            cancel,
            done: false,
        }
    }

    pub(crate) fn reader(&self) -> &RecordReader {
        &self.reader
    }

    fn fill(&mut self) -> Result<Vec<Record>, anyhow::Error> {
        let mut records = Vec::with_capacity(self.capacity);
        while records.len() < self.chunk_size {
            if records.len() % CANCEL_CHECK_INTERVAL == 0 && self.cancel.load(Ordering::Relaxed) {
                return Err(SortError::Cancelled.into());
            }
            match self.reader.next_record()? {
                Some(record) => records.push(record),
                None => {
                    self.done = true;
                    break;
                }
            }
        }
        // a full chunk is likely to be followed by another one
        if records.len() == self.chunk_size {
            self.capacity = self.chunk_size;
        }
        Ok(records)
    }
}

impl Iterator for ChunkIterator {
    type Item = Result<Chunk, anyhow::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.fill() {
            Ok(records) if records.is_empty() => None,
            Ok(records) => {
                let chunk = Chunk::new(self.index, records);
                self.index += 1;
                Some(Ok(chunk))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
