use std::cmp::Ordering;
use std::sync::Arc;

use crate::config::Config;
use crate::order::RecordOrder;
use crate::record::Record;
use crate::record_reader::RecordReader;
use crate::sorted_chunk_file::SortedChunkFile;

/// An open chunk file during the merge, together with its smallest unconsumed record.
///
/// Ordering is reversed so that a [std::collections::BinaryHeap] (a max heap) yields the chunk
/// with the smallest head first. Equal heads are ordered by chunk index, the lowest index first.
pub(crate) struct UnmergedChunkFile {
    index: usize,
    reader: RecordReader,
    head: Option<Record>,
    order: Arc<dyn RecordOrder>,
}

impl UnmergedChunkFile {
    pub(crate) fn new(sorted_chunk_file: &SortedChunkFile, config: &Config) -> Result<UnmergedChunkFile, anyhow::Error> {
        let mut reader = RecordReader::open(sorted_chunk_file.path(), config.buffer_size())?;
        let head = reader.next_record()?;
        Ok(
            UnmergedChunkFile {
                index: sorted_chunk_file.index(),
                reader,
                head,
                order: config.order().clone(),
            }
        )
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn head(&self) -> Option<&Record> {
        self.head.as_ref()
    }

    /// Take the head and read the next record in its place
    pub(crate) fn line_record(&mut self) -> Result<Option<Record>, anyhow::Error> {
        if self.head.is_none() {
            return Ok(None);
        }
        let next = self.reader.next_record()?;
        Ok(std::mem::replace(&mut self.head, next))
    }

    pub(crate) fn skipped(&self) -> u64 {
        self.reader.skipped()
    }
}

impl Eq for UnmergedChunkFile {}

impl PartialEq<Self> for UnmergedChunkFile {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd<Self> for UnmergedChunkFile {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UnmergedChunkFile {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.head, &other.head) {
            (None, None) => other.index.cmp(&self.index),
            // exhausted files sink to the bottom of the heap
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(head), Some(other_head)) => {
                self.order
                    .compare(other_head, head)
                    .then_with(|| other.index.cmp(&self.index))
            }
        }
    }
}
