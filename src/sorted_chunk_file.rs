use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A spilled chunk: `records` lines in sorted order
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SortedChunkFile {
    index: usize,
    path: PathBuf,
    records: usize,
}

impl SortedChunkFile {
    pub(crate) fn new(index: usize, path: PathBuf, records: usize) -> SortedChunkFile {
        SortedChunkFile {
            index,
            path,
            records,
        }
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn path(&self) -> &PathBuf {
        &self.path
    }

    pub(crate) fn records(&self) -> usize {
        self.records
    }
}

/// Collects the chunk files written by the sorting workers, and the first failure among them.
#[derive(Debug, Default)]
pub(crate) struct ChunkSink {
    files: Mutex<Vec<SortedChunkFile>>,
    error: Mutex<Option<anyhow::Error>>,
    aborted: AtomicBool,
}

impl ChunkSink {
    pub(crate) fn new() -> ChunkSink {
        ChunkSink::default()
    }

    pub(crate) fn push(&self, file: SortedChunkFile) {
        self.files
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(file);
    }

    /// Keep the first error and stop the remaining work
    pub(crate) fn fail(&self, error: anyhow::Error) {
        let mut guard = self.error.lock().unwrap_or_else(|e| e.into_inner());
        if guard.is_none() {
            *guard = Some(error);
        }
        self.abort();
    }

    pub(crate) fn abort(&self) {
        self.aborted.store(true, Ordering::Relaxed);
    }

    pub(crate) fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Relaxed)
    }

    pub(crate) fn take_error(&self) -> Option<anyhow::Error> {
        self.error.lock().unwrap_or_else(|e| e.into_inner()).take()
    }

    /// Chunk files ordered by chunk index
    pub(crate) fn take_files(&self) -> Vec<SortedChunkFile> {
        let mut files = std::mem::take(&mut *self.files.lock().unwrap_or_else(|e| e.into_inner()));
        files.sort_by_key(|file| file.index());
        files
    }
}
