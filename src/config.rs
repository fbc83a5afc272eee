use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use regex::Regex;

use crate::order::RecordOrder;

#[derive(Clone)]
pub(crate) struct Config {
    tmp: PathBuf,
    tmp_prefix: String,
    tmp_suffix: String,
    tasks: usize,
    queue_size: usize,
    chunk_size: usize,
    buffer_size: usize,
    ignore_lines: Option<Regex>,
    strict: bool,
    order: Arc<dyn RecordOrder>,
    cancel: Arc<AtomicBool>,
}

impl Config {
    pub(crate) fn new(
        tmp: PathBuf,
        tmp_prefix: String,
        tmp_suffix: String,
        tasks: usize,
        chunk_size: usize,
        buffer_size: usize,
        ignore_lines: Option<Regex>,
        strict: bool,
        order: Arc<dyn RecordOrder>,
        cancel: Arc<AtomicBool>,
    ) -> Config {
        // one pending chunk on top of the ones being sorted
        let queue_size = 1;
        // a chunk holds at least one record
        let chunk_size = chunk_size.max(1);
        Config {
            tmp,
            tmp_prefix,
            tmp_suffix,
            tasks,
            queue_size,
            chunk_size,
            buffer_size,
            ignore_lines,
            strict,
            order,
            cancel,
        }
    }

    pub(crate) fn tmp(&self) -> &PathBuf {
        &self.tmp
    }

    pub(crate) fn tmp_prefix(&self) -> &String {
        &self.tmp_prefix
    }

    pub(crate) fn tmp_suffix(&self) -> &String {
        &self.tmp_suffix
    }

    pub(crate) fn tasks(&self) -> usize {
        self.tasks
    }

    pub(crate) fn queue_size(&self) -> usize {
        self.queue_size
    }

    pub(crate) fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub(crate) fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub(crate) fn ignore_lines(&self) -> &Option<Regex> {
        &self.ignore_lines
    }

    pub(crate) fn strict(&self) -> bool {
        self.strict
    }

    pub(crate) fn order(&self) -> &Arc<dyn RecordOrder> {
        &self.order
    }

    pub(crate) fn cancel(&self) -> &Arc<AtomicBool> {
        &self.cancel
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }
}
