use std::cmp::{max, min, Ordering};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Context;
use regex::Regex;
use rlimit::{getrlimit, setrlimit, Resource};

use crate::chunk_dir::ChunkDir;
use crate::chunk_producer;
use crate::config::Config;
use crate::error::SortError;
use crate::merge;
use crate::order::{Order, RecordOrder, Reversed, TextThenNumber};
use crate::record::Record;
use crate::record_reader::RecordReader;

/// Default number of records per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 10 * 1024 * 1024;
/// Default size in bytes of the read and write buffers
pub const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// What a completed sort did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SortSummary {
    records: u64,
    skipped: u64,
    ignored: u64,
    chunks: usize,
}

impl SortSummary {
    /// Number of records written to the output
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Number of blank or malformed input lines left out of the output
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Number of input lines matched by the ignore regex
    pub fn ignored(&self) -> u64 {
        self.ignored
    }

    /// Number of sorted chunk files the input was split into
    pub fn chunks(&self) -> usize {
        self.chunks
    }
}

/// Sort a text file of `<number>. <text>` records
///
/// The input is split into chunks of at most `chunk_size` records. Chunks are sorted in parallel
/// and written to a private directory under the tmp directory, then merged into the output.
/// Lines that are not records are left out.
///
/// # Examples
/// ```
/// use std::path::PathBuf;
/// use text_record_sort::sort::Sort;
///
/// fn sort_records(input: PathBuf, output: PathBuf, tmp: PathBuf) -> Result<(), anyhow::Error> {
///     let mut text_record_sort = Sort::new(input, output);
///     // set number of CPU cores the sort will attempt to use. The default is to use all
///     // available cores.
///     text_record_sort.with_tasks(2);
///     // set the directory for intermediate results. The default is the system temp dir -
///     // std::env::temp_dir(), however, for large files it is recommended to provide a dedicated
///     // directory for intermediate files, preferably on the same file system as the output.
///     text_record_sort.with_tmp_dir(tmp);
///     let summary = text_record_sort.sort()?;
///     println!("sorted {} records, skipped {} lines", summary.records(), summary.skipped());
///     Ok(())
/// }
/// ```
pub struct Sort {
    input: PathBuf,
    output: PathBuf,
    tmp: PathBuf,
    tasks: usize,
    chunk_size: usize,
    buffer_size: usize,
    ignore_lines: Option<Regex>,
    strict: bool,
    order: Arc<dyn RecordOrder>,
    cancel: Arc<AtomicBool>,
}

impl Sort {
    /// Create a default Sort definition.
    ///
    /// * intermediate files go to a new directory inside std::env::temp_dir()
    /// * all CPU cores are used
    /// * chunks hold 10M records, I/O buffers are 1 MB
    /// * records are ordered by text, then by number
    /// * malformed lines are skipped
    pub fn new(input: PathBuf, output: PathBuf) -> Sort {
        Sort {
            input,
            output,
            tmp: std::env::temp_dir(),
            tasks: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
            buffer_size: DEFAULT_BUFFER_SIZE,
            ignore_lines: None,
            strict: false,
            order: Arc::new(TextThenNumber),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Set the directory for intermediate files. By default use std::env::temp_dir().
    /// The directory is created if missing and is never removed; each sort works in its own
    /// subdirectory which is removed when the sort returns.
    pub fn with_tmp_dir(&mut self, tmp: PathBuf) {
        self.tmp = tmp;
    }

    /// Set the number of tasks. The default is zero which will result in using all system cores
    pub fn with_tasks(&mut self, tasks: usize) {
        self.tasks = tasks;
    }

    /// Set the maximal number of records per chunk
    pub fn with_chunk_size(&mut self, chunk_size: usize) {
        self.chunk_size = chunk_size;
    }

    /// Set the size in bytes of the read and write buffers
    pub fn with_buffer_size(&mut self, buffer_size: usize) {
        self.buffer_size = buffer_size;
    }

    /// Specify which lines to ignore. Each line matching the regex will be ignored and will not
    /// appear in the output.
    pub fn with_ignore_lines(&mut self, r: Regex) {
        self.ignore_lines = Some(r)
    }

    /// Fail on the first malformed line instead of skipping it. Blank lines are always skipped.
    pub fn with_strict(&mut self, strict: bool) {
        self.strict = strict
    }

    /// Set [Order]
    pub fn with_order(&mut self, order: Order) {
        self.order = match order {
            Order::Asc => Arc::new(TextThenNumber),
            Order::Desc => Arc::new(Reversed(TextThenNumber)),
        }
    }

    /// Replace the record order with a custom one
    pub fn with_record_order(&mut self, order: Arc<dyn RecordOrder>) {
        self.order = order
    }

    /// Share a flag that stops the sort when set. A stopped sort removes its intermediate files
    /// and fails with [SortError::Cancelled].
    pub fn with_cancel_flag(&mut self, cancel: Arc<AtomicBool>) {
        self.cancel = cancel
    }

    /// Sort the input file into the output file
    pub fn sort(&self) -> Result<SortSummary, anyhow::Error> {
        if !self.input.exists() {
            return Err(SortError::SourceNotFound(self.input.clone()).into());
        }

        let config = self.create_config();
        log::info!("Start parallel sort of {}, tasks: {}", self.input.display(), config.tasks());
        let chunk_dir = ChunkDir::create(&config)?;
        let summary = Self::internal_sort(&self.input, &self.output, &chunk_dir, &config)?;
        chunk_dir.close()?;
        log::info!("Finish parallel sort of {}, records: {}", self.input.display(), summary.records);
        Ok(summary)
    }

    /// Check whether the input is already sorted. Malformed lines are skipped.
    pub fn check(&self) -> Result<bool, anyhow::Error> {
        let config = self.create_config();
        let reader = RecordReader::open(&self.input, config.buffer_size())?
            .with_ignore_lines(config.ignore_lines().clone())
            .with_strict(config.strict());

        let mut previous: Option<Record> = None;
        for record in reader {
            let record = record?;
            if let Some(previous_record) = &previous {
                if config.order().compare(previous_record, &record) == Ordering::Greater {
                    return Ok(false);
                }
            }
            previous = Some(record);
        }
        Ok(true)
    }

    fn create_config(&self) -> Config {
        let mut tasks = self.tasks;
        if self.tasks == 0 {
            tasks = num_cpus::get();
        }

        Config::new(
            self.tmp.clone(),
            "part-".to_string(),
            ".sorted".to_string(),
            tasks,
            self.chunk_size,
            self.buffer_size,
            self.ignore_lines.clone(),
            self.strict,
            self.order.clone(),
            self.cancel.clone(),
        )
    }

    fn internal_sort(input: &Path, output: &Path, chunk_dir: &ChunkDir, config: &Config) -> Result<SortSummary, anyhow::Error> {
        let produced = chunk_producer::produce(input, chunk_dir, config)?;
        if produced.skipped() > 0 {
            log::warn!("Skipped {} blank or malformed lines in {}", produced.skipped(), input.display());
        }

        let (current_soft, current_hard) = Self::get_rlimits()?;
        let new_soft = min(max((produced.chunk_files().len() + 256) as u64, current_soft), current_hard);
        if new_soft != current_soft {
            log::info!("Set new rlimit NOFILE, soft: {}, hard: {}", new_soft, current_hard);
            Self::set_rlimits(new_soft, current_hard)?;
        }
        let mut merged = merge::merge_chunk_files(produced.chunk_files(), output, config);
        if new_soft != current_soft {
            log::info!("Restore rlimit NOFILE, soft: {}, hard: {}", current_soft, current_hard);
            merged = Self::merge_outcome(merged, Self::set_rlimits(current_soft, current_hard));
        }

        Ok(
            SortSummary {
                records: merged?,
                skipped: produced.skipped(),
                ignored: produced.ignored(),
                chunks: produced.chunk_files().len(),
            }
        )
    }

    /// A merge failure takes precedence over a failure to restore the rlimit
    fn merge_outcome(merged: Result<u64, anyhow::Error>, restored: Result<(), anyhow::Error>) -> Result<u64, anyhow::Error> {
        match (merged, restored) {
            (Ok(merged), Ok(())) => Ok(merged),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(restore_error)) => {
                log::warn!("Failed to restore rlimit NOFILE: {:#}", restore_error);
                Err(e)
            }
        }
    }

    fn get_rlimits() -> Result<(u64, u64), anyhow::Error> {
        getrlimit(Resource::NOFILE).with_context(|| "getrlimit")
    }

    fn set_rlimits(soft: u64, hard: u64) -> Result<(), anyhow::Error> {
        setrlimit(Resource::NOFILE, soft, hard)
            .with_context(|| format!("set rlimit NOFILE, soft: {}, hard: {}", soft, hard))?;
        Ok(())
    }
}
