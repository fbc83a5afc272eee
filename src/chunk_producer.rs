use std::path::Path;
use std::sync::Arc;

use command_executor::shutdown_mode::ShutdownMode;
use command_executor::thread_pool::ThreadPool;
use command_executor::thread_pool_builder::ThreadPoolBuilder;

use crate::chunk_dir::ChunkDir;
use crate::chunk_iterator::ChunkIterator;
use crate::config::Config;
use crate::error::SortError;
use crate::record_reader::RecordReader;
use crate::sort_command::SortCommand;
use crate::sorted_chunk_file::{ChunkSink, SortedChunkFile};

#[derive(Debug)]
pub(crate) struct ProducedChunks {
    chunk_files: Vec<SortedChunkFile>,
    records: u64,
    skipped: u64,
    ignored: u64,
}

impl ProducedChunks {
    pub(crate) fn chunk_files(&self) -> &Vec<SortedChunkFile> {
        &self.chunk_files
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

/// Split `input` into sorted chunk files inside `chunk_dir`.
///
/// Full chunks are sorted on the pool, at most `tasks` at a time. Submitting blocks while the
/// pool queue is full, which keeps the reader from running ahead of the workers. The trailing
/// partial chunk is sorted on the calling thread. Returns once every chunk file is written.
pub(crate) fn produce(input: &Path, chunk_dir: &ChunkDir, config: &Config) -> Result<ProducedChunks, anyhow::Error> {
    log::info!("Start splitting {} into sorted chunks", input.display());
    let reader = RecordReader::open(input, config.buffer_size())?
        .with_ignore_lines(config.ignore_lines().clone())
        .with_strict(config.strict());
    let mut chunks = ChunkIterator::new(reader, config.chunk_size(), config.cancel().clone());
    let sink = Arc::new(ChunkSink::new());

    let mut thread_pool_builder = ThreadPoolBuilder::new();
    let mut sorting_pool = thread_pool_builder
        .with_name("sorting".to_string())
        .with_tasks(config.tasks())
        .with_queue_size(config.queue_size())
        .with_shutdown_mode(ShutdownMode::CompletePending)
        .build()?;

    let dispatched = dispatch(&mut chunks, &mut sorting_pool, &sink, chunk_dir, config);
    if dispatched.is_err() {
        sink.abort();
    }

    log::info!("Shutting down sorting pool");
    sorting_pool.shutdown();
    sorting_pool.join()?;

    dispatched?;
    if let Some(e) = sink.take_error() {
        return Err(e);
    }
    if config.is_cancelled() {
        return Err(SortError::Cancelled.into());
    }

    let reader = chunks.reader();
    let produced = ProducedChunks {
        chunk_files: sink.take_files(),
        records: reader.records(),
        skipped: reader.skipped(),
        ignored: reader.ignored(),
    };
    log::info!(
        "Finished splitting {}, records: {}, chunks: {}, skipped lines: {}",
        input.display(),
        produced.records,
        produced.chunk_files.len(),
        produced.skipped
    );
    Ok(produced)
}

fn dispatch(
    chunks: &mut ChunkIterator,
    sorting_pool: &mut ThreadPool,
    sink: &Arc<ChunkSink>,
    chunk_dir: &ChunkDir,
    config: &Config,
) -> Result<(), anyhow::Error> {
    for chunk in chunks {
        let chunk = chunk?;
        if sink.is_aborted() {
            // a worker failed, its error is reported once the pool is joined
            break;
        }

        let path = chunk_dir.chunk_path(chunk.index());
        if chunk.len() == config.chunk_size() {
            log::debug!("Submitting chunk {}", chunk.index());
            let sort_command = Box::new(SortCommand::new(chunk, path, config.clone(), sink.clone()));
            sorting_pool.submit(sort_command);
        } else {
            let sorted_chunk_file = SortCommand::write_sorted_chunk(chunk, path, config)?;
            sink.push(sorted_chunk_file);
        }
    }
    Ok(())
}
