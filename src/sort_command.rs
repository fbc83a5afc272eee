use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;

use anyhow::{anyhow, Context};
use command_executor::command::Command;

use crate::chunk_iterator::Chunk;
use crate::config::Config;
use crate::sorted_chunk_file::{ChunkSink, SortedChunkFile};

/// Sorts one chunk and spills it to its chunk file
pub(crate) struct SortCommand {
    chunk: Mutex<Option<Chunk>>,
    path: PathBuf,
    config: Config,
    sink: Arc<ChunkSink>,
}

impl SortCommand {
    pub(crate) fn new(chunk: Chunk, path: PathBuf, config: Config, sink: Arc<ChunkSink>) -> SortCommand {
        SortCommand {
            chunk: Mutex::new(Some(chunk)),
            path,
            config,
            sink,
        }
    }

    pub(crate) fn write_sorted_chunk(chunk: Chunk, path: PathBuf, config: &Config) -> Result<SortedChunkFile, anyhow::Error> {
        let index = chunk.index();
        let mut records = chunk.into_records();
        let order = config.order();
        records.sort_unstable_by(|a, b| order.compare(a, b));

        let chunk_file = File::create(&path)
            .with_context(|| anyhow!("path: {}", path.display()))?;
        let mut buf_writer = BufWriter::with_capacity(config.buffer_size(), chunk_file);
        for record in &records {
            writeln!(buf_writer, "{}", record)
                .with_context(|| anyhow!("path: {}", path.display()))?;
        }
        buf_writer.flush()
            .with_context(|| anyhow!("path: {}", path.display()))?;

        log::debug!(
            "Wrote sorted chunk {}, records: {}, thread: {}",
            index,
            records.len(),
            thread::current().name().unwrap_or("unnamed")
        );
        Ok(SortedChunkFile::new(index, path, records.len()))
    }
}

impl Command for SortCommand {
    fn execute(&self) -> Result<(), anyhow::Error> {
        let chunk = self.chunk.lock().unwrap_or_else(|e| e.into_inner()).take();
        let Some(chunk) = chunk else {
            return Ok(());
        };

        if self.sink.is_aborted() || self.config.is_cancelled() {
            log::debug!("Skipping chunk {}, sort is stopping", chunk.index());
            return Ok(());
        }

        match Self::write_sorted_chunk(chunk, self.path.clone(), &self.config) {
            Ok(sorted_chunk_file) => self.sink.push(sorted_chunk_file),
            Err(e) => {
                log::error!("Failed to write chunk {}: {:#}", self.path.display(), e);
                self.sink.fail(e);
            }
        }
        Ok(())
    }
}
