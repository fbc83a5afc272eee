use std::collections::BinaryHeap;
use std::fs;
use std::fs::File;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{anyhow, Context};

use crate::config::Config;
use crate::error::SortError;
use crate::sorted_chunk_file::SortedChunkFile;
use crate::unmerged_chunk_file::UnmergedChunkFile;

const CANCEL_CHECK_INTERVAL: u64 = 4096;

/// Merge sorted chunk files into `output`, returning the number of records written.
///
/// The output is created (or truncated) before any chunk file is opened; a missing parent
/// directory fails with [SortError::DestinationNotFound], a destination that may not be written
/// with [SortError::DestinationNotWritable]. If the merge fails after that the partial output is
/// removed.
pub(crate) fn merge_chunk_files(chunk_files: &[SortedChunkFile], output: &Path, config: &Config) -> Result<u64, anyhow::Error> {
    log::info!(
        "Merging {} sorted chunk files, {} records, into {}, thread: {}",
        chunk_files.len(),
        chunk_files.iter().map(|chunk_file| chunk_file.records()).sum::<usize>(),
        output.display(),
        thread::current().name().unwrap_or("unnamed")
    );
    let mut merged_writer = create_output(output, config)?;
    let merged = merge_into(chunk_files, &mut merged_writer, config)
        .and_then(|merged| {
            merged_writer.flush()
                .with_context(|| anyhow!("path: {}", output.display()))?;
            Ok(merged)
        });

    match merged {
        Ok(merged) => {
            log::info!("Finished merging sorted chunk files, merged length: {} records", merged);
            Ok(merged)
        }
        Err(e) => {
            drop(merged_writer);
            if let Err(remove_error) = fs::remove_file(output) {
                log::warn!("Failed to remove partial output {}: {}", output.display(), remove_error);
            }
            Err(e)
        }
    }
}

fn create_output(output: &Path, config: &Config) -> Result<BufWriter<File>, anyhow::Error> {
    let parent = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !parent.is_dir() {
        return Err(SortError::DestinationNotFound(parent).into());
    }
    if output.is_dir() {
        return Err(SortError::DestinationNotWritable(output.to_path_buf()).into());
    }

    match File::create(output) {
        Ok(file) => Ok(BufWriter::with_capacity(config.buffer_size(), file)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(SortError::DestinationNotFound(parent).into())
        }
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            Err(SortError::DestinationNotWritable(output.to_path_buf()).into())
        }
        Err(e) => Err(e).with_context(|| anyhow!("path: {}", output.display())),
    }
}

fn merge_into<W: Write>(chunk_files: &[SortedChunkFile], merged_writer: &mut W, config: &Config) -> Result<u64, anyhow::Error> {
    let mut unmerged_files = BinaryHeap::with_capacity(chunk_files.len());
    for chunk_file in chunk_files {
        let unmerged = UnmergedChunkFile::new(chunk_file, config)?;
        if unmerged.head().is_some() {
            unmerged_files.push(unmerged);
        }
    }

    let mut merged_len: u64 = 0;
    let mut skipped: u64 = 0;
    while let Some(mut current_min) = unmerged_files.pop() {
        // comparison operators are flipped to work with BinaryHeap (max heap)
        while unmerged_files.peek().map_or(true, |next| &current_min >= next) {
            let Some(record) = current_min.line_record()? else {
                break;
            };
            if merged_len % CANCEL_CHECK_INTERVAL == 0 && config.is_cancelled() {
                return Err(SortError::Cancelled.into());
            }
            writeln!(merged_writer, "{}", record)?;
            merged_len += 1;
        }

        if current_min.head().is_some() {
            unmerged_files.push(current_min);
        } else {
            log::debug!("Chunk {} exhausted", current_min.index());
            skipped += current_min.skipped();
        }
    }

    if skipped > 0 {
        log::warn!("Skipped {} malformed lines in chunk files", skipped);
    }
    Ok(merged_len)
}
