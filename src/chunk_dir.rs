use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use tempfile::{Builder, TempDir};

use crate::config::Config;

const DIR_PREFIX: &str = "text-record-sort-";

/// The scratch directory of one sort operation.
///
/// A fresh, uniquely named directory is created inside the configured tmp directory, so
/// concurrent sorts sharing a tmp directory never see each other's chunk files. The directory
/// and everything in it is removed by [ChunkDir::close], or when the value is dropped on an
/// error path.
#[derive(Debug)]
pub(crate) struct ChunkDir {
    dir: TempDir,
    prefix: String,
    suffix: String,
}

impl ChunkDir {
    pub(crate) fn create(config: &Config) -> Result<ChunkDir, anyhow::Error> {
        fs::create_dir_all(config.tmp())
            .with_context(|| anyhow!("path: {}", config.tmp().display()))?;
        let dir = Builder::new()
            .prefix(DIR_PREFIX)
            .tempdir_in(config.tmp())
            .with_context(|| anyhow!("Failed to create chunk directory in {}", config.tmp().display()))?;
        log::info!("Created chunk directory {}", dir.path().display());
        Ok(
            ChunkDir {
                dir,
                prefix: config.tmp_prefix().clone(),
                suffix: config.tmp_suffix().clone(),
            }
        )
    }

    pub(crate) fn path(&self) -> &Path {
        self.dir.path()
    }

    pub(crate) fn chunk_path(&self, index: usize) -> PathBuf {
        self.dir.path().join(format!("{}{:06}{}", self.prefix, index, self.suffix))
    }

    pub(crate) fn close(self) -> Result<(), anyhow::Error> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()
            .with_context(|| anyhow!("Failed to remove chunk directory {}", path.display()))?;
        log::info!("Removed chunk directory {}", path.display());
        Ok(())
    }
}
