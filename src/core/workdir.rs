//! Per-run scratch space: one `chunk_NNNN/` directory per chunk.

use crate::error::{Result, SplitError};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tempfile::{Builder, TempDir};
use tracing::{info, warn};

pub struct WorkDir {
    dir: TempDir,
    keep: bool,
}

impl WorkDir {
    /// Create a fresh work directory under `root`, or the system temp dir.
    pub fn create(root: Option<&Path>, keep: bool) -> Result<Self> {
        let mut builder = Builder::new();
        builder.prefix("chunked_split_");
        let dir = match root {
            Some(root) => {
                fs::create_dir_all(root).map_err(|e| SplitError::fs(root, e))?;
                builder.tempdir_in(root).map_err(|e| SplitError::fs(root, e))?
            }
            None => builder
                .tempdir()
                .map_err(|e| SplitError::fs(std::env::temp_dir(), e))?,
        };
        Ok(Self { dir, keep })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn chunk_dir(&self, index: usize) -> PathBuf {
        self.path().join(format!("chunk_{index:04}"))
    }

    pub fn chunk_source(&self, index: usize) -> PathBuf {
        self.chunk_dir(index).join("source.wav")
    }

    pub fn chunk_stems_dir(&self, index: usize) -> PathBuf {
        self.chunk_dir(index).join("stems")
    }

    pub fn concat_list(&self, stem: &str) -> PathBuf {
        self.path().join(format!("concat_{stem}.txt"))
    }

    /// Finish a successful run: remove the directory, or keep it when asked.
    pub fn close(self) -> Result<Option<PathBuf>> {
        if self.keep {
            let kept = self.dir.keep();
            info!("temporary chunks kept under {}", kept.display());
            return Ok(Some(kept));
        }
        let path = self.path().to_path_buf();
        self.dir.close().map_err(|e| SplitError::fs(path, e))?;
        Ok(None)
    }

    /// Tear down after a failed run. Cleanup problems are logged, never returned,
    /// so they cannot mask the error that ended the run.
    pub fn abandon(self) {
        if self.keep {
            let kept = self.dir.keep();
            info!("run failed; temporary chunks kept under {}", kept.display());
            return;
        }
        let path = self.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            warn!("could not remove work dir {}: {e}", path.display());
        }
    }
}
