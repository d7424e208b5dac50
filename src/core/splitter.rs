use crate::{
    core::{
        media::{Ffmpeg, MediaTool},
        planner::plan_chunks,
        separator::{Separator, Spleeter},
        workdir::WorkDir,
    },
    error::{Result, SplitError, Stage, ToolError},
    io::progress::{emit_chunks, emit_split_progress, SplitProgress},
    model::registry::resolve_stems,
    types::{ChunkPlan, ChunkSpec, SplitOptions, SplitResult, StemOutput},
};

use rayon::prelude::*;
use std::{
    borrow::Cow,
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};
use tracing::{debug, info, warn};

/// Allowed gap between a joined stem and the sum of its chunk files.
pub const DURATION_TOLERANCE_SECS: f64 = 0.1;

/// Separate `input` with ffmpeg and spleeter configured from `opts`.
pub fn split_file(input: impl AsRef<Path>, opts: SplitOptions) -> Result<SplitResult> {
    Splitter::from_options(opts).run(input.as_ref())
}

/// Drives one run: plan, extract + separate every chunk, join per stem.
pub struct Splitter<M, S> {
    media: M,
    separator: S,
    opts: SplitOptions,
}

impl Splitter<Ffmpeg, Spleeter> {
    pub fn from_options(opts: SplitOptions) -> Self {
        Self::new(Ffmpeg::from_options(&opts), Spleeter::from_options(&opts), opts)
    }
}

impl<M: MediaTool, S: Separator> Splitter<M, S> {
    pub fn new(media: M, separator: S, opts: SplitOptions) -> Self {
        Self {
            media,
            separator,
            opts,
        }
    }

    pub fn options(&self) -> &SplitOptions {
        &self.opts
    }

    /// Probe and plan `input` without writing anything. Fails on the same
    /// option, model and input errors as [`Splitter::run`].
    pub fn plan(&self, input: &Path) -> Result<ChunkPlan> {
        self.validate()?;
        self.stem_names()?;
        self.probe_and_plan(input)
    }

    pub fn run(&self, input: &Path) -> Result<SplitResult> {
        self.validate()?;
        let stems = self.stem_names()?;

        emit_split_progress(SplitProgress::Stage("plan"));
        let plan = self.probe_and_plan(input)?;

        let work = WorkDir::create(self.opts.temp_root.as_deref(), self.opts.keep_temp)?;
        debug!("work dir {}", work.path().display());

        match self.separate_and_join(input, &plan, &stems, &work) {
            Ok(outputs) => {
                work.close()?;
                emit_split_progress(SplitProgress::Finished);
                Ok(SplitResult {
                    stems: outputs,
                    chunks: plan.chunks.len(),
                    duration: plan.total_duration,
                })
            }
            Err(e) => {
                work.abandon();
                Err(e)
            }
        }
    }

    fn validate(&self) -> Result<()> {
        let o = &self.opts;
        if !(o.chunk_secs.is_finite() && o.chunk_secs > 0.0) {
            return Err(SplitError::invalid(format!(
                "chunk length must be positive, got {}",
                o.chunk_secs
            )));
        }
        if o.jobs == 0 {
            return Err(SplitError::invalid("jobs must be at least 1"));
        }
        if o.codec.trim().is_empty() {
            return Err(SplitError::invalid("codec must not be empty"));
        }
        if o.model.trim().is_empty() {
            return Err(SplitError::invalid("model must not be empty"));
        }
        Ok(())
    }

    fn stem_names(&self) -> Result<Vec<String>> {
        match &self.opts.stems {
            Some(stems) if stems.is_empty() => Err(SplitError::invalid("stem list is empty")),
            Some(stems) => Ok(stems.clone()),
            None => resolve_stems(&self.opts.model),
        }
    }

    fn probe_and_plan(&self, input: &Path) -> Result<ChunkPlan> {
        if !input.is_file() {
            return Err(SplitError::invalid(format!(
                "input file '{}' not found",
                input.display()
            )));
        }

        let total = self.media.probe_duration(input).map_err(|e| match e {
            ToolError::Launch { .. } => SplitError::tool(Stage::Planning, None, e),
            other => SplitError::invalid(format!(
                "cannot determine duration of '{}': {other}",
                input.display()
            )),
        })?;

        let chunks = plan_chunks(total, self.opts.chunk_secs)?;
        info!(
            "duration {:.2}s -> {} chunk(s) of {}s",
            total,
            chunks.len(),
            self.opts.chunk_secs
        );

        Ok(ChunkPlan {
            total_duration: total,
            chunk_length: self.opts.chunk_secs,
            chunks,
        })
    }

    fn separate_and_join(
        &self,
        input: &Path,
        plan: &ChunkPlan,
        stems: &[String],
        work: &WorkDir,
    ) -> Result<Vec<StemOutput>> {
        emit_split_progress(SplitProgress::Stage("separate"));
        let chunk_stems = self.process_chunks(input, plan, stems, work)?;

        emit_split_progress(SplitProgress::Stage("concatenate"));
        fs::create_dir_all(&self.opts.output_dir)
            .map_err(|e| SplitError::fs(&self.opts.output_dir, e))?;

        let base = input
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or(Cow::Borrowed("output"));

        let mut outputs = Vec::with_capacity(stems.len());
        for (si, stem) in stems.iter().enumerate() {
            emit_split_progress(SplitProgress::Stem {
                name: stem.clone(),
                done: si,
                total: stems.len(),
            });
            let parts: Vec<PathBuf> = chunk_stems.iter().map(|c| c[si].clone()).collect();
            let dest = self
                .opts
                .output_dir
                .join(format!("{base}_{stem}.{}", self.opts.codec));

            info!("concatenating {stem} ({} parts)", parts.len());
            self.join_stem(&parts, &work.concat_list(stem), &dest)?;
            outputs.push(StemOutput {
                name: stem.clone(),
                path: dest,
            });
        }
        Ok(outputs)
    }

    /// Extract and separate every chunk on a pool of `jobs` workers.
    /// Returns, per chunk in index order, its stem files in `stems` order.
    fn process_chunks(
        &self,
        input: &Path,
        plan: &ChunkPlan,
        stems: &[String],
        work: &WorkDir,
    ) -> Result<Vec<Vec<PathBuf>>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.opts.jobs)
            .thread_name(|i| format!("chunk-worker-{i}"))
            .build()
            .map_err(|e| {
                SplitError::invalid(format!("cannot start {} workers: {e}", self.opts.jobs))
            })?;

        let total = plan.chunks.len();
        let done = AtomicUsize::new(0);
        emit_chunks(0, total);

        pool.install(|| {
            plan.chunks
                .par_iter()
                .map(|chunk| {
                    let files = self.process_chunk(input, chunk, stems, work)?;
                    let n = done.fetch_add(1, Ordering::SeqCst) + 1;
                    info!("chunk {} done ({n}/{total})", chunk.index);
                    emit_chunks(n, total);
                    Ok(files)
                })
                .collect::<Result<Vec<_>>>()
        })
    }

    fn process_chunk(
        &self,
        input: &Path,
        chunk: &ChunkSpec,
        stems: &[String],
        work: &WorkDir,
    ) -> Result<Vec<PathBuf>> {
        let i = chunk.index;
        let dir = work.chunk_dir(i);
        fs::create_dir_all(&dir).map_err(|e| SplitError::fs(&dir, e))?;

        let source = work.chunk_source(i);
        debug!(
            "chunk {i}: extracting [{:.3}, {:.3})",
            chunk.start, chunk.end
        );
        self.media
            .extract(input, chunk, &source)
            .map_err(|e| SplitError::tool(Stage::Extraction, Some(i), e))?;
        if !source.is_file() {
            return Err(SplitError::tool(
                Stage::Extraction,
                Some(i),
                ToolError::MissingOutput { path: source },
            ));
        }

        let out_dir = work.chunk_stems_dir(i);
        let attempts = self.opts.retries.saturating_add(1);
        let mut attempt = 1;
        loop {
            reset_dir(&out_dir)?;
            let result = self
                .separator
                .separate(&source, &self.opts.model, &out_dir)
                .and_then(|()| collect_stems(&out_dir, stems, &self.opts.codec));
            match result {
                Ok(files) => return Ok(files),
                Err(e) if attempt < attempts => {
                    warn!("chunk {i}: separation attempt {attempt}/{attempts} failed: {e}");
                    attempt += 1;
                }
                Err(e) => return Err(SplitError::tool(Stage::Separation, Some(i), e)),
            }
        }
    }

    fn join_stem(&self, parts: &[PathBuf], list_file: &Path, dest: &Path) -> Result<()> {
        let concat_err = |e| SplitError::tool(Stage::Concatenation, None, e);

        if let Err(e) = self.media.concat(parts, list_file, dest) {
            discard(dest);
            return Err(concat_err(e));
        }
        if !self.opts.verify_durations {
            return Ok(());
        }

        self.verify_join(parts, dest).map_err(|e| {
            discard(dest);
            concat_err(e)
        })
    }

    fn verify_join(&self, parts: &[PathBuf], dest: &Path) -> std::result::Result<(), ToolError> {
        let mut expected = 0.0;
        for part in parts {
            expected += self.media.probe_duration(part)?;
        }
        let actual = self.media.probe_duration(dest)?;
        if (actual - expected).abs() > DURATION_TOLERANCE_SECS {
            return Err(ToolError::DurationMismatch {
                path: dest.to_path_buf(),
                expected,
                actual,
            });
        }
        debug!("{} verified at {actual:.3}s", dest.display());
        Ok(())
    }
}

fn reset_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(|e| SplitError::fs(dir, e))?;
    }
    fs::create_dir_all(dir).map_err(|e| SplitError::fs(dir, e))
}

fn collect_stems(
    dir: &Path,
    stems: &[String],
    codec: &str,
) -> std::result::Result<Vec<PathBuf>, ToolError> {
    stems
        .iter()
        .map(|stem| {
            let path = dir.join(format!("{stem}.{codec}"));
            if path.is_file() {
                Ok(path)
            } else {
                Err(ToolError::MissingOutput { path })
            }
        })
        .collect()
}

fn discard(path: &Path) {
    if path.exists() {
        if let Err(e) = fs::remove_file(path) {
            warn!("could not remove partial output {}: {e}", path.display());
        }
    }
}
