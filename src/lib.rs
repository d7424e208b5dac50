//! # chunked-stem-splitter
//!
//! Runs a source-separation model over audio far longer than the model can
//! take in one pass: the input is cut into time-bounded chunks with ffmpeg,
//! each chunk is separated on its own, and every stem is joined back
//! together without re-encoding.

pub mod cli;
pub mod core;
pub mod error;
pub mod io;
pub mod model;
pub mod types;
pub mod utils;

pub use crate::{
    core::{
        media::{Ffmpeg, MediaTool},
        planner::plan_chunks,
        separator::{Separator, Spleeter},
        splitter::{split_file, Splitter},
    },
    error::{Result, SplitError, Stage, ToolError},
    io::progress::{set_split_progress_callback, SplitProgress},
    model::registry::{list_models, resolve_stems},
    types::{ChunkPlan, ChunkSpec, SplitOptions, SplitResult, StemOutput},
};
