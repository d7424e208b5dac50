//! Chunk planning: cut `[0, total)` into contiguous, bounded slices.

use crate::{
    error::{Result, SplitError},
    types::ChunkSpec,
};

/// Trailing remainders at or below this are float noise, not a chunk.
const EPSILON_SECS: f64 = 1e-6;

/// Shortest chunk worth cutting: about one audio frame.
pub const MIN_CHUNK_SECS: f64 = 1e-3;

/// Upper bound on the number of chunks in one plan.
pub const MAX_CHUNKS: usize = 1_000_000;

/// Split `[0, total_secs)` into `ceil(total / chunk)` slices of `chunk_secs`.
///
/// Boundaries are `i * chunk_secs`, clamped to `total_secs` for the last
/// slice, so they do not drift with the number of chunks. Chunks shorter
/// than [`MIN_CHUNK_SECS`] or plans above [`MAX_CHUNKS`] are rejected.
pub fn plan_chunks(total_secs: f64, chunk_secs: f64) -> Result<Vec<ChunkSpec>> {
    if !(total_secs.is_finite() && total_secs > 0.0) {
        return Err(SplitError::invalid(format!(
            "total duration must be positive, got {total_secs}"
        )));
    }
    if !(chunk_secs.is_finite() && chunk_secs > 0.0) {
        return Err(SplitError::invalid(format!(
            "chunk length must be positive, got {chunk_secs}"
        )));
    }
    if chunk_secs < MIN_CHUNK_SECS {
        return Err(SplitError::invalid(format!(
            "chunk length {chunk_secs}s is below the {MIN_CHUNK_SECS}s minimum"
        )));
    }

    let exact = (total_secs / chunk_secs).ceil();
    if exact > MAX_CHUNKS as f64 {
        return Err(SplitError::invalid(format!(
            "{total_secs}s in chunks of {chunk_secs}s needs {exact} chunks, more than {MAX_CHUNKS}"
        )));
    }

    let mut count = exact as usize;
    if count > 1 && total_secs - (count - 1) as f64 * chunk_secs <= EPSILON_SECS {
        count -= 1;
    }
    let count = count.max(1);

    Ok((0..count)
        .map(|index| {
            let start = index as f64 * chunk_secs;
            let end = if index + 1 == count {
                total_secs
            } else {
                (index + 1) as f64 * chunk_secs
            };
            ChunkSpec { index, start, end }
        })
        .collect())
}
