use std::sync::{Mutex, OnceLock};

#[derive(Debug, Clone)]
pub enum SplitProgress {
    Stage(&'static str),
    Chunks {
        done: usize,
        total: usize,
        percent: f32,
    },
    Stem {
        name: String,
        done: usize,
        total: usize,
    },
    Finished,
}

type ProgressCb = Box<dyn Fn(SplitProgress) + Send + 'static>;

static SPLIT_PROGRESS_CB: OnceLock<Mutex<Option<ProgressCb>>> = OnceLock::new();

/// Install the process-wide progress hook. Only the first call takes effect.
pub fn set_split_progress_callback(cb: impl Fn(SplitProgress) + Send + 'static) {
    let _ = SPLIT_PROGRESS_CB.set(Mutex::new(Some(Box::new(cb))));
}

pub fn emit_split_progress(progress: SplitProgress) {
    if let Some(m) = SPLIT_PROGRESS_CB.get() {
        if let Ok(g) = m.lock() {
            if let Some(cb) = &*g {
                cb(progress);
            }
        }
    }
}

pub(crate) fn emit_chunks(done: usize, total: usize) {
    let percent = if total > 0 {
        done as f32 / total as f32 * 100.0
    } else {
        100.0
    };
    emit_split_progress(SplitProgress::Chunks {
        done,
        total,
        percent,
    });
}
