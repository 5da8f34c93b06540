use rayon::prelude::*;

use crate::{
    composition::model::Composition,
    eval::evaluator::{Evaluator, VisualState},
    foundation::core::{FrameIndex, FrameRange},
    foundation::error::{QuoteReelError, QuoteReelResult},
    render::fingerprint::{FrameFingerprint, fingerprint_state},
};

/// Options controlling offline range evaluation.
#[derive(Clone, Debug, Default)]
pub struct OfflineOpts {
    /// Evaluate frames in parallel on a dedicated rayon pool.
    pub parallel: bool,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

/// Frame-by-frame driver for the external renderer.
///
/// Bypasses the clock entirely: frames are addressed by index and go through the same
/// [`Evaluator`] the preview uses. Output is always in frame order, whether or not the range was
/// evaluated in parallel.
pub struct OfflineRenderer {
    comp: Composition,
    opts: OfflineOpts,
}

impl OfflineRenderer {
    pub fn new(comp: Composition, opts: OfflineOpts) -> QuoteReelResult<Self> {
        comp.validate()?;
        if let Some(n) = opts.threads
            && n == 0
        {
            return Err(QuoteReelError::validation(
                "offline 'threads' must be >= 1 when set",
            ));
        }
        Ok(Self { comp, opts })
    }

    pub fn composition(&self) -> &Composition {
        &self.comp
    }

    /// Evaluate a single frame (clamped into the timeline).
    pub fn frame(&self, frame: FrameIndex) -> VisualState {
        Evaluator::evaluate(&self.comp, frame)
    }

    /// Evaluate every frame of `range`, in order.
    #[tracing::instrument(skip(self), fields(parallel = self.opts.parallel))]
    pub fn render_range(&self, range: FrameRange) -> QuoteReelResult<Vec<VisualState>> {
        self.map_range(range, |f| Evaluator::evaluate(&self.comp, f))
    }

    /// Fingerprint every frame of `range`, in order.
    pub fn fingerprints(&self, range: FrameRange) -> QuoteReelResult<Vec<FrameFingerprint>> {
        self.map_range(range, |f| {
            fingerprint_state(&Evaluator::evaluate(&self.comp, f))
        })
    }

    /// Fingerprints of the whole timeline.
    pub fn fingerprint_all(&self) -> QuoteReelResult<Vec<FrameFingerprint>> {
        self.fingerprints(self.comp.range())
    }

    fn map_range<T, M>(&self, range: FrameRange, map: M) -> QuoteReelResult<Vec<T>>
    where
        T: Send,
        M: Fn(FrameIndex) -> T + Sync + Send,
    {
        if range.is_empty() {
            return Err(QuoteReelError::validation(
                "offline range must be non-empty",
            ));
        }
        if range.end.0 > self.comp.total_frames() {
            return Err(QuoteReelError::validation(
                "offline range must be within composition duration",
            ));
        }

        let (start, end) = (range.start.0, range.end.0);
        if !self.opts.parallel {
            return Ok((start..end).map(|i| map(FrameIndex(i))).collect());
        }

        let pool = build_thread_pool(self.opts.threads)?;
        let out = pool.install(|| {
            (start..end)
                .into_par_iter()
                .map(|i| map(FrameIndex(i)))
                .collect()
        });
        tracing::debug!(frames = end - start, "offline range evaluated in parallel");
        Ok(out)
    }
}

fn build_thread_pool(threads: Option<usize>) -> QuoteReelResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| QuoteReelError::evaluation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/offline.rs"]
mod tests;
