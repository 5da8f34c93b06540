use std::path::Path;

use crate::{
    composition::model::{AudioPlan, Composition},
    foundation::core::{Fps, FrameIndex},
    foundation::error::{QuoteReelError, QuoteReelResult},
    render::fingerprint::FrameFingerprint,
    render::offline::{OfflineOpts, OfflineRenderer},
};

/// Render-job document format version.
pub const RENDER_JOB_VERSION: u32 = 1;

/// Audio instructions for the external renderer, flattened from the [`AudioPlan`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioCue {
    pub track: String,
    pub path: String,
    /// Media second aligned with frame 0.
    pub start_sec: f64,
    pub gain: f32,
    pub fade_in_sec: f64,
    pub fade_out_sec: f64,
    /// Timeline second where audio stops.
    pub end_sec: f64,
}

impl From<&AudioPlan> for AudioCue {
    fn from(p: &AudioPlan) -> Self {
        Self {
            track: p.track.id.clone(),
            path: p.track.path.clone(),
            start_sec: p.start_sec,
            gain: p.gain,
            fade_in_sec: p.envelope.fade_in_sec,
            fade_out_sec: p.envelope.fade_out_sec,
            end_sec: p.envelope.end_sec,
        }
    }
}

/// Everything the offline renderer needs to reproduce the preview.
///
/// `fingerprints[i]` is the fingerprint of frame `i`; a renderer that evaluates the embedded
/// composition itself can check every frame against it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderJob {
    pub version: u32,
    pub fps: Fps,
    pub total_frames: u64,
    pub composition: Composition,
    pub audio: Option<AudioCue>,
    pub fingerprints: Vec<FrameFingerprint>,
}

impl RenderJob {
    /// Evaluate the whole timeline and package it.
    #[tracing::instrument(skip_all, fields(frames = comp.total_frames()))]
    pub fn build(comp: Composition, opts: OfflineOpts) -> QuoteReelResult<Self> {
        let renderer = OfflineRenderer::new(comp, opts)?;
        let fingerprints = renderer.fingerprint_all()?;
        let comp = renderer.composition();
        Ok(Self {
            version: RENDER_JOB_VERSION,
            fps: comp.fps,
            total_frames: comp.total_frames(),
            audio: comp.audio.as_ref().map(AudioCue::from),
            composition: comp.clone(),
            fingerprints,
        })
    }

    pub fn validate(&self) -> QuoteReelResult<()> {
        if self.version != RENDER_JOB_VERSION {
            return Err(QuoteReelError::validation(format!(
                "unsupported render job version {}",
                self.version
            )));
        }
        self.composition.validate()?;
        if self.fps != self.composition.fps || self.total_frames != self.composition.total_frames()
        {
            return Err(QuoteReelError::validation(
                "render job header disagrees with its composition",
            ));
        }
        if self.fingerprints.len() as u64 != self.total_frames {
            return Err(QuoteReelError::validation(format!(
                "expected {} fingerprints, found {}",
                self.total_frames,
                self.fingerprints.len()
            )));
        }
        Ok(())
    }

    /// Re-evaluate the composition and return the first frame whose fingerprint differs.
    pub fn first_mismatch(&self, opts: OfflineOpts) -> QuoteReelResult<Option<FrameIndex>> {
        self.validate()?;
        let fresh = OfflineRenderer::new(self.composition.clone(), opts)?.fingerprint_all()?;
        Ok(fresh
            .iter()
            .zip(&self.fingerprints)
            .position(|(a, b)| a != b)
            .map(|i| FrameIndex(i as u64)))
    }

    pub fn from_json_str(s: &str) -> QuoteReelResult<Self> {
        let job: Self = serde_json::from_str(s)?;
        job.validate()?;
        Ok(job)
    }

    pub fn from_path(path: &Path) -> QuoteReelResult<Self> {
        let s = std::fs::read_to_string(path)?;
        Self::from_json_str(&s)
    }

    pub fn to_json_pretty(&self) -> QuoteReelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to(&self, path: &Path) -> QuoteReelResult<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/job.rs"]
mod tests;
