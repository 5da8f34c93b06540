use std::path::Path;

use crate::foundation::error::{QuoteReelError, QuoteReelResult};

/// Settings record produced by the external editing forms.
///
/// The core only reads it. Field names match the host's JSON exactly (camelCase); every field has
/// a default so partial records from older editors still load.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub person_quote: String,
    pub company_name: String,
    pub owner_account_image: Option<String>,
    pub partner_image: Option<String>,
    pub person_image: Option<String>,
    pub person_name: String,
    pub person_title: String,
    pub color_palette: ColorPalette,
    pub primary_font: String,
    pub secondary_font: String,
    /// Video length in seconds.
    pub video_duration: f64,
    pub animation_speed: AnimationSpeed,
    /// Seconds from the start until the person details appear.
    pub speaker_reveal_timing: f64,
    /// Catalog track id, or `none`.
    pub background_music: String,
    /// 0-100.
    pub music_volume: f64,
    pub music_fade_in: bool,
    pub music_fade_out: bool,
    pub music_fade_in_duration: f64,
    pub music_fade_out_duration: f64,
    /// Offset into the track where playback begins, in seconds.
    pub music_start_time: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            person_quote: String::new(),
            company_name: String::new(),
            owner_account_image: None,
            partner_image: None,
            person_image: None,
            person_name: String::new(),
            person_title: String::new(),
            color_palette: ColorPalette::default(),
            primary_font: "Inter".to_owned(),
            secondary_font: "Inter".to_owned(),
            video_duration: 15.0,
            animation_speed: AnimationSpeed::Medium,
            speaker_reveal_timing: 5.0,
            background_music: NO_MUSIC.to_owned(),
            music_volume: 50.0,
            music_fade_in: true,
            music_fade_out: true,
            music_fade_in_duration: 2.0,
            music_fade_out_duration: 2.0,
            music_start_time: 0.0,
        }
    }
}

/// Sentinel `backgroundMusic` value disabling all audio behavior.
pub const NO_MUSIC: &str = "none";

impl Settings {
    /// Parse a settings record from JSON.
    pub fn from_json_str(s: &str) -> QuoteReelResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Read and parse a settings JSON file.
    pub fn from_path(path: &Path) -> QuoteReelResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            QuoteReelError::validation(format!("read settings '{}': {e}", path.display()))
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// `musicVolume` mapped linearly onto `[0, 1]`.
    pub fn music_gain(&self) -> f32 {
        volume_to_gain(self.music_volume)
    }

    /// `true` when a background track is selected.
    pub fn has_music(&self) -> bool {
        let id = self.background_music.trim();
        !id.is_empty() && id != NO_MUSIC
    }
}

/// Map a 0-100 volume onto a `[0, 1]` gain. Out-of-range and NaN inputs are clamped.
pub fn volume_to_gain(volume: f64) -> f32 {
    if volume.is_nan() {
        return 0.0;
    }
    (volume.clamp(0.0, 100.0) / 100.0) as f32
}

/// Colors of the ad, as CSS color strings passed straight through to the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ColorPalette {
    pub background: String,
    pub accent: String,
    pub text: String,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            background: "#0f172a".to_owned(),
            accent: "#6366f1".to_owned(),
            text: "#ffffff".to_owned(),
        }
    }
}

/// Playback speed preset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationSpeed {
    Slow,
    #[default]
    Medium,
    Fast,
}

impl AnimationSpeed {
    /// Multiplier applied to timeline advancement.
    pub fn speed_factor(self) -> f64 {
        match self {
            Self::Slow => 0.7,
            Self::Medium => 1.0,
            Self::Fast => 1.5,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/settings/model.rs"]
mod tests;
