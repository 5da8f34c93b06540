use crate::audio::sink::AudioError;
use crate::settings::model::NO_MUSIC;

/// One entry of the background-music catalog.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrackInfo {
    /// Stable id referenced by `backgroundMusic`.
    pub id: String,
    /// Resource path handed to the host audio device and the offline renderer.
    pub path: String,
    /// Nominal track length in seconds.
    pub duration_sec: f64,
}

// (id, resource path, nominal duration seconds)
const CATALOG: [(&str, &str, f64); 5] = [
    ("corporate1", "audio/corporate-1.mp3", 120.0),
    ("corporate2", "audio/corporate-2.mp3", 95.0),
    ("ambient1", "audio/ambient-1.mp3", 180.0),
    ("ambient2", "audio/ambient-2.mp3", 150.0),
    ("uplifting1", "audio/uplifting-1.mp3", 110.0),
];

/// Look up a track by id.
pub fn lookup(id: &str) -> Option<TrackInfo> {
    CATALOG
        .iter()
        .find(|(tid, _, _)| *tid == id)
        .map(|&(id, path, duration_sec)| TrackInfo {
            id: id.to_owned(),
            path: path.to_owned(),
            duration_sec,
        })
}

/// All catalog ids in table order.
pub fn track_ids() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|(id, _, _)| *id)
}

/// Resolve a `backgroundMusic` value.
///
/// `none` (or blank) resolves to `Ok(None)`; an id missing from the catalog is a
/// [`AudioError::UnknownTrack`], which callers downgrade to a muted session.
pub fn resolve(selection: &str) -> Result<Option<TrackInfo>, AudioError> {
    let id = selection.trim();
    if id.is_empty() || id == NO_MUSIC {
        return Ok(None);
    }
    lookup(id)
        .map(Some)
        .ok_or_else(|| AudioError::UnknownTrack(id.to_owned()))
}
