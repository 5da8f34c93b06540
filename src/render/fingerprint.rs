use xxhash_rust::xxh3::Xxh3;

use crate::{
    eval::evaluator::{ElementState, VisualState},
    foundation::core::Transform2D,
};

const XXH3_SEED: u64 = 0x8b5ad4a0c7d8e9f1;

/// Stable 128-bit digest of one evaluated frame.
///
/// Two frames with the same fingerprint present identically. The preview and the offline
/// renderer compare fingerprints to prove they agree frame for frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FrameFingerprint {
    pub hi: u64,
    pub lo: u64,
}

impl std::fmt::Display for FrameFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

/// Fingerprint a visual state. Floats hash by bit pattern, maps in key order.
pub fn fingerprint_state(state: &VisualState) -> FrameFingerprint {
    let mut h = StableHasher::new();
    h.write_u64(state.frame.0);
    h.write_u32(state.elements.len() as u32);
    for (id, e) in &state.elements {
        h.write_str(id);
        write_element(&mut h, e);
    }
    h.finish()
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_i32(&mut self, v: i32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_str(&mut self, s: &str) {
        self.write_u32(s.len() as u32);
        self.write_bytes(s.as_bytes());
    }

    fn finish(self) -> FrameFingerprint {
        let v = self.inner.digest128();
        FrameFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

fn write_element(h: &mut StableHasher, e: &ElementState) {
    h.write_bool(e.visible);
    h.write_f64(e.opacity);
    h.write_i32(e.z);
    write_transform(h, &e.transform);

    match &e.text {
        Some(t) => {
            h.write_u8(1);
            h.write_str(t);
        }
        None => h.write_u8(0),
    }

    h.write_u32(e.images.len() as u32);
    for img in &e.images {
        h.write_str(img);
    }

    h.write_u32(e.labels.len() as u32);
    for (k, v) in &e.labels {
        h.write_str(k);
        h.write_str(v);
    }
}

fn write_transform(h: &mut StableHasher, t: &Transform2D) {
    h.write_f64(t.translate.x);
    h.write_f64(t.translate.y);
    h.write_f64(t.scale);
    h.write_f64(t.rotation_deg);
}

#[cfg(test)]
#[path = "../../tests/unit/render/fingerprint.rs"]
mod tests;
