use serde::{Deserialize, Serialize};

/// A ridge ending or bifurcation.
///
/// `id` is stable within the owning template and equals the minutia's
/// position in [`Template::minutiae`](crate::Template::minutiae).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Minutia {
    pub id: u32,
    pub x: u32,
    pub y: u32,
    /// Direction in degrees, `0..=359`.
    pub angle: u32,
    /// Closest other minutiae, ascending by distance.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub neighbors: Vec<Neighbor>,
}

impl Minutia {
    /// Creates a minutia without neighbors.
    pub fn new(id: u32, x: u32, y: u32, angle: u32) -> Self {
        Self {
            id,
            x,
            y,
            angle,
            neighbors: Vec::new(),
        }
    }
}

/// Position and direction of another minutia of the same template,
/// expressed in the frame of the owning minutia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighbor {
    pub relative_x: i32,
    pub relative_y: i32,
    /// Absolute angle difference in degrees. Always below 360 when produced
    /// by the builder; the index reduces it modulo 360 when searching.
    pub relative_angle: u32,
    pub neighbor_id: u32,
}

/// A minutia as reported by an external extractor, before ids are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectedMinutia {
    pub x: u32,
    pub y: u32,
    pub angle: u32,
    /// Reliability in percent (`0..=100`).
    pub quality: u32,
}
