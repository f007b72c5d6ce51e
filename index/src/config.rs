use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};

/// Upper bound on minutiae per enrolled template. Composite references are
/// `template_id * MAX_MINUTIAE_PER_TEMPLATE + minutia_id`.
pub const MAX_MINUTIAE_PER_TEMPLATE: u32 = 64;

/// Maximum number of ranked matches returned by an identification.
pub const MAX_MATCHES: usize = 100;

/// Number of distinct angle values, `0..=359`.
pub const ANGLE_RANGE: u32 = 360;

/// Layout of the bucket space. Fixed for the lifetime of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Relative x coordinates span `-max_x..=max_x` (default: 353).
    pub max_x: u32,
    /// Relative y coordinates span `-max_y..=max_y` (default: 390).
    pub max_y: u32,
    /// Width of a bucket along x and y (default: 1).
    pub pixels_per_group: u32,
    /// Width of a bucket along the angle axis (default: 2).
    pub degrees_per_group: u32,
    /// Slots added each time a bucket grows (default: 32).
    pub alloc_step: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_x: 353,
            max_y: 390,
            pixels_per_group: 1,
            degrees_per_group: 2,
            alloc_step: 32,
        }
    }
}

impl DatabaseConfig {
    pub fn with_max_coord(mut self, max_x: u32, max_y: u32) -> Self {
        self.max_x = max_x;
        self.max_y = max_y;
        self
    }

    pub fn with_density(mut self, pixels_per_group: u32, degrees_per_group: u32) -> Self {
        self.pixels_per_group = pixels_per_group;
        self.degrees_per_group = degrees_per_group;
        self
    }

    pub fn with_alloc_step(mut self, alloc_step: u32) -> Self {
        self.alloc_step = alloc_step;
        self
    }

    /// Checks that every field is positive and `degrees_per_group < 360`.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("max_x", self.max_x),
            ("max_y", self.max_y),
            ("pixels_per_group", self.pixels_per_group),
            ("degrees_per_group", self.degrees_per_group),
            ("alloc_step", self.alloc_step),
        ];
        for (name, value) in fields {
            if value == 0 {
                return Err(IndexError::InvalidConfiguration(format!("{name} must be positive")));
            }
        }
        if self.degrees_per_group >= ANGLE_RANGE {
            return Err(IndexError::InvalidConfiguration(format!(
                "degrees_per_group must be below {ANGLE_RANGE}, got {}",
                self.degrees_per_group
            )));
        }
        if self.max_x > i32::MAX as u32 / 2 || self.max_y > i32::MAX as u32 / 2 {
            return Err(IndexError::InvalidConfiguration(
                "max_x and max_y must fit the signed coordinate range".into(),
            ));
        }
        Ok(())
    }
}

/// Tolerances and thresholds used by identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Allowed deviation of a neighbor's x (default: 5).
    pub x_tolerance: u32,
    /// Allowed deviation of a neighbor's y (default: 5).
    pub y_tolerance: u32,
    /// Allowed deviation of a neighbor's angle in degrees (default: 7).
    pub t_tolerance: u32,
    /// Compatible neighbors needed for two minutiae to match (default: 15).
    pub minutia_threshold: u32,
    /// Matching minutiae needed for a template to be reported (default: 1).
    pub template_threshold: u32,
    /// Non-compatible minutiae after which a match would be aborted
    /// (default: 0, never). Stored but not consulted by the scoring loop.
    pub failure_threshold: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            x_tolerance: 5,
            y_tolerance: 5,
            t_tolerance: 7,
            minutia_threshold: 15,
            template_threshold: 1,
            failure_threshold: 0,
        }
    }
}
