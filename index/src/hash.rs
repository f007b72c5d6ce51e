//! Geometric hash: maps a neighbor's `(x, y, t)` to a bucket index.
//!
//! The space `[-max_x, max_x] x [-max_y, max_y] x [0, 359]` is cut into
//! groups of `pixels_per_group` along x and y and `degrees_per_group` along
//! the angle. Buckets are laid out x-major:
//!
//! ```text
//! index = (y_groups * t_groups) * x_idx + t_groups * y_idx + t_idx
//! ```

use crate::config::{DatabaseConfig, ANGLE_RANGE};
use crate::error::{IndexError, Result};

/// Bucket space derived from a [`DatabaseConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSpace {
    max_x: i64,
    max_y: i64,
    pixels_per_group: i64,
    degrees_per_group: i64,
    x_groups: usize,
    y_groups: usize,
    t_groups: usize,
    bucket_count: usize,
}

impl GroupSpace {
    /// Fails with `InvalidConfiguration` if the config is invalid or the
    /// bucket count does not fit in memory addressing.
    pub fn new(cfg: &DatabaseConfig) -> Result<Self> {
        cfg.validate()?;
        let x_groups = groups(2 * cfg.max_x as u64 + 1, cfg.pixels_per_group as u64);
        let y_groups = groups(2 * cfg.max_y as u64 + 1, cfg.pixels_per_group as u64);
        let t_groups = groups(ANGLE_RANGE as u64, cfg.degrees_per_group as u64);

        let bucket_count = x_groups
            .checked_mul(y_groups)
            .and_then(|n| n.checked_mul(t_groups))
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| IndexError::InvalidConfiguration("too many buckets".into()))?;

        Ok(Self {
            max_x: cfg.max_x as i64,
            max_y: cfg.max_y as i64,
            pixels_per_group: cfg.pixels_per_group as i64,
            degrees_per_group: cfg.degrees_per_group as i64,
            x_groups: x_groups as usize,
            y_groups: y_groups as usize,
            t_groups: t_groups as usize,
            bucket_count,
        })
    }

    /// `(x_groups, y_groups, t_groups)`.
    pub fn groups(&self) -> (usize, usize, usize) {
        (self.x_groups, self.y_groups, self.t_groups)
    }

    /// Total number of buckets.
    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    /// Bucket holding `(x, y, t)`.
    ///
    /// `t` must already be reduced to `0..=359`. Out-of-range input yields
    /// `ValueOutOfRange`, which window searches treat as "skip this cell".
    pub fn bucket_index(&self, x: i64, y: i64, t: i64) -> Result<usize> {
        if !(-self.max_x..=self.max_x).contains(&x)
            || !(-self.max_y..=self.max_y).contains(&y)
            || !(0..ANGLE_RANGE as i64).contains(&t)
        {
            return Err(IndexError::ValueOutOfRange { x, y, t });
        }

        let x_idx = ((self.max_x + x) / self.pixels_per_group) as usize;
        let y_idx = ((self.max_y + y) / self.pixels_per_group) as usize;
        let t_idx = (t / self.degrees_per_group) as usize;

        Ok(self.y_groups * self.t_groups * x_idx + self.t_groups * y_idx + t_idx)
    }

    pub(crate) fn max_x(&self) -> i64 {
        self.max_x
    }

    pub(crate) fn max_y(&self) -> i64 {
        self.max_y
    }

    pub(crate) fn pixels_per_group(&self) -> i64 {
        self.pixels_per_group
    }

    pub(crate) fn degrees_per_group(&self) -> i64 {
        self.degrees_per_group
    }
}

fn groups(values: u64, per_group: u64) -> u64 {
    values.div_ceil(per_group)
}
