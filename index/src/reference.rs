use std::fmt;

use crate::config::MAX_MINUTIAE_PER_TEMPLATE;
use crate::error::{IndexError, Result};

/// `(template_id, minutia_id)` packed into the 32-bit value stored in a
/// bucket: `template_id * MAX_MINUTIAE_PER_TEMPLATE + minutia_id`.
///
/// The packed value doubles as an index into the per-minutia vote table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MinutiaRef(u32);

impl MinutiaRef {
    /// Packs the pair. Fails with `InvalidParameter` if `minutia_id` is not
    /// below [`MAX_MINUTIAE_PER_TEMPLATE`] or the result overflows.
    pub fn encode(template_id: u32, minutia_id: u32) -> Result<Self> {
        if minutia_id >= MAX_MINUTIAE_PER_TEMPLATE {
            return Err(IndexError::InvalidParameter(format!(
                "minutia id {minutia_id} exceeds {}",
                MAX_MINUTIAE_PER_TEMPLATE - 1
            )));
        }
        template_id
            .checked_mul(MAX_MINUTIAE_PER_TEMPLATE)
            .and_then(|base| base.checked_add(minutia_id))
            .map(Self)
            .ok_or_else(|| IndexError::InvalidParameter(format!("template id {template_id} too large")))
    }

    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn template_id(self) -> u32 {
        self.0 / MAX_MINUTIAE_PER_TEMPLATE
    }

    pub fn minutia_id(self) -> u32 {
        self.0 % MAX_MINUTIAE_PER_TEMPLATE
    }
}

impl fmt::Debug for MinutiaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MinutiaRef({}:{})", self.template_id(), self.minutia_id())
    }
}
