use crate::builder::build_neighbors;
use crate::error::TemplateError;
use crate::minutia::Minutia;

/// The feature set of one fingerprint.
///
/// A template is either [`Template::Uninitialized`] (default, or after
/// [`Template::destroy`]) or [`Template::Initialized`] with minutiae whose
/// neighbor descriptors have been computed. Consumers reject uninitialized
/// templates with [`TemplateError::NotInitialized`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Template {
    #[default]
    Uninitialized,
    Initialized(Vec<Minutia>),
}

impl Template {
    /// Builds a template from `(x, y, angle)` points.
    ///
    /// Ids follow the order of `points`. Each minutia receives
    /// `num_neighbors` descriptors, so more than `num_neighbors` points are
    /// required.
    pub fn from_points(points: &[(u32, u32, u32)], num_neighbors: usize) -> Result<Self, TemplateError> {
        let mut minutiae = Vec::with_capacity(points.len());
        for (i, &(x, y, angle)) in points.iter().enumerate() {
            if angle > 359 {
                return Err(TemplateError::InvalidParameter(format!(
                    "minutia {i}: angle {angle} exceeds 359"
                )));
            }
            minutiae.push(Minutia::new(i as u32, x, y, angle));
        }
        Self::build(minutiae, num_neighbors)
    }

    /// Wraps minutiae whose neighbors were computed elsewhere.
    ///
    /// No geometry is recomputed; ids and descriptors are taken as given.
    pub fn from_prebuilt(minutiae: Vec<Minutia>) -> Self {
        Self::Initialized(minutiae)
    }

    pub(crate) fn build(mut minutiae: Vec<Minutia>, num_neighbors: usize) -> Result<Self, TemplateError> {
        build_neighbors(&mut minutiae, num_neighbors)?;
        Ok(Self::Initialized(minutiae))
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self, Self::Initialized(_))
    }

    /// Returns the minutiae, or `NotInitialized`.
    pub fn minutiae(&self) -> Result<&[Minutia], TemplateError> {
        match self {
            Self::Initialized(minutiae) => Ok(minutiae),
            Self::Uninitialized => Err(TemplateError::NotInitialized),
        }
    }

    /// Number of minutiae; zero when uninitialized.
    pub fn len(&self) -> usize {
        match self {
            Self::Initialized(minutiae) => minutiae.len(),
            Self::Uninitialized => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of neighbor descriptors over all minutiae.
    pub fn neighbor_count(&self) -> usize {
        match self {
            Self::Initialized(minutiae) => minutiae.iter().map(|m| m.neighbors.len()).sum(),
            Self::Uninitialized => 0,
        }
    }

    /// Releases the minutiae. Calling it again is a no-op.
    pub fn destroy(&mut self) {
        *self = Self::Uninitialized;
    }
}
