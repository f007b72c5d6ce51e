//! Fingerprint templates: minutiae plus relative-neighbor descriptors.
//!
//! # Pipeline
//!
//! 1. Minutiae come from `.xyt` text ([`Template::from_xyt`]) or from an
//!    image through an external detector ([`Template::from_raw_image`]).
//! 2. Every pair of minutiae is connected; each minutia keeps its
//!    `num_neighbors` shortest connections as [`Neighbor`] descriptors,
//!    expressed relative to its own position and angle.
//!
//! The descriptors are what the index stores and searches, so two
//! impressions of the same finger produce similar descriptors regardless of
//! where the finger sat on the sensor.
//!
//! ```
//! use fingerhash_minutiae::Template;
//!
//! let tpl = Template::from_xyt("0 0 90\n4 4 270\n", 64, 1).unwrap();
//! let n = tpl.minutiae().unwrap()[0].neighbors[0];
//! assert_eq!((n.relative_x, n.relative_y, n.relative_angle), (4, -4, 180));
//! ```

mod builder;
mod error;
mod image;
mod minutia;
mod template;
mod xyt;

pub use builder::build_neighbors;
pub use error::TemplateError;
pub use image::{MinutiaeExtractor, RawImage, MIN_RELIABILITY};
pub use minutia::{DetectedMinutia, Minutia, Neighbor};
pub use template::Template;
pub use xyt::parse_xyt;
