//! Fingerprint identification over a geometric hash index.
//!
//! Every neighbor descriptor of an enrolled template is quantized by its
//! relative `(x, y, angle)` into a bucket, and the bucket records which
//! template minutia it came from. To identify a probe, each of its neighbor
//! descriptors looks up the buckets within a tolerance window and votes for
//! the enrolled minutiae it finds there.
//!
//! # Architecture
//!
//! ```text
//! Template ──► add_template ──► GroupSpace::bucket_index ──► BucketStore
//!                                                               │
//! Template ──► identify ──► tolerance window ──► votes ──► scores ──► [Match]
//! ```
//!
//! # Scoring
//!
//! Votes are counted per enrolled minutia and restart with every probe
//! minutia. An enrolled minutia with at least `minutia_threshold` votes
//! gives its template one point. Templates with at least
//! `template_threshold` points are returned, best first.
//!
//! # Example
//!
//! ```
//! use fingerhash_index::{Context, DatabaseConfig};
//! use fingerhash_minutiae::Template;
//!
//! let cfg = DatabaseConfig::default().with_max_coord(4, 4).with_density(1, 90);
//! let mut ctx = Context::with_config(Some(cfg)).unwrap();
//!
//! let tpl = Template::from_xyt("0 0 90\n4 4 270\n", 64, 1).unwrap();
//! assert_eq!(ctx.add_template(&tpl).unwrap(), 0);
//! assert_eq!(ctx.template_counter().unwrap(), 1);
//! ```

mod config;
mod context;
mod enroll;
mod error;
mod hash;
mod identify;
mod journal;
mod reference;
mod store;


pub use config::{DatabaseConfig, MatchConfig, ANGLE_RANGE, MAX_MATCHES, MAX_MINUTIAE_PER_TEMPLATE};
pub use context::Context;
pub use error::{IndexError, Result};
pub use hash::GroupSpace;
pub use identify::Match;
pub use reference::MinutiaRef;
pub use store::BucketStore;

/// Crate version, for diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
