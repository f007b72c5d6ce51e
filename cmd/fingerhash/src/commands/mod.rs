//! CLI commands module.

mod config;
mod identify;
mod parse;
mod settings;
mod util;

pub use config::ConfigCommand;
pub use identify::IdentifyCommand;
pub use parse::ParseCommand;

pub(crate) use settings::*;
pub(crate) use util::*;
