//! Template inspection.

use std::path::PathBuf;

use clap::Args;
use fingerhash_minutiae::Minutia;
use serde::Serialize;

use super::{load_settings, load_template, output_result};
use crate::Cli;

/// Parse an `.xyt` file and print its minutiae with neighbor descriptors.
#[derive(Args)]
pub struct ParseCommand {
    /// Minutiae file ("X Y ANGLE" per line)
    file: PathBuf,

    /// Records to read (overrides settings)
    #[arg(long)]
    max_minutiae: Option<usize>,

    /// Neighbor descriptors per minutia (overrides settings)
    #[arg(short = 'n', long)]
    neighbors: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ParseOutput<'a> {
    file: String,
    minutiae: &'a [Minutia],
}

impl ParseCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let mut settings = load_settings(cli.config.as_deref())?.template;
        if let Some(max) = self.max_minutiae {
            settings.max_minutiae = max;
        }
        if let Some(n) = self.neighbors {
            settings.num_neighbors = n;
        }

        let tpl = load_template(&self.file, &settings)?;
        let output = ParseOutput {
            file: self.file.display().to_string(),
            minutiae: tpl.minutiae()?,
        };
        output_result(&output, cli.output.as_deref(), cli.json)
    }
}
