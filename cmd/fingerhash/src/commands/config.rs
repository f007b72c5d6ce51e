//! Settings commands.

use clap::{Args, Subcommand};

use super::{load_settings, output_result, print_success, save_settings, settings_path, Settings};
use crate::Cli;

/// Show or initialize settings.
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Print the effective settings
    Show,
    /// Print the settings file path
    Path,
    /// Write default settings to the settings file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl ConfigCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            ConfigSubcommand::Show => {
                let settings = load_settings(cli.config.as_deref())?;
                output_result(&settings, cli.output.as_deref(), cli.json)
            }
            ConfigSubcommand::Path => {
                println!("{}", settings_path(cli.config.as_deref())?.display());
                Ok(())
            }
            ConfigSubcommand::Init { force } => {
                let path = settings_path(cli.config.as_deref())?;
                if path.exists() && !force {
                    anyhow::bail!("{} already exists, use --force to overwrite", path.display());
                }
                save_settings(&Settings::default(), &path)?;
                print_success(&format!("wrote {}", path.display()));
                Ok(())
            }
        }
    }
}
