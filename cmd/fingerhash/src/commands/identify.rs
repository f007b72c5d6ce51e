//! Gallery identification.

use std::path::{Path, PathBuf};

use clap::Args;
use fingerhash_index::{Context, Match};
use serde::Serialize;

use super::{gallery_files, load_settings, load_template, output_result, print_success, print_warning, Settings};
use crate::Cli;

/// Enroll every gallery template, then identify the probe.
#[derive(Args)]
pub struct IdentifyCommand {
    /// Gallery .xyt file or directory of .xyt files (repeatable)
    #[arg(short = 'g', long = "gallery", required = true)]
    gallery: Vec<PathBuf>,

    /// Probe .xyt file
    probe: PathBuf,

    /// Report only the best match
    #[arg(long)]
    best: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct IdentifyOutput {
    pub probe: String,
    pub enrolled: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
    pub matches: Vec<MatchOutput>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MatchOutput {
    pub template_id: u32,
    pub score: u32,
    pub file: String,
}

impl IdentifyCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let settings = load_settings(cli.config.as_deref())?;
        let output = identify(&settings, &self.gallery, &self.probe, self.best)?;

        for file in &output.skipped {
            print_warning(&format!("skipped {file}"));
        }
        if cli.verbose {
            print_success(&format!(
                "{} templates enrolled, {} matches",
                output.enrolled,
                output.matches.len()
            ));
        }
        output_result(&output, cli.output.as_deref(), cli.json)
    }
}

/// Builds an index from `gallery` and matches `probe` against it.
///
/// Gallery files that do not yield a template are skipped and listed.
pub(crate) fn identify(
    settings: &Settings,
    gallery: &[PathBuf],
    probe: &Path,
    best_only: bool,
) -> anyhow::Result<IdentifyOutput> {
    let mut ctx = Context::with_config(Some(settings.database))?;
    ctx.set_match_config(settings.matching)?;

    // Ids are handed out sequentially, so position equals template id.
    let mut enrolled: Vec<String> = Vec::new();
    let mut skipped = Vec::new();
    for file in gallery_files(gallery)? {
        let name = file.display().to_string();
        let added = load_template(&file, &settings.template).and_then(|tpl| Ok(ctx.add_template(&tpl)?));
        match added {
            Ok(id) => {
                tracing::debug!(template_id = id, file = %name, "enrolled");
                enrolled.push(name);
            }
            Err(err) => {
                tracing::warn!(file = %name, error = %format!("{err:#}"), "gallery file skipped");
                skipped.push(name);
            }
        }
    }

    let probe_tpl = load_template(probe, &settings.template)?;
    let matches: Vec<Match> = if best_only {
        ctx.identify_best(&probe_tpl)?.into_iter().collect()
    } else {
        ctx.identify(&probe_tpl)?
    };

    Ok(IdentifyOutput {
        probe: probe.display().to_string(),
        enrolled: enrolled.len(),
        skipped,
        matches: matches
            .into_iter()
            .map(|m| MatchOutput {
                template_id: m.template_id,
                score: m.score,
                file: enrolled.get(m.template_id as usize).cloned().unwrap_or_default(),
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagonal(x0: u32, y0: u32) -> String {
        (0..21).map(|i| format!("{} {} 45\n", x0 + 3 * i, y0 + 3 * i)).collect()
    }

    fn horizontal() -> String {
        (0..21).map(|i| format!("{} 100 90\n", 10 + 15 * i)).collect()
    }

    #[test]
    fn probe_resolves_to_its_gallery_file() {
        let dir = tempfile::tempdir().unwrap();
        let gallery = dir.path().join("gallery");
        std::fs::create_dir(&gallery).unwrap();
        std::fs::write(gallery.join("a_diag.xyt"), diagonal(1, 2)).unwrap();
        std::fs::write(gallery.join("b_horiz.xyt"), horizontal()).unwrap();
        std::fs::write(gallery.join("c_short.xyt"), "1 1 0\n").unwrap();
        let probe = dir.path().join("probe.xyt");
        std::fs::write(&probe, diagonal(30, 5)).unwrap();

        let settings = Settings::default();
        let out = identify(&settings, &[gallery.clone()], &probe, false).unwrap();
        assert_eq!(out.enrolled, 2);
        assert_eq!(out.skipped, vec![gallery.join("c_short.xyt").display().to_string()]);
        assert_eq!(out.matches.len(), 1);
        assert_eq!(out.matches[0].template_id, 0);
        assert!(out.matches[0].file.ends_with("a_diag.xyt"));

        let best = identify(&settings, &[gallery], &probe, true).unwrap();
        assert_eq!(best.matches.len(), 1);
        assert_eq!(best.matches[0].template_id, 0);
    }

    #[test]
    fn no_match_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let gallery = dir.path().join("horiz.xyt");
        std::fs::write(&gallery, horizontal()).unwrap();
        let probe = dir.path().join("probe.xyt");
        std::fs::write(&probe, diagonal(1, 1)).unwrap();

        let out = identify(&Settings::default(), &[gallery], &probe, true).unwrap();
        assert_eq!(out.enrolled, 1);
        assert!(out.matches.is_empty());
    }

    #[test]
    fn unreadable_probe_fails() {
        let dir = tempfile::tempdir().unwrap();
        let probe = dir.path().join("missing.xyt");
        assert!(identify(&Settings::default(), &[], &probe, false).is_err());
    }
}
