//! Utility functions for CLI commands.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use fingerhash_minutiae::Template;

use super::TemplateSettings;

/// Extension of minutiae files picked up from gallery directories.
pub const XYT_EXTENSION: &str = "xyt";

/// Reads an `.xyt` file into a template.
pub fn load_template(path: &Path, settings: &TemplateSettings) -> anyhow::Result<Template> {
    let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let tpl = Template::from_xyt(&text, settings.max_minutiae, settings.num_neighbors)
        .with_context(|| format!("invalid template {}", path.display()))?;
    Ok(tpl)
}

/// Expands gallery arguments: files are kept as given, directories
/// contribute their `.xyt` files in name order.
pub fn gallery_files(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        let mut found: Vec<PathBuf> = std::fs::read_dir(path)
            .with_context(|| format!("failed to list {}", path.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.is_file()
                    && p.extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| e.eq_ignore_ascii_case(XYT_EXTENSION))
            })
            .collect();
        found.sort();
        files.extend(found);
    }
    Ok(files)
}

/// Outputs result as JSON or YAML.
pub fn output_result<T: serde::Serialize>(result: &T, output_path: Option<&str>, as_json: bool) -> anyhow::Result<()> {
    let output = if as_json {
        serde_json::to_string_pretty(result)? + "\n"
    } else {
        serde_yaml::to_string(result)?
    };

    match output_path {
        Some(path) => std::fs::write(path, output)?,
        None => print!("{}", output),
    }

    Ok(())
}

/// Prints success message.
pub fn print_success(msg: &str) {
    eprintln!("\x1b[32m✓\x1b[0m {}", msg);
}

/// Prints warning message.
pub fn print_warning(msg: &str) {
    eprintln!("\x1b[33m⚠\x1b[0m {}", msg);
}
