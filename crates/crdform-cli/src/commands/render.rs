//! Render command - print the manifest for a configuration

use console::style;
use std::path::Path;

use crate::error::{CliError, Result};
use crate::util::{GlobalOptions, read_config};

pub fn run(
    options: &GlobalOptions,
    type_name: &str,
    config_file: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let catalog = options.catalog()?;
    let schema = catalog.get(type_name)?;
    let config = read_config(config_file, schema)?;

    let manifest = crdform_core::render(schema, &config)?;

    match output {
        Some(path) => {
            std::fs::write(path, manifest.as_bytes()).map_err(|e| CliError::io(path.display(), e))?;
            eprintln!(
                "{} Wrote {} manifest to {}",
                style("✓").green(),
                schema.kind,
                path.display()
            );
        }
        None => print!("{}", manifest),
    }

    Ok(())
}
