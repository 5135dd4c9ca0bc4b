//! Validate command - check a configuration against its resource schema

use console::style;
use std::path::Path;

use crate::display::ValidationReport;
use crate::error::{CliError, Result};
use crate::util::{GlobalOptions, read_config};

pub fn run(
    options: &GlobalOptions,
    type_name: &str,
    config_file: &Path,
    json_output: bool,
) -> Result<()> {
    let catalog = options.catalog()?;
    let schema = catalog.get(type_name)?;
    let config = read_config(config_file, schema)?;

    let result = crdform_core::validate_config(schema, &config);

    if json_output {
        let output = serde_json::json!({
            "valid": result.is_valid,
            "type": type_name,
            "errors": &result.errors,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if result.is_valid {
        println!(
            "{} {} is a valid {}",
            style("✓").green().bold(),
            config_file.display(),
            schema.kind
        );
    } else {
        let report = ValidationReport::new(config_file.display().to_string(), &result.errors);
        report.display();
        println!();
        report.print_summary();
    }

    if !result.is_valid {
        return Err(CliError::validation(format!(
            "{} has {} problem(s)",
            config_file.display(),
            result.errors.len()
        )));
    }

    Ok(())
}
