//! Schema command - describe the attributes of a resource type

use console::style;

use crate::display::display_fields;
use crate::error::Result;
use crate::util::GlobalOptions;

pub fn run(options: &GlobalOptions, type_name: &str, as_yaml: bool) -> Result<()> {
    let catalog = options.catalog()?;
    let schema = catalog.get(type_name)?;

    if as_yaml {
        print!("{}", serde_yaml::to_string(schema)?);
        return Ok(());
    }

    println!("{}", style(type_name).cyan().bold());
    println!("{}", style("=".repeat(type_name.len())).dim());
    println!();
    println!("{}: {}", style("API Version").bold(), schema.api_version());
    println!("{}: {}", style("Kind").bold(), schema.kind);
    if let Some(description) = &schema.description {
        println!("{}: {}", style("Description").bold(), description);
    }
    println!();
    println!("{}:", style("Attributes").bold());
    display_fields(&schema.fields, 0);

    Ok(())
}
