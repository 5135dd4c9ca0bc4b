//! Resources command - list available resource types

use console::style;

use crate::error::Result;
use crate::util::GlobalOptions;

pub fn run(options: &GlobalOptions, output_json: bool) -> Result<()> {
    let catalog = options.catalog()?;

    if output_json {
        let types: Vec<_> = catalog
            .iter()
            .map(|(type_name, schema)| {
                serde_json::json!({
                    "typeName": type_name,
                    "apiVersion": schema.api_version(),
                    "kind": schema.kind,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&types)?);
        return Ok(());
    }

    println!(
        "{:<56} {:<32} {}",
        style("TYPE").bold(),
        style("API VERSION").bold(),
        style("KIND").bold()
    );
    for (type_name, schema) in catalog.iter() {
        println!("{:<56} {:<32} {}", type_name, schema.api_version(), schema.kind);
    }

    Ok(())
}
