//! Apply command - create or update a resource

use console::style;
use crdform_provider::Plan;
use std::path::Path;

use crate::display::display_plan;
use crate::error::Result;
use crate::util::{GlobalOptions, read_config};

pub fn run(
    options: &GlobalOptions,
    address: &str,
    type_name: &str,
    config_file: &Path,
) -> Result<()> {
    let provider = options.provider()?;
    let resource = provider.resource(type_name)?;
    let config = read_config(config_file, resource.schema())?;

    let (plan, state) = resource.apply(address, &config)?;
    display_plan(address, &plan);
    println!();

    let verb = match plan {
        Plan::Create { .. } => "Created",
        Plan::Update { .. } => "Updated",
        Plan::NoChange => {
            println!("{} No changes applied", style("✓").green());
            return Ok(());
        }
    };
    println!(
        "{} {} {} (id {}, revision {})",
        style("✓").green().bold(),
        verb,
        style(&state.address).bold(),
        state.id,
        state.revision
    );
    Ok(())
}
