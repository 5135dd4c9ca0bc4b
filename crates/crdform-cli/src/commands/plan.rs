//! Plan command - show what apply would change

use console::style;
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

    let plan = resource.plan(address, &config)?;
    display_plan(address, &plan);

    println!();
    println!("{} Plan: {}", style("→").blue(), plan.summary());
    Ok(())
}
