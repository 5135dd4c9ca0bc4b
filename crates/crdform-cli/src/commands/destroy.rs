//! Destroy command - remove recorded state

use console::style;

use crate::error::Result;
use crate::util::GlobalOptions;

pub fn run(options: &GlobalOptions, address: &str) -> Result<()> {
    let provider = options.provider()?;
    let recorded = provider.show(address)?;

    let removed = provider.resource(&recorded.type_name)?.delete(address)?;
    println!(
        "{} Destroyed {} ({})",
        style("✓").green().bold(),
        style(&removed.address).bold(),
        removed.kind
    );
    Ok(())
}
