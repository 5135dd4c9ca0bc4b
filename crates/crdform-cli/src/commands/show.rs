//! Show command - print recorded state

use console::style;

use crate::error::Result;
use crate::util::GlobalOptions;

pub fn run(options: &GlobalOptions, address: &str, output_json: bool) -> Result<()> {
    let provider = options.provider()?;
    let state = provider.show(address)?;

    if output_json {
        println!("{}", serde_json::to_string_pretty(&state)?);
        return Ok(());
    }

    println!("{}", style(&state.address).cyan().bold());
    println!("{}", style("=".repeat(state.address.len())).dim());
    println!();
    println!("{}: {}", style("Type").bold(), state.type_name);
    println!("{}: {}", style("Kind").bold(), state.kind);
    println!("{}: {}", style("API Version").bold(), state.api_version);
    println!("{}: {}", style("Id").bold(), state.id);
    println!("{}: {}", style("Revision").bold(), state.revision);
    println!("{}: {}", style("Created").bold(), state.created_at.to_rfc3339());
    println!("{}: {}", style("Updated").bold(), state.updated_at.to_rfc3339());
    println!("{}: {}", style("Digest").bold(), truncate_digest(&state.digest, 12));
    println!();
    print!("{}", state.yaml);

    Ok(())
}

/// Shorten a digest for display without slicing past its end
fn truncate_digest(digest: &str, max_len: usize) -> &str {
    let end = digest.len().min(max_len);
    &digest[..end]
}
