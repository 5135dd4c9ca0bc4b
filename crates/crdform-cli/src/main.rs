//! crdform CLI - render, plan and apply Kubernetes custom resource manifests

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;
mod error;
mod exit_codes;
mod util;

use util::GlobalOptions;

#[derive(Parser)]
#[command(name = "crdform")]
#[command(author = "crdform Contributors")]
#[command(version)]
#[command(about = "Render, plan and apply Kubernetes custom resource manifests", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Directory holding recorded resource state
    #[arg(long, global = true, env = "CRDFORM_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Extra schema descriptor directory (repeatable)
    #[arg(long = "schema-dir", global = true)]
    schema_dirs: Vec<PathBuf>,

    /// Settings file (default: ~/.config/crdform/crdform.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available resource types
    Resources {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Describe the attributes of a resource type
    Schema {
        /// Resource type name
        type_name: String,

        /// Print the raw descriptor
        #[arg(long)]
        yaml: bool,
    },

    /// Render the manifest for a configuration
    Render {
        /// Resource type name
        type_name: String,

        /// Configuration file (YAML or JSON)
        #[arg(short = 'f', long = "file")]
        file: PathBuf,

        /// Write the manifest to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a configuration against its resource schema
    Validate {
        /// Resource type name
        type_name: String,

        /// Configuration file (YAML or JSON)
        #[arg(short = 'f', long = "file")]
        file: PathBuf,

        /// Output validation results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show what apply would change
    Plan {
        /// Resource address
        address: String,

        /// Resource type name
        type_name: String,

        /// Configuration file (YAML or JSON)
        #[arg(short = 'f', long = "file")]
        file: PathBuf,
    },

    /// Create or update a resource
    Apply {
        /// Resource address
        address: String,

        /// Resource type name
        type_name: String,

        /// Configuration file (YAML or JSON)
        #[arg(short = 'f', long = "file")]
        file: PathBuf,
    },

    /// Print recorded state
    Show {
        /// Resource address
        address: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove recorded state
    Destroy {
        /// Resource address
        address: String,
    },
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    let options = GlobalOptions {
        state_dir: cli.state_dir,
        schema_dirs: cli.schema_dirs,
        config: cli.config,
    };

    let result = match cli.command {
        Commands::Resources { json } => commands::resources::run(&options, json),

        Commands::Schema { type_name, yaml } => commands::schema::run(&options, &type_name, yaml),

        Commands::Render {
            type_name,
            file,
            output,
        } => commands::render::run(&options, &type_name, &file, output.as_deref()),

        Commands::Validate {
            type_name,
            file,
            json,
        } => commands::validate::run(&options, &type_name, &file, json),

        Commands::Plan {
            address,
            type_name,
            file,
        } => commands::plan::run(&options, &address, &type_name, &file),

        Commands::Apply {
            address,
            type_name,
            file,
        } => commands::apply::run(&options, &address, &type_name, &file),

        Commands::Show { address, json } => commands::show::run(&options, &address, json),

        Commands::Destroy { address } => commands::destroy::run(&options, &address),
    };

    if let Err(err) = result {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}
