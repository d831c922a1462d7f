use clap::{Parser, Subcommand};
use std::path::PathBuf;

use wit_layout::Target;
use wit_layout::cli::{
    CaseArg, CliError, Config, OutputFormat, compute, init_logging, load_resolve, render_layout,
    render_reports, reports,
};

#[derive(Parser)]
#[command(name = "wit-layout")]
#[command(about = "Compute Canonical ABI sizes, alignments and variant layouts")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, global = true, env = "WIT_LAYOUT_CONFIG")]
    config: Option<PathBuf>,

    /// Memory model used to size strings and lists.
    #[arg(long, global = true)]
    target: Option<Target>,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Describe the layout of types defined in a WIT file or directory.
    Describe {
        /// WIT file or directory.
        #[arg(long)]
        wit: PathBuf,

        /// Type to describe; every named type when omitted.
        #[arg(long)]
        type_name: Option<String>,
    },

    /// Compute a variant layout from raw case sizes and alignments.
    Compute {
        /// Discriminant width in bytes.
        #[arg(long, default_value_t = 1)]
        discriminant: usize,

        /// A case as `<size>:<align>`; repeat for each case.
        #[arg(long = "case")]
        cases: Vec<CaseArg>,
    },
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    init_logging(&config.logging)?;

    let target = cli.target.unwrap_or(config.output.target);
    let format = cli.format.unwrap_or(config.output.format);

    let output = match cli.command {
        Commands::Describe { wit, type_name } => {
            let resolve = load_resolve(&wit)?;
            render_reports(&reports(&resolve, type_name.as_deref(), target)?, format)?
        }
        Commands::Compute {
            discriminant,
            cases,
        } => render_layout(&compute(discriminant, &cases)?, format)?,
    };
    println!("{}", output.trim_end());
    Ok(())
}
