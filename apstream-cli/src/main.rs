//! apstream CLI - Pack .npy tensors into accelerator word streams and back.

use clap::{Parser, Subcommand};

mod common;
mod config;
mod inspect;
mod logging;
mod pack;
mod unpack;

#[derive(Parser)]
#[command(name = "apstream")]
#[command(about = "CLI tool for packing .npy tensors into fixed-width accelerator words")]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack a .npy tensor into a text file of hex words
    Pack {
        /// Path to the .npy file
        #[arg(short, long)]
        input: String,

        /// Path to stream config JSON (optional)
        #[arg(short, long)]
        config: Option<String>,

        /// Output path for the word file
        #[arg(short, long)]
        output: Option<String>,

        /// Generate a template config instead of packing
        #[arg(long)]
        generate_config: bool,
    },

    /// Unpack a text file of hex words into a .npy tensor
    Unpack {
        /// Path to the word file
        #[arg(short, long)]
        input: String,

        /// Path to stream config JSON
        #[arg(short, long)]
        config: Option<String>,

        /// Output path for the .npy file
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show the header of a .npy file and its packed word layout
    Inspect {
        /// Path to the .npy file
        #[arg(short, long)]
        input: String,

        /// Element type to compute the word width for (e.g. INT8, FIXED<8,4>)
        #[arg(short, long)]
        elem_type: Option<String>,

        /// Number of sub-blocks the last axis is split into
        #[arg(short, long, default_value_t = 1)]
        multi_pixel_out: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose)?;

    match cli.command {
        Commands::Pack {
            input,
            config,
            output,
            generate_config,
        } => {
            if generate_config {
                pack::generate_config_template(&input)?;
            } else {
                pack::run(&input, config.as_deref(), output.as_deref())?;
            }
        }
        Commands::Unpack {
            input,
            config,
            output,
        } => {
            unpack::run(&input, config.as_deref(), output.as_deref())?;
        }
        Commands::Inspect {
            input,
            elem_type,
            multi_pixel_out,
        } => {
            inspect::run(&input, elem_type.as_deref(), multi_pixel_out)?;
        }
    }

    Ok(())
}
