//! # apio CLI Entry Point
//!
//! Parses CLI arguments using clap and routes commands to the handlers.
//!
//! ## Command Structure
//!
//! - **Build**: `build`, `time`, `verify`, `sim`, `clean`
//! - **System**: `system`, `upgrade`, `completion`
//!
//! Build-family commands exit with the exit code returned by the
//! underlying SCons invocation.

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::*;

use apio::config::Config;
use apio::scons::{BoardOptions, Scons};
use apio::system;
use apio::version;

#[derive(Parser)]
#[command(name = "apio")]
#[command(about = "Open source FPGA toolchain front end", version = env!("CARGO_PKG_VERSION"))]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize the bitstream
    Build {
        #[command(flatten)]
        board: BoardArgs,
    },
    /// Bitstream timing analysis
    Time {
        #[command(flatten)]
        board: BoardArgs,
    },
    /// Verify the verilog code
    Verify,
    /// Launch the verilog simulation
    Sim,
    /// Remove the build artifacts
    Clean,
    /// Show platform and installed package info
    System,
    /// Check the package index for a newer version
    Upgrade,
    /// Generate shell completion scripts
    Completion { shell: Shell },
}

#[derive(Args)]
struct BoardArgs {
    /// Set the board
    #[arg(long, value_name = "board")]
    board: Option<String>,
    /// Set the FPGA
    #[arg(long, value_name = "fpga")]
    fpga: Option<String>,
    /// Set the FPGA size (1k/8k)
    #[arg(long, value_name = "size")]
    size: Option<String>,
    /// Set the FPGA type (hx/lp)
    #[arg(long = "type", value_name = "type")]
    fpga_type: Option<String>,
    /// Set the FPGA package
    #[arg(long, value_name = "package")]
    pack: Option<String>,
}

impl From<BoardArgs> for BoardOptions {
    fn from(args: BoardArgs) -> Self {
        Self {
            board: args.board,
            fpga: args.fpga,
            size: args.size,
            fpga_type: args.fpga_type,
            pack: args.pack,
        }
    }
}

fn main() -> Result<()> {
    // Manual cancel is fail-fast by design: report and terminate, no
    // graceful unwinding of an in-flight SCons job.
    ctrlc::set_handler(|| {
        println!("{}", "Aborted by user".red());
        std::process::exit(1);
    })?;

    let cli = Cli::parse();
    let config = Config::load();

    match cli.command {
        Commands::Build { board } => {
            std::process::exit(Scons::new(&config).build(&board.into()))
        }
        Commands::Time { board } => {
            std::process::exit(Scons::new(&config).time(&board.into()))
        }
        Commands::Verify => std::process::exit(Scons::new(&config).verify()),
        Commands::Sim => std::process::exit(Scons::new(&config).sim()),
        Commands::Clean => std::process::exit(Scons::new(&config).clean()),
        Commands::System => system::print_system_info(&config),
        Commands::Upgrade => version::check_upgrade(),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
            Ok(())
        }
    }
}
