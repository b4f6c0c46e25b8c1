//! progen — project-file generator for embedded toolchains.
//!
//! Reads YAML project descriptions and emits native project files for
//! Keil uVision, IAR Embedded Workbench, GNU Make, Eclipse CDT and
//! Sublime Text, optionally driving the tool's own build afterwards.
//!
//! # Examples
//!
//! ```bash
//! # Export every declared project for every tool it supports
//! progen generate
//!
//! # Export one project for uVision 5 and build it
//! progen generate -p blinky -t uvision5 --build
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use progen_cli::commands;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// YAML-driven project generator for embedded toolchains.
#[derive(Parser, Debug)]
#[command(name = "progen")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Projects file to read
    #[arg(short, long, global = true, default_value = "projects.yaml")]
    file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a source tree and scaffold starter project YAML.
    Create {
        /// Directory to scan
        #[arg(default_value = ".")]
        directory: PathBuf,

        /// Project name (default: the directory name)
        #[arg(short, long)]
        name: Option<String>,

        /// Target board to record in the fragment
        #[arg(short, long)]
        target: Option<String>,
    },

    /// Resolve projects and export tool-native project files.
    Generate {
        /// Project to generate (default: every declared project)
        #[arg(short, long)]
        project: Option<String>,

        /// Tool to generate for (default: every supported tool)
        #[arg(short, long)]
        tool: Option<String>,

        /// Regex of source paths to leave out, matched against the
        /// start of the path; repeatable
        #[arg(short, long = "ignore")]
        ignore: Vec<String>,

        /// Copy sources into the output directory instead of
        /// referencing them relatively
        #[arg(short, long)]
        copy: bool,

        /// Run the external build tool after exporting
        #[arg(short, long)]
        build: bool,

        /// Kill the external build after this many seconds
        #[arg(long, requires = "build")]
        timeout: Option<u64>,
    },

    /// Export projects and run the external build tool.
    Build {
        /// Project to build (default: every declared project)
        #[arg(short, long)]
        project: Option<String>,

        /// Tool to build with (default: every supported tool)
        #[arg(short, long)]
        tool: Option<String>,

        /// Regex of source paths to leave out, matched against the
        /// start of the path; repeatable
        #[arg(short, long = "ignore")]
        ignore: Vec<String>,

        /// Copy sources into the output directory before building
        #[arg(short, long)]
        copy: bool,

        /// Kill the external build after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// List the tools each project can be exported for.
    Tools {
        /// Project to inspect (default: every declared project)
        #[arg(short, long)]
        project: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Create {
            directory,
            name,
            target,
        } => commands::create::run(&directory, name.as_deref(), target.as_deref()),
        Commands::Generate {
            project,
            tool,
            ignore,
            copy,
            build,
            timeout,
        } => commands::generate::run(
            &cli.file,
            project.as_deref(),
            tool.as_deref(),
            &ignore,
            copy,
            build,
            timeout,
        ),
        Commands::Build {
            project,
            tool,
            ignore,
            copy,
            timeout,
        } => commands::build::run(
            &cli.file,
            project.as_deref(),
            tool.as_deref(),
            &ignore,
            copy,
            timeout,
        ),
        Commands::Tools { project } => commands::tools::run(&cli.file, project.as_deref()),
    }
}

/// Sets up tracing to stderr so generated output and build logs on
/// stdout stay clean.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
