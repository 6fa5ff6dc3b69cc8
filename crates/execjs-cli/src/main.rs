#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod logging;

use clap::Parser;
use execjs_core::Config;
use miette::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "execjs")]
#[command(author, version, about = "Run JavaScript through whichever engine is available", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Runtime to use instead of autodetecting one
    #[arg(long, global = true, env = "EXECJS_RUNTIME", value_name = "NAME")]
    runtime: Option<String>,

    /// Directory for temporary script files
    #[arg(long, global = true, value_name = "DIR")]
    temp_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Evaluate an expression and print its value as JSON
    Eval {
        /// The expression
        source: String,

        /// Script to load into the context first
        #[arg(long, value_name = "FILE")]
        prelude: Option<PathBuf>,
    },

    /// Run a script as a function body and print its return value as JSON
    Exec {
        /// Script file (reads stdin when omitted or `-`)
        file: Option<PathBuf>,

        /// Script to load into the context first
        #[arg(long, value_name = "FILE")]
        prelude: Option<PathBuf>,
    },

    /// List known runtimes and whether they are usable here
    Runtimes,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose, cli.json);

    let mut config = Config::default();
    if let Some(name) = cli.runtime.filter(|name| !name.trim().is_empty()) {
        config = config.with_runtime(name);
    }
    if let Some(dir) = cli.temp_dir {
        config = config.with_temp_dir(dir);
    }

    match cli.command {
        Commands::Eval { source, prelude } => {
            let span = tracing::info_span!("eval", cmd = "eval");
            let _guard = span.enter();
            commands::eval::run(&config, &source, prelude.as_deref(), cli.json)
        }
        Commands::Exec { file, prelude } => {
            let span = tracing::info_span!("exec", cmd = "exec");
            let _guard = span.enter();
            commands::exec::run(&config, file.as_deref(), prelude.as_deref(), cli.json)
        }
        Commands::Runtimes => commands::runtimes::run(&config, cli.json),
    }
}
