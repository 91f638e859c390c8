//! CLI tool for parsing fseventsd logs.

mod commands;
mod exit_codes;
mod output;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use exit_codes::ExitCode;
use fseventsd::read::{ParseOptions, Threads};

/// FSEvents log parser
#[derive(Parser)]
#[command(name = "fseventsd")]
#[command(author, version, about = "FSEvents (fseventsd) log parser", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "human", global = true)]
    format: OutputFormat,

    /// Suppress the summary
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Number of threads (0 = auto)
    #[arg(long, short = 't', default_value = "0", global = true)]
    threads: usize,

    /// Do not fall back to the log file modification date
    #[arg(long, global = true)]
    no_mod_dates: bool,

    /// Reject logs with a missing or wrong gzip trailer
    #[arg(long, global = true)]
    strict_trailer: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse logs and print their events (alias: p)
    #[command(alias = "p")]
    Parse {
        /// fseventsd log files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Write events to a file instead of stdout
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Show pages, timeline and statistics of one log (alias: i)
    #[command(alias = "i")]
    Info {
        /// fseventsd log file
        archive: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

impl Cli {
    fn parse_options(&self) -> ParseOptions {
        let threads = if self.threads == 0 {
            Threads::Auto
        } else {
            Threads::count_or_single(self.threads)
        };
        ParseOptions::new()
            .use_modification_date(!self.no_mod_dates)
            .tolerate_missing_trailer(!self.strict_trailer)
            .threads(threads)
    }
}

fn main() {
    env_logger::init();

    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted");
        std::process::exit(exit_codes::USER_INTERRUPT);
    })
    .ok();

    let cli = Cli::parse();
    let options = cli.parse_options();

    let exit_code = match &cli.command {
        Commands::Parse { files, output } => commands::parse(&commands::ParseConfig {
            files,
            output: output.as_deref(),
            options: &options,
            format: cli.format,
            quiet: cli.quiet,
        }),

        Commands::Info { archive } => commands::info(archive, &options, cli.format),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut std::io::stdout());
            ExitCode::Success
        }
    };

    std::process::exit(exit_code.code());
}
