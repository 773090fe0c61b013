use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use unreleased_merge::sync::{
  ChangelogSync, ChangelogSyncOptions, DEFAULT_DESTINATION_FILENAME, DEFAULT_SOURCE_FILENAME,
  DEFAULT_TITLE,
};

#[derive(Parser)]
#[command(
  name = "unreleased-merge",
  about = "Merge the Unreleased sections of two Keep-a-Changelog files",
  version,
  author
)]
struct Cli {
  /// Changelog whose unreleased entries are merged in
  #[arg(short, long, env = "SOURCE_CHANGELOG", default_value = DEFAULT_SOURCE_FILENAME)]
  source: PathBuf,

  /// Changelog that receives the merged unreleased section
  #[arg(short, long, env = "DESTINATION_CHANGELOG", default_value = DEFAULT_DESTINATION_FILENAME)]
  destination: PathBuf,

  /// Write the result to this file instead of stdout
  #[arg(short, long, env = "OUTPUT_FILE")]
  output: Option<PathBuf>,

  /// Top-level heading the unreleased section lives under
  #[arg(short, long, env = "CHANGELOG_TITLE", default_value = DEFAULT_TITLE)]
  title: String,

  /// Verbose output (-v for verbose, -vv for very verbose)
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

fn setup_tracing(verbose: u8) {
  use tracing_subscriber::fmt;
  use tracing_subscriber::prelude::*;

  let log_level = match verbose {
    1 => "debug",
    2 => "trace",
    _ => "info",
  };

  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(tracing_subscriber::EnvFilter::new(
      std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
    ))
    .init();
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  setup_tracing(cli.verbose);

  let options = ChangelogSyncOptions {
    source_file: cli.source,
    destination_file: cli.destination,
    output_file: cli.output,
    title: cli.title,
  };

  match ChangelogSync::sync_with_options(options) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      eprintln!("error: {err}");
      ExitCode::FAILURE
    }
  }
}
