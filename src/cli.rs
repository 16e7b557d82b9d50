use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

/// Command-line interface definition.
#[derive(Parser, Debug, Clone, Default)]
#[command(
	version,
	about = "Process a mailbox for DMARC reports and save them as CSV files"
)]
pub struct Cli {
	/// Hostname of the IMAP server
	#[arg(short, long)]
	pub server: Option<String>,

	/// Port of the IMAP server
	#[arg(long)]
	pub port: Option<u16>,

	/// Username of the IMAP account
	#[arg(short, long)]
	pub username: Option<String>,

	/// Password of the IMAP account; prefer the IMAPPW environment variable
	#[arg(short, long, env = "IMAPPW", hide_env_values = true)]
	pub password: Option<String>,

	/// Only process messages sent to this address
	#[arg(short, long)]
	pub to: Option<String>,

	/// The folder to process
	#[arg(short, long)]
	pub folder: Option<String>,

	/// List folders and exit
	#[arg(long = "list-folders", alias = "listfolders")]
	pub list_folders: bool,

	/// The directory to save the CSV files
	#[arg(short, long, value_name = "DIR")]
	pub output: Option<PathBuf>,

	/// Print verbose messages
	#[arg(short, long)]
	pub verbose: bool,

	/// Print debug messages
	#[arg(short, long)]
	pub debug: bool,

	/// Connect readonly to the IMAP server
	#[arg(short, long)]
	pub readonly: bool,

	/// Instead of processing only unread messages, process all messages
	#[arg(short, long)]
	pub all: bool,

	/// Print instead of save to CSV
	#[arg(long)]
	pub nosave: bool,

	/// TOML configuration file; command-line values take precedence
	#[arg(short, long, value_name = "FILE")]
	pub config: Option<PathBuf>,
}

impl Cli {
	/// Parse CLI arguments from process args.
	pub fn from_args() -> Self {
		Self::parse()
	}

	/// Log level selected by the verbosity flags.
	pub fn log_level(&self) -> LevelFilter {
		if self.debug {
			LevelFilter::Trace
		} else if self.verbose {
			LevelFilter::Debug
		} else {
			LevelFilter::Info
		}
	}
}
