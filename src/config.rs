use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};
use simple_error::bail;

use crate::cli::Cli;
use crate::process::OutputOptions;

#[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
	pub imap: ImapConfig,
	pub reports: ReportsConfig,
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ImapConfig {
	pub host: String,
	pub port: u16,
	pub username: String,
	pub password: Option<String>,
	pub folder: Option<String>,
	pub readonly: bool,
}

impl Default for ImapConfig {
	fn default() -> Self {
		ImapConfig {
			host: String::new(),
			port: 993,
			username: String::new(),
			password: None,
			folder: None,
			readonly: false,
		}
	}
}

#[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ReportsConfig {
	pub output: PathBuf,
	/// Only process messages sent to this address.
	pub recipient: Option<String>,
	pub all: bool,
	pub no_save: bool,
}

impl Config {
	/// Template written when a named config file does not exist yet.
	pub fn template() -> Self {
		Config {
			imap: ImapConfig {
				host: "imap.example.com".to_string(),
				username: "dmarc-reports@example.com".to_string(),
				folder: Some("INBOX".to_string()),
				..Default::default()
			},
			reports: ReportsConfig {
				output: PathBuf::from("reports"),
				..Default::default()
			},
		}
	}

	/// Reads a TOML config file. A missing file is created from the template and
	/// reported as an error so it can be edited first.
	pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
		if !path.exists() {
			info!("Could not find config, creating default at {}", path.display());
			fs::write(path, toml::to_string(&Config::template())?)?;
			bail!("edit the new config file {} and run again", path.display());
		}

		let config_text = fs::read_to_string(path)?;
		Ok(toml::from_str(&config_text)?)
	}

	/// Loads the config file named on the command line, if any, and lays the
	/// command-line values over it.
	pub fn from_cli(cli: &Cli) -> Result<Self, Box<dyn Error>> {
		let mut config = match &cli.config {
			Some(path) => Config::load(path)?,
			None => Config::default(),
		};
		config.merge_with_cli(cli);
		Ok(config)
	}

	pub fn merge_with_cli(&mut self, cli: &Cli) {
		let imap = &mut self.imap;
		if let Some(host) = &cli.server {
			imap.host = host.clone();
		}
		if let Some(port) = cli.port {
			imap.port = port;
		}
		if let Some(username) = &cli.username {
			imap.username = username.clone();
		}
		if cli.password.is_some() {
			imap.password = cli.password.clone();
		}
		if cli.folder.is_some() {
			imap.folder = cli.folder.clone();
		}
		imap.readonly |= cli.readonly;

		let reports = &mut self.reports;
		if let Some(output) = &cli.output {
			reports.output = output.clone();
		}
		if cli.to.is_some() {
			reports.recipient = cli.to.clone();
		}
		reports.all |= cli.all;
		reports.no_save |= cli.nosave;
	}

	/// Checks that everything needed to reach the mailbox is present.
	/// `needs_output` is false when only listing folders.
	pub fn validate(&self, needs_output: bool) -> Result<(), Box<dyn Error>> {
		if self.imap.host.is_empty() {
			bail!("no IMAP server given (use --server)");
		}
		if self.imap.username.is_empty() {
			bail!("no IMAP username given (use --username)");
		}
		if self.imap.password.is_none() {
			bail!("no IMAP password defined (use IMAPPW='mypassword')");
		}
		if needs_output && !self.reports.no_save && self.reports.output.as_os_str().is_empty() {
			bail!("no output directory given (use --output)");
		}
		Ok(())
	}

	pub fn output_options(&self) -> OutputOptions {
		OutputOptions {
			directory: self.reports.output.clone(),
			no_save: self.reports.no_save,
		}
	}
}
