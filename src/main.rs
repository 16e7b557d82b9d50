use std::fs;
use std::process;

use log::{debug, error, info, LevelFilter};

use dmarc_csv::cli::Cli;
use dmarc_csv::config::Config;
use dmarc_csv::mailbox::Mailbox;
use dmarc_csv::{process_message, MailboxError};

const CONFIG_EXIT_CODE: i32 = 2;

fn init_logger(level: LevelFilter) {
	let _ = env_logger::builder()
		.filter_level(level)
		.format_timestamp_secs()
		.try_init();
}

fn main() {
	let cli = Cli::from_args();
	init_logger(cli.log_level());

	/*
	 * config parsing
	 */
	let config = match Config::from_cli(&cli).and_then(|config| config.validate(!cli.list_folders).map(|_| config)) {
		Ok(config) => config,
		Err(e) => {
			error!("ERROR: {}", e);
			process::exit(CONFIG_EXIT_CODE);
		}
	};

	if !cli.list_folders && !config.reports.no_save {
		if let Err(e) = fs::create_dir_all(&config.reports.output) {
			error!("ERROR: cannot create output directory {}: {}", config.reports.output.display(), e);
			process::exit(CONFIG_EXIT_CODE);
		}
	}

	if let Err(e) = run(&cli, &config) {
		error!("Error: {}", e);
		process::exit(e.exit_code());
	}
}

fn run(cli: &Cli, config: &Config) -> Result<(), MailboxError> {
	/*
	 * imap connection
	 */
	let password = config.imap.password.clone().unwrap_or_default();
	let mut mailbox = Mailbox::connect(&config.imap, &password)?;

	if cli.list_folders {
		println!("Folders found:");
		for folder in mailbox.list_folders()? {
			println!("  {}", folder);
		}
		return mailbox.logout();
	}

	mailbox.open(config.imap.folder.as_deref(), config.imap.readonly)?;

	/*
	 * report processing
	 */
	let messages = mailbox.search(config.reports.all)?;
	if messages.is_empty() {
		info!("No (new) messages found");
		return mailbox.logout();
	}
	debug!("Found {} messages", messages.len());

	let options = config.output_options();
	let recipient = config.reports.recipient.as_deref();
	for (counter, sequence) in messages.iter().enumerate() {
		let progress = (counter + 1) * 100 / messages.len();
		debug!("Retrieving message {}/{} - {}%", sequence, messages.len(), progress);

		let raw = match mailbox.fetch(*sequence)? {
			Some(raw) => raw,
			None => {
				error!("Message {} has no body", sequence);
				continue;
			}
		};

		if let Err(e) = process_message(&raw, recipient, &options) {
			error!("Skipping message {}: {}", sequence, e);
		}
	}

	mailbox.logout()
}
