use std::net::TcpStream;

use log::trace;
use native_tls::{TlsConnector, TlsStream};

use crate::config::ImapConfig;
use crate::error::MailboxError;

const DEFAULT_FOLDER: &str = "INBOX";

/// An authenticated IMAP session over TLS.
pub struct Mailbox {
	session: imap::Session<TlsStream<TcpStream>>,
}

impl Mailbox {
	/// Connects to the server and logs in.
	pub fn connect(config: &ImapConfig, password: &str) -> Result<Self, MailboxError> {
		let host = config.host.as_str();
		trace!("Connecting to {}", host);
		let tls = TlsConnector::builder()
			.build()
			.map_err(|e| MailboxError::Connect { host: host.to_string(), source: e.into() })?;
		let client = imap::connect((host, config.port), host, &tls)
			.map_err(|source| MailboxError::Connect { host: host.to_string(), source })?;
		trace!("Connected to {}", host);

		trace!("Login in as {}", config.username);
		let session = client
			.login(&config.username, password)
			.map_err(|(source, _)| MailboxError::Login { username: config.username.clone(), source })?;
		trace!("Logged in as {}", config.username);

		Ok(Mailbox { session })
	}

	/// Names of every folder on the server.
	pub fn list_folders(&mut self) -> Result<Vec<String>, MailboxError> {
		let names = self
			.session
			.list(None, Some("*"))
			.map_err(|source| MailboxError::Protocol { operation: "list", source })?;
		Ok(names.iter().map(|name| name.name().to_string()).collect())
	}

	/// Selects a folder, or examines it when `readonly` so that fetched messages
	/// stay unseen.
	pub fn open(&mut self, folder: Option<&str>, readonly: bool) -> Result<(), MailboxError> {
		let folder = folder.unwrap_or(DEFAULT_FOLDER);
		trace!("Selecting folder {}", folder);
		let result = if readonly {
			self.session.examine(folder)
		} else {
			self.session.select(folder)
		};
		let mailbox = result.map_err(|source| MailboxError::Protocol { operation: "select", source })?;
		trace!("Folder selected, {} messages", mailbox.exists);
		Ok(())
	}

	/// Sequence numbers of all messages, or only the unseen ones, in ascending
	/// order.
	pub fn search(&mut self, all: bool) -> Result<Vec<u32>, MailboxError> {
		let query = if all { "ALL" } else { "UNSEEN" };
		trace!("Searching {} messages", query);
		let found = self
			.session
			.search(query)
			.map_err(|source| MailboxError::Protocol { operation: "search", source })?;
		let mut found: Vec<u32> = found.into_iter().collect();
		found.sort_unstable();
		Ok(found)
	}

	/// Fetches the full RFC 822 source of one message.
	pub fn fetch(&mut self, sequence: u32) -> Result<Option<Vec<u8>>, MailboxError> {
		let fetches = self
			.session
			.fetch(sequence.to_string(), "RFC822")
			.map_err(|source| MailboxError::Protocol { operation: "fetch", source })?;
		Ok(fetches.iter().next().and_then(|fetch| fetch.body()).map(|body| body.to_vec()))
	}

	pub fn logout(mut self) -> Result<(), MailboxError> {
		self.session
			.logout()
			.map_err(|source| MailboxError::Protocol { operation: "logout", source })
	}
}
