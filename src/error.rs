use std::io;
use std::path::Path;

use thiserror::Error;

/// Reasons a single report attachment could not be turned into a CSV file.
///
/// Every variant is local to the attachment that produced it: the caller logs
/// it and moves on to the next attachment.
#[derive(Error, Debug)]
pub enum ReportError {
	#[error("unsupported attachment extension '{extension}'")]
	UnsupportedFormat { extension: String },

	#[error("corrupt archive: {0}")]
	CorruptArchive(#[source] Box<dyn std::error::Error + Send + Sync>),

	#[error("archive contains no files")]
	EmptyArchive,

	#[error("invalid XML: {0}")]
	InvalidXml(#[source] serde_xml_rs::Error),

	#[error("record {record} has a missing or non-numeric count ({value:?})")]
	InvalidCount { record: usize, value: Option<String> },

	#[error("could not write {destination}: {source}")]
	WriteError {
		destination: String,
		#[source]
		source: io::Error,
	},
}

impl ReportError {
	pub(crate) fn corrupt<E>(err: E) -> Self
	where
		E: std::error::Error + Send + Sync + 'static,
	{
		ReportError::CorruptArchive(Box::new(err))
	}

	pub(crate) fn write(destination: &Path, source: io::Error) -> Self {
		ReportError::WriteError {
			destination: destination.display().to_string(),
			source,
		}
	}
}

/// Reasons a fetched message is skipped as a whole.
#[derive(Error, Debug)]
pub enum MessageError {
	#[error("message could not be parsed: {0}")]
	Parse(#[from] mailparse::MailParseError),

	#[error("no {0} header found in email")]
	MissingHeader(&'static str),
}

/// Failures of the IMAP session. These end the run.
#[derive(Error, Debug)]
pub enum MailboxError {
	#[error("cannot connect to {host}: {source}")]
	Connect {
		host: String,
		#[source]
		source: imap::Error,
	},

	#[error("login failed for {username}: {source}")]
	Login {
		username: String,
		#[source]
		source: imap::Error,
	},

	#[error("{operation} failed: {source}")]
	Protocol {
		operation: &'static str,
		#[source]
		source: imap::Error,
	},
}

impl MailboxError {
	/// Process exit status for this failure.
	pub fn exit_code(&self) -> i32 {
		match self {
			MailboxError::Connect { .. } => 1,
			MailboxError::Login { .. } => 2,
			MailboxError::Protocol { .. } => 3,
		}
	}
}
