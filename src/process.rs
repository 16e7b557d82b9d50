use std::path::PathBuf;

use log::{debug, error, info, trace};

use crate::dmarc;
use crate::error::{MessageError, ReportError};
use crate::filename;
use crate::message::{self, MessageMetadata};
use crate::output;

/// Where the rows of processed reports go.
#[derive(Debug, Clone)]
pub struct OutputOptions {
	pub directory: PathBuf,
	/// Print rows to standard output instead of saving CSV files.
	pub no_save: bool,
}

/// Runs one attachment through decompression, parsing and CSV output.
///
/// Returns the path of the written file, or `None` in no-save mode.
pub fn process_attachment(
	filename: &str,
	payload: &[u8],
	meta: &MessageMetadata,
	options: &OutputOptions,
) -> Result<Option<PathBuf>, ReportError> {
	let extension = message::extension_of(filename);
	trace!("    Attachment extension: {}", extension);

	let xml = message::decompress(payload, &extension)?;
	let rows = dmarc::parse(&xml, meta)?;

	let base_name = filename::derive_base_name(meta);
	trace!("    Mail message id: {}", base_name);

	if options.no_save {
		output::echo(rows.iter())?;
		return Ok(None);
	}

	let path = filename::resolve_path(&options.directory, &base_name);
	debug!("    Save CSV as: {}", path.display());
	output::save(rows.iter(), &path)?;
	Ok(Some(path))
}

/// Processes every report attachment of a raw RFC 822 message.
///
/// Returns the number of attachments that were processed successfully.
/// Attachment failures are logged and skipped; only an unreadable message or
/// one missing required headers is an error.
pub fn process_message(
	raw: &[u8],
	recipient: Option<&str>,
	options: &OutputOptions,
) -> Result<usize, MessageError> {
	let mail = mailparse::parse_mail(raw)?;
	let meta = MessageMetadata::from_mail(&mail)?;
	debug!("  Message is sent to {}", meta.to);

	if let Some(recipient) = recipient {
		if meta.to != recipient && meta.to != format!("<{}>", recipient) {
			trace!("  - Skipping message, not right recipient");
			return Ok(0);
		}
	}

	let mut processed = 0;
	for attachment in message::find_attachments(&mail) {
		match process_attachment(&attachment.filename, &attachment.payload, &meta, options) {
			Ok(Some(path)) => {
				info!("Saved report {} as {}", attachment.filename, path.display());
				processed += 1;
			},
			Ok(None) => processed += 1,
			Err(e) => error!("    ERROR: {}: {}", attachment.filename, e),
		}
	}

	Ok(processed)
}
