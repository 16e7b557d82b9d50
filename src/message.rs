use std::io::{prelude::*, Cursor};
use std::path::Path;

use flate2::read::GzDecoder;
use log::{debug, trace};
use mailparse::{MailHeaderMap, ParsedMail};
use zip::ZipArchive;

use crate::error::{MessageError, ReportError};

/// Headers of the email that carried a report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageMetadata {
	pub to: String,
	pub from: String,
	pub date: String,
	pub message_id: Option<String>,
}

impl MessageMetadata {
	/// Reads the metadata of a parsed message. `To`, `Subject` and `Date` must be
	/// present; a missing `From` reads as empty.
	pub fn from_mail(mail: &ParsedMail) -> Result<Self, MessageError> {
		let headers = &mail.headers;
		let to = headers.get_first_value("To").ok_or(MessageError::MissingHeader("To"))?;
		let subject = headers.get_first_value("Subject").ok_or(MessageError::MissingHeader("Subject"))?;
		let date = headers.get_first_value("Date").ok_or(MessageError::MissingHeader("Date"))?;

		trace!("  Subject of message: {}", subject);
		trace!("  Date of message: {}", date);

		Ok(MessageMetadata {
			to,
			from: headers.get_first_value("From").unwrap_or_default(),
			date,
			message_id: headers.get_first_value("Message-Id"),
		})
	}
}

/// Compression formats a report attachment may come in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFileType {
	Gzip,
	Zip,
}

impl ReportFileType {
	/// Picks the format from a file extension such as `.gz`.
	pub fn from_extension(extension: &str) -> Option<Self> {
		match extension.to_lowercase().as_str() {
			".gz" | ".gzip" => Some(ReportFileType::Gzip),
			".zip" => Some(ReportFileType::Zip),
			_ => None,
		}
	}
}

/// Returns the extension of a file name including its leading dot, or an empty
/// string when there is none.
pub fn extension_of(filename: &str) -> String {
	Path::new(filename)
		.extension()
		.map(|ext| format!(".{}", ext.to_string_lossy()))
		.unwrap_or_default()
}

/// Decompresses a report attachment into the raw XML bytes it carries.
pub fn decompress(payload: &[u8], extension: &str) -> Result<Vec<u8>, ReportError> {
	let file_type = ReportFileType::from_extension(extension).ok_or_else(|| ReportError::UnsupportedFormat {
		extension: extension.to_string(),
	})?;
	read_report(file_type, payload)
}

/// Given a report type and the raw data in bytes, decompresses the report.
pub fn read_report(report_type: ReportFileType, data: &[u8]) -> Result<Vec<u8>, ReportError> {
	let body_reader = Cursor::new(data);
	let mut result = Vec::new();
	match report_type {
		ReportFileType::Gzip => {
			trace!("      Extracting using gzip");
			let mut d = GzDecoder::new(body_reader);
			d.read_to_end(&mut result).map_err(ReportError::corrupt)?;
		},
		ReportFileType::Zip => {
			trace!("      Extracting using zip");
			let mut archive = ZipArchive::new(body_reader).map_err(ReportError::corrupt)?;

			if archive.is_empty() {
				return Err(ReportError::EmptyArchive);
			}

			let mut report_file = archive.by_index(0).map_err(ReportError::corrupt)?;
			trace!("      Reading archive entry {}", report_file.name());
			report_file.read_to_end(&mut result).map_err(ReportError::corrupt)?;
		}
	}
	Ok(result)
}

/// A named, decoded attachment of an email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
	pub filename: String,
	pub payload: Vec<u8>,
}

/// Collects every attachment of the message, walking the MIME tree depth-first
/// with the message itself first.
///
/// Multipart containers, parts without a `Content-Disposition` header, parts
/// without a file name and parts with an empty body are skipped.
pub fn find_attachments(mail: &ParsedMail) -> Vec<Attachment> {
	let mut parts = Vec::new();
	walk(mail, &mut parts);

	let mut attachments = Vec::new();
	for part in parts {
		let mimetype = &part.ctype.mimetype;
		trace!("  Processing part: {}", mimetype);
		if mimetype.starts_with("multipart/") {
			continue;
		}
		if part.headers.get_first_value("Content-Disposition").is_none() {
			trace!("    Skipping because of Content-Disposition");
			continue;
		}

		let filename = match attachment_name(part) {
			Some(filename) => filename,
			None => {
				debug!("  No filename given, skipping this attachment");
				continue;
			}
		};
		debug!("    Found attachment: {}", filename);

		match part.get_body_raw() {
			Ok(payload) if !payload.is_empty() => attachments.push(Attachment { filename, payload }),
			Ok(_) => debug!("      No data found in attachment"),
			Err(e) => debug!("      Could not decode attachment {}: {}", filename, e),
		}
	}

	attachments
}

fn walk<'a>(part: &'a ParsedMail<'a>, parts: &mut Vec<&'a ParsedMail<'a>>) {
	parts.push(part);
	for subpart in &part.subparts {
		walk(subpart, parts);
	}
}

fn attachment_name(part: &ParsedMail) -> Option<String> {
	part.get_content_disposition()
		.params
		.get("filename")
		.or_else(|| part.ctype.params.get("name"))
		.filter(|name| !name.is_empty())
		.cloned()
}
