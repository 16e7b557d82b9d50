use std::convert::TryFrom;

use chrono::{TimeZone, Utc};
use log::{trace, warn};

use super::types::{Record, Report};
use super::{clean, OutputRow, Rows};
use crate::error::ReportError;
use crate::message::MessageMetadata;

/// Some senders emit this broken schema declaration in front of otherwise valid
/// reports. It is removed textually before the document is parsed.
pub const MALFORMED_SCHEMA_FRAGMENT: &str = "\" <xs:schema xmlns:xs=\"http://www.w3.org/2001/XMLSchema\" targetNamespace=\"http://dmarc.org/dmarc-xml/0.1\">";

const UNDEFINED_MESSAGE_ID: &str = "<Undefined>";

const HUMAN_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parses an aggregate report into one row per record, each repeated `count`
/// times, in document order.
pub fn parse(xml: &[u8], meta: &MessageMetadata) -> Result<Rows, ReportError> {
	let document = String::from_utf8_lossy(xml).replace(MALFORMED_SCHEMA_FRAGMENT, "");
	let report: Report = serde_xml_rs::from_str(&document).map_err(ReportError::InvalidXml)?;

	let template = report_row(&report, meta);
	let mut rows = Rows::default();
	for (index, record) in report.record.iter().enumerate() {
		let count = record_count(index + 1, record)?;
		trace!("adding record {} {} times", index + 1, count);
		rows.push(record_row(&template, record), count);
	}

	Ok(rows)
}

/// Lookup policy for optional schema elements: an absent element reads as
/// empty text, never as an error.
fn text(value: &Option<String>) -> String {
	value.as_deref().map(|v| clean(v.trim())).unwrap_or_default()
}

fn lowercase_text(value: &Option<String>) -> String {
	text(value).to_lowercase()
}

/// Formats a Unix timestamp in UTC. Returns an empty string when the value is
/// not a number.
fn human_date(epoch: &str) -> String {
	let date = epoch
		.parse::<i64>()
		.ok()
		.and_then(|seconds| Utc.timestamp_opt(seconds, 0).single());

	match date {
		Some(date) => date.format(HUMAN_DATE_FORMAT).to_string(),
		None => {
			warn!("report date '{}' is not a Unix timestamp", epoch);
			String::new()
		}
	}
}

/// A negative count yields no rows; a missing or non-numeric one fails the
/// report.
fn record_count(index: usize, record: &Record) -> Result<usize, ReportError> {
	let raw = record.row.count.as_deref().map(str::trim);
	match raw.map(str::parse::<i64>) {
		Some(Ok(count)) => Ok(usize::try_from(count.max(0)).unwrap_or(usize::MAX)),
		_ => Err(ReportError::InvalidCount {
			record: index,
			value: raw.map(str::to_string),
		}),
	}
}

/// The part of a row shared by every record of a report.
fn report_row(report: &Report, meta: &MessageMetadata) -> OutputRow {
	let metadata = &report.report_metadata;
	let policy = &report.policy_published;
	let date_epoch_begin = text(&metadata.date_range.begin);
	let date_epoch_end = text(&metadata.date_range.end);

	OutputRow {
		org_name: text(&metadata.org_name),
		org_email: text(&metadata.email),
		extra_contact_info: text(&metadata.extra_contact_info),
		report_id: text(&metadata.report_id),
		date_human_begin: human_date(&date_epoch_begin),
		date_human_end: human_date(&date_epoch_end),
		date_epoch_begin,
		date_epoch_end,
		error: text(&metadata.error.first().cloned()),
		mail_to: clean(&meta.to),
		mail_from: clean(&meta.from),
		mail_date: clean(&meta.date),
		mail_message_id: clean(meta.message_id.as_deref().unwrap_or(UNDEFINED_MESSAGE_ID)),
		policy_domain: text(&policy.domain),
		policy_adkim: text(&policy.adkim),
		policy_aspf: text(&policy.aspf),
		policy_p: text(&policy.p),
		policy_sp: text(&policy.sp),
		policy_pct: text(&policy.pct),
		..Default::default()
	}
}

fn record_row(template: &OutputRow, record: &Record) -> OutputRow {
	let evaluated = &record.row.policy_evaluated;
	let reason = evaluated.reason.first();
	let dkim = record.auth_results.dkim.first();
	let spf = record.auth_results.spf.first();

	OutputRow {
		source_ip: text(&record.row.source_ip),
		evaluated_disposition: text(&evaluated.disposition),
		evaluated_dkim: lowercase_text(&evaluated.dkim),
		evaluated_spf: lowercase_text(&evaluated.spf),
		evaluated_reason_type: reason.map(|r| text(&r.kind)).unwrap_or_default(),
		evaluated_reason_comment: reason.map(|r| text(&r.comment)).unwrap_or_default(),
		envelope_to: text(&record.identifiers.envelope_to),
		header_from: text(&record.identifiers.header_from),
		auth_dkim_domain: dkim.map(|d| text(&d.domain)).unwrap_or_default(),
		auth_dkim_result: dkim.map(|d| lowercase_text(&d.result)).unwrap_or_default(),
		auth_dkim_human_result: dkim.map(|d| text(&d.human_result)).unwrap_or_default(),
		auth_spf_domain: spf.map(|s| text(&s.domain)).unwrap_or_default(),
		auth_spf_result: spf.map(|s| lowercase_text(&s.result)).unwrap_or_default(),
		..template.clone()
	}
}
