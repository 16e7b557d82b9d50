//! DMARC aggregate reports: the XML schema, the parser and the flattened row
//! that ends up in the CSV output.

use std::iter;

mod parse;
pub mod types;

pub use parse::{parse, MALFORMED_SCHEMA_FRAGMENT};

/// Column names of the CSV output, in output order.
pub const COLUMNS: [&str; 32] = [
	"Organization Name",
	"Organization Email",
	"Extra Contact Info",
	"Report ID",
	"Date Begin (EPOCH)",
	"Date End (EPOCH)",
	"Date Begin (Human)",
	"Date End (Human)",
	"Error",
	"Mail Recipient",
	"Mail Sender",
	"Mail Date",
	"Mail MessageID",
	"Policy: Domain",
	"Policy: ADKIM",
	"Policy: ASPF",
	"Policy: P",
	"Policy: SP",
	"Policy: PCT",
	"Source IP",
	"Evaluated Disposition",
	"Evaluated DKIM",
	"Evaluated SPF",
	"Evaluated Reason",
	"Evaluated Comment",
	"Envelope To",
	"Header From",
	"Auth DKIM Domain",
	"Auth Result DKIM",
	"Auth Human Result DKIM",
	"Auth SPF Domain",
	"Auth Result SPF",
];

/// One flattened mail-flow evaluation: report scalars, record fields and the
/// metadata of the email that carried the report.
///
/// All fields are already stripped of line breaks and double quotes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputRow {
	pub org_name: String,
	pub org_email: String,
	pub extra_contact_info: String,
	pub report_id: String,
	pub date_epoch_begin: String,
	pub date_epoch_end: String,
	pub date_human_begin: String,
	pub date_human_end: String,
	pub error: String,
	pub mail_to: String,
	pub mail_from: String,
	pub mail_date: String,
	pub mail_message_id: String,
	pub policy_domain: String,
	pub policy_adkim: String,
	pub policy_aspf: String,
	pub policy_p: String,
	pub policy_sp: String,
	pub policy_pct: String,
	pub source_ip: String,
	pub evaluated_disposition: String,
	pub evaluated_dkim: String,
	pub evaluated_spf: String,
	pub evaluated_reason_type: String,
	pub evaluated_reason_comment: String,
	pub envelope_to: String,
	pub header_from: String,
	pub auth_dkim_domain: String,
	pub auth_dkim_result: String,
	pub auth_dkim_human_result: String,
	pub auth_spf_domain: String,
	pub auth_spf_result: String,
}

impl OutputRow {
	/// Field values in the order of [`COLUMNS`].
	pub fn fields(&self) -> [&str; 32] {
		[
			self.org_name.as_str(),
			self.org_email.as_str(),
			self.extra_contact_info.as_str(),
			self.report_id.as_str(),
			self.date_epoch_begin.as_str(),
			self.date_epoch_end.as_str(),
			self.date_human_begin.as_str(),
			self.date_human_end.as_str(),
			self.error.as_str(),
			self.mail_to.as_str(),
			self.mail_from.as_str(),
			self.mail_date.as_str(),
			self.mail_message_id.as_str(),
			self.policy_domain.as_str(),
			self.policy_adkim.as_str(),
			self.policy_aspf.as_str(),
			self.policy_p.as_str(),
			self.policy_sp.as_str(),
			self.policy_pct.as_str(),
			self.source_ip.as_str(),
			self.evaluated_disposition.as_str(),
			self.evaluated_dkim.as_str(),
			self.evaluated_spf.as_str(),
			self.evaluated_reason_type.as_str(),
			self.evaluated_reason_comment.as_str(),
			self.envelope_to.as_str(),
			self.header_from.as_str(),
			self.auth_dkim_domain.as_str(),
			self.auth_dkim_result.as_str(),
			self.auth_dkim_human_result.as_str(),
			self.auth_spf_domain.as_str(),
			self.auth_spf_result.as_str(),
		]
	}
}

/// The rows of one report, kept as one row per record plus its repetition
/// count. Rows are expanded only while iterating.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rows {
	groups: Vec<(OutputRow, usize)>,
}

impl Rows {
	pub(crate) fn push(&mut self, row: OutputRow, count: usize) {
		self.groups.push((row, count));
	}

	/// Total number of rows after expansion.
	pub fn len(&self) -> usize {
		self.groups.iter().map(|(_, count)| count).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// One entry per record, in document order, with its count.
	pub fn groups(&self) -> &[(OutputRow, usize)] {
		&self.groups
	}

	/// Every row, each record repeated `count` times.
	pub fn iter(&self) -> impl Iterator<Item = &OutputRow> {
		self.groups
			.iter()
			.flat_map(|(row, count)| iter::repeat(row).take(*count))
	}
}

/// Removes the characters the fixed-quoting CSV format cannot carry.
pub(crate) fn clean(value: &str) -> String {
	value.chars().filter(|c| !matches!(c, '\n' | '\r' | '"')).collect()
}
