use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReportDateRange {
	pub begin: Option<String>,
	pub end: Option<String>
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReportMetadata {
	pub org_name: Option<String>,
	pub email: Option<String>,
	pub extra_contact_info: Option<String>,
	pub report_id: Option<String>,
	pub date_range: ReportDateRange,
	pub error: Vec<String>
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Policy {
	pub domain: Option<String>,
	pub adkim: Option<String>,
	pub aspf: Option<String>,
	pub p: Option<String>,
	pub sp: Option<String>,
	pub pct: Option<String>
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecordRowReason {
	#[serde(rename = "type")]
	pub kind: Option<String>,
	pub comment: Option<String>
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecordRowPolicy {
	pub disposition: Option<String>,
	pub dkim: Option<String>,
	pub spf: Option<String>,
	pub reason: Vec<RecordRowReason>
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecordRow {
	pub source_ip: Option<String>,
	pub count: Option<String>,
	pub policy_evaluated: RecordRowPolicy
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecordIdentifiers {
	pub envelope_to: Option<String>,
	pub header_from: Option<String>
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecordDKIMResult {
	pub domain: Option<String>,
	pub result: Option<String>,
	pub human_result: Option<String>
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecordSPFResult {
	pub domain: Option<String>,
	pub result: Option<String>
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecordResults {
	pub dkim: Vec<RecordDKIMResult>,
	pub spf: Vec<RecordSPFResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Record {
	pub row: RecordRow,
	pub identifiers: RecordIdentifiers,
	pub auth_results: RecordResults
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Report {
	pub report_metadata: ReportMetadata,
	pub policy_published: Policy,
	pub record: Vec<Record>
}
