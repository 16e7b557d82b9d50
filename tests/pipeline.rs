//! End-to-end tests: raw report emails in, CSV files out.

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use zip::write::{FileOptions, ZipWriter};

use dmarc_csv::{process_attachment, process_message, MessageMetadata, OutputOptions, ReportError};

const REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<feedback>
  <report_metadata>
    <org_name>Acme "Mail" Inc</org_name>
    <email>noreply-dmarc-support@google.com</email>
    <report_id>17287364917323764</report_id>
    <date_range>
      <begin>1609459200</begin>
      <end>1609545599</end>
    </date_range>
  </report_metadata>
  <policy_published>
    <domain>example.com</domain>
    <adkim>r</adkim>
    <aspf>r</aspf>
    <p>none</p>
    <sp>none</sp>
    <pct>100</pct>
  </policy_published>
  <record>
    <row>
      <source_ip>192.0.2.1</source_ip>
      <count>3</count>
      <policy_evaluated>
        <disposition>none</disposition>
        <dkim>pass</dkim>
        <spf>pass</spf>
      </policy_evaluated>
    </row>
    <identifiers>
      <header_from>example.com</header_from>
    </identifiers>
    <auth_results>
      <dkim>
        <domain>example.com</domain>
        <result>pass</result>
      </dkim>
      <spf>
        <domain>example.com</domain>
        <result>pass</result>
      </spf>
    </auth_results>
  </record>
  <record>
    <row>
      <source_ip>198.51.100.7</source_ip>
      <count>1</count>
      <policy_evaluated>
        <disposition>none</disposition>
        <dkim>fail</dkim>
        <spf>fail</spf>
      </policy_evaluated>
    </row>
    <identifiers>
      <header_from>example.com</header_from>
    </identifiers>
    <auth_results>
      <spf>
        <domain>mail.example.org</domain>
        <result>fail</result>
      </spf>
    </auth_results>
  </record>
</feedback>
"#;

const EXPECTED_FILE: &str = "noreply-dmarc-support@google.com-1234@google.com.csv";

fn gzip(data: &[u8]) -> Vec<u8> {
	let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
	encoder.write_all(data).unwrap();
	encoder.finish().unwrap()
}

fn zip(name: &str, data: &[u8]) -> Vec<u8> {
	let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
	writer.start_file(name, FileOptions::default()).unwrap();
	writer.write_all(data).unwrap();
	writer.finish().unwrap().into_inner()
}

/// Builds a multipart report email with base64 encoded attachments.
fn email(attachments: &[(&str, Vec<u8>)]) -> Vec<u8> {
	let mut raw = String::from(
		"From: noreply-dmarc-support@google.com\r\n\
		 To: dmarc@example.net\r\n\
		 Subject: Report domain: example.com Submitter: google.com\r\n\
		 Date: Sat, 02 Jan 2021 10:00:00 +0000\r\n\
		 Message-Id: <1234@google.com>\r\n\
		 MIME-Version: 1.0\r\n\
		 Content-Type: multipart/mixed; boundary=\"REPORT\"\r\n\
		 \r\n\
		 --REPORT\r\n\
		 Content-Type: text/plain\r\n\
		 \r\n\
		 This is an aggregate report from google.com.\r\n",
	);
	for (name, payload) in attachments {
		raw.push_str("--REPORT\r\n");
		raw.push_str(&format!("Content-Type: application/octet-stream; name=\"{}\"\r\n", name));
		raw.push_str(&format!("Content-Disposition: attachment; filename=\"{}\"\r\n", name));
		raw.push_str("Content-Transfer-Encoding: base64\r\n\r\n");
		let encoded = base64::encode(payload);
		for chunk in encoded.as_bytes().chunks(76) {
			raw.push_str(std::str::from_utf8(chunk).unwrap());
			raw.push_str("\r\n");
		}
	}
	raw.push_str("--REPORT--\r\n");
	raw.into_bytes()
}

fn options(directory: &Path, no_save: bool) -> OutputOptions {
	OutputOptions {
		directory: directory.to_path_buf(),
		no_save,
	}
}

fn csv_fields(line: &str) -> Vec<String> {
	let inner = line.strip_prefix('"').and_then(|l| l.strip_suffix('"')).unwrap();
	inner.split("\",\"").map(str::to_string).collect()
}

#[test]
fn gzip_report_becomes_csv_file() {
	let dir = tempfile::tempdir().unwrap();
	let raw = email(&[("google.com!example.com!1609459200!1609545599.xml.gz", gzip(REPORT.as_bytes()))]);

	assert_eq!(process_message(&raw, None, &options(dir.path(), false)).unwrap(), 1);

	let content = fs::read_to_string(dir.path().join(EXPECTED_FILE)).unwrap();
	let lines: Vec<&str> = content.lines().collect();
	assert_eq!(lines.len(), 5);
	assert!(lines[0].starts_with("\"Organization Name\""));

	let rows: Vec<Vec<String>> = lines[1..].iter().map(|line| csv_fields(line)).collect();
	assert!(rows.iter().all(|row| row.len() == 32));
	assert_eq!(rows[0], rows[1]);
	assert_eq!(rows[1], rows[2]);
	assert_eq!(rows[0][0], "Acme Mail Inc");
	assert_eq!(rows[0][6], "2021-01-01 00:00:00");
	assert_eq!(rows[0][9], "dmarc@example.net");
	assert_eq!(rows[0][12], "<1234@google.com>");
	assert_eq!(rows[0][19], "192.0.2.1");
	assert_eq!(rows[3][19], "198.51.100.7");
	assert_eq!(rows[3][27], "");
	assert_eq!(rows[3][30], "mail.example.org");
	assert_eq!(rows[3][31], "fail");
}

#[test]
fn repeated_reports_get_numbered_files() {
	let dir = tempfile::tempdir().unwrap();
	let raw = email(&[("report.zip", zip("report.xml", REPORT.as_bytes()))]);
	let options = options(dir.path(), false);

	for _ in 0..3 {
		assert_eq!(process_message(&raw, Some("dmarc@example.net"), &options).unwrap(), 1);
	}

	for name in &[
		EXPECTED_FILE,
		"noreply-dmarc-support@google.com-1234@google.com-1.csv",
		"noreply-dmarc-support@google.com-1234@google.com-2.csv",
	] {
		assert!(dir.path().join(name).is_file(), "missing {}", name);
	}
	assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);
}

#[test]
fn broken_attachment_does_not_stop_the_message() {
	let dir = tempfile::tempdir().unwrap();
	let raw = email(&[
		("broken.xml.gz", b"this is not gzip data".to_vec()),
		("empty.zip", ZipWriter::new(Cursor::new(Vec::new())).finish().unwrap().into_inner()),
		("report.xml.gz", gzip(REPORT.as_bytes())),
	]);

	assert_eq!(process_message(&raw, None, &options(dir.path(), false)).unwrap(), 1);
	assert!(dir.path().join(EXPECTED_FILE).is_file());
}

#[test]
fn no_save_writes_no_files() {
	let dir = tempfile::tempdir().unwrap();
	let raw = email(&[("report.xml.gz", gzip(REPORT.as_bytes()))]);

	assert_eq!(process_message(&raw, None, &options(dir.path(), true)).unwrap(), 1);
	assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn invalid_xml_is_reported_per_attachment() {
	let dir = tempfile::tempdir().unwrap();
	let meta = MessageMetadata {
		to: "dmarc@example.net".to_string(),
		from: "noreply-dmarc-support@google.com".to_string(),
		date: "Sat, 02 Jan 2021 10:00:00 +0000".to_string(),
		message_id: None,
	};

	let result = process_attachment("report.xml.gz", &gzip(b"<feedback><record>"), &meta, &options(dir.path(), false));
	assert!(matches!(result, Err(ReportError::InvalidXml(_))));
	assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}
