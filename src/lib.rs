//! Turns DMARC aggregate reports found in an IMAP mailbox into CSV files.
//!
//! Each report attachment (gzip or zip compressed XML) is decompressed, parsed
//! and flattened into one CSV row per evaluated message: a `<record>` with a
//! `count` of 3 becomes three identical rows.

pub mod cli;
pub mod config;
pub mod dmarc;
pub mod error;
pub mod filename;
pub mod mailbox;
pub mod message;
pub mod output;
pub mod process;

pub use dmarc::{OutputRow, Rows};
pub use error::{MailboxError, MessageError, ReportError};
pub use message::MessageMetadata;
pub use process::{process_attachment, process_message, OutputOptions};
