//! CLI presentation: text and json formatters per command.

use crate::error::NotaryError;
use crate::snapshot::{Mismatch, Snapshot, VerifyReport};
use crate::types::digest_hex;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use std::path::Path;

pub fn format_fingerprint_text(snapshot: &Snapshot, target: &Path) -> String {
    format!(
        "Root:     {}\nRecords:  {}\nBytes:    {}\nSnapshot: {}",
        digest_hex(snapshot.root_digest()),
        snapshot.records().len(),
        snapshot.total_bytes(),
        target.display()
    )
}

pub fn format_verify_json(report: &VerifyReport) -> Result<String, NotaryError> {
    serde_json::to_string_pretty(report)
        .map_err(|e| NotaryError::Task(format!("Failed to serialize report: {}", e)))
}

pub fn format_verify_text(report: &VerifyReport) -> String {
    let mut out = format!(
        "Snapshot: {}\nEntries:  {}\nRoot:     {}",
        report.snapshot.display(),
        report.entries,
        report.root
    );
    if !report.rehashed {
        return out;
    }
    if report.is_clean() {
        out.push_str("\nAll listed files match");
        return out;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Path", "Problem", "Detail"]);
    for mismatch in &report.mismatches {
        match mismatch {
            Mismatch::Missing { path } => {
                table.add_row(vec![path.as_str(), "missing", "-"]);
            }
            Mismatch::Changed { path, actual, .. } => {
                let detail = format!("now {}", actual);
                table.add_row(vec![path.as_str(), "changed", detail.as_str()]);
            }
            Mismatch::Unreadable { path, error } => {
                table.add_row(vec![path.as_str(), "unreadable", error.as_str()]);
            }
        }
    }
    out.push_str(&format!(
        "\n{} of {} files differ\n{}",
        report.mismatches.len(),
        report.entries,
        table
    ));
    out
}
