//! CSV export of fetched profiles
//!
//! The format is written by hand: a fixed header row, then one row per profile
//! in input order, rows separated by `\n` with no trailing newline. A field is
//! quoted only when it contains a comma, a quote or a line break; quotes inside
//! a quoted field are doubled.

use crate::fetch::ProfileRecord;
use crate::output::{OutputError, OutputResult};
use chrono::NaiveDate;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Column names of the export, in order
pub const HEADER: &[&str] = &[
    "Name",
    "Username",
    "Location",
    "Company",
    "Email",
    "Website",
    "Public Repos",
    "Followers",
    "Bio",
];

/// Formats profiles as CSV text
///
/// Deterministic: the same records always give the same text.
///
/// # Example
///
/// ```
/// use profile_harvest::output::format_csv;
/// use profile_harvest::ProfileRecord;
///
/// let csv = format_csv(&[ProfileRecord::with_login("octocat")]);
/// assert_eq!(
///     csv,
///     "Name,Username,Location,Company,Email,Website,Public Repos,Followers,Bio\n,octocat,,,,,0,0,"
/// );
/// ```
pub fn format_csv(records: &[ProfileRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(HEADER.join(","));

    for record in records {
        let fields = [
            escape(&record.name),
            escape(&record.login),
            escape(&record.location),
            escape(&record.company),
            escape(&record.email),
            escape(&record.blog),
            record.public_repos.to_string(),
            record.followers.to_string(),
            escape(&record.bio),
        ];
        lines.push(fields.join(","));
    }

    lines.join("\n")
}

/// Name of the export file for a given day: `github-profiles-YYYY-MM-DD.csv`
pub fn export_filename(date: NaiveDate) -> String {
    format!("github-profiles-{}.csv", date.format("%Y-%m-%d"))
}

/// Writes the export file into `dir`, creating the directory if needed
///
/// Returns the path of the written file. An existing export of the same day
/// is overwritten.
pub fn write_export(dir: &Path, records: &[ProfileRecord], date: NaiveDate) -> OutputResult<PathBuf> {
    fs::create_dir_all(dir)?;

    let path = dir.join(export_filename(date));
    let mut file = File::create(&path)
        .map_err(|e| OutputError::Write(format!("{}: {}", path.display(), e)))?;
    file.write_all(format_csv(records).as_bytes())?;

    tracing::info!("Exported {} profiles to {}", records.len(), path.display());
    Ok(path)
}

fn escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
