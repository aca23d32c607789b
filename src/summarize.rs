//! Persistence of agent-produced daily channel summaries.

use crate::llm::output::SummaryOutput;
use anyhow::Context as _;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::info;

const CSV_HEADER: &str = "user_handle,topic,message_count";

/// Render summary rows as CSV with a header line.
pub fn to_csv(summary: &SummaryOutput) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for row in &summary.summaries {
        out.push_str(&format!(
            "{},{},{}\n",
            csv_field(&row.user_handle),
            csv_field(&row.topic),
            row.message_count
        ));
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Write `discord_daily_summary_<date>.txt` under `dir`, returning its path.
///
/// The date comes from the model, so it must be a real `YYYY-MM-DD` date
/// before it is used in a file name.
pub fn write_daily_summary(dir: &Path, summary: &SummaryOutput) -> anyhow::Result<PathBuf> {
    let date = NaiveDate::parse_from_str(summary.date.trim(), "%Y-%m-%d")
        .with_context(|| format!("Summary date '{}' is not YYYY-MM-DD", summary.date))?;

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(format!("discord_daily_summary_{}.txt", date.format("%Y-%m-%d")));
    std::fs::write(&path, to_csv(summary))
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(
        "Saved summary for {} ({} rows) to {}",
        date,
        summary.summaries.len(),
        path.display()
    );
    Ok(path)
}
