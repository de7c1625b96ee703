//! JSON files for downstream tooling.

use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// Path a result named `stem` lands at for `date`.
pub fn output_path(output_dir: &str, date: NaiveDate, stem: &str) -> PathBuf {
    PathBuf::from(output_dir)
        .join(date.to_string())
        .join(format!("{}.json", stem))
}

/// Serialize `value` as pretty JSON to `{output_dir}/{today}/{stem}.json`,
/// creating the dated directory when needed.
///
/// # Returns
///
/// The path written.
#[instrument(level = "info", skip(value))]
pub async fn write_json<T>(value: &T, output_dir: &str, stem: &str) -> Result<PathBuf, Box<dyn Error>>
where
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string_pretty(value)?;
    let path = output_path(output_dir, Local::now().date_naive(), stem);

    if let Some(dir) = path.parent() {
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create output dir");
            return Err(e.into());
        }
    }

    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote JSON");
    Ok(path)
}
