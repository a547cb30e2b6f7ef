use crate::config::Config;
use crate::error::{AppError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

pub const MARKDOWN_CONTENT_TYPE: &str = "text/markdown; charset=utf-8";
const FILENAME_PREFIX: &str = "web-debug-report-";

/// Filename for a download made at `now`, e.g.
/// `web-debug-report-2026-10-19T08-15-02.md`.
pub fn download_filename(now: DateTime<Utc>) -> String {
    let stamp: String = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
        .chars()
        .take(19)
        .collect();
    format!("{}{}.md", FILENAME_PREFIX, stamp)
}

/// Saves reports to disk and renders the manual-save fallback page.
pub struct ExportService {
    export_dir: PathBuf,
}

impl ExportService {
    pub fn new(config: &Config) -> Self {
        Self {
            export_dir: config.export_dir.clone(),
        }
    }

    pub async fn save(&self, report: &str, now: DateTime<Utc>) -> Result<PathBuf> {
        if !self.export_dir.exists() {
            fs::create_dir_all(&self.export_dir)
                .await
                .map_err(|e| AppError::DownloadFailed(format!(
                    "Failed to create export directory: {}", e
                )))?;
        }

        let filepath = self.export_dir.join(download_filename(now));

        fs::write(&filepath, report)
            .await
            .map_err(|e| AppError::DownloadFailed(format!(
                "Failed to save report: {}", e
            )))?;

        debug!("Report saved: {:?}", filepath);
        Ok(filepath)
    }

    /// Standalone page with the report and instructions for saving it by
    /// hand, for when a download cannot be triggered.
    pub fn manual_save_page(&self, report: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <title>Debug report - save manually</title>
  <style>
    body {{ font-family: monospace; padding: 20px; background: #f5f5f5; line-height: 1.6; }}
    .instructions {{ background: #fff3cd; border: 2px solid #ffc107; padding: 15px; margin-bottom: 20px; border-radius: 8px; }}
    kbd {{ background: #333; color: white; padding: 2px 6px; border-radius: 3px; font-size: 12px; }}
    pre {{ background: white; padding: 20px; border-radius: 8px; border: 1px solid #ddd; white-space: pre-wrap; word-wrap: break-word; }}
  </style>
</head>
<body>
  <div class="instructions">
    <strong>Saving this report:</strong>
    <ol>
      <li>Press <kbd>Ctrl+S</kbd> (<kbd>Cmd+S</kbd> on macOS) to save this page</li>
      <li>Name the file <code>web-debug-report.md</code></li>
      <li>Choose "Web page, HTML only" or "Text file" as the type</li>
    </ol>
    <p>Or select the text below with <kbd>Ctrl+A</kbd>, copy it with <kbd>Ctrl+C</kbd> and paste it into an editor.</p>
  </div>
  <pre>{}</pre>
</body>
</html>
"#,
            escape_html(report)
        )
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
