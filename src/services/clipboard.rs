use crate::error::{AppError, Result};
use arboard::Clipboard;
use async_trait::async_trait;
use tracing::debug;

/// Destination for the rendered report.
#[async_trait]
pub trait ClipboardSink: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<()>;
}

/// The desktop clipboard of the machine running the service.
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClipboardSink for SystemClipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        let text = text.to_string();
        let len = text.len();

        // arboard talks to the display server synchronously.
        tokio::task::spawn_blocking(move || {
            let mut clipboard =
                Clipboard::new().map_err(|e| AppError::ClipboardWriteFailed(e.to_string()))?;
            clipboard
                .set_text(text)
                .map_err(|e| AppError::ClipboardWriteFailed(e.to_string()))
        })
        .await
        .map_err(|e| AppError::Internal(format!("clipboard task: {}", e)))??;

        debug!("Copied {} bytes to the clipboard", len);
        Ok(())
    }
}

/// Used when clipboard access is switched off; every write is refused.
pub struct DisabledClipboard;

#[async_trait]
impl ClipboardSink for DisabledClipboard {
    async fn write_text(&self, _text: &str) -> Result<()> {
        Err(AppError::ClipboardWriteFailed(
            "clipboard access is disabled (COPY_TO_CLIPBOARD=false)".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_clipboard_refuses_writes() {
        let err = DisabledClipboard.write_text("report").await.unwrap_err();
        assert_eq!(err.kind(), "clipboard_write_failed");
    }
}
