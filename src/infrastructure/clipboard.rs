//! # System Clipboard
//!
//! Reads the shared clipboard through `arboard`. The handle is opened per read because
//! `arboard::Clipboard` is not `Send` on every platform.

use async_trait::async_trait;

use crate::domain::traits::ClipboardChannel;

#[derive(Default)]
pub struct ArboardClipboard;

impl ArboardClipboard {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ClipboardChannel for ArboardClipboard {
    async fn read_text(&self) -> Result<String, String> {
        tokio::task::spawn_blocking(|| {
            let mut clipboard = arboard::Clipboard::new().map_err(|e| e.to_string())?;
            clipboard.get_text().map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| format!("clipboard task failed: {e}"))?
    }
}
