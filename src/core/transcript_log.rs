//! Append-only transcript log.
//!
//! Either one file shared by every call, or one file per call identifier
//! under a directory. Writes are best-effort from the caller's point of view.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::core::transcript::TranscriptEntry;

pub const DEFAULT_TRANSCRIPT_LOG_PATH: &str = "transcript.log";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptLogMode {
    /// All calls interleaved in one file
    #[default]
    Shared,
    /// `{path}/{call_sid}.log`
    PerCall,
}

impl std::str::FromStr for TranscriptLogMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "shared" => Ok(Self::Shared),
            "per_call" | "per-call" | "percall" => Ok(Self::PerCall),
            other => Err(format!(
                "Invalid transcript log mode '{other}', expected 'shared' or 'per_call'"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranscriptLog {
    path: PathBuf,
    mode: TranscriptLogMode,
}

impl TranscriptLog {
    pub fn new(path: impl Into<PathBuf>, mode: TranscriptLogMode) -> Self {
        Self {
            path: path.into(),
            mode,
        }
    }

    pub fn mode(&self) -> TranscriptLogMode {
        self.mode
    }

    /// File the given call's lines go to.
    pub fn file_for(&self, call_sid: Option<&str>) -> PathBuf {
        match self.mode {
            TranscriptLogMode::Shared => self.path.clone(),
            TranscriptLogMode::PerCall => {
                let name = call_sid
                    .map(sanitize)
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| "unknown".to_string());
                self.path.join(format!("{name}.log"))
            }
        }
    }

    /// Append one `Speaker: text` line per entry.
    pub async fn append(
        &self,
        call_sid: Option<&str>,
        entries: &[TranscriptEntry],
    ) -> std::io::Result<PathBuf> {
        let file_path = self.file_for(call_sid);
        if entries.is_empty() {
            return Ok(file_path);
        }

        ensure_parent(&file_path).await?;

        let mut buffer = String::new();
        for entry in entries {
            buffer.push_str(&entry.to_string());
            buffer.push('\n');
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)
            .await?;
        file.write_all(buffer.as_bytes()).await?;
        file.flush().await?;

        Ok(file_path)
    }
}

async fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent).await,
        _ => Ok(()),
    }
}

fn sanitize(call_sid: &str) -> String {
    call_sid
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}
