//! Local staging for synthesized audio the device fetches back.

use std::path::PathBuf;

use crate::Result;

/// Writes synthesized artifacts under a served directory and hands out
/// the URLs the device should fetch them from.
pub struct ArtifactStore {
    dir: PathBuf,
    base_url: String,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            base_url: base_url.into(),
        }
    }

    /// Persist `bytes` under `name` and return the URL it is served at.
    pub async fn store(&self, name: &str, bytes: &[u8]) -> Result<String> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(name);
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(path = %path.display(), len = bytes.len(), "artifact stored");
        Ok(self.url_for(name))
    }

    pub fn url_for(&self, name: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), name)
    }

    /// Delete a stored artifact. An already-missing file is not an
    /// error; anything else is logged and swallowed, since pruning
    /// must never fail the turn that triggered it.
    pub async fn remove(&self, name: &str) {
        let path = self.dir.join(name);
        if let Err(err) = tokio::fs::remove_file(&path).await {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %err, "stale artifact not removed");
            }
        }
    }
}
