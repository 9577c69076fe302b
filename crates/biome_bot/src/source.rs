//! Where script documents come from.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;

use biome_core::ScriptDocument;

/// Supplier of script documents by URI. The whole cell set of a bot is
/// fetched through one source during the warm-up phase.
#[async_trait]
pub trait ScriptSource: Send + Sync {
    async fn fetch(&self, uri: &str) -> Result<ScriptDocument>;
}

/// Reads JSON cell files relative to a root directory.
pub struct FsScriptSource {
    root: PathBuf,
}

impl FsScriptSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ScriptSource for FsScriptSource {
    async fn fetch(&self, uri: &str) -> Result<ScriptDocument> {
        let path = self.root.join(uri);
        let text = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading script {}", path.display()))?;
        ScriptDocument::parse(&text).with_context(|| format!("parsing script {}", path.display()))
    }
}

/// Cell name derived from a script URI: the file name without its extension.
pub fn cell_name(uri: &str) -> String {
    let file = uri.rsplit(['/', '\\']).next().unwrap_or(uri);
    file.strip_suffix(".json").unwrap_or(file).to_string()
}
