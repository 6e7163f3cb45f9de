pub mod compile;
pub mod layout;

use crate::project::ProjectFile;
use anyhow::Result;
use netweave_core::audit::TracingChangeSink;
use netweave_core::store::PendingProcessIndicator;
use netweave_core::{EngineConfig, G2gEngine, MemoryStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Shared state for commands operating on a project file
pub struct CommandContext {
    pub path: PathBuf,
    pub project_id: String,
    pub store: Arc<MemoryStore>,
    pub engine: G2gEngine,
}

impl CommandContext {
    /// Load the project file into an in-memory store and build an engine over it
    pub async fn open(path: &Path) -> Result<Self> {
        let file = ProjectFile::load(path)?;
        let store = Arc::new(MemoryStore::new());
        store.import_project(&file.project_id, file.state).await;
        if let Some(pending) = file.pending {
            store.restore_pending(&file.project_id, pending);
        }
        // Change records go to the log; the project file keeps no history
        let engine = G2gEngine::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(TracingChangeSink),
            store.clone(),
            EngineConfig::from_env(),
        );
        Ok(Self {
            path: path.to_path_buf(),
            project_id: file.project_id,
            store,
            engine,
        })
    }

    /// Write the store contents back to the project file
    pub async fn save(&self) -> Result<()> {
        let state = self.store.export_project(&self.project_id).await;
        let pending = self.store.current(&self.project_id).await?;
        let file = ProjectFile {
            project_id: self.project_id.clone(),
            state,
            pending,
        };
        file.save(&self.path)?;
        debug!("Wrote project '{}' back to {}", self.project_id, self.path.display());
        Ok(())
    }
}
