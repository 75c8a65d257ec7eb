use crate::errors::CoreError;
use crate::models::HistoryMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::error;

/// Flat JSON file holding the whole history snapshot.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty history. Anything else that cannot be read
    /// is an error so the caller never overwrites data it failed to load.
    pub async fn load(&self) -> Result<HistoryMap, CoreError> {
        match fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|err| {
                error!(path = %self.path.display(), "failed to parse data file: {err}");
                CoreError::unavailable(err)
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(HistoryMap::default()),
            Err(err) => {
                error!(path = %self.path.display(), "failed to read data file: {err}");
                Err(CoreError::unavailable(err))
            }
        }
    }

    /// Writes next to the target and renames over it.
    pub async fn persist(&self, history: &HistoryMap) -> Result<(), CoreError> {
        let payload = serde_json::to_vec_pretty(history).map_err(CoreError::unavailable)?;
        let staging = self.staging_path();
        let written = match fs::write(&staging, payload).await {
            Ok(()) => fs::rename(&staging, &self.path).await,
            Err(err) => Err(err),
        };
        written.map_err(|err| {
            error!(path = %self.path.display(), "failed to write data file: {err}");
            CoreError::unavailable(err)
        })
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}
