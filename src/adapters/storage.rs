use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Output layout below `<plot_dir>/<config name>`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// `<base>/<signal>_tagging`
    pub fn signal_dir(&self, signal: &str) -> PathBuf {
        self.base_path.join(format!("{}_tagging", signal))
    }

    pub fn plot_path(&self, signal: &str, plot_name: &str, extension: &str) -> PathBuf {
        self.signal_dir(signal)
            .join(format!("{}.{}", plot_name, extension))
    }

    /// Creates the signal directory (and parents) if needed.
    pub fn prepare_signal_dir(&self, signal: &str) -> Result<PathBuf> {
        let dir = self.signal_dir(signal);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
