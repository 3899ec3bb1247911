//! Where the demo keeps its saved tree and its logs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

const LATEST_LOG: &str = "latest.log";
const STATE_FILE: &str = "tree.state";

/// Archived logs kept by [`DemoDirs::rotate_logs`].
pub const KEPT_LOGS: usize = 10;

/// Data and cache directories of the demo.
///
/// On Linux these follow XDG (`~/.local/share/ribs-demo` and
/// `~/.cache/ribs-demo`); other platforms use their usual locations.
#[derive(Debug, Clone)]
pub struct DemoDirs {
    data: PathBuf,
    cache: PathBuf,
}

impl DemoDirs {
    /// Platform directories, or `None` without a home directory.
    pub fn locate() -> Option<Self> {
        let dirs = ProjectDirs::from("dev", "ribs", "ribs-demo")?;
        Some(Self {
            data: dirs.data_dir().to_path_buf(),
            cache: dirs.cache_dir().to_path_buf(),
        })
    }

    /// Both directories under `root`.
    #[cfg(test)]
    fn under(root: &Path) -> Self {
        Self {
            data: root.join("data"),
            cache: root.join("cache"),
        }
    }

    /// Saved tree state, written on quit and read on the next start.
    pub fn state_file(&self) -> PathBuf {
        self.data.join(STATE_FILE)
    }

    pub fn log_file(&self) -> PathBuf {
        self.cache.join(LATEST_LOG)
    }

    /// Archive the previous run's log under its start time and keep only
    /// the newest `keep` archives. Creates the cache directory.
    pub fn rotate_logs(&self, keep: usize) -> io::Result<()> {
        fs::create_dir_all(&self.cache)?;
        let latest = self.log_file();
        if latest.exists() {
            let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S%.3f");
            fs::rename(&latest, self.cache.join(format!("{stamp}.log")))?;
        }

        let mut archived = archived_logs(&self.cache)?;
        // Stamped names sort in time order.
        archived.sort();
        let excess = archived.len().saturating_sub(keep);
        for path in &archived[..excess] {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

fn archived_logs(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut logs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_archive = path.extension().is_some_and(|ext| ext == "log")
            && path.file_name().is_some_and(|name| name != LATEST_LOG);
        if is_archive {
            logs.push(path);
        }
    }
    Ok(logs)
}
