use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::Result;
use crate::record::MemoryRecord;
use crate::{MEMORY_FILE, STATE_DIR};

/// Reads and writes the single per-project memory file.
///
/// All writes are atomic (temp file + rename). The design assumes one writer
/// process per project; there is no cross-process locking.
pub struct MemoryStore {
    root: PathBuf,
    path: PathBuf,
}

impl MemoryStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let path = root.join(STATE_DIR).join(MEMORY_FILE);
        Self { root, path }
    }

    #[must_use]
    pub fn memory_path(&self) -> &Path {
        &self.path
    }

    /// Load the memory record.
    ///
    /// A missing file yields an in-memory default that is not persisted. A
    /// file that exists but fails to parse is renamed aside with a `.bak`
    /// suffix and replaced by a default; the data loss is logged, never
    /// fatal.
    #[must_use]
    pub fn load(&self) -> MemoryRecord {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return self.default_record(),
        };

        match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("memory file is corrupt ({e}); backing it up and starting fresh");
                self.backup_corrupt();
                self.default_record()
            }
        }
    }

    /// Stamp `last_updated` and write the record atomically.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the filesystem write fails.
    pub fn save(&self, record: &mut MemoryRecord) -> Result<()> {
        record.last_updated = unix_now_ms();

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(record)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn default_record(&self) -> MemoryRecord {
        let name = self
            .root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string());
        MemoryRecord::new(name, unix_now_ms())
    }

    fn backup_corrupt(&self) {
        let bak = self.path.with_extension("json.bak");
        if let Err(e) = fs::rename(&self.path, &bak) {
            log::warn!("could not back up corrupt memory file: {e}");
        } else {
            log::info!("backed up corrupt memory file to {}", bak.display());
        }
    }
}

fn unix_now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
