//! Correction history store
//!
//! Persists correction records to a single JSON file under the user data
//! directory. Concurrent processes are serialized with an advisory file
//! lock around every read-modify-write; the lock file's content is never
//! read, only its lock state matters.

use fs2::FileExt;
use plume_core::history::{SaveCorrectionParams, StoredCorrection};
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use uuid::Uuid;

const STORE_DIR: &str = "plume";
const CORRECTIONS_FILE: &str = "corrections.json";
const STORE_LOCK_TIMEOUT_SECS: u64 = 5;
const STORE_LOCK_RETRY_MS: u64 = 50;

/// File-backed history of correction runs.
pub struct CorrectionStore {
    dir: PathBuf,
}

struct StoreLock {
    file: std::fs::File,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

impl CorrectionStore {
    /// Store rooted at the platform data directory.
    pub fn open_default() -> anyhow::Result<Self> {
        let dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?
            .join(STORE_DIR);
        Ok(Self::at(dir))
    }

    /// Store rooted at an explicit directory.
    pub fn at(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn corrections_path(&self) -> PathBuf {
        self.dir.join(CORRECTIONS_FILE)
    }

    fn ensure_dir(&self) -> anyhow::Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        Ok(())
    }

    fn lock(&self) -> anyhow::Result<StoreLock> {
        self.ensure_dir()?;
        let lock_path = self.dir.join(".lock");
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)?;

        let start = Instant::now();
        loop {
            match FileExt::try_lock_exclusive(&file) {
                Ok(()) => break,
                Err(err) => {
                    if err.kind() != ErrorKind::WouldBlock {
                        return Err(err.into());
                    }
                    if start.elapsed() >= Duration::from_secs(STORE_LOCK_TIMEOUT_SECS) {
                        return Err(anyhow::anyhow!(
                            "Timed out waiting for history lock ({}s)",
                            STORE_LOCK_TIMEOUT_SECS
                        ));
                    }
                    std::thread::sleep(Duration::from_millis(STORE_LOCK_RETRY_MS));
                }
            }
        }

        Ok(StoreLock { file })
    }

    fn read_all(&self) -> anyhow::Result<Vec<StoredCorrection>> {
        let path = self.corrections_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_all(&self, records: &[StoredCorrection]) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(records)?;
        write_atomic(&self.corrections_path(), &content)
    }

    /// Persist one correction run and return the stored record.
    pub fn save(
        &self,
        user_id: &str,
        params: SaveCorrectionParams,
    ) -> anyhow::Result<StoredCorrection> {
        let _lock = self.lock()?;
        let mut records = self.read_all()?;
        let record = StoredCorrection::new(user_id, params);
        records.push(record.clone());
        self.write_all(&records)?;
        tracing::debug!(id = %record.id, "saved correction");
        Ok(record)
    }

    /// All corrections for a user, most recent first.
    pub fn list(&self, user_id: &str) -> anyhow::Result<Vec<StoredCorrection>> {
        let _lock = self.lock()?;
        let mut records: Vec<StoredCorrection> = self
            .read_all()?
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .collect();
        records.sort_by_key(|r| std::cmp::Reverse(r.created_at));
        Ok(records)
    }

    /// Remove one correction by id.
    pub fn delete(&self, id: Uuid) -> anyhow::Result<()> {
        let _lock = self.lock()?;
        let mut records = self.read_all()?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            anyhow::bail!("No correction with id {}", id);
        }
        self.write_all(&records)?;
        tracing::debug!(%id, "deleted correction");
        Ok(())
    }
}

fn write_atomic(path: &Path, content: &str) -> anyhow::Result<()> {
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = fs::Permissions::from_mode(0o600);
        let _ = fs::set_permissions(&tmp_path, perms);
    }

    #[cfg(windows)]
    {
        // Windows cannot rename over an existing file; move it aside first.
        let backup_path = path.with_extension("bak");
        if backup_path.exists() {
            let _ = fs::remove_file(&backup_path);
        }
        if path.exists() {
            fs::rename(path, &backup_path)?;
        }
    }

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err.into());
    }
    Ok(())
}
