// src/store.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{error::AppError, models::result::ResultRecord};

/// Persistence seam for test results.
///
/// Reads hand out owned snapshots; callers never hold a reference into the store.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Every stored result, oldest first.
    async fn all(&self) -> Result<Vec<ResultRecord>, AppError>;

    /// Results whose `username` matches exactly.
    async fn by_user(&self, username: &str) -> Result<Vec<ResultRecord>, AppError> {
        let mut results = self.all().await?;
        results.retain(|r| r.username == username);
        Ok(results)
    }

    /// Appends a result and returns it as stored.
    async fn append(&self, record: ResultRecord) -> Result<ResultRecord, AppError>;
}

/// On-disk layout: `{ "results": [ ... ] }`.
///
/// Entries stay raw JSON here so that one bad entry neither fails the
/// read nor gets dropped from disk by the next append.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ResultsFile {
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

impl ResultsFile {
    /// Converts every entry that is a JSON object; other entries are skipped.
    fn records(self, path: &Path) -> Vec<ResultRecord> {
        self.results
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(
                        "Skipping malformed result #{} in {}: {}",
                        index,
                        path.display(),
                        e
                    );
                    None
                }
            })
            .collect()
    }
}

/// Result store backed by a single JSON file.
///
/// The file is re-read on every call so edits made while the server runs are
/// picked up. Writes within this process are serialized by `write_lock`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileStore {
    /// Opens the store at `path`, creating the file (and parent directories)
    /// with an empty `results` collection if it does not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        if !tokio::fs::try_exists(&path).await? {
            tracing::info!("Creating results store at {}", path.display());
            write_file(&path, &ResultsFile::default()).await?;
        }

        Ok(Self {
            path,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<ResultsFile, AppError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ResultsFile::default());
            }
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(ResultsFile::default());
        }

        serde_json::from_str(&raw).map_err(|e| {
            tracing::error!("Results store {} is corrupt: {:?}", self.path.display(), e);
            AppError::from(e)
        })
    }
}

#[async_trait]
impl ResultStore for JsonFileStore {
    async fn all(&self) -> Result<Vec<ResultRecord>, AppError> {
        Ok(self.read().await?.records(&self.path))
    }

    async fn append(&self, record: ResultRecord) -> Result<ResultRecord, AppError> {
        let _guard = self.write_lock.lock().await;

        let mut file = self.read().await?;
        file.results.push(serde_json::to_value(&record)?);
        write_file(&self.path, &file).await?;

        tracing::debug!(
            "Stored result of '{}' for test '{}' ({} total)",
            record.username,
            record.test_title,
            file.results.len()
        );
        Ok(record)
    }
}

/// Writes through a sibling temp file so a crash never leaves half a document.
async fn write_file(path: &Path, file: &ResultsFile) -> Result<(), AppError> {
    let body = serde_json::to_vec_pretty(file)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, body).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
