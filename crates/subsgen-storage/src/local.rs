use crate::keys::{record_file_name, validate_key};
use crate::traits::{SelectionStorage, SessionScope, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use subsgen_core::constants::SESSION_MARKER_NAME;
use subsgen_core::{PendingSelection, VideoPayload};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

const RECORD_MAGIC: &[u8; 4] = b"SGR1";
const PROC_ROOT: &str = "/proc";
const PREAMBLE_LEN: usize = 12;

/// Everything in a record except the payload bytes.
#[derive(Debug, Serialize, Deserialize)]
struct RecordHeader {
    id: String,
    filename: String,
    content_type: String,
    style_id: String,
    saved_at_ms: i64,
    size_bytes: u64,
}

/// Local filesystem storage implementation
///
/// One file per record: a 4-byte magic, the header length as a little-endian
/// u64, the JSON header, then the raw payload. Writes land in a temporary
/// file that is synced and renamed over the record, so readers see either
/// the old record or the new one.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at `base_path`.
    ///
    /// The directory is created by the first write, not here.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.base_path.join(record_file_name(key)))
    }

    async fn ensure_base_dir(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.base_path).await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to create storage directory {}: {}",
                self.base_path.display(),
                e
            ))
        })
    }
}

fn encode_record(record: &PendingSelection) -> StorageResult<Vec<u8>> {
    let header = RecordHeader {
        id: record.id.clone(),
        filename: record.payload.filename.clone(),
        content_type: record.payload.content_type.clone(),
        style_id: record.style_id.clone(),
        saved_at_ms: record.saved_at_ms,
        size_bytes: record.payload.size_bytes(),
    };
    let header_bytes = serde_json::to_vec(&header)?;

    let mut buf =
        Vec::with_capacity(PREAMBLE_LEN + header_bytes.len() + record.payload.data.len());
    buf.extend_from_slice(RECORD_MAGIC);
    buf.extend_from_slice(&(header_bytes.len() as u64).to_le_bytes());
    buf.extend_from_slice(&header_bytes);
    buf.extend_from_slice(&record.payload.data);
    Ok(buf)
}

fn decode_record(raw: Vec<u8>) -> StorageResult<PendingSelection> {
    if raw.len() < PREAMBLE_LEN || &raw[..4] != RECORD_MAGIC {
        return Err(StorageError::Corrupt(
            "Record is missing its preamble".to_string(),
        ));
    }

    let len_bytes = <[u8; 8]>::try_from(&raw[4..PREAMBLE_LEN])
        .map_err(|e| StorageError::Corrupt(e.to_string()))?;
    let header_end = usize::try_from(u64::from_le_bytes(len_bytes))
        .ok()
        .and_then(|len| PREAMBLE_LEN.checked_add(len))
        .filter(|end| *end <= raw.len())
        .ok_or_else(|| StorageError::Corrupt("Header length out of bounds".to_string()))?;

    let header: RecordHeader = serde_json::from_slice(&raw[PREAMBLE_LEN..header_end])?;
    let data = Bytes::from(raw).slice(header_end..);

    if data.len() as u64 != header.size_bytes {
        return Err(StorageError::Corrupt(format!(
            "Payload is {} bytes, header says {}",
            data.len(),
            header.size_bytes
        )));
    }

    Ok(PendingSelection {
        id: header.id,
        payload: VideoPayload {
            filename: header.filename,
            content_type: header.content_type,
            data,
        },
        style_id: header.style_id,
        saved_at_ms: header.saved_at_ms,
    })
}

async fn write_and_commit(tmp_path: &Path, path: &Path, contents: &[u8]) -> StorageResult<()> {
    let mut file = fs::File::create(tmp_path).await.map_err(|e| {
        StorageError::WriteFailed(format!(
            "Failed to create file {}: {}",
            tmp_path.display(),
            e
        ))
    })?;

    file.write_all(contents).await.map_err(|e| {
        StorageError::WriteFailed(format!(
            "Failed to write file {}: {}",
            tmp_path.display(),
            e
        ))
    })?;

    file.sync_all().await.map_err(|e| {
        StorageError::WriteFailed(format!("Failed to sync file {}: {}", tmp_path.display(), e))
    })?;
    drop(file);

    fs::rename(tmp_path, path).await.map_err(|e| {
        StorageError::WriteFailed(format!(
            "Failed to commit {} to {}: {}",
            tmp_path.display(),
            path.display(),
            e
        ))
    })
}

#[async_trait]
impl SelectionStorage for LocalStorage {
    async fn put(&self, record: &PendingSelection) -> StorageResult<()> {
        let path = self.key_to_path(&record.id)?;
        self.ensure_base_dir().await?;

        let start = std::time::Instant::now();
        let contents = encode_record(record)?;
        let tmp_path = self
            .base_path
            .join(format!("{}.{}.tmp", record.id, Uuid::new_v4()));

        if let Err(e) = write_and_commit(&tmp_path, &path, &contents).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e);
        }

        tracing::debug!(
            path = %path.display(),
            key = %record.id,
            size_bytes = record.payload.size_bytes(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage write committed"
        );

        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Option<PendingSelection>> {
        let path = self.key_to_path(key)?;

        let raw = match fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::ReadFailed(format!(
                    "Failed to read file {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let record = decode_record(raw)?;
        tracing::debug!(
            path = %path.display(),
            key = %key,
            size_bytes = record.payload.size_bytes(),
            "Local storage read"
        );
        Ok(Some(record))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), key = %key, "Local storage delete");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

/// Session marker kept as a file in a session-scoped directory.
///
/// The directory should be one that does not outlive the session (for
/// example `$XDG_RUNTIME_DIR`), and the session id should change when a new
/// session starts.
#[derive(Debug, Clone)]
pub struct FileSessionScope {
    dir: PathBuf,
    marker_name: String,
}

impl FileSessionScope {
    pub fn new(dir: impl Into<PathBuf>, session_id: &str) -> Self {
        let session_id: String = session_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        Self {
            dir: dir.into(),
            marker_name: format!("{}-{}", SESSION_MARKER_NAME, session_id),
        }
    }

    pub fn marker_path(&self) -> StorageResult<PathBuf> {
        validate_key(&self.marker_name)?;
        Ok(self.dir.join(&self.marker_name))
    }

    /// Remove markers whose session id is a process id that is no longer
    /// running, so a later shell reusing that id does not inherit them.
    ///
    /// Non-numeric ids are left alone, and nothing is removed on systems
    /// without `/proc`.
    async fn sweep_stale_markers(&self) {
        let proc_root = Path::new(PROC_ROOT);
        if !fs::try_exists(proc_root.join("self")).await.unwrap_or(false) {
            return;
        }

        let prefix = format!("{}-", SESSION_MARKER_NAME);
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(_) => return,
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == self.marker_name {
                continue;
            }
            let Some(pid) = name.strip_prefix(&prefix) else {
                continue;
            };
            if pid.is_empty() || !pid.bytes().all(|b| b.is_ascii_digit()) {
                continue;
            }
            if fs::try_exists(proc_root.join(pid)).await.unwrap_or(true) {
                continue;
            }

            match fs::remove_file(entry.path()).await {
                Ok(()) => tracing::debug!(marker = %name, "Removed stale session marker"),
                Err(e) => tracing::warn!(
                    error = %e,
                    marker = %name,
                    "Failed to remove stale session marker"
                ),
            }
        }
    }
}

#[async_trait]
impl SessionScope for FileSessionScope {
    async fn is_session_active(&self) -> StorageResult<bool> {
        let path = self.marker_path()?;
        fs::try_exists(&path).await.map_err(|e| {
            StorageError::ReadFailed(format!(
                "Failed to check session marker {}: {}",
                path.display(),
                e
            ))
        })
    }

    async fn mark_session_active(&self) -> StorageResult<()> {
        let path = self.marker_path()?;
        fs::create_dir_all(&self.dir).await?;
        fs::write(&path, b"active").await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to write session marker {}: {}",
                path.display(),
                e
            ))
        })?;
        self.sweep_stale_markers().await;
        Ok(())
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(name: &str, style: &str, data: &[u8], saved_at_ms: i64) -> PendingSelection {
        PendingSelection::new(
            VideoPayload::new(name, "video/mp4", data.to_vec()),
            style,
            saved_at_ms,
        )
    }

    #[tokio::test]
    async fn test_local_storage_put_get() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("pending"));

        let original = record("talk.mp4", "neon", b"\x00\x01binary\xff", 42);
        storage.put(&original).await.unwrap();

        let loaded = storage.get("current_video").await.unwrap().unwrap();
        assert_eq!(loaded, original);
    }

    #[tokio::test]
    async fn test_local_storage_overwrite_replaces_record() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage
            .put(&record("a.mp4", "hormozi", b"first payload, longer", 1))
            .await
            .unwrap();
        storage
            .put(&record("b.webm", "fire", b"second", 2))
            .await
            .unwrap();

        let loaded = storage.get("current_video").await.unwrap().unwrap();
        assert_eq!(loaded.payload.filename, "b.webm");
        assert_eq!(loaded.payload.data.as_ref(), b"second");
        assert_eq!(loaded.style_id, "fire");
    }

    #[tokio::test]
    async fn test_local_storage_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage.put(&record("a.mp4", "neon", b"x", 1)).await.unwrap();
        storage.put(&record("a.mp4", "neon", b"y", 2)).await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["current_video.rec".to_string()]);
    }

    #[tokio::test]
    async fn test_local_storage_missing_dir_reads_empty() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("never-created");
        let storage = LocalStorage::new(&base);

        assert!(storage.get("current_video").await.unwrap().is_none());
        assert!(storage.delete("current_video").await.is_ok());
        assert!(!base.exists());
    }

    #[tokio::test]
    async fn test_local_storage_delete() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage.put(&record("a.mp4", "neon", b"x", 1)).await.unwrap();
        storage.delete("current_video").await.unwrap();
        assert!(storage.get("current_video").await.unwrap().is_none());
        assert!(storage.delete("current_video").await.is_ok());
    }

    #[tokio::test]
    async fn test_corrupt_record_is_reported() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        std::fs::write(dir.path().join("current_video.rec"), b"garbage").unwrap();

        let result = storage.get("current_video").await;
        assert!(matches!(result, Err(StorageError::Corrupt(_))));
    }

    #[tokio::test]
    async fn test_truncated_payload_is_reported() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        storage
            .put(&record("a.mp4", "neon", b"0123456789", 1))
            .await
            .unwrap();

        let path = dir.path().join("current_video.rec");
        let mut raw = std::fs::read(&path).unwrap();
        raw.truncate(raw.len() - 3);
        std::fs::write(&path, raw).unwrap();

        let result = storage.get("current_video").await;
        assert!(matches!(result, Err(StorageError::Corrupt(_))));
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        let result = storage.get("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete("../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let mut bad = record("a.mp4", "neon", b"x", 1);
        bad.id = "nested/key".to_string();
        assert!(matches!(
            storage.put(&bad).await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_file_session_scope_marks_session() {
        let dir = tempdir().unwrap();
        let scope = FileSessionScope::new(dir.path().join("sessions"), "4242");

        assert!(!scope.is_session_active().await.unwrap());
        scope.mark_session_active().await.unwrap();
        assert!(scope.is_session_active().await.unwrap());
        scope.mark_session_active().await.unwrap();
        assert!(scope.is_session_active().await.unwrap());
    }

    #[tokio::test]
    async fn test_file_session_scope_isolates_sessions() {
        let dir = tempdir().unwrap();
        let first = FileSessionScope::new(dir.path(), "100");
        let second = FileSessionScope::new(dir.path(), "200");

        first.mark_session_active().await.unwrap();
        assert!(!second.is_session_active().await.unwrap());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_markers_of_exited_processes_are_swept() {
        let dir = tempdir().unwrap();
        let live_pid = std::process::id().to_string();
        // Above the kernel's pid_max, so never a running process.
        let dead_pid = "4294967295";

        for id in [live_pid.as_str(), dead_pid, "tty-7"] {
            FileSessionScope::new(dir.path(), id)
                .mark_session_active()
                .await
                .unwrap();
        }

        assert!(FileSessionScope::new(dir.path(), &live_pid)
            .is_session_active()
            .await
            .unwrap());
        assert!(FileSessionScope::new(dir.path(), "tty-7")
            .is_session_active()
            .await
            .unwrap());
        assert!(!FileSessionScope::new(dir.path(), dead_pid)
            .is_session_active()
            .await
            .unwrap());
    }

    #[test]
    fn test_session_id_is_sanitized() {
        let scope = FileSessionScope::new("/run/subsgen", "../../tty 1");
        let path = scope.marker_path().unwrap();
        assert_eq!(
            path,
            PathBuf::from("/run/subsgen/subsgen_session-______tty_1")
        );
    }
}
