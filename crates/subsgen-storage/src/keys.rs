//! Shared key checks for storage backends.

use crate::traits::{StorageError, StorageResult};

/// Reject keys that could escape a backend's directory or collide with
/// temporary files.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }

    if key.contains("..") || key.contains('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(format!(
            "Storage key contains invalid characters: {}",
            key
        )));
    }

    if key.ends_with(".tmp") {
        return Err(StorageError::InvalidKey(format!(
            "Storage key uses a reserved suffix: {}",
            key
        )));
    }

    Ok(())
}

/// File name of the record stored under `key`.
pub fn record_file_name(key: &str) -> String {
    format!("{}.rec", key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_keys() {
        assert!(validate_key("current_video").is_ok());
        assert!(validate_key("subsgen_session-4242").is_ok());
    }

    #[test]
    fn rejects_traversal_and_separators() {
        for key in ["", "../etc/passwd", "a/b", "a\\b", "x.tmp"] {
            assert!(
                matches!(validate_key(key), Err(StorageError::InvalidKey(_))),
                "{:?}",
                key
            );
        }
    }
}
