//! Shared repository utilities.
//!
//! Directory allocation and shard traversal used by the conversation
//! repository and the maintenance services (retention, compliance, nudges).

use crate::{ChatError, ChatResult};
use solace_uuid::UuidService;
use std::{
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

/// Allocates a fresh conversation id and creates its sharded directory.
///
/// Ids come from `uuid_source`; a collision with an existing directory (a
/// pathological UUID clash, or interference from outside the process) is
/// retried with a new id, up to 5 times.
///
/// Returns the allocated id together with the created directory path.
///
/// # Errors
///
/// Returns `ChatError::ConversationDirCreation` when parent or leaf directory
/// creation fails, or when no unique directory could be allocated.
pub(crate) fn create_uuid_and_shard_dir(
    base_dir: &Path,
    mut uuid_source: impl FnMut() -> UuidService,
) -> ChatResult<(UuidService, PathBuf)> {
    for _attempt in 0..5 {
        let uuid = uuid_source();
        let candidate = uuid.sharded_dir(base_dir);

        if candidate.exists() {
            continue;
        }

        if let Some(parent) = candidate.parent() {
            fs::create_dir_all(parent).map_err(ChatError::ConversationDirCreation)?;
        }

        match fs::create_dir(&candidate) {
            Ok(()) => return Ok((uuid, candidate)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(ChatError::ConversationDirCreation(e)),
        }
    }

    Err(ChatError::ConversationDirCreation(io::Error::new(
        ErrorKind::AlreadyExists,
        "failed to allocate a unique conversation directory after 5 attempts",
    )))
}

/// Walks the sharded layout and returns every conversation id found.
///
/// Directory names that are not canonical UUIDs are logged and skipped; a
/// missing base directory yields an empty list rather than an error so
/// maintenance services behave sensibly on a fresh deployment.
pub(crate) fn scan_conversation_ids(base_dir: &Path) -> Vec<UuidService> {
    let mut ids = Vec::new();

    let s1_iter = match fs::read_dir(base_dir) {
        Ok(it) => it,
        Err(_) => return ids,
    };

    for s1 in s1_iter.flatten() {
        let s1_path = s1.path();
        if !s1_path.is_dir() {
            continue;
        }

        let s2_iter = match fs::read_dir(&s1_path) {
            Ok(it) => it,
            Err(_) => continue,
        };

        for s2 in s2_iter.flatten() {
            let s2_path = s2.path();
            if !s2_path.is_dir() {
                continue;
            }

            let id_iter = match fs::read_dir(&s2_path) {
                Ok(it) => it,
                Err(_) => continue,
            };

            for id_ent in id_iter.flatten() {
                let id_path = id_ent.path();
                if !id_path.is_dir() {
                    continue;
                }

                let name = id_path
                    .file_name()
                    .and_then(|os| os.to_str())
                    .unwrap_or("");

                match UuidService::parse(name) {
                    Ok(uuid) => ids.push(uuid),
                    Err(_) => {
                        tracing::warn!(
                            "skipping non-canonical conversation directory: {}",
                            id_path.display()
                        );
                    }
                }
            }
        }
    }

    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_uuid_and_shard_dir_allocates_fresh_directory() {
        let base = tempfile::tempdir().unwrap();
        let (uuid, dir) = create_uuid_and_shard_dir(base.path(), UuidService::new).unwrap();

        assert!(dir.is_dir());
        assert_eq!(dir, uuid.sharded_dir(base.path()));
    }

    #[test]
    fn test_create_uuid_and_shard_dir_retries_on_collision() {
        let base = tempfile::tempdir().unwrap();
        let taken = UuidService::parse("00112233445566778899aabbccddeeff").unwrap();
        let free = UuidService::parse("aabbccddeeff00112233445566778899").unwrap();
        fs::create_dir_all(taken.sharded_dir(base.path())).unwrap();

        let mut sequence = vec![free.clone(), taken.clone()];
        let (uuid, dir) =
            create_uuid_and_shard_dir(base.path(), move || sequence.pop().unwrap()).unwrap();

        assert_eq!(uuid, free);
        assert!(dir.is_dir());
    }

    #[test]
    fn test_scan_conversation_ids_skips_noise() {
        let base = tempfile::tempdir().unwrap();
        let good = UuidService::parse("550e8400e29b41d4a716446655440000").unwrap();
        fs::create_dir_all(good.sharded_dir(base.path())).unwrap();
        fs::create_dir_all(base.path().join("55").join("0e").join("not-a-uuid")).unwrap();

        let ids = scan_conversation_ids(base.path());
        assert_eq!(ids, vec![good]);
    }

    #[test]
    fn test_scan_missing_base_dir_is_empty() {
        let base = tempfile::tempdir().unwrap();
        let ids = scan_conversation_ids(&base.path().join("absent"));
        assert!(ids.is_empty());
    }
}
