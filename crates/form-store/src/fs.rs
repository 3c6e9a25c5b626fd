//! Directory-backed store.
//!
//! Layout under the root:
//!
//! ```text
//! forms/<uuid>/form.json        pretty-printed form definition
//! forms/<uuid>/responses.jsonl  one response record per line, append-only
//! ```

use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use form_spec::{FormDefinition, ResponseRecord};
use tempfile::NamedTempFile;
use tracing::debug;
use uuid::Uuid;

use crate::store::{FormStore, StoreError};

const FORMS_DIR: &str = "forms";
const FORM_FILE: &str = "form.json";
const RESPONSES_FILE: &str = "responses.jsonl";

#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Opens (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        let forms = root.join(FORMS_DIR);
        fs::create_dir_all(&forms).map_err(|err| StoreError::io(&forms, err))?;
        debug!(root = %root.display(), "opened form store");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn form_dir(&self, uuid: Uuid) -> PathBuf {
        self.root.join(FORMS_DIR).join(uuid.to_string())
    }

    fn form_path(&self, uuid: Uuid) -> PathBuf {
        self.form_dir(uuid).join(FORM_FILE)
    }

    fn responses_path(&self, uuid: Uuid) -> PathBuf {
        self.form_dir(uuid).join(RESPONSES_FILE)
    }

    fn ensure_form(&self, uuid: Uuid) -> Result<(), StoreError> {
        if self.form_path(uuid).is_file() {
            Ok(())
        } else {
            Err(StoreError::FormNotFound(uuid))
        }
    }
}

/// Writes through a temp file in the target's directory; the temp file is
/// removed on every failure path when it drops.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut file = NamedTempFile::new_in(dir).map_err(|err| StoreError::io(dir, err))?;
    file.write_all(bytes)
        .and_then(|()| file.as_file().sync_all())
        .map_err(|err| StoreError::io(file.path(), err))?;
    file.persist(path)
        .map_err(|err| StoreError::io(path, err.error))?;
    Ok(())
}

impl FormStore for FsStore {
    fn create_form(&self, form: FormDefinition) -> Result<Uuid, StoreError> {
        let uuid = form.uuid;
        let dir = self.form_dir(uuid);
        let path = dir.join(FORM_FILE);
        if path.exists() {
            return Err(StoreError::FormExists(uuid));
        }
        fs::create_dir_all(&dir).map_err(|err| StoreError::io(&dir, err))?;
        let bytes = serde_json::to_vec_pretty(&form).map_err(|err| StoreError::json(&path, err))?;
        write_atomic(&path, &bytes)?;
        debug!(%uuid, path = %path.display(), "wrote form definition");
        Ok(uuid)
    }

    fn get_form(&self, uuid: Uuid) -> Result<FormDefinition, StoreError> {
        let path = self.form_path(uuid);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::FormNotFound(uuid));
            }
            Err(err) => return Err(StoreError::io(&path, err)),
        };
        serde_json::from_slice(&bytes).map_err(|err| StoreError::json(&path, err))
    }

    fn append_response(&self, uuid: Uuid, record: ResponseRecord) -> Result<Uuid, StoreError> {
        self.ensure_form(uuid)?;
        let path = self.responses_path(uuid);
        let mut line = serde_json::to_vec(&record).map_err(|err| StoreError::json(&path, err))?;
        line.push(b'\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| StoreError::io(&path, err))?;
        file.write_all(&line)
            .map_err(|err| StoreError::io(&path, err))?;
        Ok(record.id)
    }

    fn list_responses(&self, uuid: Uuid) -> Result<Vec<ResponseRecord>, StoreError> {
        self.ensure_form(uuid)?;
        let path = self.responses_path(uuid);
        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StoreError::io(&path, err)),
        };

        let mut records = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|err| StoreError::io(&path, err))?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line).map_err(|err| StoreError::json(&path, err))?);
        }
        debug!(%uuid, count = records.len(), "loaded responses");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_keyed_by_uuid() {
        let store = FsStore {
            root: PathBuf::from("/data"),
        };
        let uuid = Uuid::nil();
        assert_eq!(
            store.responses_path(uuid),
            Path::new("/data/forms/00000000-0000-0000-0000-000000000000/responses.jsonl")
        );
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .expect("read dir")
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn atomic_write_leaves_only_the_target() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join(FORM_FILE);
        write_atomic(&target, b"{}").expect("write");
        assert_eq!(fs::read(&target).expect("read"), b"{}");
        assert_eq!(entries(dir.path()), vec![FORM_FILE]);
    }

    #[test]
    fn failed_atomic_write_cleans_up() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join(FORM_FILE);
        fs::create_dir(&target).expect("mkdir");
        fs::write(target.join("occupied"), b"x").expect("fill");

        let err = write_atomic(&target, b"{}").unwrap_err();
        assert!(matches!(err, StoreError::Io { ref path, .. } if *path == target));
        assert_eq!(entries(dir.path()), vec![FORM_FILE]);
    }
}
