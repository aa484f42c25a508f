use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::CoachCalResult;

use super::{Document, DocumentStore};

const STORE_FILE: &str = "store.json";
const LOCK_FILE: &str = ".store.lock";

/// JSON file store under a data directory.
///
/// Readers take a shared lock and writers an exclusive one on a sidecar lock
/// file. Writes land in a temp file that is renamed over `store.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> CoachCalResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(FileStore { dir })
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(STORE_FILE)
    }

    fn lock_file(&self) -> CoachCalResult<File> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.dir.join(LOCK_FILE))?;
        Ok(file)
    }

    fn load(path: &Path) -> CoachCalResult<Document> {
        if !path.exists() {
            return Ok(Document::default());
        }
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Document::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, doc: &Document) -> CoachCalResult<()> {
        let path = self.path();
        let temp = self.dir.join(STORE_FILE.to_string() + ".tmp");

        let content = serde_json::to_string_pretty(doc)?;
        fs::write(&temp, content)?;
        fs::rename(&temp, &path)?;
        Ok(())
    }
}

impl DocumentStore for FileStore {
    fn read<R>(&self, f: impl FnOnce(&Document) -> R) -> CoachCalResult<R> {
        let lock = self.lock_file()?;
        FileExt::lock_shared(&lock)?;
        let doc = Self::load(&self.path())?;
        Ok(f(&doc))
    }

    fn write<R>(&self, f: impl FnOnce(&mut Document) -> CoachCalResult<R>) -> CoachCalResult<R> {
        let lock = self.lock_file()?;
        FileExt::lock_exclusive(&lock)?;

        let mut doc = Self::load(&self.path())?;
        let out = f(&mut doc)?;
        self.save(&doc)?;

        tracing::debug!(
            path = %self.path().display(),
            tasks = doc.tasks.len(),
            todos = doc.todos.len(),
            "store saved"
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{ConvertRequest, TimeSlot, convert};
    use crate::error::CoachCalError;
    use crate::store::OccurrenceStore;
    use crate::todo::{NewTodo, Todo};
    use chrono::{TimeZone, Utc};

    fn todo() -> Todo {
        Todo::new(NewTodo {
            title: "Plan deload week".to_string(),
            description: String::new(),
            deadline: None,
            owner_id: "coach".to_string(),
            assigned_to_id: None,
            project_id: None,
        })
    }

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        assert!(store.find_todos("coach", None).unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let item = todo();
        FileStore::open(dir.path())
            .unwrap()
            .insert_todo(item.clone())
            .unwrap();

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get_todo(&item.id).unwrap(), item);
        assert!(!dir.path().join("store.json.tmp").exists());
    }

    #[test]
    fn test_conversion_is_persisted_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let item = todo();
        store.insert_todo(item.clone()).unwrap();
        let slot = TimeSlot::starting_at(Utc.with_ymd_and_hms(2025, 3, 6, 14, 0, 0).unwrap());
        let request = ConvertRequest::new(&item.id, slot);

        let conversion = convert(&store, &request).unwrap();
        let again = convert(&FileStore::open(dir.path()).unwrap(), &request);

        assert!(matches!(again, Err(CoachCalError::Conflict(_))));
        let stored = store.get_todo(&item.id).unwrap();
        assert_eq!(stored.converted_to_task_id, Some(conversion.task.id.clone()));
        assert_eq!(store.get_task(&conversion.task.id).unwrap(), conversion.task);
    }

    #[test]
    fn test_corrupt_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(STORE_FILE), "{ not json").unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        assert!(matches!(
            store.find_todos("coach", None),
            Err(CoachCalError::Serialization(_))
        ));
    }
}
