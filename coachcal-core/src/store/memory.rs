use std::sync::{Mutex, MutexGuard};

use crate::error::{CoachCalError, CoachCalResult};
use crate::task::Task;

use super::{Document, DocumentStore};

/// In-process store. Used by tests and as a scratch calendar.
#[derive(Debug, Default)]
pub struct MemoryStore {
    doc: Mutex<Document>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(doc: Document) -> Self {
        MemoryStore {
            doc: Mutex::new(doc),
        }
    }

    /// Every stored task, in insertion order.
    pub fn all_tasks(&self) -> CoachCalResult<Vec<Task>> {
        self.read(|doc| doc.tasks.clone())
    }

    fn lock(&self) -> CoachCalResult<MutexGuard<'_, Document>> {
        self.doc
            .lock()
            .map_err(|_| CoachCalError::Store("memory store lock poisoned".to_string()))
    }
}

impl DocumentStore for MemoryStore {
    fn read<R>(&self, f: impl FnOnce(&Document) -> R) -> CoachCalResult<R> {
        let doc = self.lock()?;
        Ok(f(&doc))
    }

    fn write<R>(&self, f: impl FnOnce(&mut Document) -> CoachCalResult<R>) -> CoachCalResult<R> {
        let mut doc = self.lock()?;
        let mut draft = doc.clone();
        let out = f(&mut draft)?;
        *doc = draft;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::OccurrenceStore;
    use crate::todo::{NewTodo, Todo};

    fn todo(title: &str, project: Option<&str>) -> Todo {
        Todo::new(NewTodo {
            title: title.to_string(),
            description: String::new(),
            deadline: None,
            owner_id: "coach".to_string(),
            assigned_to_id: Some("athlete".to_string()),
            project_id: project.map(str::to_string),
        })
    }

    #[test]
    fn test_failed_write_leaves_document_untouched() {
        let store = MemoryStore::new();
        let first = todo("Stretch", None);
        store.insert_todo(first.clone()).unwrap();

        let result: CoachCalResult<()> = store.write(|doc| {
            doc.todos.clear();
            Err(CoachCalError::Store("boom".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(store.get_todo(&first.id).unwrap(), first);
    }

    #[test]
    fn test_find_todos_by_project() {
        let store = MemoryStore::new();
        store.insert_todo(todo("Book gym", Some("strength"))).unwrap();
        store.insert_todo(todo("Buy shoes", None)).unwrap();

        assert_eq!(store.find_todos("athlete", None).unwrap().len(), 2);
        let strength = store.find_todos("athlete", Some("strength")).unwrap();
        assert_eq!(strength.len(), 1);
        assert_eq!(strength[0].title, "Book gym");
        assert!(store.find_todos("stranger", None).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_insert_conflicts() {
        let store = MemoryStore::new();
        let item = todo("Stretch", None);
        store.insert_todo(item.clone()).unwrap();

        assert!(matches!(
            store.insert_todo(item),
            Err(CoachCalError::Conflict(_))
        ));
    }

    #[test]
    fn test_poisoned_lock_is_store_error() {
        let store = MemoryStore::new();
        let _ = std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    let _guard = store.doc.lock().unwrap();
                    panic!("writer died");
                })
                .join()
        });

        assert!(matches!(store.all_tasks(), Err(CoachCalError::Store(_))));
    }
}
