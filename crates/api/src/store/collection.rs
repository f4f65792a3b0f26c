//! Generic JSON-file-backed collection.
//!
//! Each collection is one pretty-printed JSON file holding its records plus
//! a persisted `nextId` counter. Reads are served from memory; writes build
//! the new state, persist it atomically (tmp file + rename), and only then
//! commit it to memory. The in-memory state therefore always matches the
//! last state that reached disk.
//!
//! One async mutex guards each collection. Id allocation and uniqueness
//! checks happen inside that critical section, so two concurrent inserts can
//! neither observe the same counter value nor both pass a uniqueness check.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::StoreError;

/// A named collection of records persisted as a single JSON file.
#[derive(Debug)]
pub struct Collection<T> {
    name: &'static str,
    path: PathBuf,
    state: Mutex<CollectionState<T>>,
}

/// The persisted shape of a collection: records plus the id counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollectionState<T> {
    next_id: i64,
    records: Vec<T>,
}

impl<T> CollectionState<T> {
    const fn empty() -> Self {
        Self {
            next_id: 1,
            records: Vec::new(),
        }
    }

    /// Hand out the next id and advance the counter.
    ///
    /// Counter values are monotonic and never revisited, so ids stay unique
    /// for the lifetime of the store even after records are deleted.
    fn allocate(&mut self, collection: &'static str) -> Result<i64, StoreError> {
        let id = self.next_id;
        self.next_id = id
            .checked_add(1)
            .ok_or(StoreError::IdsExhausted { collection })?;
        Ok(id)
    }
}

impl<T> Collection<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    /// Open a collection file under `dir`, creating an empty collection in
    /// memory if the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DataCorruption` if an existing file does not
    /// parse, or `StoreError::Unavailable` if it cannot be read.
    pub async fn open(dir: &Path, name: &'static str) -> Result<Self, StoreError> {
        let path = dir.join(format!("{name}.json"));

        let state = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                StoreError::DataCorruption(format!("invalid JSON in {name} collection: {e}"))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => CollectionState::empty(),
            Err(e) => return Err(StoreError::Unavailable(e)),
        };

        Ok(Self {
            name,
            path,
            state: Mutex::new(state),
        })
    }

    /// Insert a record built from a freshly allocated id.
    ///
    /// The id allocation, record construction, and persist all happen inside
    /// the collection's critical section.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the new state cannot be persisted;
    /// in that case nothing is committed.
    pub async fn insert_with<F>(&self, build: F) -> Result<T, StoreError>
    where
        F: FnOnce(i64) -> T,
    {
        let mut state = self.state.lock().await;

        let mut draft = state.clone();
        let id = draft.allocate(self.name)?;
        let record = build(id);
        draft.records.push(record.clone());

        self.persist(&draft).await?;
        *state = draft;

        Ok(record)
    }

    /// Insert a record, first checking that no existing record matches
    /// `taken`. The check and the insert share one critical section, so of
    /// two concurrent inserts with the same key exactly one wins.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` with `conflict` as the description if
    /// an existing record matches `taken`.
    pub async fn insert_unique_with<P, F>(
        &self,
        taken: P,
        conflict: &str,
        build: F,
    ) -> Result<T, StoreError>
    where
        P: Fn(&T) -> bool,
        F: FnOnce(i64) -> T,
    {
        let mut state = self.state.lock().await;

        if state.records.iter().any(|r| taken(r)) {
            return Err(StoreError::Conflict(conflict.to_owned()));
        }

        let mut draft = state.clone();
        let id = draft.allocate(self.name)?;
        let record = build(id);
        draft.records.push(record.clone());

        self.persist(&draft).await?;
        *state = draft;

        Ok(record)
    }

    /// Find the first record matching the predicate.
    pub async fn find<P>(&self, pred: P) -> Option<T>
    where
        P: Fn(&T) -> bool,
    {
        let state = self.state.lock().await;
        state.records.iter().find(|r| pred(r)).cloned()
    }

    /// Snapshot of every record in insertion order.
    pub async fn all(&self) -> Vec<T> {
        self.state.lock().await.records.clone()
    }

    /// Number of stored records.
    pub async fn count(&self) -> usize {
        self.state.lock().await.records.len()
    }

    /// Remove every record matching the predicate and persist the result.
    /// Removed records do not free their ids.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the new state cannot be
    /// persisted; in that case nothing is removed.
    pub async fn remove_where<P>(&self, pred: P) -> Result<usize, StoreError>
    where
        P: Fn(&T) -> bool,
    {
        let mut state = self.state.lock().await;

        let mut draft = state.clone();
        let before = draft.records.len();
        draft.records.retain(|r| !pred(r));
        let removed = before - draft.records.len();
        if removed == 0 {
            return Ok(0);
        }

        self.persist(&draft).await?;
        *state = draft;

        Ok(removed)
    }

    /// Write the current in-memory state to disk.
    ///
    /// Normally writes happen as part of inserts and removals; this exists so
    /// a freshly opened collection can materialize its file.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the state cannot be persisted.
    pub async fn flush(&self) -> Result<(), StoreError> {
        let state = self.state.lock().await;
        self.persist(&state).await
    }

    /// Persist a state atomically: write a sibling tmp file, fsync, rename
    /// over the target. A crash mid-write never leaves a truncated
    /// collection behind.
    async fn persist(&self, state: &CollectionState<T>) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(state).map_err(|e| {
            StoreError::DataCorruption(format!("cannot encode {} collection: {e}", self.name))
        })?;

        let tmp = self.path.with_extension("json.tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&json).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct Note {
        id: i64,
        title: String,
    }

    fn note(id: i64, title: &str) -> Note {
        Note {
            id,
            title: title.to_owned(),
        }
    }

    async fn open_notes(dir: &Path) -> Collection<Note> {
        Collection::open(dir, "notes").await.unwrap()
    }

    #[tokio::test]
    async fn open_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let notes = open_notes(dir.path()).await;

        assert_eq!(notes.count().await, 0);
        assert!(notes.all().await.is_empty());
    }

    #[tokio::test]
    async fn insert_allocates_sequential_ids() {
        let dir = tempfile::tempdir().unwrap();
        let notes = open_notes(dir.path()).await;

        let first = notes.insert_with(|id| note(id, "first")).await.unwrap();
        let second = notes.insert_with(|id| note(id, "second")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(notes.count().await, 2);
    }

    #[tokio::test]
    async fn state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        {
            let notes = open_notes(dir.path()).await;
            notes.insert_with(|id| note(id, "persisted")).await.unwrap();
        }

        let reopened = open_notes(dir.path()).await;
        assert_eq!(reopened.count().await, 1);
        assert_eq!(
            reopened.find(|n| n.title == "persisted").await.unwrap().id,
            1
        );

        // The counter is part of the persisted state, not derived from records.
        let next = reopened.insert_with(|id| note(id, "after")).await.unwrap();
        assert_eq!(next.id, 2);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_removal() {
        let dir = tempfile::tempdir().unwrap();
        let notes = open_notes(dir.path()).await;

        notes.insert_with(|id| note(id, "a")).await.unwrap();
        let b = notes.insert_with(|id| note(id, "b")).await.unwrap();
        assert_eq!(notes.remove_where(|n| n.id == b.id).await.unwrap(), 1);

        let c = notes.insert_with(|id| note(id, "c")).await.unwrap();
        assert_eq!(c.id, 3);
    }

    #[tokio::test]
    async fn unique_insert_rejects_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let notes = open_notes(dir.path()).await;

        notes
            .insert_unique_with(|n| n.title == "solo", "title taken", |id| note(id, "solo"))
            .await
            .unwrap();

        let err = notes
            .insert_unique_with(|n| n.title == "solo", "title taken", |id| note(id, "solo"))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Conflict(msg) if msg == "title taken"));
        assert_eq!(notes.count().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_inserts_allocate_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        let notes = Arc::new(open_notes(dir.path()).await);

        let mut handles = Vec::new();
        for i in 0..16 {
            let notes = Arc::clone(&notes);
            handles.push(tokio::spawn(async move {
                notes
                    .insert_with(|id| note(id, &format!("note-{i}")))
                    .await
                    .unwrap()
                    .id
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }

        ids.sort_unstable();
        let expected: Vec<i64> = (1..=16).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn failed_persist_commits_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let notes = open_notes(dir.path()).await;

        notes.insert_with(|id| note(id, "kept")).await.unwrap();

        // Occupy the tmp path with a directory so the next write fails.
        std::fs::create_dir(dir.path().join("notes.json.tmp")).unwrap();

        let err = notes
            .insert_with(|id| note(id, "lost"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));

        // Memory still matches the last persisted state, and the failed
        // insert did not burn an id.
        assert_eq!(notes.count().await, 1);
        std::fs::remove_dir(dir.path().join("notes.json.tmp")).unwrap();
        let retry = notes.insert_with(|id| note(id, "retry")).await.unwrap();
        assert_eq!(retry.id, 2);
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.json"), b"{not json").unwrap();

        let err = Collection::<Note>::open(dir.path(), "notes")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DataCorruption(_)));
    }

    #[tokio::test]
    async fn flush_materializes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let notes = open_notes(dir.path()).await;

        assert!(!dir.path().join("notes.json").exists());
        notes.flush().await.unwrap();
        assert!(dir.path().join("notes.json").exists());
    }
}
