//! In-memory job store, newest first.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::watch;

use crate::job::model::{Job, JobId, JobPatch};

/// Immutable view of the job list at one revision.
pub type JobSnapshot = Arc<Vec<Job>>;

/// Ordered job list that every view renders from.
///
/// Mutation goes through `append`, `update_by_id` and `merge_batch` only.
/// Each effective write swaps in a new list and bumps the revision once, so
/// readers always see a whole state and subscribers wake once per write.
pub struct JobStore {
    jobs: RwLock<JobSnapshot>,
    revision: watch::Sender<u64>,
}

impl JobStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            jobs: RwLock::new(Arc::new(Vec::new())),
            revision,
        }
    }

    fn read_jobs(&self) -> RwLockReadGuard<'_, JobSnapshot> {
        match self.jobs.read() {
            Ok(g) => g,
            Err(poisoned) => {
                log::warn!("Job store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write_jobs(&self) -> RwLockWriteGuard<'_, JobSnapshot> {
        match self.jobs.write() {
            Ok(g) => g,
            Err(poisoned) => {
                log::warn!("Job store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    // ─── Mutation ───────────────────────────────────────────────────────────

    /// Puts a new job at the front of the list.
    ///
    /// Returns false, leaving the store untouched, if a job with the same id
    /// already exists.
    pub fn append(&self, job: Job) -> bool {
        let mut guard = self.write_jobs();
        if guard.iter().any(|existing| existing.id == job.id) {
            log::warn!("Refusing to append duplicate job id {}", job.id);
            return false;
        }

        Arc::make_mut(&mut *guard).insert(0, job);
        drop(guard);
        self.bump();
        true
    }

    /// Replaces the job with `id` by `updater(job)`.
    ///
    /// Returns false if no job currently has that id. An update that yields
    /// an identical record is not a write.
    pub fn update_by_id<F>(&self, id: &JobId, updater: F) -> bool
    where
        F: FnOnce(&Job) -> Job,
    {
        let mut guard = self.write_jobs();
        let Some(pos) = guard.iter().position(|job| &job.id == id) else {
            log::debug!("update_by_id: job {} not found", id);
            return false;
        };

        let updated = updater(&guard[pos]);
        if updated == guard[pos] {
            return true;
        }

        Arc::make_mut(&mut *guard)[pos] = updated;
        drop(guard);
        self.bump();
        true
    }

    /// Applies server patches keyed by assigned id as one transition.
    ///
    /// Jobs missing from `patches` are untouched. Returns whether anything
    /// changed; when nothing does, no write or notification happens.
    pub fn merge_batch(&self, patches: &HashMap<u64, JobPatch>) -> bool {
        if patches.is_empty() {
            return false;
        }

        let mut guard = self.write_jobs();
        let changes: Vec<(usize, Job)> = guard
            .iter()
            .enumerate()
            .filter_map(|(pos, job)| {
                let patch = patches.get(&job.id.assigned()?)?;
                job.merged(patch).map(|merged| (pos, merged))
            })
            .collect();

        if changes.is_empty() {
            return false;
        }

        let jobs = Arc::make_mut(&mut *guard);
        for (pos, merged) in changes {
            jobs[pos] = merged;
        }
        drop(guard);
        self.bump();
        true
    }

    // ─── Reads ──────────────────────────────────────────────────────────────

    /// Snapshot of the full ordered list.
    pub fn snapshot(&self) -> JobSnapshot {
        Arc::clone(&self.read_jobs())
    }

    /// Looks up a job by its current id.
    pub fn get(&self, id: &JobId) -> Option<Job> {
        self.read_jobs().iter().find(|job| &job.id == id).cloned()
    }

    /// Assigned ids of all jobs that still need polling, newest first.
    pub fn eligible_ids(&self) -> Vec<u64> {
        self.read_jobs()
            .iter()
            .filter(|job| job.is_pollable())
            .filter_map(|job| job.id.assigned())
            .collect()
    }

    pub fn has_eligible(&self) -> bool {
        self.read_jobs().iter().any(Job::is_pollable)
    }

    /// True while any job, temporary or not, is unfinished.
    pub fn has_unfinished(&self) -> bool {
        self.read_jobs().iter().any(|job| !job.is_finished())
    }

    pub fn len(&self) -> usize {
        self.read_jobs().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_jobs().is_empty()
    }

    /// Current revision; increases by one per effective write.
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Subscribes to revision changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::model::JobStatus;

    fn pending(store: &JobStore, temp: &str, id: u64) {
        store.append(Job::uploading(temp, format!("{}.pdf", id)));
        store.update_by_id(&JobId::Temporary(temp.into()), |job| {
            job.promoted(id, JobStatus::Pending)
        });
    }

    fn patch(status: &str) -> JobPatch {
        JobPatch {
            status: Some(JobStatus::parse(status)),
            ..Default::default()
        }
    }

    #[test]
    fn test_append_is_newest_first() {
        let store = JobStore::new();
        store.append(Job::uploading("a", "a.pdf"));
        store.append(Job::uploading("b", "b.pdf"));

        let jobs = store.snapshot();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].filename, "b.pdf");
        assert_eq!(jobs[1].filename, "a.pdf");
        assert_eq!(store.revision(), 2);
    }

    #[test]
    fn test_append_rejects_duplicate_id() {
        let store = JobStore::new();
        assert!(store.append(Job::uploading("a", "a.pdf")));
        assert!(!store.append(Job::uploading("a", "other.pdf")));
        assert_eq!(store.len(), 1);
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn test_update_by_id_missing_is_noop() {
        let store = JobStore::new();
        store.append(Job::uploading("a", "a.pdf"));
        let rev = store.revision();

        let found = store.update_by_id(&JobId::Assigned(7), |job| job.failed("x"));
        assert!(!found);
        assert_eq!(store.revision(), rev);
    }

    #[test]
    fn test_update_by_id_promotes_in_place() {
        let store = JobStore::new();
        store.append(Job::uploading("a", "a.pdf"));
        store.append(Job::uploading("b", "b.pdf"));

        store.update_by_id(&JobId::Temporary("a".into()), |job| {
            job.promoted(42, JobStatus::Pending)
        });

        let jobs = store.snapshot();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[1].id, JobId::Assigned(42));
        assert!(store.get(&JobId::Temporary("a".into())).is_none());
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_writes() {
        let store = JobStore::new();
        store.append(Job::uploading("a", "a.pdf"));
        let before = store.snapshot();

        store.update_by_id(&JobId::Temporary("a".into()), |job| job.failed("boom"));

        assert_eq!(before[0].status, JobStatus::Uploading);
        assert_eq!(store.snapshot()[0].status, JobStatus::Failed);
    }

    #[test]
    fn test_eligible_ids_only_assigned_unfinished() {
        let store = JobStore::new();
        pending(&store, "a", 42);
        pending(&store, "b", 43);
        store.append(Job::uploading("c", "c.pdf"));
        store.merge_batch(&HashMap::from([(43, patch("completed"))]));

        assert_eq!(store.eligible_ids(), vec![42]);
        assert!(store.has_eligible());
        assert!(store.has_unfinished());
    }

    #[test]
    fn test_merge_batch_skips_unchanged() {
        let store = JobStore::new();
        pending(&store, "a", 42);

        assert!(store.merge_batch(&HashMap::from([(42, patch("processing"))])));
        let rev = store.revision();

        assert!(!store.merge_batch(&HashMap::from([(42, patch("processing"))])));
        assert_eq!(store.revision(), rev);
    }

    #[test]
    fn test_merge_batch_leaves_absent_jobs_untouched() {
        let store = JobStore::new();
        pending(&store, "a", 42);
        pending(&store, "b", 43);
        let before = store.get(&JobId::Assigned(43)).unwrap();

        store.merge_batch(&HashMap::from([(42, patch("completed"))]));

        assert_eq!(store.get(&JobId::Assigned(43)).unwrap(), before);
        assert_eq!(
            store.get(&JobId::Assigned(42)).unwrap().status,
            JobStatus::Completed
        );
    }

    #[test]
    fn test_merge_batch_is_one_revision() {
        let store = JobStore::new();
        pending(&store, "a", 42);
        pending(&store, "b", 43);
        let rev = store.revision();

        store.merge_batch(&HashMap::from([
            (42, patch("processing")),
            (43, patch("completed")),
        ]));

        assert_eq!(store.revision(), rev + 1);
    }

    #[tokio::test]
    async fn test_subscribe_sees_writes() {
        let store = JobStore::new();
        let mut rx = store.subscribe();

        store.append(Job::uploading("a", "a.pdf"));

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 1);
    }
}
