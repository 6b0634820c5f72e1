//! Scripted `JobApi` for driving the tracker without a server.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;

use docsearch_upload::api::{ApiError, CreateJobResponse, JobApi, JobStatusResponse};
use docsearch_upload::{Job, JobStore, UploadFile};

/// Answers create calls in order and status calls per job id.
///
/// A status script repeats its last entry once exhausted. Unscripted ids
/// answer 404.
#[derive(Default)]
pub struct FakeApi {
    creates: Mutex<VecDeque<Result<CreateJobResponse, ApiError>>>,
    statuses: Mutex<HashMap<u64, VecDeque<Result<JobStatusResponse, ApiError>>>>,
    fetch_calls: Mutex<Vec<u64>>,
    uploaded: Mutex<Vec<String>>,
    fetch_delay: Mutex<Option<Duration>>,
    observed: OnceLock<Arc<JobStore>>,
    seen_during_create: Mutex<Vec<Vec<Job>>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on_create(&self, reply: Result<CreateJobResponse, ApiError>) {
        self.creates.lock().unwrap().push_back(reply);
    }

    pub fn on_status(&self, id: u64, replies: Vec<Result<JobStatusResponse, ApiError>>) {
        self.statuses
            .lock()
            .unwrap()
            .insert(id, replies.into_iter().collect());
    }

    /// Makes every status fetch take `delay` before answering.
    pub fn delay_fetches(&self, delay: Duration) {
        *self.fetch_delay.lock().unwrap() = Some(delay);
    }

    /// Records the store contents at the start of each create call.
    pub fn observe(&self, store: Arc<JobStore>) {
        let _ = self.observed.set(store);
    }

    pub fn seen_during_create(&self) -> Vec<Vec<Job>> {
        self.seen_during_create.lock().unwrap().clone()
    }

    pub fn uploaded(&self) -> Vec<String> {
        self.uploaded.lock().unwrap().clone()
    }

    pub fn fetches_for(&self, id: u64) -> usize {
        self.fetch_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|&&c| c == id)
            .count()
    }

    pub fn total_fetches(&self) -> usize {
        self.fetch_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl JobApi for FakeApi {
    async fn create_job(&self, file: &UploadFile) -> Result<CreateJobResponse, ApiError> {
        if let Some(store) = self.observed.get() {
            self.seen_during_create
                .lock()
                .unwrap()
                .push(store.snapshot().to_vec());
        }
        self.uploaded.lock().unwrap().push(file.filename.clone());
        self.creates
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Network("no create scripted".to_string())))
    }

    async fn fetch_job(&self, id: u64) -> Result<JobStatusResponse, ApiError> {
        self.fetch_calls.lock().unwrap().push(id);

        let delay = *self.fetch_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut statuses = self.statuses.lock().unwrap();
        let Some(script) = statuses.get_mut(&id) else {
            return Err(ApiError::Http {
                status: 404,
                detail: Some("Not Found".to_string()),
            });
        };
        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script.front().cloned().unwrap()
        }
    }
}
