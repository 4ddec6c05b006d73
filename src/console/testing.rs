use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use reqwest::StatusCode;
use uuid::Uuid;

use super::rest::{BookApi, ClientError};
use crate::memory::InMemoryBookRepo;
use crate::models::{Book, BookUpdate, ErrorBody, ErrorMeta, NewBook};
use crate::repo::{BookRepo, StoreError};

/// `BookApi` over an in-memory store, answering the way the server would.
#[derive(Default)]
pub(crate) struct FakeApi {
    repo: InMemoryBookRepo,
    latency: Duration,
    list_calls: AtomicUsize,
    offline: AtomicBool,
}

impl FakeApi {
    pub(crate) fn with_latency(latency: Duration) -> Self {
        FakeApi {
            latency,
            ..FakeApi::default()
        }
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Remove a book behind the client's back, as another session would.
    pub(crate) async fn delete_elsewhere(&self, id: Uuid) {
        self.repo.delete_book(id).await.unwrap();
    }

    fn check_online(&self) -> Result<(), ClientError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ClientError::Rejected {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: ErrorBody {
                    message: "offline".to_string(),
                    meta: ErrorMeta::default(),
                },
            });
        }
        Ok(())
    }
}

fn rejected(meta: ErrorMeta) -> ClientError {
    ClientError::Rejected {
        status: StatusCode::BAD_REQUEST,
        body: ErrorBody {
            message: "Something went wrong".to_string(),
            meta,
        },
    }
}

fn store_failure<E: StoreError>(err: E) -> ClientError {
    rejected(err.meta())
}

impl BookApi for FakeApi {
    async fn list(&self) -> Result<Vec<Book>, ClientError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.check_online()?;
        self.repo.list_books().await.map_err(store_failure)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Book>, ClientError> {
        self.check_online()?;
        self.repo.get_book(id).await.map_err(store_failure)
    }

    async fn create(&self, book: &NewBook) -> Result<Book, ClientError> {
        self.check_online()?;
        self.repo.insert_book(book.clone()).await.map_err(store_failure)
    }

    async fn update(&self, update: &BookUpdate) -> Result<Book, ClientError> {
        self.check_online()?;
        self.repo
            .update_book(update.id, update.changes.clone())
            .await
            .map_err(store_failure)?
            .ok_or_else(|| rejected(ErrorMeta::cause("Record to update not found.")))
    }

    async fn delete(&self, id: Uuid) -> Result<Book, ClientError> {
        self.check_online()?;
        self.repo
            .delete_book(id)
            .await
            .map_err(store_failure)?
            .ok_or_else(|| rejected(ErrorMeta::cause("Record to delete does not exist.")))
    }
}
