use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::rest::{BookApi, ClientError};
use crate::models::Book;

/// Cache key of the book collection.
pub const BOOKS_KEY: &str = "books";

#[derive(Debug, Default)]
struct Entry {
    books: Option<Vec<Book>>,
    stale: bool,
}

/// Last fetched book collection. Reads share one in-flight fetch, and every
/// successful mutation refetches the whole collection.
pub struct BookCache<A> {
    api: Arc<A>,
    entry: Mutex<Entry>,
}

impl<A: BookApi> BookCache<A> {
    pub fn new(api: Arc<A>) -> Self {
        BookCache {
            api,
            entry: Mutex::new(Entry::default()),
        }
    }

    /// Seed the cache, e.g. with a collection rendered by the server.
    pub fn with_initial(api: Arc<A>, books: Vec<Book>) -> Self {
        BookCache {
            api,
            entry: Mutex::new(Entry {
                books: Some(books),
                stale: false,
            }),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// The collection, fetched only if nothing fresh is cached. Callers that
    /// arrive during a fetch wait for it instead of starting their own.
    pub async fn books(&self) -> Result<Vec<Book>, ClientError> {
        let mut entry = self.entry.lock().await;
        if let (Some(books), false) = (&entry.books, entry.stale) {
            return Ok(books.clone());
        }
        self.fetch(&mut entry).await
    }

    /// Whatever is cached right now, fresh or not, without fetching.
    pub async fn snapshot(&self) -> Option<Vec<Book>> {
        self.entry.lock().await.books.clone()
    }

    /// Mark the collection stale and refetch it.
    pub async fn invalidate(&self) -> Result<Vec<Book>, ClientError> {
        let mut entry = self.entry.lock().await;
        entry.stale = true;
        debug!("Invalidated cache key {:?}", BOOKS_KEY);
        self.fetch(&mut entry).await
    }

    /// Run a mutation and invalidate the collection if it succeeds. A failed
    /// refetch is logged; the mutation result is returned either way.
    pub async fn mutate<T>(
        &self,
        mutation: impl Future<Output = Result<T, ClientError>>,
    ) -> Result<T, ClientError> {
        let result = mutation.await?;
        if let Err(err) = self.invalidate().await {
            warn!("Refetching {:?} after a mutation failed: {}", BOOKS_KEY, err);
        }
        Ok(result)
    }

    async fn fetch(&self, entry: &mut Entry) -> Result<Vec<Book>, ClientError> {
        let books = self.api.list().await?;
        debug!("Fetched {} books into cache key {:?}", books.len(), BOOKS_KEY);
        entry.books = Some(books.clone());
        entry.stale = false;
        Ok(books)
    }
}
