use crate::models::{Book, BookChanges, ErrorMeta, NewBook};
use std::error::Error;
use std::future::Future;
use uuid::Uuid;

/// A failure raised by a [`BookRepo`].
pub trait StoreError: Error + Send + Sync + 'static {
    /// Details merged into the error response, e.g. the fields of a violated
    /// uniqueness constraint.
    fn meta(&self) -> ErrorMeta;
}

pub trait BookRepo: Clone + Send + Sync + 'static {
    type Error: StoreError;

    /// All books, in creation order
    fn list_books(&self) -> impl Future<Output = Result<Vec<Book>, Self::Error>> + Send;

    fn get_book(&self, id: Uuid) -> impl Future<Output = Result<Option<Book>, Self::Error>> + Send;

    /// Assigns a fresh id and stores the book
    fn insert_book(&self, new_book: NewBook)
        -> impl Future<Output = Result<Book, Self::Error>> + Send;

    /// Returns `None` if no book has the given id
    fn update_book(
        &self,
        id: Uuid,
        changes: BookChanges,
    ) -> impl Future<Output = Result<Option<Book>, Self::Error>> + Send;

    /// Returns the deleted book, or `None` if it did not exist
    fn delete_book(&self, id: Uuid)
        -> impl Future<Output = Result<Option<Book>, Self::Error>> + Send;
}
