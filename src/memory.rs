use std::sync::{Arc, Mutex, MutexGuard};

use tracing::info;
use uuid::Uuid;

use crate::models::{Book, BookChanges, ErrorMeta, NewBook};
use crate::repo::{BookRepo, StoreError};

#[derive(thiserror::Error, Debug)]
pub enum MemoryStoreError {
    #[error("a book with the same {0} already exists")]
    UniqueViolation(&'static str),

    #[error("{0} must not be negative")]
    Negative(&'static str),

    #[error("in-memory store lock was poisoned")]
    Poisoned,
}

impl StoreError for MemoryStoreError {
    fn meta(&self) -> ErrorMeta {
        match self {
            MemoryStoreError::UniqueViolation(field) => {
                ErrorMeta::conflict(vec![field.to_string()])
            }
            other => ErrorMeta::cause(other.to_string()),
        }
    }
}

/// Process-local book store with the same uniqueness and range rules as the
/// Postgres schema. Books are kept in creation order.
#[derive(Clone, Default)]
pub struct InMemoryBookRepo {
    books: Arc<Mutex<Vec<Book>>>,
}

impl InMemoryBookRepo {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Book>>, MemoryStoreError> {
        self.books.lock().map_err(|_| MemoryStoreError::Poisoned)
    }
}

fn check_constraints(books: &[Book], candidate: &Book) -> Result<(), MemoryStoreError> {
    if books
        .iter()
        .any(|book| book.id != candidate.id && book.email == candidate.email)
    {
        return Err(MemoryStoreError::UniqueViolation("email"));
    }

    let counts = [
        ("age", candidate.age),
        ("number_of_pages", candidate.number_of_pages),
        ("number_of_chapters", candidate.number_of_chapters),
        ("number_of_published_books", candidate.number_of_published_books),
    ];
    match counts.iter().find(|(_, value)| *value < 0) {
        Some((field, _)) => Err(MemoryStoreError::Negative(*field)),
        None => Ok(()),
    }
}

impl BookRepo for InMemoryBookRepo {
    type Error = MemoryStoreError;

    async fn list_books(&self) -> Result<Vec<Book>, MemoryStoreError> {
        Ok(self.lock()?.clone())
    }

    async fn get_book(&self, id: Uuid) -> Result<Option<Book>, MemoryStoreError> {
        Ok(self.lock()?.iter().find(|book| book.id == id).cloned())
    }

    async fn insert_book(&self, new_book: NewBook) -> Result<Book, MemoryStoreError> {
        let mut books = self.lock()?;

        let book = Book::from_new(Uuid::now_v7(), new_book);
        check_constraints(&books, &book)?;
        books.push(book.clone());

        info!("Stored book {} in memory ({} total)", book.id, books.len());

        Ok(book)
    }

    async fn update_book(
        &self,
        id: Uuid,
        changes: BookChanges,
    ) -> Result<Option<Book>, MemoryStoreError> {
        let mut books = self.lock()?;

        let Some(index) = books.iter().position(|book| book.id == id) else {
            return Ok(None);
        };

        let mut updated = books[index].clone();
        changes.apply_to(&mut updated);
        check_constraints(&books, &updated)?;
        books[index] = updated.clone();

        Ok(Some(updated))
    }

    async fn delete_book(&self, id: Uuid) -> Result<Option<Book>, MemoryStoreError> {
        let mut books = self.lock()?;

        Ok(books
            .iter()
            .position(|book| book.id == id)
            .map(|index| books.remove(index)))
    }
}
