//! Client side of the books console: a REST client for the books endpoint,
//! the collection cache, and the controllers behind the editable table and
//! the create dialog.

pub mod cache;
pub mod create_dialog;
pub mod form;
pub mod notify;
pub mod rest;
pub mod table;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::models::Book;
pub use cache::{BookCache, BOOKS_KEY};
pub use create_dialog::{CreateDialog, DialogError};
pub use form::{Field, FieldError, FormValues, InputType};
pub use notify::{LogNotifier, NotificationQueue, Notifier};
pub use rest::{BookApi, ClientError, RestClient};
pub use table::{Action, Cell, EditableTable, RowState, RowView, TableError, COLUMNS};

#[derive(thiserror::Error, Debug)]
pub enum ConsoleError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Dialog(#[from] DialogError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Runs the network side of every table and dialog transition. Mutations go
/// through the cache, so each success refetches the collection.
pub struct Console<A, N> {
    cache: BookCache<A>,
    notifier: N,
    table: EditableTable,
    dialog: CreateDialog,
}

impl<A: BookApi, N: Notifier> Console<A, N> {
    pub fn new(api: A, notifier: N) -> Self {
        Self::from_cache(BookCache::new(Arc::new(api)), notifier)
    }

    /// Start from a collection the caller already has.
    pub fn with_initial(api: A, notifier: N, books: Vec<Book>) -> Self {
        Self::from_cache(BookCache::with_initial(Arc::new(api), books), notifier)
    }

    fn from_cache(cache: BookCache<A>, notifier: N) -> Self {
        Console {
            cache,
            notifier,
            table: EditableTable::new(),
            dialog: CreateDialog::new(),
        }
    }

    pub fn table(&self) -> &EditableTable {
        &self.table
    }

    pub fn dialog(&self) -> &CreateDialog {
        &self.dialog
    }

    pub fn cache(&self) -> &BookCache<A> {
        &self.cache
    }

    pub async fn books(&self) -> Result<Vec<Book>, ClientError> {
        self.cache.books().await
    }

    pub async fn rows(&self) -> Result<Vec<RowView>, ClientError> {
        Ok(self.table.rows(&self.books().await?))
    }

    pub fn open_create(&mut self) {
        self.dialog.open();
    }

    pub fn cancel_create(&mut self) {
        self.dialog.cancel();
    }

    pub fn set_create_field(&mut self, field: Field, raw: &str) {
        self.dialog.set_field(field, raw);
    }

    pub async fn submit_create(&mut self) -> Result<Book, ConsoleError> {
        let new_book = self.dialog.begin_submit()?;

        let result = self.cache.mutate(self.cache.api().create(&new_book)).await;
        self.dialog.finish_submit(result.is_ok());

        match result {
            Ok(book) => {
                info!("Created book {}", book.id);
                Ok(book)
            }
            Err(err) => {
                self.report_failure("create", &err);
                Err(err.into())
            }
        }
    }

    pub fn edit(&mut self, book: &Book) -> Result<(), TableError> {
        self.table.edit(book)
    }

    pub fn set_edit_field(&mut self, field: Field, raw: &str) -> Result<(), TableError> {
        self.table.set_field(field, raw)
    }

    pub fn cancel_edit(&mut self) -> bool {
        self.table.cancel()
    }

    /// The row only leaves edit mode once the server has accepted the update.
    pub async fn save(&mut self, id: Uuid) -> Result<Book, ConsoleError> {
        let update = self.table.begin_save(id)?;

        match self.cache.mutate(self.cache.api().update(&update)).await {
            Ok(book) => {
                self.table.finish_save(id, Ok(()));
                info!("Updated book {}", id);
                Ok(book)
            }
            Err(err) => {
                let message = self.report_failure("update", &err);
                self.table.finish_save(id, Err(message));
                Err(err.into())
            }
        }
    }

    pub async fn delete(&mut self, id: Uuid) -> Result<Book, ConsoleError> {
        self.table.begin_delete()?;

        match self.cache.mutate(self.cache.api().delete(id)).await {
            Ok(book) => {
                info!("Deleted book {}", id);
                Ok(book)
            }
            Err(err) => {
                self.report_failure("delete", &err);
                Err(err.into())
            }
        }
    }

    /// Notify the user: one message per conflicting field, or a generic one.
    /// Returns the text shown, for use as an inline error.
    fn report_failure(&self, action: &str, err: &ClientError) -> String {
        warn!("Failed to {} book: {}", action, err);

        let fields = err.conflict_fields();
        let messages: Vec<String> = if fields.is_empty() {
            vec![format!("Failed to {action} the book")]
        } else {
            fields
                .iter()
                .map(|field| format!("Book with the same {field} already exists"))
                .collect()
        };

        for message in &messages {
            self.notifier.error(message);
        }
        messages.join("; ")
    }
}
