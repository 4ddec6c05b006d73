use std::error::Error;
use std::fmt;

use crate::models::{Book, BookChanges, ErrorMeta, NewBook};
use crate::repo::{BookRepo, StoreError};
use crate::schema::books;
use bb8::Pool;
use diesel::result::DatabaseErrorKind;
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::{
    pooled_connection::{AsyncDieselConnectionManager, PoolError},
    AsyncPgConnection, RunQueryDsl,
};
use tracing::info;
use uuid::Uuid;

pub type DBPool = bb8::Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

pub async fn create_db_pool(connection_string: &str, max_size: u32) -> Result<DBPool, PoolError> {
    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(connection_string);
    let pool = Pool::builder().max_size(max_size).build(config).await?;

    info!("Created DB connection pool with up to {} connections", max_size);

    Ok(pool)
}

#[derive(Debug)]
pub enum DatabaseError {
    PoolError(bb8::RunError<PoolError>),
    ResultError(diesel::result::Error),
}

impl From<bb8::RunError<PoolError>> for DatabaseError {
    fn from(error: bb8::RunError<PoolError>) -> Self {
        DatabaseError::PoolError(error)
    }
}

impl From<diesel::result::Error> for DatabaseError {
    fn from(error: diesel::result::Error) -> Self {
        DatabaseError::ResultError(error)
    }
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::PoolError(e) => {
                write!(f, "problem getting a connection from the connection pool: {e}")
            }
            DatabaseError::ResultError(e) => {
                write!(f, "problem executing a statement against the DB: {e}")
            }
        }
    }
}

impl Error for DatabaseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DatabaseError::PoolError(e) => Some(e),
            DatabaseError::ResultError(e) => Some(e),
        }
    }
}

impl StoreError for DatabaseError {
    fn meta(&self) -> ErrorMeta {
        match self {
            DatabaseError::ResultError(diesel::result::Error::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                info,
            )) => {
                let fields = match (info.column_name(), info.constraint_name()) {
                    (Some(column), _) => vec![column.to_string()],
                    (None, Some(constraint)) => constraint_field(constraint).into_iter().collect(),
                    (None, None) => Vec::new(),
                };
                ErrorMeta::conflict(fields)
            }
            DatabaseError::ResultError(diesel::result::Error::DatabaseError(_, info)) => {
                ErrorMeta::cause(info.message())
            }
            other => ErrorMeta::cause(other.to_string()),
        }
    }
}

/// Recover the column name from a Postgres `<table>_<column>_key` constraint.
fn constraint_field(constraint: &str) -> Option<String> {
    constraint
        .strip_prefix("books_")
        .and_then(|rest| rest.strip_suffix("_key"))
        .filter(|field| !field.is_empty())
        .map(str::to_string)
}

#[derive(Clone)]
pub struct DatabaseBookRepo {
    pool: DBPool,
}

impl DatabaseBookRepo {
    pub fn new(pool: DBPool) -> Self {
        DatabaseBookRepo { pool }
    }
}

impl BookRepo for DatabaseBookRepo {
    type Error = DatabaseError;

    async fn list_books(&self) -> Result<Vec<Book>, DatabaseError> {
        let mut conn = self.pool.get().await?;

        // ids are UUIDv7, so ordering by id is ordering by creation time
        let books = books::table
            .select(Book::as_select())
            .order(books::id.asc())
            .load(&mut conn)
            .await?;

        Ok(books)
    }

    async fn get_book(&self, id: Uuid) -> Result<Option<Book>, DatabaseError> {
        let mut conn = self.pool.get().await?;

        let maybe_book = books::table
            .find(id)
            .select(Book::as_select())
            .first(&mut conn)
            .await
            .optional()?;

        Ok(maybe_book)
    }

    async fn insert_book(&self, new_book: NewBook) -> Result<Book, DatabaseError> {
        let mut conn = self.pool.get().await?;

        let book = Book::from_new(Uuid::now_v7(), new_book);
        let inserted_book = diesel::insert_into(books::table)
            .values(&book)
            .returning(Book::as_returning())
            .get_result(&mut conn)
            .await?;

        Ok(inserted_book)
    }

    async fn update_book(
        &self,
        id: Uuid,
        changes: BookChanges,
    ) -> Result<Option<Book>, DatabaseError> {
        // diesel refuses an empty SET clause
        if changes.is_empty() {
            return self.get_book(id).await;
        }

        let mut conn = self.pool.get().await?;

        let updated_book = diesel::update(books::table.find(id))
            .set(&changes)
            .returning(Book::as_returning())
            .get_result(&mut conn)
            .await
            .optional()?;

        Ok(updated_book)
    }

    async fn delete_book(&self, id: Uuid) -> Result<Option<Book>, DatabaseError> {
        let mut conn = self.pool.get().await?;

        let deleted_book = diesel::delete(books::table.find(id))
            .returning(Book::as_returning())
            .get_result(&mut conn)
            .await
            .optional()?;

        Ok(deleted_book)
    }
}
