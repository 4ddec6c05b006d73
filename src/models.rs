use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::books;

#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    diesel::Queryable,
    diesel::Selectable,
    diesel::Insertable,
)]
#[diesel(table_name = books)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Book {
    pub id: Uuid,
    pub email: String,
    pub url: String,
    pub tel: String,
    pub color: String,
    pub okey: String,
    pub city: String,
    pub author: String,
    pub date_of_creation: NaiveDate,
    pub age: i32,
    pub number_of_pages: i32,
    pub number_of_chapters: i32,
    pub number_of_published_books: i32,
}

impl Book {
    pub fn from_new(id: Uuid, new_book: NewBook) -> Self {
        Book {
            id,
            email: new_book.email,
            url: new_book.url,
            tel: new_book.tel,
            color: new_book.color,
            okey: new_book.okey,
            city: new_book.city,
            author: new_book.author,
            date_of_creation: new_book.date_of_creation,
            age: new_book.age,
            number_of_pages: new_book.number_of_pages,
            number_of_chapters: new_book.number_of_chapters,
            number_of_published_books: new_book.number_of_published_books,
        }
    }
}

/// A complete Book minus the server-assigned `id`, as submitted on create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub email: String,
    pub url: String,
    pub tel: String,
    pub color: String,
    pub okey: String,
    pub city: String,
    pub author: String,
    pub date_of_creation: NaiveDate,
    pub age: i32,
    pub number_of_pages: i32,
    pub number_of_chapters: i32,
    pub number_of_published_books: i32,
}

/// Any subset of Book attributes. `None` fields are left untouched on update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, diesel::AsChangeset)]
#[diesel(table_name = books)]
pub struct BookChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub okey: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_creation: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_pages: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_chapters: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_published_books: Option<i32>,
}

impl BookChanges {
    pub fn is_empty(&self) -> bool {
        *self == BookChanges::default()
    }

    /// Merge the supplied attributes into `book`.
    pub fn apply_to(&self, book: &mut Book) {
        fn merge<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *slot = value.clone();
            }
        }

        merge(&mut book.email, &self.email);
        merge(&mut book.url, &self.url);
        merge(&mut book.tel, &self.tel);
        merge(&mut book.color, &self.color);
        merge(&mut book.okey, &self.okey);
        merge(&mut book.city, &self.city);
        merge(&mut book.author, &self.author);
        merge(&mut book.date_of_creation, &self.date_of_creation);
        merge(&mut book.age, &self.age);
        merge(&mut book.number_of_pages, &self.number_of_pages);
        merge(&mut book.number_of_chapters, &self.number_of_chapters);
        merge(
            &mut book.number_of_published_books,
            &self.number_of_published_books,
        );
    }
}

/// Body of a PUT request: the target `id` plus the attributes to replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookUpdate {
    pub id: Uuid,
    #[serde(flatten)]
    pub changes: BookChanges,
}

/// Store-provided details about a failure, merged into the error body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMeta {
    /// Fields whose uniqueness constraint was violated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl ErrorMeta {
    pub fn conflict(fields: Vec<String>) -> Self {
        ErrorMeta {
            target: Some(fields),
            cause: None,
        }
    }

    pub fn cause(cause: impl Into<String>) -> Self {
        ErrorMeta {
            target: None,
            cause: Some(cause.into()),
        }
    }
}

/// JSON body of every 4xx response from the books endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(flatten)]
    pub meta: ErrorMeta,
}
