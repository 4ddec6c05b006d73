//! Editable table: which row is open for editing, the values in its inputs,
//! and the render model of every row.

use tracing::debug;
use uuid::Uuid;

use super::form::{Field, FieldError, FormValues, InputType};
use super::notify::DIAGNOSTIC_TARGET;
use crate::models::{Book, BookUpdate};

/// Characters of the access key shown before it is cut off.
const KEY_PREVIEW_LEN: usize = 20;

/// At most one row is ever open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowState {
    #[default]
    Idle,
    Editing(Uuid),
    /// The update for this row has been sent and not yet answered.
    Saving(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub field: Field,
    pub title: &'static str,
    pub width: &'static str,
}

pub const COLUMNS: [Column; 11] = [
    column(Field::Email, "email", "200px"),
    column(Field::Tel, "Phone", "200px"),
    column(Field::Color, "Color", "150px"),
    column(Field::Age, "age", "100px"),
    column(Field::Okey, "Key", "200px"),
    column(Field::City, "City", "100px"),
    column(Field::Author, "Author", "200px"),
    column(Field::NumberOfPages, "pages", "100px"),
    column(Field::NumberOfChapters, "chapters", "100px"),
    column(Field::NumberOfPublishedBooks, "copies", "100px"),
    column(Field::DateOfCreation, "date of creation", "200px"),
];

const fn column(field: Field, title: &'static str, width: &'static str) -> Column {
    Column {
        field,
        title,
        width,
    }
}

impl Column {
    /// Dates are read-only once set.
    pub fn editable(&self) -> bool {
        self.field.input_type() != InputType::Date
    }
}

/// Fields submitted when an edited row is saved.
fn editable_fields() -> Vec<Field> {
    COLUMNS
        .iter()
        .filter(|column| column.editable())
        .map(|column| column.field)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    /// Links to the record's own page
    Link { text: String, href: String },
    Input {
        field: Field,
        input_type: InputType,
        value: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Edit,
    Delete,
    Save,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionLink {
    pub action: Action,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub id: Uuid,
    pub cells: Vec<Cell>,
    pub actions: Vec<ActionLink>,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum TableError {
    #[error("row {0} is already being edited or saved")]
    RowBusy(Uuid),

    #[error("row {0} is not being edited")]
    NotEditing(Uuid),

    #[error("no row is being edited")]
    NoOpenRow,

    #[error("{0} cannot be edited")]
    ReadOnly(&'static str),

    #[error("{} field(s) failed validation", .0.len())]
    Invalid(Vec<FieldError>),
}

#[derive(Debug, Default)]
pub struct EditableTable {
    state: RowState,
    form: FormValues,
    error: Option<String>,
}

impl EditableTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RowState {
        self.state
    }

    /// Why the last save of the open row failed, if it did.
    pub fn inline_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn form(&self) -> &FormValues {
        &self.form
    }

    fn open_row(&self) -> Option<Uuid> {
        match self.state {
            RowState::Idle => None,
            RowState::Editing(id) | RowState::Saving(id) => Some(id),
        }
    }

    pub fn edit(&mut self, book: &Book) -> Result<(), TableError> {
        if let Some(open) = self.open_row() {
            return Err(TableError::RowBusy(open));
        }
        self.form = FormValues::from_book(book);
        self.error = None;
        self.state = RowState::Editing(book.id);
        Ok(())
    }

    pub fn set_field(&mut self, field: Field, raw: &str) -> Result<(), TableError> {
        let RowState::Editing(_) = self.state else {
            return Err(TableError::NoOpenRow);
        };
        if field.input_type() == InputType::Date {
            return Err(TableError::ReadOnly(field.name()));
        }
        self.form.set_input(field, raw);
        Ok(())
    }

    /// Validate the open row and hand back the update to send. Invalid input
    /// keeps the row open.
    pub fn begin_save(&mut self, id: Uuid) -> Result<BookUpdate, TableError> {
        if self.state != RowState::Editing(id) {
            return Err(TableError::NotEditing(id));
        }

        match self.form.changes(&editable_fields()) {
            Ok(changes) => {
                self.state = RowState::Saving(id);
                self.error = None;
                Ok(BookUpdate { id, changes })
            }
            Err(errors) => {
                debug!(target: DIAGNOSTIC_TARGET, "Validate failed for row {}: {:?}", id, errors);
                Err(TableError::Invalid(errors))
            }
        }
    }

    /// Close the row once the update is confirmed; on failure reopen it with
    /// the error shown inline.
    pub fn finish_save(&mut self, id: Uuid, outcome: Result<(), String>) {
        if self.state != RowState::Saving(id) {
            debug!(
                target: DIAGNOSTIC_TARGET,
                "Ignoring save result for row {} in state {:?}", id, self.state
            );
            return;
        }

        match outcome {
            Ok(()) => {
                self.state = RowState::Idle;
                self.form.clear();
                self.error = None;
            }
            Err(message) => {
                self.state = RowState::Editing(id);
                self.error = Some(message);
            }
        }
    }

    /// Close the open row without saving. A row that is saving stays put.
    pub fn cancel(&mut self) -> bool {
        match self.state {
            RowState::Editing(_) => {
                self.state = RowState::Idle;
                self.form.clear();
                self.error = None;
                true
            }
            _ => false,
        }
    }

    /// Deleting is only offered while no row is open.
    pub fn begin_delete(&self) -> Result<(), TableError> {
        match self.open_row() {
            Some(open) => Err(TableError::RowBusy(open)),
            None => Ok(()),
        }
    }

    pub fn rows(&self, books: &[Book]) -> Vec<RowView> {
        books.iter().map(|book| self.row(book)).collect()
    }

    fn row(&self, book: &Book) -> RowView {
        let open = self.open_row() == Some(book.id);

        let cells = COLUMNS
            .iter()
            .map(|column| {
                if open && column.editable() {
                    Cell::Input {
                        field: column.field,
                        input_type: column.field.input_type(),
                        value: self.form.input(column.field),
                    }
                } else {
                    display_cell(book, column.field)
                }
            })
            .collect();

        let actions = match self.state {
            RowState::Editing(id) if id == book.id => vec![
                link(Action::Save, true),
                link(Action::Cancel, true),
            ],
            RowState::Saving(id) if id == book.id => vec![
                link(Action::Save, false),
                link(Action::Cancel, false),
            ],
            state => {
                let enabled = state == RowState::Idle;
                vec![
                    link(Action::Edit, enabled),
                    link(Action::Delete, enabled),
                ]
            }
        };

        RowView {
            id: book.id,
            cells,
            actions,
        }
    }
}

fn link(action: Action, enabled: bool) -> ActionLink {
    ActionLink { action, enabled }
}

fn display_cell(book: &Book, field: Field) -> Cell {
    let text = match field {
        Field::Email => {
            return Cell::Link {
                text: book.email.clone(),
                href: book.id.to_string(),
            }
        }
        Field::Okey => {
            let preview: String = book.okey.chars().take(KEY_PREVIEW_LEN).collect();
            format!("{preview}...")
        }
        Field::DateOfCreation => book.date_of_creation.format("%a %b %d %Y").to_string(),
        Field::Url => book.url.clone(),
        Field::Tel => book.tel.clone(),
        Field::Color => book.color.clone(),
        Field::City => book.city.clone(),
        Field::Author => book.author.clone(),
        Field::Age => book.age.to_string(),
        Field::NumberOfPages => book.number_of_pages.to_string(),
        Field::NumberOfChapters => book.number_of_chapters.to_string(),
        Field::NumberOfPublishedBooks => book.number_of_published_books.to_string(),
    };
    Cell::Text(text)
}
