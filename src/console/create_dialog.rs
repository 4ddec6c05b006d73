use tracing::debug;

use super::form::{Field, FieldError, FormValues};
use super::notify::DIAGNOSTIC_TARGET;
use crate::models::NewBook;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum DialogError {
    #[error("the create dialog is not open")]
    Closed,

    #[error("a create request is already pending")]
    Pending,

    #[error("{} field(s) failed validation", .0.len())]
    Invalid(Vec<FieldError>),
}

/// Modal form for new books.
#[derive(Debug, Default)]
pub struct CreateDialog {
    visible: bool,
    pending: bool,
    form: FormValues,
    errors: Vec<FieldError>,
}

impl CreateDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn form(&self) -> &FormValues {
        &self.form
    }

    /// Validation errors from the last submit attempt.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Show the dialog. Values entered earlier are kept, stale validation
    /// errors are not.
    pub fn open(&mut self) {
        self.visible = true;
        self.errors.clear();
    }

    pub fn cancel(&mut self) {
        self.visible = false;
    }

    pub fn set_field(&mut self, field: Field, raw: &str) {
        self.form.set_input(field, raw);
    }

    /// Validate every field and, if they all pass, mark the dialog pending
    /// and return the book to create.
    pub fn begin_submit(&mut self) -> Result<NewBook, DialogError> {
        if !self.visible {
            return Err(DialogError::Closed);
        }
        if self.pending {
            return Err(DialogError::Pending);
        }

        match self.form.new_book() {
            Ok(book) => {
                self.errors.clear();
                self.pending = true;
                Ok(book)
            }
            Err(errors) => {
                debug!(target: DIAGNOSTIC_TARGET, "Validate failed: {:?}", errors);
                self.errors = errors.clone();
                Err(DialogError::Invalid(errors))
            }
        }
    }

    /// A created book closes and resets the dialog; a failure leaves it open
    /// with the entered values intact.
    pub fn finish_submit(&mut self, created: bool) {
        self.pending = false;
        if created {
            self.visible = false;
            self.form.clear();
            self.errors.clear();
        }
    }
}
