//! Field model, input coercion and validation shared by the edit row and the
//! create dialog.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;

use crate::models::{Book, BookChanges, NewBook};

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Wire format of `date_of_creation`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Email,
    Url,
    Tel,
    Color,
    Okey,
    City,
    Author,
    DateOfCreation,
    Age,
    NumberOfPages,
    NumberOfChapters,
    NumberOfPublishedBooks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    Text,
    /// Non-negative integers only
    Number,
    Date,
}

impl Field {
    pub const ALL: [Field; 12] = [
        Field::Email,
        Field::Url,
        Field::Tel,
        Field::Color,
        Field::Okey,
        Field::City,
        Field::Author,
        Field::DateOfCreation,
        Field::Age,
        Field::NumberOfPages,
        Field::NumberOfChapters,
        Field::NumberOfPublishedBooks,
    ];

    /// The attribute name on the wire.
    pub fn name(self) -> &'static str {
        match self {
            Field::Email => "email",
            Field::Url => "url",
            Field::Tel => "tel",
            Field::Color => "color",
            Field::Okey => "okey",
            Field::City => "city",
            Field::Author => "author",
            Field::DateOfCreation => "date_of_creation",
            Field::Age => "age",
            Field::NumberOfPages => "number_of_pages",
            Field::NumberOfChapters => "number_of_chapters",
            Field::NumberOfPublishedBooks => "number_of_published_books",
        }
    }

    /// Human-readable label used in messages.
    pub fn label(self) -> &'static str {
        match self {
            Field::Email => "email",
            Field::Url => "url",
            Field::Tel => "telephone",
            Field::Color => "color",
            Field::Okey => "open key",
            Field::City => "city",
            Field::Author => "author",
            Field::DateOfCreation => "date",
            Field::Age => "age",
            Field::NumberOfPages => "number of pages",
            Field::NumberOfChapters => "number of chapters",
            Field::NumberOfPublishedBooks => "number of published books",
        }
    }

    pub fn input_type(self) -> InputType {
        match self {
            Field::Age
            | Field::NumberOfPages
            | Field::NumberOfChapters
            | Field::NumberOfPublishedBooks => InputType::Number,
            Field::DateOfCreation => InputType::Date,
            _ => InputType::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Number(i32),
    Date(NaiveDate),
}

impl FieldValue {
    /// The value as it appears in an input box.
    pub fn to_input(&self) -> String {
        match self {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Number(number) => number.to_string(),
            FieldValue::Date(date) => date.format(DATE_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    fn new(field: Field, message: impl Into<String>) -> Self {
        FieldError {
            field,
            message: message.into(),
        }
    }

    fn missing(field: Field) -> Self {
        FieldError::new(field, format!("Please input the {}!", field.label()))
    }
}

/// Coerce raw numeric input to a non-negative integer. Negative values clamp
/// to zero, fractions truncate, anything unparseable yields `None`.
pub fn coerce_count(raw: &str) -> Option<i32> {
    let number: f64 = raw.trim().parse().ok()?;
    if !number.is_finite() {
        return None;
    }
    Some(number.trunc().clamp(0.0, f64::from(i32::MAX)) as i32)
}

/// The current values of a form, keyed by field. Absent fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    values: BTreeMap<Field, FieldValue>,
}

impl FormValues {
    pub fn from_book(book: &Book) -> Self {
        let mut form = FormValues::default();
        for (field, value) in [
            (Field::Email, FieldValue::Text(book.email.clone())),
            (Field::Url, FieldValue::Text(book.url.clone())),
            (Field::Tel, FieldValue::Text(book.tel.clone())),
            (Field::Color, FieldValue::Text(book.color.clone())),
            (Field::Okey, FieldValue::Text(book.okey.clone())),
            (Field::City, FieldValue::Text(book.city.clone())),
            (Field::Author, FieldValue::Text(book.author.clone())),
            (Field::DateOfCreation, FieldValue::Date(book.date_of_creation)),
            (Field::Age, FieldValue::Number(book.age)),
            (Field::NumberOfPages, FieldValue::Number(book.number_of_pages)),
            (Field::NumberOfChapters, FieldValue::Number(book.number_of_chapters)),
            (
                Field::NumberOfPublishedBooks,
                FieldValue::Number(book.number_of_published_books),
            ),
        ] {
            form.values.insert(field, value);
        }
        form
    }

    /// Store raw user input, coerced to the field's input type. Input that
    /// cannot be coerced empties the field.
    pub fn set_input(&mut self, field: Field, raw: &str) {
        let value = match field.input_type() {
            InputType::Text => Some(FieldValue::Text(raw.to_string())),
            InputType::Number => coerce_count(raw).map(FieldValue::Number),
            InputType::Date => NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
                .ok()
                .map(FieldValue::Date),
        };

        match value {
            Some(value) => self.values.insert(field, value),
            None => self.values.remove(&field),
        };
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    pub fn input(&self, field: Field) -> String {
        self.get(field).map(FieldValue::to_input).unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Every field must be present and valid.
    pub fn new_book(&self) -> Result<NewBook, Vec<FieldError>> {
        let mut check = Checker::new(self);
        let book = NewBook {
            email: check.text(Field::Email),
            url: check.text(Field::Url),
            tel: check.text(Field::Tel),
            color: check.text(Field::Color),
            okey: check.text(Field::Okey),
            city: check.text(Field::City),
            author: check.text(Field::Author),
            date_of_creation: check.date(Field::DateOfCreation),
            age: check.number(Field::Age),
            number_of_pages: check.number(Field::NumberOfPages),
            number_of_chapters: check.number(Field::NumberOfChapters),
            number_of_published_books: check.number(Field::NumberOfPublishedBooks),
        };
        check.finish(book)
    }

    /// Only `fields` are validated and submitted.
    pub fn changes(&self, fields: &[Field]) -> Result<BookChanges, Vec<FieldError>> {
        let mut check = Checker::new(self);
        let mut changes = BookChanges::default();
        for &field in fields {
            match field {
                Field::Email => changes.email = Some(check.text(field)),
                Field::Url => changes.url = Some(check.text(field)),
                Field::Tel => changes.tel = Some(check.text(field)),
                Field::Color => changes.color = Some(check.text(field)),
                Field::Okey => changes.okey = Some(check.text(field)),
                Field::City => changes.city = Some(check.text(field)),
                Field::Author => changes.author = Some(check.text(field)),
                Field::DateOfCreation => changes.date_of_creation = Some(check.date(field)),
                Field::Age => changes.age = Some(check.number(field)),
                Field::NumberOfPages => changes.number_of_pages = Some(check.number(field)),
                Field::NumberOfChapters => changes.number_of_chapters = Some(check.number(field)),
                Field::NumberOfPublishedBooks => {
                    changes.number_of_published_books = Some(check.number(field))
                }
            }
        }
        check.finish(changes)
    }
}

/// Pulls typed values out of a form while collecting every failure, so all
/// invalid fields are reported at once.
struct Checker<'a> {
    form: &'a FormValues,
    errors: Vec<FieldError>,
}

impl<'a> Checker<'a> {
    fn new(form: &'a FormValues) -> Self {
        Checker {
            form,
            errors: Vec::new(),
        }
    }

    fn text(&mut self, field: Field) -> String {
        let form = self.form;
        let text = match form.get(field) {
            Some(FieldValue::Text(text)) if !text.trim().is_empty() => text.trim(),
            _ => {
                self.errors.push(FieldError::missing(field));
                return String::new();
            }
        };

        let well_formed = match field {
            Field::Email => EMAIL.is_match(text),
            Field::Url => Url::parse(text).is_ok_and(|url| url.has_host()),
            _ => true,
        };
        if !well_formed {
            self.errors.push(FieldError::new(
                field,
                format!("'{}' is not a valid {}", field.name(), field.label()),
            ));
        }

        text.to_string()
    }

    fn number(&mut self, field: Field) -> i32 {
        match self.form.get(field) {
            Some(FieldValue::Number(number)) if *number >= 0 => *number,
            _ => {
                self.errors.push(FieldError::missing(field));
                0
            }
        }
    }

    fn date(&mut self, field: Field) -> NaiveDate {
        match self.form.get(field) {
            Some(FieldValue::Date(date)) => *date,
            _ => {
                self.errors.push(FieldError::missing(field));
                NaiveDate::MIN
            }
        }
    }

    fn finish<T>(self, value: T) -> Result<T, Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }
}
