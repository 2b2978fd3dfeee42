//! The person entry form.
//!
//! [`PersonForm`] holds the two name fields, the list of people from the
//! most recent fetch, and the rendered text view. It validates input before
//! anything reaches the store and reports store failures instead of
//! swallowing them.

use thiserror::Error;
use tracing::{debug, warn};

use crate::person::Person;
use crate::store::{RecordStore, StoreError};

/// A name field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The first name field is empty.
    #[error("first name must not be empty")]
    EmptyFirstName,

    /// The last name field is empty.
    #[error("last name must not be empty")]
    EmptyLastName,
}

/// Errors reported by form actions.
#[derive(Debug, Error)]
pub enum FormError {
    /// Input was rejected before reaching the store.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The store reported a failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Check that both name fields are non-empty.
///
/// Only zero-length fields are rejected; whitespace counts as content.
///
/// # Errors
///
/// Returns the first failing field.
pub fn validate(first_name: &str, last_name: &str) -> Result<(), ValidationError> {
    if first_name.is_empty() {
        return Err(ValidationError::EmptyFirstName);
    }
    if last_name.is_empty() {
        return Err(ValidationError::EmptyLastName);
    }
    Ok(())
}

/// Render people one per line as `"<first> <last>\n"`.
#[must_use]
pub fn render(people: &[Person]) -> String {
    people.iter().map(|person| format!("{person}\n")).collect()
}

/// Single-screen form for adding and listing people.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonForm {
    /// First name input field.
    pub first_name: String,
    /// Last name input field.
    pub last_name: String,
    /// People from the last fetch, plus any submitted since.
    people: Vec<Person>,
    /// Read-only listing shown to the user.
    text_view: String,
}

impl PersonForm {
    /// Create an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a form with both fields filled in.
    #[must_use]
    pub fn with_names(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Self::default()
        }
    }

    /// People currently held by the form.
    #[must_use]
    pub fn people(&self) -> &[Person] {
        &self.people
    }

    /// Contents of the text view.
    #[must_use]
    pub fn text_view(&self) -> &str {
        &self.text_view
    }

    /// Save the current fields as a new person.
    ///
    /// Invalid input never reaches the store. On success the new person is
    /// also added to the form's list.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Invalid`] if a field is empty, or
    /// [`FormError::Store`] if the store rejects the write.
    pub fn submit<S: RecordStore + ?Sized>(&mut self, store: &mut S) -> Result<Person, FormError> {
        validate(&self.first_name, &self.last_name)?;

        if let Err(e) = store.append(&self.first_name, &self.last_name) {
            warn!("Couldn't save person: {}", e);
            return Err(e.into());
        }

        let person = Person::new(self.first_name.clone(), self.last_name.clone());
        self.people.push(person.clone());
        debug!("Saved person; form now holds {}", self.people.len());
        Ok(person)
    }

    /// Fetch every person and render them into the text view.
    ///
    /// The text view is replaced, not appended to. On failure the list and
    /// text view are left as they were.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Store`] if the fetch fails.
    pub fn list<S: RecordStore + ?Sized>(&mut self, store: &mut S) -> Result<&str, FormError> {
        let people = store.fetch_all().map_err(|e| {
            warn!("Could not fetch people: {}", e);
            FormError::from(e)
        })?;

        self.text_view = render(&people);
        self.people = people;
        debug!("Listed {} people", self.people.len());
        Ok(&self.text_view)
    }
}
