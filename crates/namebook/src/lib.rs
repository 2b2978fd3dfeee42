//! `namebook` - A local record store for people's names
//!
//! This library provides a durable append-and-fetch store for [`Person`]
//! records and the form that validates input before it reaches the store.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod logging;
pub mod person;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use form::{FormError, PersonForm, ValidationError};
pub use logging::init_logging;
pub use person::Person;
pub use store::{MemoryStore, RecordStore, SqliteStore, StoreError, StoreOptions};
