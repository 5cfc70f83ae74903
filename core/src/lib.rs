//! Core of the sprout growth tracker: the meal log and its aggregates, the
//! food catalog, remote-first sync, growth goals, and the assistant.

pub mod aggregate;
pub mod assistant;
pub mod catalog;
pub mod clock;
pub mod entries;
pub mod error;
pub mod export;
pub mod goals;
pub mod models;
pub mod remote;
pub mod store;
pub mod sync;

pub use error::{Error, Result};
