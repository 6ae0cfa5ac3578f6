//! Change sets: the unit of text editing exchanged between sessions.

mod changeset;
mod cursor;
mod error;
mod types;

#[cfg(test)]
mod tests;

pub use changeset::ChangeSet;
pub use error::ChangeError;
pub use types::{Bias, Change, Insertion, Operation, Tendril};
