//! Core types for collaborative text editing: change sets and ranges.

/// Change sets and their operations.
pub mod changes;
/// Text range types: char indices and anchor/head ranges.
pub mod range;

pub use changes::{Bias, Change, ChangeError, ChangeSet, Insertion, Operation, Tendril};
pub use range::{CharIdx, CharLen, Direction, Range};
pub use ropey::{Rope, RopeSlice};
