//! Delimited text I/O — comma-separated numeric tables without headers
//!
//! Reading rejects anything that is not a finite number. Writing goes through
//! a temporary file in the destination directory that is renamed into place,
//! so a failed write never leaves a partial file behind. Staged files let a
//! caller prepare several outputs and commit them only once all are written.

mod loader;
mod writer;

pub use loader::{load_matrix, load_table};
pub use writer::{stage, stage_matrix, stage_order, write_atomic, write_matrix, write_order, StagedFile};
