//! Filesystem operations: the safe mover and its helpers.

mod atomic;
mod copy;
mod duplicate;
mod file_move;
mod helpers;
mod util;

pub use duplicate::{numbered_name, MAX_SUFFIX_ATTEMPTS};
pub use file_move::move_into;

pub(crate) use helpers::describe_io_error;
