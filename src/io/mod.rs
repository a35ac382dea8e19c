//! Colony files and assignment output.
//!
//! - [`parse_colony`] / [`read_colony`]: load a colony description.
//! - [`write_assignments`] / [`save_assignments`]: emit the allocation.

mod reader;
mod writer;

pub use reader::{parse_colony, read_colony, ColonyFileError};
pub use writer::{save_assignments, write_assignments};
