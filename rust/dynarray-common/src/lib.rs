//! Core definitions shared by the dynarray-* crates: the error type and the
//! `Result` alias.

pub mod error;
pub mod result;

pub use error::{Error, ErrorKind};
pub use result::Result;
