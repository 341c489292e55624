//! Core library for jjwork: settings-file merge for agent hook entries and
//! jj workspace lifecycle for parallel agent sessions.

pub mod error;
pub mod io;
pub mod jj;
pub mod paths;
pub mod settings;
pub mod stale;
pub mod workspace;

pub use error::{JjworkError, Result};
