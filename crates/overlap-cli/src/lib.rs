//! Library side of the `drug-overlap` command.

pub mod config;
pub mod logging;
pub mod pipeline;
