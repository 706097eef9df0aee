//! Types shared by the dashboard core, the GUI shell and the CLI.

pub mod domain;
pub mod error;
pub mod protocol;
