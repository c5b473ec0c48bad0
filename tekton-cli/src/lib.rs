//! Tekton CLI wrapper - command templates, process execution and cluster listings

pub mod command;
pub mod executor;
pub mod tkn;

pub use executor::{CliExecutor, CliResult, OutputStream, StreamHandle, TerminalLine};
pub use tkn::{Tkn, TknCli};
